use std::sync::LazyLock;

use regex::Regex;

use crate::automation::Automation;
use crate::command::CommandDocument;
use crate::error::{ConfigError, Violation};

use super::rules;

pub const MAX_STEP_NAME_LEN: usize = 100;

pub(crate) static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid"));
pub(crate) static DOC_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-.]{3,128}$").expect("valid"));

pub(crate) struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    pub fn finish(self) -> Result<(), ConfigError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::new(self.violations))
        }
    }

    pub fn validate_automation(&mut self, automation: &Automation, raw_doc_outputs: &[String]) {
        rules::automation::validate_automation(self, automation, raw_doc_outputs);
    }

    pub fn validate_command_document(&mut self, doc: &CommandDocument) {
        rules::command::validate_command_document(self, doc);
    }

    pub(crate) fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(path, message));
    }

    pub(crate) fn validate_document_name(&mut self, path: &str, name: &str) {
        if !DOC_NAME_RE.is_match(name) {
            self.push(path, "must be 3-128 characters of [A-Za-z0-9_.-]");
        }
    }
}
