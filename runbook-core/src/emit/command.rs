use serde_json::Value;

use crate::command::{CommandDocument, CommandStep};
use crate::error::EmitError;
use crate::types::{CommandDoc, CommandStepFragment, InputMap, Precondition, COMMAND_SCHEMA_VERSION};

use super::{render, write_document, EmitFormat};

impl CommandDocument {
    pub fn compile(&self) -> CommandDoc {
        // A single supported platform is pinned on every step.
        let precondition = match self.platforms().iter().collect::<Vec<_>>().as_slice() {
            [only] => Some(Precondition {
                string_equals: vec!["platformType".to_string(), only.as_str().to_string()],
            }),
            _ => None,
        };

        CommandDoc {
            description: self.description().map(str::to_string),
            schema_version: COMMAND_SCHEMA_VERSION.to_string(),
            parameters: self
                .parameters()
                .iter()
                .map(|p| (p.name().to_string(), p.to_parameter()))
                .collect(),
            main_steps: self
                .steps()
                .iter()
                .map(|s| command_fragment(s, precondition.clone()))
                .collect(),
        }
    }

    pub fn render(&self, format: EmitFormat) -> Result<String, EmitError> {
        render(&self.compile(), format)
    }

    pub fn write_to(
        &self,
        path: impl AsRef<std::path::Path>,
        format: EmitFormat,
    ) -> Result<(), EmitError> {
        write_document(&self.compile(), path, format)
    }
}

fn command_fragment(step: &CommandStep, precondition: Option<Precondition>) -> CommandStepFragment {
    let mut inputs = InputMap::new();
    inputs.insert(
        "runCommand".into(),
        Value::Array(step.commands().iter().cloned().map(Value::String).collect()),
    );
    if let Some(dir) = step.working_dir() {
        inputs.insert("workingDirectory".into(), Value::String(dir.to_string()));
    }
    if let Some(timeout) = step.timeout_secs() {
        inputs.insert("timeoutSeconds".into(), Value::from(timeout));
    }

    CommandStepFragment {
        action: step.action().action().to_string(),
        name: step.name().to_string(),
        precondition,
        inputs,
        on_failure: step.continues_on_failure().then(|| "continue".to_string()),
        finally_step: step.is_finally().then_some(true),
    }
}
