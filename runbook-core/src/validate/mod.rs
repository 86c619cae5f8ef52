mod rules;
mod validator;

use crate::automation::Automation;
use crate::command::CommandDocument;
use crate::error::ConfigError;

pub(crate) use validator::Validator;
pub use validator::MAX_STEP_NAME_LEN;

/// Re-run static validation on an already built value.
pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

impl Validate for Automation {
    fn validate(&self) -> Result<(), ConfigError> {
        let raw: Vec<String> = self.doc_outputs().iter().map(|r| r.key()).collect();
        let mut v = Validator::new();
        v.validate_automation(self, &raw);
        v.finish()
    }
}

impl Validate for CommandDocument {
    fn validate(&self) -> Result<(), ConfigError> {
        let mut v = Validator::new();
        v.validate_command_document(self);
        v.finish()
    }
}
