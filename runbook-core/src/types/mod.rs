//! Wire model of the two emitted document schemas.

mod automation;
mod command;
mod parameter;

pub use automation::{AutomationDoc, OutputSpec, StepFragment, AUTOMATION_SCHEMA_VERSION};
pub use command::{CommandDoc, CommandStepFragment, Precondition, COMMAND_SCHEMA_VERSION};
pub use parameter::ParameterSpec;

pub type AnyValue = serde_json::Value;
pub type InputMap = serde_json::Map<String, serde_json::Value>;
