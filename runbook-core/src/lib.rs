#![forbid(unsafe_code)]

pub mod automation;
pub mod chain;
pub mod command;
pub mod emit;
pub mod error;
pub mod expressions;
pub mod operations;
pub mod parser;
pub mod steps;
pub mod types;
pub mod validate;
pub mod values;

pub use crate::automation::{Automation, AutomationBuilder, DocOutputRef, RoleBinding};
pub use crate::chain::{Chain, Edges, StepId};
pub use crate::command::{
    intersect_platforms, CommandAction, CommandDocument, CommandDocumentBuilder, CommandStep,
    Platform,
};
pub use crate::emit::{render, write_document, EmitFormat};
pub use crate::error::{ConfigError, EmitError, ParseError, RunbookError, Violation};
pub use crate::expressions::{Selector, SelectorError, Template, TemplateError};
pub use crate::operations::{OperandType, Operation, OperationError};
pub use crate::parser::{
    parse_automation_document, parse_command_document, DocumentFormat, ParsedDocument,
};
pub use crate::steps::{
    ApiCall, BranchStep, Choice, HelperLibrary, PauseStep, RunCommandStep, ScriptStep, SleepStep,
    Step, StepKind,
};
pub use crate::validate::Validate;
pub use crate::values::{DataType, Input, InputError, Output};
