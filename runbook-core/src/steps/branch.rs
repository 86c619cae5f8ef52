use serde_json::Value;

use crate::operations::Operation;

/// One predicate/target pair of a branch.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    operation: Operation,
    input_to_test: String,
    constant: Value,
    target: String,
}

impl Choice {
    pub fn new(
        operation: Operation,
        input_to_test: impl Into<String>,
        constant: impl Into<Value>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            input_to_test: input_to_test.into(),
            constant: constant.into(),
            target: target.into(),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn input_to_test(&self) -> &str {
        &self.input_to_test
    }

    pub fn constant(&self) -> &Value {
        &self.constant
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Chooses the next step from an ordered list of choices.
///
/// When no choice matches control goes to `default_step`, or to the branch's
/// own successor when no default is given.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BranchStep {
    choices: Vec<Choice>,
    default_step: Option<String>,
}

impl BranchStep {
    pub fn new(choices: Vec<Choice>) -> Self {
        Self {
            choices,
            default_step: None,
        }
    }

    pub fn choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    pub fn default_step(mut self, target: impl Into<String>) -> Self {
        self.default_step = Some(target.into());
        self
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn default_target(&self) -> Option<&str> {
        self.default_step.as_deref()
    }
}
