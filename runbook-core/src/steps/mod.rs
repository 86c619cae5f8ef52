mod api;
mod branch;
mod run_command;
mod script;
mod timing;

pub use api::ApiCall;
pub use branch::{BranchStep, Choice};
pub use run_command::RunCommandStep;
pub use script::{HelperLibrary, ScriptStep};
pub use timing::{PauseStep, SleepStep};

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::automation::Automation;
use crate::values::Output;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 3600;

/// The closed set of things a step can do.
#[derive(Debug, Clone)]
pub enum StepKind {
    ApiCall(ApiCall),
    Branch(BranchStep),
    Sleep(SleepStep),
    Pause(PauseStep),
    Script(ScriptStep),
    Automation(Arc<Automation>),
    RunCommand(RunCommandStep),
}

impl StepKind {
    /// Wire-format `action` of the step.
    pub fn action(&self) -> &'static str {
        match self {
            StepKind::ApiCall(_) => "aws:executeAwsApi",
            StepKind::Branch(_) => "aws:branch",
            StepKind::Sleep(_) => "aws:sleep",
            StepKind::Pause(_) => "aws:pause",
            StepKind::Script(_) => "aws:executeScript",
            StepKind::Automation(_) => "aws:executeAutomation",
            StepKind::RunCommand(_) => "aws:runCommand",
        }
    }

    fn referenced_inputs(&self, out: &mut BTreeSet<String>) {
        match self {
            StepKind::ApiCall(call) => call.referenced_inputs(out),
            StepKind::Branch(branch) => {
                out.extend(branch.choices().iter().map(|c| c.input_to_test().to_string()))
            }
            StepKind::Script(script) => out.extend(script.input_payload().values().cloned()),
            StepKind::Automation(automation) => out.extend(automation.forwarded_inputs()),
            StepKind::RunCommand(cmd) => cmd.referenced_inputs(out),
            StepKind::Sleep(_) | StepKind::Pause(_) => {}
        }
    }
}

/// One unit of effect, retry policy and wire fragment.
///
/// Steps are assembled with the builder methods below and become immutable
/// once handed to an [`Automation`](crate::Automation) builder.
#[derive(Debug, Clone)]
pub struct Step {
    name: String,
    description: Option<String>,
    kind: StepKind,
    max_attempts: u32,
    timeout_seconds: u64,
    is_end: bool,
    on_failure: Option<String>,
    on_cancel: Option<String>,
    inputs: Vec<String>,
    outputs: Vec<Output>,
}

impl Step {
    pub fn new(name: impl Into<String>, kind: StepKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            is_end: false,
            on_failure: None,
            on_cancel: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn api_call(name: impl Into<String>, call: ApiCall) -> Self {
        Self::new(name, StepKind::ApiCall(call))
    }

    pub fn branch(name: impl Into<String>, branch: BranchStep) -> Self {
        Self::new(name, StepKind::Branch(branch))
    }

    pub fn sleep(name: impl Into<String>, seconds: u64) -> Self {
        Self::new(name, StepKind::Sleep(SleepStep::new(seconds)))
    }

    pub fn pause(name: impl Into<String>) -> Self {
        Self::new(name, StepKind::Pause(PauseStep))
    }

    pub fn script(name: impl Into<String>, script: ScriptStep) -> Self {
        Self::new(name, StepKind::Script(script))
    }

    /// Run `automation` as a nested sub-document.
    pub fn automation(name: impl Into<String>, automation: Arc<Automation>) -> Self {
        Self::new(name, StepKind::Automation(automation))
    }

    /// Run a command document; `Status` and `ResponseCode` are declared as outputs.
    pub fn run_command(name: impl Into<String>, command: RunCommandStep) -> Self {
        Self::new(name, StepKind::RunCommand(command))
            .output(Output::new("Status", crate::values::DataType::String))
            .output(Output::new("ResponseCode", crate::values::DataType::Integer))
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn is_end(mut self, is_end: bool) -> Self {
        self.is_end = is_end;
        self
    }

    pub fn on_failure(mut self, target: impl Into<String>) -> Self {
        self.on_failure = Some(target.into());
        self
    }

    pub fn on_cancel(mut self, target: impl Into<String>) -> Self {
        self.on_cancel = Some(target.into());
        self
    }

    /// Declare a context value (`Name` or `Step.Output`) the step needs.
    pub fn input(mut self, name: impl Into<String>) -> Self {
        self.inputs.push(name.into());
        self
    }

    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn kind(&self) -> &StepKind {
        &self.kind
    }

    pub fn attempt_limit(&self) -> u32 {
        self.max_attempts
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_seconds
    }

    pub fn ends_chain(&self) -> bool {
        self.is_end
    }

    pub fn failure_target(&self) -> Option<&str> {
        self.on_failure.as_deref()
    }

    pub fn cancel_target(&self) -> Option<&str> {
        self.on_cancel.as_deref()
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn declared_inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Every context key that must be present before this step runs:
    /// explicit inputs plus the references its kind uses.
    pub fn required_inputs(&self) -> BTreeSet<String> {
        let mut out: BTreeSet<String> = self.inputs.iter().cloned().collect();
        self.kind.referenced_inputs(&mut out);
        out
    }
}
