//! OS-level command steps and the command document they chain into.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::ConfigError;
use crate::expressions::collect_references;
use crate::validate::Validator;
use crate::values::Input;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Platform {
    Linux,
    Windows,
    MacOS,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "Linux",
            Platform::Windows => "Windows",
            Platform::MacOS => "MacOS",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandAction {
    ShellScript,
    PowerShellScript,
}

impl CommandAction {
    pub fn action(&self) -> &'static str {
        match self {
            CommandAction::ShellScript => "aws:runShellScript",
            CommandAction::PowerShellScript => "aws:runPowerShellScript",
        }
    }

    pub fn default_platforms(&self) -> BTreeSet<Platform> {
        match self {
            CommandAction::ShellScript => [Platform::Linux, Platform::MacOS].into(),
            CommandAction::PowerShellScript => [Platform::Windows].into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandStep {
    name: String,
    action: CommandAction,
    commands: Vec<String>,
    working_directory: Option<String>,
    timeout_seconds: Option<u64>,
    platforms: BTreeSet<Platform>,
    continue_on_failure: bool,
    finally: bool,
}

impl CommandStep {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        action: CommandAction,
        commands: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name: name.into(),
            action,
            commands: commands.into_iter().map(Into::into).collect(),
            working_directory: None,
            timeout_seconds: None,
            platforms: action.default_platforms(),
            continue_on_failure: false,
            finally: false,
        }
    }

    pub fn shell<S: Into<String>>(name: impl Into<String>, commands: impl IntoIterator<Item = S>) -> Self {
        Self::new(name, CommandAction::ShellScript, commands)
    }

    pub fn powershell<S: Into<String>>(
        name: impl Into<String>,
        commands: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(name, CommandAction::PowerShellScript, commands)
    }

    pub fn working_directory(mut self, dir: impl Into<String>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Replace the platforms this step can run on.
    pub fn platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.platforms = platforms.into_iter().collect();
        self
    }

    /// On failure, carry on with the next step instead of jumping to the finally step.
    pub fn continue_on_failure(mut self) -> Self {
        self.continue_on_failure = true;
        self
    }

    /// Mark as the cleanup step that runs whether earlier steps failed or not.
    pub fn finally(mut self) -> Self {
        self.finally = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn action(&self) -> CommandAction {
        self.action
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn working_dir(&self) -> Option<&str> {
        self.working_directory.as_deref()
    }

    pub fn timeout_secs(&self) -> Option<u64> {
        self.timeout_seconds
    }

    pub fn supported_platforms(&self) -> &BTreeSet<Platform> {
        &self.platforms
    }

    pub fn continues_on_failure(&self) -> bool {
        self.continue_on_failure
    }

    pub fn is_finally(&self) -> bool {
        self.finally
    }

    /// Parameter names referenced by `{{ Name }}` in commands or working directory.
    pub fn referenced_parameters(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        for text in self.commands.iter().chain(self.working_directory.iter()) {
            let _ = collect_references(&Value::String(text.clone()), &mut out);
        }
        out
    }
}

/// Intersection of every step's platform set.
pub fn intersect_platforms<'a>(steps: impl IntoIterator<Item = &'a CommandStep>) -> BTreeSet<Platform> {
    let mut steps = steps.into_iter();
    let Some(first) = steps.next() else {
        return BTreeSet::new();
    };
    steps.fold(first.supported_platforms().clone(), |acc, s| {
        acc.intersection(s.supported_platforms()).copied().collect()
    })
}

#[derive(Debug, Clone)]
pub struct CommandDocument {
    name: String,
    description: Option<String>,
    parameters: Vec<Input>,
    steps: Vec<CommandStep>,
    platforms: BTreeSet<Platform>,
}

impl CommandDocument {
    pub fn builder(name: impl Into<String>) -> CommandDocumentBuilder {
        CommandDocumentBuilder {
            name: name.into(),
            description: None,
            parameters: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parameters(&self) -> &[Input] {
        &self.parameters
    }

    pub fn steps(&self) -> &[CommandStep] {
        &self.steps
    }

    /// Platforms every step supports; never empty for a built document.
    pub fn platforms(&self) -> &BTreeSet<Platform> {
        &self.platforms
    }

    pub fn finally_index(&self) -> Option<usize> {
        self.steps.iter().position(CommandStep::is_finally)
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(CommandStep::name).collect()
    }
}

pub struct CommandDocumentBuilder {
    name: String,
    description: Option<String>,
    parameters: Vec<Input>,
    steps: Vec<CommandStep>,
}

impl CommandDocumentBuilder {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn parameter(mut self, input: Input) -> Self {
        self.parameters.push(input);
        self
    }

    pub fn then(mut self, step: CommandStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn build(self) -> Result<CommandDocument, ConfigError> {
        let doc = CommandDocument {
            platforms: intersect_platforms(&self.steps),
            name: self.name,
            description: self.description,
            parameters: self.parameters,
            steps: self.steps,
        };

        let mut v = Validator::new();
        v.validate_command_document(&doc);
        v.finish()?;
        Ok(doc)
    }
}
