//! Effects the interpreter delegates to the caller.
//!
//! Nothing here talks to a network service. Callers inject implementations
//! (real clients, or test doubles) through the interpreter builder.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use runbook_core::types::InputMap;
use runbook_core::CommandAction;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapabilityError {
    #[error("{0} capability is not configured")]
    NotConfigured(&'static str),
    #[error("{0}")]
    Failed(String),
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub service: String,
    pub api: String,
    pub params: InputMap,
    /// Resolved role the call should run under, if the automation declares one.
    pub assume_role: Option<Value>,
}

#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn call(&self, request: ApiRequest) -> Result<Value, CapabilityError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptInvocation {
    pub runtime: String,
    pub handler: String,
    pub script: String,
    pub payload: InputMap,
}

#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Run the script and return the handler's result.
    async fn run(&self, invocation: ScriptInvocation) -> Result<Value, CapabilityError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub action: CommandAction,
    pub script: String,
    pub working_directory: Option<PathBuf>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, invocation: CommandInvocation) -> Result<CommandOutput, CapabilityError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Pending,
    InProgress,
    Delayed,
    Success,
    Cancelled,
    TimedOut,
    Failed,
}

impl CommandStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CommandStatus::Success
                | CommandStatus::Cancelled
                | CommandStatus::TimedOut
                | CommandStatus::Failed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandStatus::Pending => "Pending",
            CommandStatus::InProgress => "InProgress",
            CommandStatus::Delayed => "Delayed",
            CommandStatus::Success => "Success",
            CommandStatus::Cancelled => "Cancelled",
            CommandStatus::TimedOut => "TimedOut",
            CommandStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    pub document_name: String,
    pub instance_ids: Vec<String>,
    pub parameters: InputMap,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResult {
    pub status: CommandStatus,
    pub response_code: i64,
    pub output: String,
}

#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    /// Submit a command document; returns the remote command id.
    async fn send(&self, request: DispatchRequest) -> Result<String, CapabilityError>;
    /// Current status of a submitted command.
    async fn wait(&self, command_id: &str) -> Result<CommandStatus, CapabilityError>;
    async fn fetch(&self, command_id: &str) -> Result<DispatchResult, CapabilityError>;
}

/// Placeholder for capabilities the caller did not inject.
pub struct Unconfigured;

#[async_trait]
impl RemoteApi for Unconfigured {
    async fn call(&self, _request: ApiRequest) -> Result<Value, CapabilityError> {
        Err(CapabilityError::NotConfigured("remote api"))
    }
}

#[async_trait]
impl ScriptRunner for Unconfigured {
    async fn run(&self, _invocation: ScriptInvocation) -> Result<Value, CapabilityError> {
        Err(CapabilityError::NotConfigured("script runner"))
    }
}

#[async_trait]
impl CommandRunner for Unconfigured {
    async fn run(&self, _invocation: CommandInvocation) -> Result<CommandOutput, CapabilityError> {
        Err(CapabilityError::NotConfigured("command runner"))
    }
}

#[async_trait]
impl CommandDispatcher for Unconfigured {
    async fn send(&self, _request: DispatchRequest) -> Result<String, CapabilityError> {
        Err(CapabilityError::NotConfigured("command dispatcher"))
    }

    async fn wait(&self, _command_id: &str) -> Result<CommandStatus, CapabilityError> {
        Err(CapabilityError::NotConfigured("command dispatcher"))
    }

    async fn fetch(&self, _command_id: &str) -> Result<DispatchResult, CapabilityError> {
        Err(CapabilityError::NotConfigured("command dispatcher"))
    }
}

/// Runs command steps as child processes of this one.
pub struct ShellCommandRunner;

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(&self, invocation: CommandInvocation) -> Result<CommandOutput, CapabilityError> {
        let mut cmd = match invocation.action {
            CommandAction::ShellScript => {
                let mut c = tokio::process::Command::new("sh");
                c.arg("-c").arg(&invocation.script);
                c
            }
            CommandAction::PowerShellScript => {
                let mut c = tokio::process::Command::new("powershell");
                c.arg("-NoProfile").arg("-Command").arg(&invocation.script);
                c
            }
        };
        if let Some(dir) = &invocation.working_directory {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(invocation.timeout, cmd.output())
            .await
            .map_err(|_| {
                CapabilityError::Failed(format!(
                    "command timed out after {}s",
                    invocation.timeout.as_secs()
                ))
            })?
            .map_err(|e| CapabilityError::Failed(format!("failed to spawn command: {e}")))?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
