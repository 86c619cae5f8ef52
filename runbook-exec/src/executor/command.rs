use std::path::PathBuf;
use std::time::Duration;

use runbook_core::types::InputMap;
use runbook_core::{CommandDocument, CommandStep, RunCommandStep};
use serde_json::{json, Value};

use crate::capabilities::{
    CapabilityError, CommandInvocation, CommandStatus, DispatchRequest, DispatchResult,
};
use crate::config::CommandMode;
use crate::context::ExecutionContext;
use crate::error::{RunError, StepError};
use crate::render::{display, render_value};

use super::Interpreter;

/// Outcome of running a command document locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReport {
    pub status: CommandStatus,
    pub response_code: i64,
    pub output: String,
    /// Command steps that ran, in order.
    pub trace: Vec<String>,
}

impl CommandReport {
    fn new() -> Self {
        Self {
            status: CommandStatus::Success,
            response_code: 0,
            output: String::new(),
            trace: Vec::new(),
        }
    }

    fn to_response(&self) -> Value {
        json!({
            "Status": self.status.as_str(),
            "ResponseCode": self.response_code,
            "Output": self.output,
        })
    }
}

struct StepRun {
    status: CommandStatus,
    exit_code: i64,
    output: String,
}

impl Interpreter {
    /// Run every step of `document` locally with the given parameters.
    ///
    /// Parameters without a value take their declared default.
    pub async fn run_command_document(
        &self,
        document: &CommandDocument,
        parameters: InputMap,
    ) -> Result<CommandReport, RunError> {
        let resolved = resolve_parameters(document, parameters)
            .map_err(|e| RunError::new(document.name(), e, Vec::new()))?;
        self.execute_command_document(document, &resolved)
            .await
            .map_err(|e| RunError::new(document.name(), e, Vec::new()))
    }

    pub(crate) async fn run_command_step(
        &self,
        cmd: &RunCommandStep,
        ctx: &ExecutionContext,
    ) -> Result<Value, StepError> {
        let document = cmd.document();
        let mut instance_ids = Vec::with_capacity(cmd.instance_ids().len());
        for id in cmd.instance_ids() {
            match render_value(&Value::String(id.clone()), ctx)? {
                Value::Array(items) => instance_ids.extend(items.iter().map(display)),
                other => instance_ids.push(display(&other)),
            }
        }
        let parameters = match render_value(&Value::Object(cmd.parameters().clone()), ctx)? {
            Value::Object(map) => map,
            _ => InputMap::new(),
        };
        let parameters = resolve_parameters(document, parameters)?;

        match self.config.command_mode {
            CommandMode::Local => {
                tracing::debug!(document = document.name(), instances = ?instance_ids, "running command document locally");
                let report = self.execute_command_document(document, &parameters).await?;
                if report.status != CommandStatus::Success {
                    return Err(StepError::execution(format!(
                        "command document {} finished {} (exit code {})",
                        document.name(),
                        report.status,
                        report.response_code
                    )));
                }
                Ok(report.to_response())
            }
            CommandMode::Dispatch => {
                let result = self.dispatch(document, instance_ids, parameters).await?;
                if result.status == CommandStatus::Cancelled {
                    return Err(StepError::Cancelled);
                }
                if result.status != CommandStatus::Success {
                    return Err(StepError::execution(format!(
                        "command document {} finished {} (exit code {})",
                        document.name(),
                        result.status,
                        result.response_code
                    )));
                }
                Ok(json!({
                    "Status": result.status.as_str(),
                    "ResponseCode": result.response_code,
                    "Output": result.output,
                }))
            }
        }
    }

    async fn execute_command_document(
        &self,
        document: &CommandDocument,
        parameters: &InputMap,
    ) -> Result<CommandReport, StepError> {
        let finally = document.finally_index();
        let mut report = CommandReport::new();

        let mut interrupted = None;

        for (idx, step) in document.steps().iter().enumerate() {
            if Some(idx) == finally {
                continue;
            }
            let run = match self.run_command(step, parameters).await {
                Ok(run) => run,
                Err(e) => {
                    tracing::warn!(
                        document = document.name(),
                        step = step.name(),
                        error = %e,
                        "command step interrupted"
                    );
                    report.trace.push(step.name().to_string());
                    interrupted = Some(e);
                    break;
                }
            };
            let failed = run.status != CommandStatus::Success;
            record(&mut report, step, &run);

            if failed {
                if step.continues_on_failure() {
                    tracing::warn!(
                        document = document.name(),
                        step = step.name(),
                        exit_code = run.exit_code,
                        "command failed, continuing"
                    );
                    continue;
                }
                report.status = run.status;
                report.response_code = run.exit_code;
                break;
            }
        }

        if let Some(idx) = finally {
            let step = &document.steps()[idx];
            match self.run_command(step, parameters).await {
                Ok(run) => {
                    record(&mut report, step, &run);
                    if run.status != CommandStatus::Success
                        && report.status == CommandStatus::Success
                    {
                        report.status = run.status;
                        report.response_code = run.exit_code;
                    }
                }
                Err(e) => {
                    report.trace.push(step.name().to_string());
                    interrupted.get_or_insert(e);
                }
            }
        }

        match interrupted {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }

    async fn run_command(
        &self,
        step: &CommandStep,
        parameters: &InputMap,
    ) -> Result<StepRun, StepError> {
        let mut lines = Vec::with_capacity(step.commands().len());
        for line in step.commands() {
            lines.push(display(&render_value(&Value::String(line.clone()), parameters)?));
        }
        let working_directory = match step.working_dir() {
            Some(dir) => Some(PathBuf::from(display(&render_value(
                &Value::String(dir.to_string()),
                parameters,
            )?))),
            None => None,
        };
        let timeout = Duration::from_secs(
            step.timeout_secs()
                .unwrap_or(self.config.default_command_timeout_secs),
        );

        let invocation = CommandInvocation {
            action: step.action(),
            script: lines.join("\n"),
            working_directory,
            timeout,
        };
        tracing::debug!(step = step.name(), timeout_secs = timeout.as_secs(), "running command");

        match tokio::time::timeout(timeout, self.commands.run(invocation)).await {
            Err(_) => Ok(StepRun {
                status: CommandStatus::TimedOut,
                exit_code: -1,
                output: format!("timed out after {}s", timeout.as_secs()),
            }),
            Ok(Ok(out)) => Ok(StepRun {
                status: if out.exit_code == 0 {
                    CommandStatus::Success
                } else {
                    CommandStatus::Failed
                },
                exit_code: i64::from(out.exit_code),
                output: out.stdout,
            }),
            Ok(Err(CapabilityError::Cancelled)) => Err(StepError::Cancelled),
            Ok(Err(e @ CapabilityError::NotConfigured(_))) => Err(e.into()),
            Ok(Err(e)) => Ok(StepRun {
                status: CommandStatus::Failed,
                exit_code: -1,
                output: e.to_string(),
            }),
        }
    }

    async fn dispatch(
        &self,
        document: &CommandDocument,
        instance_ids: Vec<String>,
        parameters: InputMap,
    ) -> Result<DispatchResult, StepError> {
        let command_id = self
            .dispatcher
            .send(DispatchRequest {
                document_name: document.name().to_string(),
                instance_ids,
                parameters,
            })
            .await?;

        let deadline = self.config.dispatch_deadline();
        let poll = async {
            loop {
                let status = self.dispatcher.wait(&command_id).await?;
                if status.is_terminal() {
                    return Ok::<_, StepError>(status);
                }
                tracing::debug!(command_id = %command_id, status = %status, "command still running");
                tokio::time::sleep(self.config.poll_interval()).await;
            }
        };
        let status = tokio::time::timeout(deadline, poll)
            .await
            .map_err(|_| StepError::Timeout {
                seconds: deadline.as_secs(),
            })??;
        tracing::debug!(command_id = %command_id, status = %status, "command settled");

        Ok(self.dispatcher.fetch(&command_id).await?)
    }
}

fn record(report: &mut CommandReport, step: &CommandStep, run: &StepRun) {
    report.trace.push(step.name().to_string());
    if !run.output.is_empty() {
        if !report.output.is_empty() {
            report.output.push('\n');
        }
        report.output.push_str(&run.output);
    }
}

/// Apply defaults and check values against the document's declared parameters.
fn resolve_parameters(
    document: &CommandDocument,
    mut parameters: InputMap,
) -> Result<InputMap, StepError> {
    for param in document.parameters() {
        if !parameters.contains_key(param.name()) {
            match param.default() {
                Some(default) => {
                    parameters.insert(param.name().to_string(), default.clone());
                }
                None => return Err(StepError::MissingInput(param.name().to_string())),
            }
        }
        if let Some(value) = parameters.get(param.name()) {
            param.validate_value(value)?;
        }
    }
    Ok(parameters)
}
