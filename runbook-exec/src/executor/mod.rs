//! In-process interpreter for automations and command documents.

mod branch;
mod chain;
mod command;
mod effects;
mod nested;
mod step_runner;

use std::sync::Arc;

use runbook_core::Automation;
use serde_json::Value;
use uuid::Uuid;

use crate::cancel::CancelHandle;
use crate::capabilities::{CommandDispatcher, CommandRunner, RemoteApi, ScriptRunner, Unconfigured};
use crate::config::ExecutorConfig;
use crate::context::ExecutionContext;
use crate::error::RunError;
use crate::events::{Event, EventSink, NoOpEventSink};

pub use command::CommandReport;

/// Result of a completed top-level run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub run_id: Uuid,
    /// Values of the automation's doc outputs, in declaration order.
    pub output: Vec<Value>,
}

pub struct Interpreter {
    remote_api: Arc<dyn RemoteApi>,
    scripts: Arc<dyn ScriptRunner>,
    commands: Arc<dyn CommandRunner>,
    dispatcher: Arc<dyn CommandDispatcher>,
    events: Arc<dyn EventSink>,
    config: ExecutorConfig,
    cancel: CancelHandle,
}

impl Interpreter {
    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::default()
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Handle that cancels the step about to run.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run `automation` against `ctx`.
    ///
    /// Missing inputs are filled from declared defaults before the first step.
    /// On failure the error carries the trace; `ctx` keeps everything written
    /// up to that point.
    pub async fn run(
        &self,
        automation: &Automation,
        ctx: &mut ExecutionContext,
    ) -> Result<RunOutcome, RunError> {
        let run_id = ctx.run_id();
        tracing::info!(run_id = %run_id, document = automation.name(), "run started");
        self.events
            .emit(Event::RunStarted {
                run_id,
                document: automation.name().to_string(),
            })
            .await;

        let result = self.run_document(automation, ctx).await;

        match &result {
            Ok(_) => tracing::info!(run_id = %run_id, document = automation.name(), "run finished"),
            Err(e) => {
                tracing::warn!(run_id = %run_id, document = automation.name(), step = %e.step, error = %e.source, "run failed")
            }
        }
        self.events
            .emit(Event::RunFinished {
                run_id,
                document: automation.name().to_string(),
                succeeded: result.is_ok(),
            })
            .await;

        Ok(RunOutcome {
            run_id,
            output: result?,
        })
    }

    async fn run_document(
        &self,
        automation: &Automation,
        ctx: &mut ExecutionContext,
    ) -> Result<Vec<Value>, RunError> {
        let fail = |ctx: &ExecutionContext, source: crate::error::StepError| {
            RunError::new(automation.name(), source, ctx.trace().to_vec())
        };
        nested::prepare_inputs(automation, ctx).map_err(|e| fail(ctx, e))?;
        self.run_chain(automation, ctx).await?;
        nested::collect_doc_outputs(automation, ctx).map_err(|e| fail(ctx, e))
    }
}

pub struct InterpreterBuilder {
    remote_api: Arc<dyn RemoteApi>,
    scripts: Arc<dyn ScriptRunner>,
    commands: Arc<dyn CommandRunner>,
    dispatcher: Arc<dyn CommandDispatcher>,
    events: Arc<dyn EventSink>,
    config: ExecutorConfig,
    cancel: CancelHandle,
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self {
            remote_api: Arc::new(Unconfigured),
            scripts: Arc::new(Unconfigured),
            commands: Arc::new(Unconfigured),
            dispatcher: Arc::new(Unconfigured),
            events: Arc::new(NoOpEventSink),
            config: ExecutorConfig::default(),
            cancel: CancelHandle::new(),
        }
    }
}

impl InterpreterBuilder {
    pub fn remote_api(mut self, remote_api: Arc<dyn RemoteApi>) -> Self {
        self.remote_api = remote_api;
        self
    }

    pub fn script_runner(mut self, scripts: Arc<dyn ScriptRunner>) -> Self {
        self.scripts = scripts;
        self
    }

    pub fn command_runner(mut self, commands: Arc<dyn CommandRunner>) -> Self {
        self.commands = commands;
        self
    }

    pub fn dispatcher(mut self, dispatcher: Arc<dyn CommandDispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cancel_handle(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn build(self) -> Interpreter {
        Interpreter {
            remote_api: self.remote_api,
            scripts: self.scripts,
            commands: self.commands,
            dispatcher: self.dispatcher,
            events: self.events,
            config: self.config,
            cancel: self.cancel,
        }
    }
}
