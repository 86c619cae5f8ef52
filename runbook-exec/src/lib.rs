#![forbid(unsafe_code)]

//! In-process interpreter for automation runbooks built with `runbook-core`.
//!
//! Every external effect goes through an injected capability, so a run never
//! touches real infrastructure unless the caller wires one in.

pub mod cancel;
pub mod capabilities;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod executor;
pub mod extract;
pub mod render;
pub mod retry;

pub use crate::cancel::CancelHandle;
pub use crate::capabilities::{
    ApiRequest, CapabilityError, CommandDispatcher, CommandInvocation, CommandOutput,
    CommandRunner, CommandStatus, DispatchRequest, DispatchResult, RemoteApi, ScriptInvocation,
    ScriptRunner, ShellCommandRunner, Unconfigured,
};
pub use crate::config::{CommandMode, ConfigLoadError, ExecutorConfig};
pub use crate::context::{AttemptRecord, ExecutionContext, Scope};
pub use crate::error::{RunError, StepError};
pub use crate::events::{
    CompositeEventSink, Event, EventSink, NoOpEventSink, RecordingEventSink, TracingEventSink,
};
pub use crate::executor::{CommandReport, Interpreter, InterpreterBuilder, RunOutcome};
pub use crate::retry::{decide_retry, RetryDecision, RetryReason};
