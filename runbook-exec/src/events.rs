use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    RunStarted {
        run_id: Uuid,
        document: String,
    },
    RunFinished {
        run_id: Uuid,
        document: String,
        succeeded: bool,
    },
    StepStarted {
        run_id: Uuid,
        step: String,
    },
    StepSucceeded {
        run_id: Uuid,
        step: String,
    },
    StepFailed {
        run_id: Uuid,
        step: String,
        error: String,
    },
    AttemptStarted {
        run_id: Uuid,
        step: String,
        attempt_no: u32,
    },
    AttemptFinished {
        run_id: Uuid,
        step: String,
        attempt_no: u32,
        succeeded: bool,
    },
    RetryScheduled {
        run_id: Uuid,
        step: String,
        attempt_no: u32,
    },
    FallbackRouted {
        run_id: Uuid,
        step: String,
        target: String,
        cancelled: bool,
    },
    BranchTaken {
        run_id: Uuid,
        step: String,
        target: Option<String>,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::RunStarted { .. } => "run.started",
            Event::RunFinished { .. } => "run.finished",
            Event::StepStarted { .. } => "step.started",
            Event::StepSucceeded { .. } => "step.succeeded",
            Event::StepFailed { .. } => "step.failed",
            Event::AttemptStarted { .. } => "attempt.started",
            Event::AttemptFinished { .. } => "attempt.finished",
            Event::RetryScheduled { .. } => "step.retry_scheduled",
            Event::FallbackRouted { .. } => "step.fallback_routed",
            Event::BranchTaken { .. } => "branch.taken",
        }
    }

    pub fn run_id(&self) -> Uuid {
        match self {
            Event::RunStarted { run_id, .. }
            | Event::RunFinished { run_id, .. }
            | Event::StepStarted { run_id, .. }
            | Event::StepSucceeded { run_id, .. }
            | Event::StepFailed { run_id, .. }
            | Event::AttemptStarted { run_id, .. }
            | Event::AttemptFinished { run_id, .. }
            | Event::RetryScheduled { run_id, .. }
            | Event::FallbackRouted { run_id, .. }
            | Event::BranchTaken { run_id, .. } => *run_id,
        }
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

pub struct CompositeEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl Default for CompositeEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn emit(&self, event: Event) {
        for sink in &self.sinks {
            sink.emit(event.clone()).await;
        }
    }
}

/// Forwards events to `tracing` at debug level.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: Event) {
        match &event {
            Event::StepFailed { step, error, .. } => {
                tracing::debug!(run_id = %event.run_id(), step = %step, error = %error, kind = event.kind());
            }
            Event::AttemptFinished {
                step,
                attempt_no,
                succeeded,
                ..
            } => {
                tracing::debug!(run_id = %event.run_id(), step = %step, attempt = attempt_no, succeeded, kind = event.kind());
            }
            Event::FallbackRouted { step, target, .. } => {
                tracing::debug!(run_id = %event.run_id(), step = %step, target = %target, kind = event.kind());
            }
            _ => tracing::debug!(run_id = %event.run_id(), kind = event.kind()),
        }
    }
}

/// Keeps every event in memory.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.events().iter().filter(|e| e.kind() == kind).count()
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn emit(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {}
}
