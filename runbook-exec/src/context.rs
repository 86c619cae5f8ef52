use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// Name lookup used when rendering templates.
pub trait Scope {
    fn lookup(&self, name: &str) -> Option<Value>;
}

impl Scope for serde_json::Map<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// One attempt of one step, as recorded during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub step: String,
    pub attempt_no: u32,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub error: Option<String>,
}

impl AttemptRecord {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Key/value state threaded through one run.
///
/// Keys are bare input names or `Step.Output`. The trace lists every step
/// invoked, in order, once per invocation.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    run_id: Uuid,
    values: BTreeMap<String, Value>,
    trace: Vec<String>,
    attempts: Vec<AttemptRecord>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            values: BTreeMap::new(),
            trace: Vec::new(),
            attempts: Vec::new(),
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Flattened `key -> value` view of the context.
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    pub fn attempts(&self) -> &[AttemptRecord] {
        &self.attempts
    }

    pub fn attempts_for(&self, step: &str) -> usize {
        self.attempts.iter().filter(|a| a.step == step).count()
    }

    /// Isolated copy for a nested run: same values and run id, empty trace.
    pub fn fork(&self) -> Self {
        Self {
            run_id: self.run_id,
            values: self.values.clone(),
            trace: Vec::new(),
            attempts: Vec::new(),
        }
    }

    pub(crate) fn record_step(&mut self, step: &str) {
        self.trace.push(step.to_string());
    }

    pub(crate) fn record_attempt(&mut self, record: AttemptRecord) {
        self.attempts.push(record);
    }

    /// Write a step's outputs as `Step.Output`.
    pub(crate) fn merge_outputs(&mut self, step: &str, outputs: Vec<(String, Value)>) {
        for (name, value) in outputs {
            self.values.insert(format!("{step}.{name}"), value);
        }
    }
}

impl Scope for ExecutionContext {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }
}
