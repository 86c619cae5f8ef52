use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;

use crate::command::CommandDocument;
use crate::expressions::collect_references;
use crate::types::InputMap;

/// Run a command document on target instances.
#[derive(Debug, Clone)]
pub struct RunCommandStep {
    document: Arc<CommandDocument>,
    instance_ids: Vec<String>,
    parameters: InputMap,
}

impl RunCommandStep {
    pub fn new(document: Arc<CommandDocument>) -> Self {
        Self {
            document,
            instance_ids: Vec::new(),
            parameters: InputMap::new(),
        }
    }

    pub fn instance(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_ids.push(instance_id.into());
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn document(&self) -> &CommandDocument {
        &self.document
    }

    pub fn instance_ids(&self) -> &[String] {
        &self.instance_ids
    }

    pub fn parameters(&self) -> &InputMap {
        &self.parameters
    }

    pub(crate) fn referenced_inputs(&self, out: &mut BTreeSet<String>) {
        for id in &self.instance_ids {
            let _ = collect_references(&Value::String(id.clone()), out);
        }
        for value in self.parameters.values() {
            let _ = collect_references(value, out);
        }
    }
}
