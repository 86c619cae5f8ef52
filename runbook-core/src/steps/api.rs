use std::collections::BTreeSet;

use serde_json::Value;

use crate::expressions::collect_references;
use crate::types::InputMap;

/// Call one operation of a remote service.
///
/// String parameter values may embed `{{ ref }}` templates resolved from the
/// execution context.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCall {
    service: String,
    api: String,
    params: InputMap,
}

impl ApiCall {
    pub fn new(service: impl Into<String>, api: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            api: api.into(),
            params: InputMap::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn api(&self) -> &str {
        &self.api
    }

    pub fn params(&self) -> &InputMap {
        &self.params
    }

    pub(crate) fn referenced_inputs(&self, out: &mut BTreeSet<String>) {
        for value in self.params.values() {
            // Malformed templates are reported by validation.
            let _ = collect_references(value, out);
        }
    }
}
