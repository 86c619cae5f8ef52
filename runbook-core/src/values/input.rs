use serde_json::Value;

use crate::types::ParameterSpec;
use crate::values::{runtime_type_name, DataType};

/// A declared document parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Input {
    name: String,
    data_type: DataType,
    description: String,
    default: Option<Value>,
    allowed_values: Option<Vec<Value>>,
    min_items: Option<usize>,
    max_items: Option<usize>,
}

impl Input {
    pub fn new(name: impl Into<String>, data_type: DataType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type,
            description: description.into(),
            default: None,
            allowed_values: None,
            min_items: None,
            max_items: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_allowed_values<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.allowed_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_min_items(mut self, min: usize) -> Self {
        self.min_items = Some(min);
        self
    }

    pub fn with_max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn allowed_values(&self) -> Option<&[Value]> {
        self.allowed_values.as_deref()
    }

    pub fn min_items(&self) -> Option<usize> {
        self.min_items
    }

    pub fn max_items(&self) -> Option<usize> {
        self.max_items
    }

    /// An input without a default must be supplied by the caller.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// Check a provided value against type, allowed values and cardinality.
    pub fn validate_value(&self, value: &Value) -> Result<(), InputError> {
        if !self.data_type.matches(value) {
            return Err(InputError::TypeMismatch {
                name: self.name.clone(),
                expected: self.data_type,
                actual: runtime_type_name(value),
            });
        }

        if let Some(allowed) = &self.allowed_values {
            if !allowed.contains(value) {
                return Err(InputError::NotAllowed {
                    name: self.name.clone(),
                    value: value.to_string(),
                });
            }
        }

        if let Some(items) = value.as_array() {
            if let Some(min) = self.min_items {
                if items.len() < min {
                    return Err(InputError::TooFewItems {
                        name: self.name.clone(),
                        min,
                        len: items.len(),
                    });
                }
            }
            if let Some(max) = self.max_items {
                if items.len() > max {
                    return Err(InputError::TooManyItems {
                        name: self.name.clone(),
                        max,
                        len: items.len(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn to_parameter(&self) -> ParameterSpec {
        ParameterSpec {
            r#type: self.data_type,
            description: if self.description.is_empty() {
                None
            } else {
                Some(self.description.clone())
            },
            default: self.default.clone(),
            allowed_values: self.allowed_values.clone(),
            min_items: self.min_items,
            max_items: self.max_items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("input {name} must be {expected}, found {actual}")]
    TypeMismatch {
        name: String,
        expected: DataType,
        actual: &'static str,
    },
    #[error("input {name} does not allow value {value}")]
    NotAllowed { name: String, value: String },
    #[error("input {name} needs at least {min} items, found {len}")]
    TooFewItems { name: String, min: usize, len: usize },
    #[error("input {name} allows at most {max} items, found {len}")]
    TooManyItems { name: String, max: usize, len: usize },
}
