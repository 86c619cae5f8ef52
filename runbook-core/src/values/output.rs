use crate::types::OutputSpec;
use crate::values::DataType;

/// A typed value pulled out of a step's raw response by a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    name: String,
    data_type: DataType,
    selector: String,
}

impl Output {
    /// Output selected from the top-level field of the same name (`$.Name`).
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        let name = name.into();
        let selector = format!("$.{name}");
        Self {
            name,
            data_type,
            selector,
        }
    }

    /// Output selected from a script step's returned payload (`$.Payload.Name`).
    pub fn payload(name: impl Into<String>, data_type: DataType) -> Self {
        let name = name.into();
        let selector = format!("$.Payload.{name}");
        Self {
            name,
            data_type,
            selector,
        }
    }

    pub fn with_selector(
        name: impl Into<String>,
        data_type: DataType,
        selector: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type,
            selector: selector.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn to_spec(&self) -> OutputSpec {
        OutputSpec {
            name: self.name.clone(),
            selector: self.selector.clone(),
            r#type: self.data_type,
        }
    }
}
