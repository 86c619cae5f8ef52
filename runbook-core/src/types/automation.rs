use std::collections::BTreeMap;

use crate::types::{InputMap, ParameterSpec};
use crate::values::DataType;

pub const AUTOMATION_SCHEMA_VERSION: &str = "0.3";

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AutomationDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "schemaVersion")]
    pub schema_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "assumeRole")]
    pub assume_role: Option<String>,

    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<String>>,

    #[serde(rename = "mainSteps")]
    pub main_steps: Vec<StepFragment>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StepFragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub name: String,

    pub action: String,

    #[serde(default)]
    pub inputs: InputMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<OutputSpec>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "isEnd")]
    pub is_end: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "maxAttempts")]
    pub max_attempts: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "timeoutSeconds")]
    pub timeout_seconds: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "onCancel")]
    pub on_cancel: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "onFailure")]
    pub on_failure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OutputSpec {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Selector")]
    pub selector: String,

    #[serde(rename = "Type")]
    pub r#type: DataType,
}
