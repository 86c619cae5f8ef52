use std::collections::BTreeMap;

use crate::types::{InputMap, ParameterSpec};

pub const COMMAND_SCHEMA_VERSION: &str = "2.2";

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CommandDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "schemaVersion")]
    pub schema_version: String,

    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterSpec>,

    #[serde(rename = "mainSteps")]
    pub main_steps: Vec<CommandStepFragment>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CommandStepFragment {
    pub action: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precondition: Option<Precondition>,

    #[serde(default)]
    pub inputs: InputMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "onFailure")]
    pub on_failure: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "finallyStep")]
    pub finally_step: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Precondition {
    #[serde(rename = "StringEquals")]
    pub string_equals: Vec<String>,
}
