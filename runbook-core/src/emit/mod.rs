//! Deterministic rendering of built runbooks into their wire documents.

mod automation;
mod command;

use std::path::Path;

use serde::Serialize;

use crate::error::EmitError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitFormat {
    #[default]
    Json,
    Yaml,
}

impl EmitFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            EmitFormat::Json => "json",
            EmitFormat::Yaml => "yaml",
        }
    }
}

pub fn render<T: Serialize>(doc: &T, format: EmitFormat) -> Result<String, EmitError> {
    Ok(match format {
        EmitFormat::Json => serde_json::to_string_pretty(doc)?,
        EmitFormat::Yaml => serde_yaml::to_string(doc)?,
    })
}

/// Render `doc` and write it to `path`, replacing any existing file.
pub fn write_document<T: Serialize>(
    doc: &T,
    path: impl AsRef<Path>,
    format: EmitFormat,
) -> Result<(), EmitError> {
    let text = render(doc, format)?;
    std::fs::write(path, text)?;
    Ok(())
}
