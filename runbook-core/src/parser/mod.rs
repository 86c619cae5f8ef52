//! Reading emitted documents back into their wire model.

use serde::de::DeserializeOwned;

use crate::error::ParseError;
use crate::types::{AutomationDoc, CommandDoc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

#[derive(Debug, Clone)]
pub struct ParsedDocument<T> {
    pub document: T,
    pub format: DocumentFormat,
}

pub fn parse_automation_document(
    input: &str,
    format: DocumentFormat,
) -> Result<ParsedDocument<AutomationDoc>, ParseError> {
    parse_document_str(input, format)
}

pub fn parse_command_document(
    input: &str,
    format: DocumentFormat,
) -> Result<ParsedDocument<CommandDoc>, ParseError> {
    parse_document_str(input, format)
}

pub fn parse_document_str<T: DeserializeOwned>(
    input: &str,
    format: DocumentFormat,
) -> Result<ParsedDocument<T>, ParseError> {
    match format {
        DocumentFormat::Json => Ok(ParsedDocument {
            document: serde_json::from_str(input)?,
            format,
        }),
        DocumentFormat::Yaml => Ok(ParsedDocument {
            document: serde_yaml::from_str(input)?,
            format,
        }),
        DocumentFormat::Auto => parse_document_auto(input),
    }
}

fn parse_document_auto<T: DeserializeOwned>(input: &str) -> Result<ParsedDocument<T>, ParseError> {
    // JSON always starts with `{` or `[` after trimming.
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return match serde_json::from_str(input) {
            Ok(document) => Ok(ParsedDocument {
                document,
                format: DocumentFormat::Json,
            }),
            Err(e) => match serde_yaml::from_str(input) {
                Ok(document) => Ok(ParsedDocument {
                    document,
                    format: DocumentFormat::Yaml,
                }),
                Err(_) => Err(ParseError::Json(e)),
            },
        };
    }

    match serde_yaml::from_str(input) {
        Ok(document) => Ok(ParsedDocument {
            document,
            format: DocumentFormat::Yaml,
        }),
        Err(e) => match serde_json::from_str(input) {
            Ok(document) => Ok(ParsedDocument {
                document,
                format: DocumentFormat::Json,
            }),
            Err(_) => Err(ParseError::Yaml(e)),
        },
    }
}
