use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunbookError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Emit(#[from] EmitError),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unable to auto-detect document format (neither valid JSON nor valid YAML)")]
    UnknownFormat,
}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to render YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),
}

/// A runbook that cannot be built: every violation found in one pass,
/// each anchored to the document location it was found at.
#[derive(Debug, Clone, Error)]
#[error("runbook configuration is invalid ({violations_len} violations): {summary}")]
pub struct ConfigError {
    pub violations: Vec<Violation>,
    violations_len: usize,
    summary: String,
}

impl ConfigError {
    pub fn new(violations: Vec<Violation>) -> Self {
        let violations_len = violations.len();
        let summary = violations
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Self {
            violations,
            violations_len,
            summary,
        }
    }

    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![Violation::new(path, message)])
    }

    pub fn has_violation_at(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path == path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
