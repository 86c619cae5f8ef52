use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandMode {
    /// Assemble each command step and run it through the local command runner.
    #[default]
    Local,
    /// Hand the document to the remote dispatcher and poll until it settles.
    Dispatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub command_mode: CommandMode,
    pub poll_interval_ms: u64,
    pub dispatch_deadline_secs: u64,
    pub honor_sleep: bool,
    pub default_command_timeout_secs: u64,
    pub enforce_timeouts: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            command_mode: CommandMode::Local,
            poll_interval_ms: 1000,
            dispatch_deadline_secs: 3600,
            honor_sleep: false,
            default_command_timeout_secs: 3600,
            enforce_timeouts: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("invalid executor config (yaml): {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid executor config (json): {0}")]
    Json(#[from] serde_json::Error),
}

impl ExecutorConfig {
    pub fn from_yaml_str(input: &str) -> Result<Self, ConfigLoadError> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self, ConfigLoadError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn dispatch_deadline(&self) -> Duration {
        Duration::from_secs(self.dispatch_deadline_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let cfg = ExecutorConfig::from_yaml_str("command_mode: dispatch\npoll_interval_ms: 50\n").unwrap();
        assert_eq!(cfg.command_mode, CommandMode::Dispatch);
        assert_eq!(cfg.poll_interval(), Duration::from_millis(50));
        assert_eq!(cfg.dispatch_deadline_secs, 3600);
        assert!(cfg.enforce_timeouts);
        assert!(!cfg.honor_sleep);
    }

    #[test]
    fn loads_json() {
        let cfg = ExecutorConfig::from_json_str(r#"{"honor_sleep": true}"#).unwrap();
        assert!(cfg.honor_sleep);
        assert_eq!(cfg.command_mode, CommandMode::Local);
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(ExecutorConfig::from_json_str(r#"{"command_mode": "remote"}"#).is_err());
    }
}
