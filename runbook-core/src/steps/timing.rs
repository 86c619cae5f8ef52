use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepStep {
    seconds: u64,
}

impl SleepStep {
    pub fn new(seconds: u64) -> Self {
        Self { seconds }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.seconds)
    }

    /// ISO-8601 duration as written into the document (`PT30S`).
    pub fn iso8601(&self) -> String {
        format!("PT{}S", self.seconds)
    }
}

/// Waits for an external resume; simulated runs resume immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PauseStep;
