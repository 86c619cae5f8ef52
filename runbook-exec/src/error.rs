use runbook_core::{DataType, InputError, OperationError};

use crate::capabilities::CapabilityError;

/// Why one attempt of a step failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StepError {
    #[error("execution failed: {0}")]
    Execution(String),
    #[error("attempt exceeded timeout of {seconds}s")]
    Timeout { seconds: u64 },
    #[error("output {output} did not resolve: selector {selector} matched nothing")]
    UnresolvedOutput { output: String, selector: String },
    #[error("output {output} declared {expected} but resolved to {actual}")]
    OutputType {
        output: String,
        expected: DataType,
        actual: &'static str,
    },
    #[error("non-retriable failure: {0}")]
    NonRetriable(String),
    #[error("cancelled")]
    Cancelled,
    #[error("missing input {0}")]
    MissingInput(String),
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    #[error("branch evaluation failed: {0}")]
    Operation(#[from] OperationError),
}

impl StepError {
    pub fn execution(message: impl Into<String>) -> Self {
        StepError::Execution(message.into())
    }

    pub fn non_retriable(message: impl Into<String>) -> Self {
        StepError::NonRetriable(message.into())
    }

    /// Another attempt may succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            StepError::Execution(_) | StepError::Timeout { .. } | StepError::UnresolvedOutput { .. }
        )
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, StepError::Cancelled)
    }

    /// Fatal errors end the run without consulting `onFailure`.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StepError::Operation(_))
    }
}

impl From<CapabilityError> for StepError {
    fn from(e: CapabilityError) -> Self {
        match e {
            CapabilityError::Failed(msg) => StepError::Execution(msg),
            CapabilityError::Cancelled => StepError::Cancelled,
            CapabilityError::NotConfigured(_) | CapabilityError::Rejected(_) => {
                StepError::NonRetriable(e.to_string())
            }
        }
    }
}

/// A run that did not complete: the step it stopped at, why, and how far it got.
#[derive(Debug, Clone, thiserror::Error)]
#[error("run failed at step {step}: {source}")]
pub struct RunError {
    pub step: String,
    #[source]
    pub source: StepError,
    pub trace: Vec<String>,
}

impl RunError {
    pub fn new(step: impl Into<String>, source: StepError, trace: Vec<String>) -> Self {
        Self {
            step: step.into(),
            source,
            trace,
        }
    }

    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    pub fn is_cancelled(&self) -> bool {
        self.source.is_cancellation()
    }

    /// How this run's failure looks to an enclosing step.
    ///
    /// The retry classification of the inner error is kept; the message names
    /// the failed step and the nested trace.
    pub(crate) fn into_step_error(self) -> StepError {
        let message = format!(
            "nested step {} failed after [{}]: {}",
            self.step,
            self.trace.join(", "),
            self.source
        );
        match self.source {
            StepError::Cancelled => StepError::Cancelled,
            e if e.is_fatal() => e,
            e if e.is_retriable() => StepError::Execution(message),
            _ => StepError::NonRetriable(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors() {
        assert!(StepError::execution("boom").is_retriable());
        assert!(StepError::Timeout { seconds: 1 }.is_retriable());
        assert!(!StepError::non_retriable("stop").is_retriable());
        assert!(!StepError::Cancelled.is_retriable());
        assert!(StepError::Cancelled.is_cancellation());
        let op = OperationError::OperandType {
            operation: "StringEquals",
            expected: runbook_core::OperandType::String,
            actual: "integer",
        };
        assert!(StepError::from(op).is_fatal());
    }

    #[test]
    fn capability_errors_map_to_step_errors() {
        assert!(StepError::from(CapabilityError::Failed("x".into())).is_retriable());
        assert!(StepError::from(CapabilityError::Cancelled).is_cancellation());
        let e = StepError::from(CapabilityError::NotConfigured("remote api"));
        assert!(matches!(e, StepError::NonRetriable(_)));
    }

    #[test]
    fn nested_failures_keep_cancellation() {
        let err = RunError::new("Inner", StepError::Cancelled, vec!["Inner".into()]);
        assert!(err.clone().into_step_error().is_cancellation());
        let err = RunError::new("Inner", StepError::execution("x"), vec![]);
        assert!(err.into_step_error().is_retriable());
    }

    #[test]
    fn nested_failures_keep_retry_classification() {
        let err = RunError::new(
            "Check",
            StepError::non_retriable("denied"),
            vec!["Prepare".into(), "Check".into()],
        );
        let e = err.into_step_error();
        assert!(!e.is_retriable());
        assert_eq!(
            e.to_string(),
            "non-retriable failure: nested step Check failed after [Prepare, Check]: non-retriable failure: denied"
        );

        let err = RunError::new(
            "Count",
            StepError::OutputType {
                output: "Total".into(),
                expected: DataType::Integer,
                actual: "boolean",
            },
            vec!["Count".into()],
        );
        assert!(matches!(err.into_step_error(), StepError::NonRetriable(_)));
    }
}
