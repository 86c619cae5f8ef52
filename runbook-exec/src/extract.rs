//! Typed extraction of declared outputs from a raw step response.

use runbook_core::{Output, Selector};
use serde_json::Value;

use crate::error::StepError;

/// Resolve and type-check every declared output.
///
/// All outputs succeed or none are returned, so a failing attempt never leaves
/// a partial write in the context.
pub fn extract_outputs(
    outputs: &[Output],
    response: &Value,
) -> Result<Vec<(String, Value)>, StepError> {
    let mut extracted = Vec::with_capacity(outputs.len());
    for output in outputs {
        let selector =
            Selector::parse(output.selector()).map_err(|e| StepError::non_retriable(e.to_string()))?;
        let value = selector
            .resolve(response)
            .map_err(|e| StepError::non_retriable(e.to_string()))?
            .ok_or_else(|| StepError::UnresolvedOutput {
                output: output.name().to_string(),
                selector: output.selector().to_string(),
            })?;

        if !output.data_type().matches(&value) {
            return Err(StepError::OutputType {
                output: output.name().to_string(),
                expected: output.data_type(),
                actual: runbook_core::values::runtime_type_name(&value),
            });
        }
        extracted.push((output.name().to_string(), value));
    }
    Ok(extracted)
}
