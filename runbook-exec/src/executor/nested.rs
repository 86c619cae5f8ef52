use runbook_core::Automation;
use serde_json::Value;

use crate::context::ExecutionContext;
use crate::error::StepError;

use super::Interpreter;

/// Fill absent inputs from defaults and check every provided value.
pub(crate) fn prepare_inputs(
    automation: &Automation,
    ctx: &mut ExecutionContext,
) -> Result<(), StepError> {
    for input in automation.inputs() {
        if !ctx.contains(input.name()) {
            match input.default() {
                Some(default) => ctx.insert(input.name(), default.clone()),
                None => return Err(StepError::MissingInput(input.name().to_string())),
            }
        }
        if let Some(value) = ctx.get(input.name()) {
            input.validate_value(value)?;
        }
    }
    Ok(())
}

/// Doc-output values in declaration order.
pub(crate) fn collect_doc_outputs(
    automation: &Automation,
    ctx: &ExecutionContext,
) -> Result<Vec<Value>, StepError> {
    automation
        .doc_outputs()
        .iter()
        .map(|r| {
            ctx.get(&r.key())
                .cloned()
                .ok_or_else(|| StepError::UnresolvedOutput {
                    output: r.key(),
                    selector: r.key(),
                })
        })
        .collect()
}

impl Interpreter {
    /// Run `nested` on an isolated copy of `ctx` and collect its doc outputs.
    pub(crate) async fn run_nested(
        &self,
        nested: &Automation,
        ctx: &ExecutionContext,
    ) -> Result<Vec<Value>, StepError> {
        let mut child = ctx.fork();
        prepare_inputs(nested, &mut child)?;
        tracing::debug!(run_id = %child.run_id(), document = nested.name(), "entering nested automation");

        Box::pin(self.run_chain(nested, &mut child))
            .await
            .map_err(|e| e.into_step_error())?;
        collect_doc_outputs(nested, &child)
    }
}
