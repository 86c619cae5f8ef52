use runbook_core::{Automation, BranchStep, StepId};

use crate::context::ExecutionContext;
use crate::error::StepError;
use crate::events::Event;

use super::Interpreter;

/// First matching choice wins; otherwise the default, then the declared successor.
pub(crate) fn select_target(
    automation: &Automation,
    id: StepId,
    branch: &BranchStep,
    ctx: &ExecutionContext,
) -> Result<Option<StepId>, StepError> {
    let edges = automation.chain().edges(id);
    for (idx, choice) in branch.choices().iter().enumerate() {
        let actual = ctx
            .get(choice.input_to_test())
            .ok_or_else(|| StepError::MissingInput(choice.input_to_test().to_string()))?;
        if choice.operation().evaluate(actual, choice.constant())? {
            return Ok(edges.choice_targets.get(idx).copied().flatten());
        }
    }
    Ok(edges.branch_default.or(edges.next))
}

impl Interpreter {
    pub(crate) async fn take_branch(
        &self,
        automation: &Automation,
        id: StepId,
        branch: &BranchStep,
        ctx: &ExecutionContext,
    ) -> Result<Option<StepId>, StepError> {
        let target = select_target(automation, id, branch, ctx)?;
        let chain = automation.chain();
        let step = chain.step(id).name();
        let target_name = target.map(|t| chain.step(t).name().to_string());

        tracing::debug!(
            run_id = %ctx.run_id(),
            step,
            target = target_name.as_deref().unwrap_or("<end>"),
            "branch taken"
        );
        self.events
            .emit(Event::BranchTaken {
                run_id: ctx.run_id(),
                step: step.to_string(),
                target: target_name,
            })
            .await;
        Ok(target)
    }
}
