use runbook_core::{Automation, StepId};

use crate::context::ExecutionContext;
use crate::error::{RunError, StepError};
use crate::events::Event;

use super::Interpreter;

impl Interpreter {
    /// Walk the chain from its first step until a step ends it or an error
    /// escapes every route.
    pub(crate) async fn run_chain(
        &self,
        automation: &Automation,
        ctx: &mut ExecutionContext,
    ) -> Result<(), RunError> {
        let chain = automation.chain();
        let mut cursor = chain.first();

        while let Some(id) = cursor {
            let step = chain.step(id);

            if self.cancel.take() {
                ctx.record_step(step.name());
                tracing::warn!(run_id = %ctx.run_id(), step = step.name(), "cancellation observed");
                cursor = Some(self.route_cancel(automation, id, ctx, StepError::Cancelled).await?);
                continue;
            }

            cursor = match self.invoke(automation, id, ctx).await {
                Ok(next) => next,
                Err(e) if e.is_fatal() => {
                    return Err(RunError::new(step.name(), e, ctx.trace().to_vec()));
                }
                Err(e) if e.is_cancellation() => Some(self.route_cancel(automation, id, ctx, e).await?),
                Err(e) => Some(self.route_failure(automation, id, ctx, e).await?),
            };
        }
        Ok(())
    }

    async fn route_cancel(
        &self,
        automation: &Automation,
        id: StepId,
        ctx: &ExecutionContext,
        error: StepError,
    ) -> Result<StepId, RunError> {
        let chain = automation.chain();
        let step = chain.step(id);
        match chain.edges(id).on_cancel {
            Some(target) => {
                self.announce_fallback(ctx, step.name(), chain.step(target).name(), true)
                    .await;
                Ok(target)
            }
            None => Err(RunError::new(step.name(), error, ctx.trace().to_vec())),
        }
    }

    async fn route_failure(
        &self,
        automation: &Automation,
        id: StepId,
        ctx: &ExecutionContext,
        error: StepError,
    ) -> Result<StepId, RunError> {
        let chain = automation.chain();
        let step = chain.step(id);
        match chain.edges(id).on_failure {
            Some(target) => {
                tracing::warn!(
                    run_id = %ctx.run_id(),
                    step = step.name(),
                    error = %error,
                    target = chain.step(target).name(),
                    "step failed, routing to onFailure"
                );
                self.announce_fallback(ctx, step.name(), chain.step(target).name(), false)
                    .await;
                Ok(target)
            }
            None => Err(RunError::new(step.name(), error, ctx.trace().to_vec())),
        }
    }

    async fn announce_fallback(&self, ctx: &ExecutionContext, step: &str, target: &str, cancelled: bool) {
        self.events
            .emit(Event::FallbackRouted {
                run_id: ctx.run_id(),
                step: step.to_string(),
                target: target.to_string(),
                cancelled,
            })
            .await;
    }
}
