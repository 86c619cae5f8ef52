use std::time::Duration;

use chrono::Utc;
use runbook_core::{Automation, StepId, StepKind};
use serde_json::Value;
use tokio::time::Instant;

use crate::context::{AttemptRecord, ExecutionContext};
use crate::error::StepError;
use crate::events::Event;
use crate::extract::extract_outputs;
use crate::retry::{decide_retry, RetryDecision};

use super::Interpreter;

/// What a step's effect produced.
pub(crate) enum Effect {
    /// Raw response that declared outputs are selected from.
    Response(Value),
    /// Control goes to this step next, bypassing the declared successor.
    Route(Option<StepId>),
}

impl Interpreter {
    /// Run one step with its retry loop. Returns the step to run next.
    pub(crate) async fn invoke(
        &self,
        automation: &Automation,
        id: StepId,
        ctx: &mut ExecutionContext,
    ) -> Result<Option<StepId>, StepError> {
        let step = automation.chain().step(id);
        let run_id = ctx.run_id();
        ctx.record_step(step.name());
        tracing::debug!(run_id = %run_id, step = step.name(), "step started");
        self.events
            .emit(Event::StepStarted {
                run_id,
                step: step.name().to_string(),
            })
            .await;

        let result = self.retry_loop(automation, id, ctx).await;

        match &result {
            Ok(_) => {
                self.events
                    .emit(Event::StepSucceeded {
                        run_id,
                        step: step.name().to_string(),
                    })
                    .await
            }
            Err(e) => {
                self.events
                    .emit(Event::StepFailed {
                        run_id,
                        step: step.name().to_string(),
                        error: e.to_string(),
                    })
                    .await
            }
        }
        result
    }

    async fn retry_loop(
        &self,
        automation: &Automation,
        id: StepId,
        ctx: &mut ExecutionContext,
    ) -> Result<Option<StepId>, StepError> {
        let step = automation.chain().step(id);
        for key in step.required_inputs() {
            if !ctx.contains(&key) {
                return Err(StepError::MissingInput(key));
            }
        }

        let mut attempt_no = 0u32;
        loop {
            attempt_no += 1;
            let error = match self.attempt(automation, id, ctx, attempt_no).await {
                Ok(next) => return Ok(next),
                Err(e) => e,
            };

            match decide_retry(attempt_no, step.attempt_limit(), &error) {
                RetryDecision::Retry { .. } => {
                    tracing::warn!(
                        run_id = %ctx.run_id(),
                        step = step.name(),
                        attempt = attempt_no,
                        error = %error,
                        "attempt failed, retrying"
                    );
                    self.events
                        .emit(Event::RetryScheduled {
                            run_id: ctx.run_id(),
                            step: step.name().to_string(),
                            attempt_no,
                        })
                        .await;
                }
                RetryDecision::Stop { reason } => {
                    tracing::debug!(
                        run_id = %ctx.run_id(),
                        step = step.name(),
                        attempt = attempt_no,
                        reason = ?reason,
                        "giving up on step"
                    );
                    return Err(error);
                }
            }
        }
    }

    async fn attempt(
        &self,
        automation: &Automation,
        id: StepId,
        ctx: &mut ExecutionContext,
        attempt_no: u32,
    ) -> Result<Option<StepId>, StepError> {
        let chain = automation.chain();
        let step = chain.step(id);
        let started_at = Utc::now();
        let start = Instant::now();
        self.events
            .emit(Event::AttemptStarted {
                run_id: ctx.run_id(),
                step: step.name().to_string(),
                attempt_no,
            })
            .await;

        let limit = Duration::from_secs(step.timeout_secs());
        let effect = if self.config.enforce_timeouts {
            match tokio::time::timeout(limit, self.effect(automation, id, ctx)).await {
                Ok(result) => result,
                Err(_) => Err(StepError::Timeout {
                    seconds: step.timeout_secs(),
                }),
            }
        } else {
            let result = self.effect(automation, id, ctx).await;
            if result.is_ok() && start.elapsed() > limit {
                Err(StepError::Timeout {
                    seconds: step.timeout_secs(),
                })
            } else {
                result
            }
        };

        let outcome = match effect {
            Ok(Effect::Route(next)) => Ok(if step.ends_chain() { None } else { next }),
            Ok(Effect::Response(response)) => {
                extract_outputs(step.outputs(), &response).map(|mut outputs| {
                    // A nested automation always exposes its collected doc outputs.
                    if matches!(step.kind(), StepKind::Automation(_))
                        && !outputs.iter().any(|(name, _)| name == "Output")
                    {
                        if let Some(list) = response.get("Output") {
                            outputs.push(("Output".to_string(), list.clone()));
                        }
                    }
                    ctx.merge_outputs(step.name(), outputs);
                    if step.ends_chain() {
                        None
                    } else {
                        chain.edges(id).next
                    }
                })
            }
            Err(e) => Err(e),
        };

        let succeeded = outcome.is_ok();
        ctx.record_attempt(AttemptRecord {
            step: step.name().to_string(),
            attempt_no,
            started_at,
            elapsed: start.elapsed(),
            error: outcome.as_ref().err().map(ToString::to_string),
        });
        self.events
            .emit(Event::AttemptFinished {
                run_id: ctx.run_id(),
                step: step.name().to_string(),
                attempt_no,
                succeeded,
            })
            .await;
        outcome
    }
}
