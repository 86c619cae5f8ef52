use runbook_core::{ApiCall, Automation, HelperLibrary, ScriptStep, StepId, StepKind};
use serde_json::{json, Value};

use crate::capabilities::{ApiRequest, ScriptInvocation};
use crate::context::ExecutionContext;
use crate::error::StepError;
use crate::render::render_value;
use runbook_core::types::InputMap;

use super::step_runner::Effect;
use super::Interpreter;

impl Interpreter {
    /// Perform the step's own effect once.
    pub(crate) async fn effect(
        &self,
        automation: &Automation,
        id: StepId,
        ctx: &ExecutionContext,
    ) -> Result<Effect, StepError> {
        let step = automation.chain().step(id);
        match step.kind() {
            StepKind::ApiCall(call) => self.call_api(automation, call, ctx).await.map(Effect::Response),
            StepKind::Branch(branch) => self.take_branch(automation, id, branch, ctx).await.map(Effect::Route),
            StepKind::Sleep(sleep) => {
                if self.config.honor_sleep {
                    tokio::time::sleep(sleep.duration()).await;
                } else {
                    tracing::debug!(step = step.name(), duration = %sleep.iso8601(), "sleep simulated");
                }
                Ok(Effect::Response(json!({})))
            }
            StepKind::Pause(_) => {
                tracing::debug!(step = step.name(), "pause resumed");
                Ok(Effect::Response(json!({})))
            }
            StepKind::Script(script) => self
                .run_script(script, automation.helpers(), ctx)
                .await
                .map(Effect::Response),
            StepKind::Automation(nested) => {
                let output = self.run_nested(nested, ctx).await?;
                Ok(Effect::Response(json!({ "Output": output })))
            }
            StepKind::RunCommand(cmd) => self.run_command_step(cmd, ctx).await.map(Effect::Response),
        }
    }

    async fn call_api(
        &self,
        automation: &Automation,
        call: &ApiCall,
        ctx: &ExecutionContext,
    ) -> Result<Value, StepError> {
        let params = match render_value(&Value::Object(call.params().clone()), ctx)? {
            Value::Object(map) => map,
            _ => InputMap::new(),
        };
        let assume_role = automation
            .role_binding()
            .and_then(|binding| ctx.get(binding.context_key()).cloned());

        let request = ApiRequest {
            service: call.service().to_string(),
            api: call.api().to_string(),
            params,
            assume_role,
        };
        Ok(self.remote_api.call(request).await?)
    }

    async fn run_script(
        &self,
        script: &ScriptStep,
        helpers: &HelperLibrary,
        ctx: &ExecutionContext,
    ) -> Result<Value, StepError> {
        let mut payload = InputMap::new();
        for (key, reference) in script.input_payload() {
            let value = ctx
                .get(reference)
                .cloned()
                .ok_or_else(|| StepError::MissingInput(reference.clone()))?;
            payload.insert(key.clone(), value);
        }

        let invocation = ScriptInvocation {
            runtime: script.runtime_name().to_string(),
            handler: script.handler().to_string(),
            script: helpers.assemble(script),
            payload,
        };
        let result = self.scripts.run(invocation).await?;
        Ok(json!({ "Payload": result }))
    }
}
