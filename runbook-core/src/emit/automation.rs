use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::automation::Automation;
use crate::chain::{Chain, StepId};
use crate::error::EmitError;
use crate::expressions::reference;
use crate::steps::{
    ApiCall, BranchStep, HelperLibrary, RunCommandStep, ScriptStep, StepKind,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_SECONDS,
};
use crate::types::{AutomationDoc, InputMap, StepFragment, AUTOMATION_SCHEMA_VERSION};

use super::{render, write_document, EmitFormat};

impl Automation {
    /// Compile into the automation document. Output depends only on the
    /// automation, so compiling twice yields equal documents.
    pub fn compile(&self) -> AutomationDoc {
        let parameters: BTreeMap<_, _> = self
            .inputs()
            .iter()
            .map(|i| (i.name().to_string(), i.to_parameter()))
            .collect();

        let outputs = (!self.doc_outputs().is_empty())
            .then(|| self.doc_outputs().iter().map(|r| r.key()).collect());

        let chain = self.chain();
        AutomationDoc {
            description: self.description().map(str::to_string),
            schema_version: AUTOMATION_SCHEMA_VERSION.to_string(),
            assume_role: self.role_binding().map(|b| b.template()),
            parameters,
            outputs,
            main_steps: chain
                .iter()
                .map(|(id, _)| step_fragment(chain, id, self.helpers()))
                .collect(),
        }
    }

    pub fn render(&self, format: EmitFormat) -> Result<String, EmitError> {
        render(&self.compile(), format)
    }

    pub fn write_to(
        &self,
        path: impl AsRef<std::path::Path>,
        format: EmitFormat,
    ) -> Result<(), EmitError> {
        write_document(&self.compile(), path, format)
    }
}

fn step_fragment(chain: &Chain, id: StepId, helpers: &HelperLibrary) -> StepFragment {
    let step = chain.step(id);
    let inputs = match step.kind() {
        StepKind::ApiCall(call) => api_inputs(call),
        StepKind::Branch(branch) => branch_inputs(chain, id, branch),
        StepKind::Sleep(sleep) => object(json!({ "Duration": sleep.iso8601() })),
        StepKind::Pause(_) => InputMap::new(),
        StepKind::Script(script) => script_inputs(script, helpers),
        StepKind::Automation(nested) => automation_inputs(nested),
        StepKind::RunCommand(cmd) => run_command_inputs(cmd),
    };

    StepFragment {
        description: step.description_text().map(str::to_string),
        name: step.name().to_string(),
        action: step.kind().action().to_string(),
        inputs,
        outputs: (!step.outputs().is_empty())
            .then(|| step.outputs().iter().map(|o| o.to_spec()).collect()),
        is_end: step.ends_chain().then_some(true),
        max_attempts: (step.attempt_limit() != DEFAULT_MAX_ATTEMPTS).then_some(step.attempt_limit()),
        timeout_seconds: (step.timeout_secs() != DEFAULT_TIMEOUT_SECONDS)
            .then_some(step.timeout_secs()),
        on_cancel: step.cancel_target().map(|t| format!("step:{t}")),
        on_failure: step.failure_target().map(|t| format!("step:{t}")),
    }
}

fn object(value: Value) -> InputMap {
    match value {
        Value::Object(map) => map,
        _ => InputMap::new(),
    }
}

fn api_inputs(call: &ApiCall) -> InputMap {
    let mut inputs = InputMap::new();
    inputs.insert("Service".into(), Value::String(call.service().to_string()));
    inputs.insert("Api".into(), Value::String(call.api().to_string()));
    for (key, value) in call.params() {
        inputs.insert(key.clone(), value.clone());
    }
    inputs
}

fn branch_inputs(chain: &Chain, id: StepId, branch: &BranchStep) -> InputMap {
    let choices: Vec<Value> = branch
        .choices()
        .iter()
        .map(|c| {
            let mut choice = InputMap::new();
            choice.insert("NextStep".into(), Value::String(c.target().to_string()));
            choice.insert("Variable".into(), Value::String(reference(c.input_to_test())));
            choice.insert(c.operation().wire_name().into(), c.constant().clone());
            Value::Object(choice)
        })
        .collect();

    let mut inputs = InputMap::new();
    inputs.insert("Choices".into(), Value::Array(choices));

    let default = branch
        .default_target()
        .map(str::to_string)
        .or_else(|| chain.edges(id).next.map(|n| chain.step(n).name().to_string()));
    if let Some(default) = default {
        inputs.insert("Default".into(), Value::String(default));
    }
    inputs
}

fn script_inputs(script: &ScriptStep, helpers: &HelperLibrary) -> InputMap {
    let payload: InputMap = script
        .input_payload()
        .iter()
        .map(|(k, r)| (k.clone(), Value::String(reference(r))))
        .collect();

    let mut inputs = InputMap::new();
    inputs.insert("Runtime".into(), Value::String(script.runtime_name().to_string()));
    inputs.insert("Handler".into(), Value::String(script.handler().to_string()));
    inputs.insert("Script".into(), Value::String(helpers.assemble(script)));
    if !payload.is_empty() {
        inputs.insert("InputPayload".into(), Value::Object(payload));
    }
    inputs
}

fn automation_inputs(nested: &Automation) -> InputMap {
    let runtime: InputMap = nested
        .inputs()
        .iter()
        .map(|i| (i.name().to_string(), Value::String(reference(i.name()))))
        .collect();

    let mut inputs = InputMap::new();
    inputs.insert("DocumentName".into(), Value::String(nested.name().to_string()));
    if !runtime.is_empty() {
        inputs.insert("RuntimeParameters".into(), Value::Object(runtime));
    }
    inputs
}

fn run_command_inputs(cmd: &RunCommandStep) -> InputMap {
    let mut inputs = InputMap::new();
    inputs.insert(
        "DocumentName".into(),
        Value::String(cmd.document().name().to_string()),
    );
    inputs.insert(
        "InstanceIds".into(),
        Value::Array(cmd.instance_ids().iter().cloned().map(Value::String).collect()),
    );
    if !cmd.parameters().is_empty() {
        inputs.insert("Parameters".into(), Value::Object(cmd.parameters().clone()));
    }
    inputs
}
