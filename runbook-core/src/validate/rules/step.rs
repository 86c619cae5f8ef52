use std::collections::HashSet;

use serde_json::Value;

use crate::chain::{Chain, StepId};
use crate::expressions::Selector;
use crate::steps::{HelperLibrary, RunCommandStep, ScriptStep, StepKind};
use crate::validate::rules::{branch, common};
use crate::validate::validator::{Validator, MAX_STEP_NAME_LEN, NAME_RE};

pub(crate) fn validate_step_names<'a>(
    v: &mut Validator,
    doc: &str,
    names: impl Iterator<Item = &'a str>,
) {
    let mut seen = HashSet::new();
    for (idx, name) in names.enumerate() {
        let path = format!("{doc}.mainSteps[{idx}].name");
        if !NAME_RE.is_match(name) {
            v.push(&path, "must match regex [A-Za-z0-9_]+");
        }
        if name.len() > MAX_STEP_NAME_LEN {
            v.push(&path, format!("must be at most {MAX_STEP_NAME_LEN} characters"));
        }
        if !seen.insert(name) {
            v.push(&path, format!("duplicate step name {name}"));
        }
    }
}

pub(crate) fn validate_step(
    v: &mut Validator,
    doc: &str,
    chain: &Chain,
    id: StepId,
    helpers: &HelperLibrary,
) {
    let step = chain.step(id);
    let edges = chain.edges(id);
    let path = format!("{doc}.{}", step.name());

    if step.attempt_limit() < 1 {
        v.push(format!("{path}.maxAttempts"), "must be at least 1");
    }
    if step.timeout_secs() < 1 {
        v.push(format!("{path}.timeoutSeconds"), "must be at least 1");
    }

    for (field, target, resolved) in [
        ("onFailure", step.failure_target(), edges.on_failure),
        ("onCancel", step.cancel_target(), edges.on_cancel),
    ] {
        let Some(target) = target else { continue };
        match resolved {
            None => v.push(format!("{path}.{field}"), format!("unknown step {target}")),
            Some(t) if t == id => v.push(format!("{path}.{field}"), "must not route to itself"),
            Some(t) if t < id => v.push(
                format!("{path}.{field}"),
                format!("must route to a later step, {target} comes first"),
            ),
            Some(_) => {}
        }
    }

    for input in step.declared_inputs() {
        common::validate_reference(v, &format!("{path}.inputs"), input);
    }

    let mut output_names = HashSet::new();
    for output in step.outputs() {
        let opath = format!("{path}.outputs.{}", output.name());
        if !NAME_RE.is_match(output.name()) {
            v.push(&opath, "name must match regex [A-Za-z0-9_]+");
        }
        if !output_names.insert(output.name()) {
            v.push(&opath, "duplicate output name");
        }
        if let Err(e) = Selector::parse(output.selector()) {
            v.push(format!("{opath}.Selector"), e.to_string());
        }
    }

    match step.kind() {
        StepKind::ApiCall(call) => {
            if call.service().trim().is_empty() {
                v.push(format!("{path}.inputs.Service"), "must not be empty");
            }
            if call.api().trim().is_empty() {
                v.push(format!("{path}.inputs.Api"), "must not be empty");
            }
            for (key, value) in call.params() {
                common::validate_value_templates(v, &format!("{path}.inputs.{key}"), value);
            }
        }
        StepKind::Branch(b) => branch::validate_branch(v, &path, chain, id, b),
        StepKind::Script(script) => validate_script(v, &path, script, helpers),
        StepKind::RunCommand(cmd) => validate_run_command(v, &path, cmd),
        StepKind::Sleep(_) | StepKind::Pause(_) | StepKind::Automation(_) => {}
    }
}

fn validate_script(v: &mut Validator, path: &str, script: &ScriptStep, helpers: &HelperLibrary) {
    if script.handler().trim().is_empty() {
        v.push(format!("{path}.inputs.Handler"), "must not be empty");
    }
    if script.script().trim().is_empty() {
        v.push(format!("{path}.inputs.Script"), "must not be empty");
    }
    for helper in script.helpers() {
        if !helpers.contains(helper) {
            v.push(
                format!("{path}.inputs.Script"),
                format!("declared helper {helper} is not in the helper library"),
            );
        }
    }
    for called in helpers.calls_in(script.script()) {
        if !script.helpers().iter().any(|h| h == called) {
            v.push(
                format!("{path}.inputs.Script"),
                format!("calls helper {called} without declaring it"),
            );
        }
    }
    for (key, reference) in script.input_payload() {
        common::validate_reference(v, &format!("{path}.inputs.InputPayload.{key}"), reference);
    }
}

fn validate_run_command(v: &mut Validator, path: &str, cmd: &RunCommandStep) {
    if cmd.instance_ids().is_empty() {
        v.push(format!("{path}.inputs.InstanceIds"), "must name at least one instance");
    }
    for id in cmd.instance_ids() {
        common::validate_value_templates(
            v,
            &format!("{path}.inputs.InstanceIds"),
            &Value::String(id.clone()),
        );
    }

    let document = cmd.document();
    for (name, value) in cmd.parameters() {
        let ppath = format!("{path}.inputs.Parameters.{name}");
        if !document.parameters().iter().any(|p| p.name() == name) {
            v.push(&ppath, format!("command document {} has no parameter {name}", document.name()));
        }
        common::validate_value_templates(v, &ppath, value);
    }
    for param in document.parameters().iter().filter(|p| p.is_required()) {
        if !cmd.parameters().contains_key(param.name()) {
            v.push(
                format!("{path}.inputs.Parameters"),
                format!("required parameter {} is not provided", param.name()),
            );
        }
    }
}
