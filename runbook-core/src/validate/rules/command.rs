use std::collections::{BTreeSet, HashSet};

use crate::command::{CommandDocument, Platform};
use crate::validate::rules::{common, step};
use crate::validate::validator::Validator;

pub(crate) fn validate_command_document(v: &mut Validator, doc: &CommandDocument) {
    let name = doc.name();
    v.validate_document_name(name, name);

    if doc.steps().is_empty() {
        v.push(format!("{name}.mainSteps"), "must have at least one step");
        return;
    }

    common::validate_inputs(v, &format!("{name}.parameters"), doc.parameters());
    step::validate_step_names(v, name, doc.steps().iter().map(|s| s.name()));

    let declared: HashSet<&str> = doc.parameters().iter().map(|p| p.name()).collect();
    let mut running: Option<BTreeSet<Platform>> = None;
    let mut finally_seen = 0usize;

    for (idx, cmd) in doc.steps().iter().enumerate() {
        let path = format!("{name}.{}", cmd.name());

        if cmd.commands().is_empty() {
            v.push(format!("{path}.inputs.runCommand"), "must have at least one command");
        }
        if cmd.timeout_secs() == Some(0) {
            v.push(format!("{path}.inputs.timeoutSeconds"), "must be at least 1");
        }
        if cmd.supported_platforms().is_empty() {
            v.push(format!("{path}.platforms"), "must support at least one platform");
        }

        for param in cmd.referenced_parameters() {
            if !declared.contains(param.as_str()) {
                v.push(
                    format!("{path}.inputs.runCommand"),
                    format!("references undeclared parameter {param}"),
                );
            }
        }

        // Report the step that first empties the document's platform set.
        let narrowed: BTreeSet<Platform> = match &running {
            None => cmd.supported_platforms().clone(),
            Some(acc) => acc.intersection(cmd.supported_platforms()).copied().collect(),
        };
        if narrowed.is_empty() && running.as_ref().is_some_and(|acc| !acc.is_empty()) {
            let before: Vec<&str> = running
                .iter()
                .flatten()
                .map(Platform::as_str)
                .collect();
            v.push(
                format!("{path}.platforms"),
                format!(
                    "no platform in common with preceding steps ({})",
                    before.join(", ")
                ),
            );
        }
        running = Some(narrowed);

        if cmd.is_finally() {
            finally_seen += 1;
            if finally_seen > 1 {
                v.push(format!("{path}.finallyStep"), "only one finally step is allowed");
            } else if idx + 1 != doc.steps().len() {
                v.push(format!("{path}.finallyStep"), "the finally step must be the last step");
            }
        }
    }
}
