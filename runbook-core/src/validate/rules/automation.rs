use crate::automation::{Automation, DocOutputRef};
use crate::steps::StepKind;
use crate::validate::rules::{common, step};
use crate::validate::validator::Validator;

pub(crate) fn validate_automation(v: &mut Validator, automation: &Automation, raw_doc_outputs: &[String]) {
    let doc = automation.name();
    v.validate_document_name(doc, doc);

    let chain = automation.chain();
    if chain.is_empty() {
        v.push(format!("{doc}.mainSteps"), "must have at least one step");
    }

    common::validate_inputs(v, &format!("{doc}.parameters"), automation.inputs());

    if let Some(role) = automation.assume_role() {
        common::validate_reference(v, &format!("{doc}.assumeRole"), role);
    }

    step::validate_step_names(v, doc, chain.iter().map(|(_, s)| s.name()));
    for (id, _) in chain.iter() {
        step::validate_step(v, doc, chain, id, automation.helpers());
    }

    for (idx, raw) in raw_doc_outputs.iter().enumerate() {
        let path = format!("{doc}.outputs[{idx}]");
        let Some(r) = DocOutputRef::parse(raw) else {
            v.push(path, format!("{raw:?} must be StepName.OutputName"));
            continue;
        };
        let Some(member) = chain.get(r.step()) else {
            v.push(path, format!("{raw:?} names unknown step {}", r.step()));
            continue;
        };
        let declared = member.outputs().iter().any(|o| o.name() == r.output())
            || (matches!(member.kind(), StepKind::Automation(_)) && r.output() == "Output");
        if !declared {
            v.push(
                path,
                format!("step {} declares no output named {}", r.step(), r.output()),
            );
        }
    }
}
