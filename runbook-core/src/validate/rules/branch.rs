use crate::chain::{Chain, StepId};
use crate::steps::BranchStep;
use crate::validate::rules::common;
use crate::validate::validator::Validator;

/// Branches may only redirect flow forward within the declared chain.
pub(crate) fn validate_branch(
    v: &mut Validator,
    path: &str,
    chain: &Chain,
    id: StepId,
    branch: &BranchStep,
) {
    if branch.choices().is_empty() {
        v.push(format!("{path}.inputs.Choices"), "must have at least one choice");
    }

    let reachable = chain.reachable_from(id);
    let edges = chain.edges(id);

    for (idx, choice) in branch.choices().iter().enumerate() {
        let cpath = format!("{path}.inputs.Choices[{idx}]");
        common::validate_reference(v, &format!("{cpath}.Variable"), choice.input_to_test());

        if let Err(e) = choice.operation().check_operand(choice.constant()) {
            v.push(format!("{cpath}.{}", choice.operation().wire_name()), e.to_string());
        }

        match edges.choice_targets.get(idx).copied().flatten() {
            None => v.push(
                format!("{cpath}.NextStep"),
                format!("unknown step {}", choice.target()),
            ),
            Some(target) if !reachable.contains(&target) => v.push(
                format!("{cpath}.NextStep"),
                format!(
                    "target {} is not reachable forward from branch {}",
                    choice.target(),
                    chain.step(id).name()
                ),
            ),
            Some(_) => {}
        }
    }

    if let Some(default) = branch.default_target() {
        match edges.branch_default {
            None => v.push(format!("{path}.inputs.Default"), format!("unknown step {default}")),
            Some(target) if !reachable.contains(&target) => v.push(
                format!("{path}.inputs.Default"),
                format!(
                    "default {default} is not reachable forward from branch {}",
                    chain.step(id).name()
                ),
            ),
            Some(_) => {}
        }
    }
}
