//! Arena of steps addressed by stable indices, with an explicit edge list.

mod reachability;

use std::collections::HashMap;

use crate::steps::{Step, StepKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(usize);

impl StepId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Outgoing edges of one step, resolved from step names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Edges {
    /// Declared successor: the following step in chain order.
    pub next: Option<StepId>,
    pub on_failure: Option<StepId>,
    pub on_cancel: Option<StepId>,
    /// Branch choice targets, aligned with the branch's choices.
    pub choice_targets: Vec<Option<StepId>>,
    pub branch_default: Option<StepId>,
}

#[derive(Debug, Clone)]
pub struct Chain {
    steps: Vec<Step>,
    edges: Vec<Edges>,
    index: HashMap<String, StepId>,
}

impl Chain {
    /// Index `steps` in order and resolve every named edge.
    ///
    /// Unknown names resolve to `None`; validation reports them before a chain
    /// is handed out.
    pub(crate) fn link(steps: Vec<Step>) -> Self {
        let mut index = HashMap::with_capacity(steps.len());
        for (idx, step) in steps.iter().enumerate() {
            index.entry(step.name().to_string()).or_insert(StepId(idx));
        }

        let lookup = |name: Option<&str>| name.and_then(|n| index.get(n).copied());
        let edges = steps
            .iter()
            .enumerate()
            .map(|(idx, step)| {
                let (choice_targets, branch_default) = match step.kind() {
                    StepKind::Branch(branch) => (
                        branch
                            .choices()
                            .iter()
                            .map(|c| lookup(Some(c.target())))
                            .collect(),
                        lookup(branch.default_target()),
                    ),
                    _ => (Vec::new(), None),
                };
                Edges {
                    next: (idx + 1 < steps.len()).then_some(StepId(idx + 1)),
                    on_failure: lookup(step.failure_target()),
                    on_cancel: lookup(step.cancel_target()),
                    choice_targets,
                    branch_default,
                }
            })
            .collect();

        Self {
            steps,
            edges,
            index,
        }
    }

    pub fn first(&self) -> Option<StepId> {
        (!self.steps.is_empty()).then_some(StepId(0))
    }

    pub fn step(&self, id: StepId) -> &Step {
        &self.steps[id.0]
    }

    pub fn edges(&self, id: StepId) -> &Edges {
        &self.edges[id.0]
    }

    pub fn id_of(&self, name: &str) -> Option<StepId> {
        self.index.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&Step> {
        self.id_of(name).map(|id| self.step(id))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StepId, &Step)> {
        self.steps.iter().enumerate().map(|(i, s)| (StepId(i), s))
    }

    /// Step names in declared order.
    pub fn order(&self) -> Vec<&str> {
        self.steps.iter().map(Step::name).collect()
    }
}
