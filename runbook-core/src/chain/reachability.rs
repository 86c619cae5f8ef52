use std::collections::BTreeSet;

use super::{Chain, StepId};

impl Chain {
    /// Steps reachable from `from` by following declared successors only.
    ///
    /// `from` itself is excluded, so a branch can never target itself or
    /// anything declared before it.
    pub fn reachable_from(&self, from: StepId) -> BTreeSet<StepId> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            if let Some(next) = self.edges(id).next {
                if next != from && seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use crate::chain::Chain;
    use crate::steps::Step;

    #[test]
    fn reachable_set_is_everything_after() {
        let chain = Chain::link(vec![
            Step::pause("A"),
            Step::pause("B"),
            Step::pause("C"),
        ]);
        let b = chain.id_of("B").unwrap();
        let reach = chain.reachable_from(b);
        assert_eq!(reach.len(), 1);
        assert!(reach.contains(&chain.id_of("C").unwrap()));
        assert!(chain.reachable_from(chain.id_of("C").unwrap()).is_empty());
    }

    #[test]
    fn unknown_targets_stay_unresolved() {
        let chain = Chain::link(vec![Step::pause("A").on_failure("Nope")]);
        assert_eq!(chain.edges(chain.first().unwrap()).on_failure, None);
    }
}
