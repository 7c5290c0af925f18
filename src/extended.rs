//! Extended states (§3): pairs `(s, i)` where `i` counts stutter progress.

use crate::mdp::StateId;

/// A state paired with its stutter progress `i ∈ {0, .., K-1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExtendedState {
    pub state: StateId,
    pub stutter: u32,
}

impl ExtendedState {
    pub fn fresh(state: StateId) -> Self {
        ExtendedState { state, stutter: 0 }
    }

    pub fn new(state: StateId, stutter: u32) -> Self {
        ExtendedState { state, stutter }
    }

    pub fn is_fresh(&self) -> bool {
        self.stutter == 0
    }
}

impl std::fmt::Display for ExtendedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.state, self.stutter)
    }
}

/// A tuple of extended states, one per stutter quantifier, in quantifier
/// order. This is `R` throughout the component design.
pub type StateTuple = Vec<ExtendedState>;

/// Pin every coordinate whose index is not in `relevant` to the canonical
/// `(0, 0)` extended state (§4.5's relevant-quantifier pruning convention).
pub fn pin_irrelevant(tuple: &StateTuple, relevant: &[usize]) -> StateTuple {
    tuple
        .iter()
        .enumerate()
        .map(|(j, es)| {
            if relevant.contains(&j) {
                *es
            } else {
                ExtendedState::fresh(0)
            }
        })
        .collect()
}
