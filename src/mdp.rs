//! The MDP View (§4.12): a read-only, validated Markov Decision Process.
//!
//! Building one of these is the responsibility of an out-of-scope PRISM-
//! language parser; this module owns the type and its invariants so every
//! downstream encoder can assume a well-formed MDP without re-checking.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{CheckError, CheckResult};
use crate::rational::Rational;

pub type StateId = usize;
pub type ActionId = usize;

/// A finite MDP: states, per-state enabled actions, rational transition
/// distributions, and an atomic-proposition labeling.
#[derive(Debug, Clone)]
pub struct Mdp {
    num_states: usize,
    actions: Vec<BTreeMap<ActionId, BTreeMap<StateId, Rational>>>,
    labels: Vec<BTreeSet<String>>,
}

impl Mdp {
    /// Validate and construct an `Mdp`. Every declared state must have at
    /// least one enabled action, and every `δ(s, α)` must sum to exactly 1
    /// under exact rational arithmetic (never float tolerance).
    pub fn new(
        num_states: usize,
        actions: Vec<BTreeMap<ActionId, BTreeMap<StateId, Rational>>>,
        labels: Vec<BTreeSet<String>>,
    ) -> CheckResult<Self> {
        if actions.len() != num_states || labels.len() != num_states {
            return Err(CheckError::malformed_mdp(
                "actions/labels vectors must have one entry per state",
            ));
        }
        for (s, act_map) in actions.iter().enumerate() {
            if act_map.is_empty() {
                return Err(CheckError::malformed_mdp(format!(
                    "state {s} has no enabled actions"
                )));
            }
            for (alpha, dist) in act_map {
                let total = dist.values().fold(Rational::ZERO, |acc, p| acc.add(*p));
                if total != Rational::ONE {
                    return Err(CheckError::malformed_mdp(format!(
                        "state {s} action {alpha}: distribution sums to {total}, not 1"
                    )));
                }
                for succ in dist.keys() {
                    if *succ >= num_states {
                        return Err(CheckError::malformed_mdp(format!(
                            "state {s} action {alpha}: successor {succ} out of range"
                        )));
                    }
                }
            }
        }
        Ok(Mdp {
            num_states,
            actions,
            labels,
        })
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn states(&self) -> impl Iterator<Item = StateId> {
        0..self.num_states
    }

    /// Enabled actions at `s`, in a deterministic (sorted) order.
    pub fn actions(&self, s: StateId) -> impl Iterator<Item = ActionId> + '_ {
        self.actions[s].keys().copied()
    }

    /// The successor distribution of `(s, alpha)`, in a deterministic order.
    pub fn transitions(&self, s: StateId, alpha: ActionId) -> impl Iterator<Item = (StateId, Rational)> + '_ {
        self.actions[s][&alpha].iter().map(|(s2, p)| (*s2, *p))
    }

    pub fn prob(&self, s: StateId, alpha: ActionId, s2: StateId) -> Rational {
        self.actions[s]
            .get(&alpha)
            .and_then(|d| d.get(&s2))
            .copied()
            .unwrap_or(Rational::ZERO)
    }

    pub fn labels(&self, s: StateId) -> &BTreeSet<String> {
        &self.labels[s]
    }

    pub fn has_label(&self, s: StateId, prop: &str) -> bool {
        self.labels[s].contains(prop)
    }

    /// The distinct enabled-action sets occurring across the MDP, used by
    /// the Scheduler Encoder to tie together states that share one.
    pub fn distinct_action_sets(&self) -> Vec<BTreeSet<ActionId>> {
        let mut seen: Vec<BTreeSet<ActionId>> = Vec::new();
        for act_map in &self.actions {
            let set: BTreeSet<ActionId> = act_map.keys().copied().collect();
            if !seen.contains(&set) {
                seen.push(set);
            }
        }
        seen
    }

    pub fn action_set(&self, s: StateId) -> BTreeSet<ActionId> {
        self.actions[s].keys().copied().collect()
    }
}
