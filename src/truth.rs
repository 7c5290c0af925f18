//! The Quantifier Encoder, "Truth" (§4.10): collapses the outer state and
//! stutter quantifiers into one quantifier-free Boolean term built from the
//! `holds_*` variables the Semantic Encoder already populated.
//!
//! Scheduler quantification needs no work here: only `∃ scheduler` is
//! supported (§4.2 rejects `∀ scheduler` during analysis), and an
//! existentially quantified scheduler is already "encoded" by the fact that
//! its probability variables are left free for the solver to choose.

use z3::ast::{Ast, Bool, Real};
use z3::Context;

use crate::extended::ExtendedState;
use crate::ir::Polarity;
use crate::mdp::{ActionId, Mdp, StateId};
use crate::quantifiers::QuantifierPrefix;
use crate::registry::{Registry, VarKey};

/// Assert the fully-collapsed truth value of `prefix` (whose `body` was
/// indexed as `top_id`) into `solver`.
pub fn encode_truth<'ctx>(
    ctx: &'ctx Context,
    solver: &z3::Solver<'ctx>,
    mdp: &Mdp,
    stutter_length: u32,
    registry: &mut Registry<'ctx>,
    prefix: &QuantifierPrefix,
    top_id: crate::index::SubformulaId,
) {
    let pairs = state_action_pairs(mdp);
    let result = collapse_states(ctx, mdp, stutter_length, registry, prefix, top_id, &pairs, 0, &mut Vec::new());
    solver.assert(&result);
}

fn state_action_pairs(mdp: &Mdp) -> Vec<(StateId, ActionId)> {
    let mut pairs = Vec::new();
    for s in mdp.states() {
        for alpha in mdp.actions(s) {
            pairs.push((s, alpha));
        }
    }
    pairs
}

fn collapse_states<'ctx>(
    ctx: &'ctx Context,
    mdp: &Mdp,
    stutter_length: u32,
    registry: &mut Registry<'ctx>,
    prefix: &QuantifierPrefix,
    top_id: crate::index::SubformulaId,
    pairs: &[(StateId, ActionId)],
    level: usize,
    chosen: &mut Vec<StateId>,
) -> Bool<'ctx> {
    if level == prefix.num_states() {
        let n = prefix.num_stutters();
        let tuple: Vec<ExtendedState> = (0..n)
            .map(|j| {
                let state_idx = prefix.stutter_assoc_state[j] as usize - 1;
                ExtendedState::fresh(chosen[state_idx])
            })
            .collect();
        let holds = registry.bool_var(VarKey::Holds { subformula: top_id, tuple });
        return collapse_stutters(ctx, mdp, stutter_length, registry, prefix, pairs, n, holds);
    }

    let mut parts: Vec<Bool<'ctx>> = Vec::new();
    for s in mdp.states() {
        chosen.push(s);
        parts.push(collapse_states(ctx, mdp, stutter_length, registry, prefix, top_id, pairs, level + 1, chosen));
        chosen.pop();
    }
    let refs: Vec<&Bool<'ctx>> = parts.iter().collect();
    match prefix.state_polarities[level] {
        Polarity::Forall => Bool::and(ctx, &refs),
        Polarity::Exists => Bool::or(ctx, &refs),
    }
}

/// Collapse stutter quantifiers `j_remaining..=1` innermost-out, enumerating
/// every candidate memoryless stutter-scheduler assignment over `pairs`
/// (§4.10). `acc` is the term built so far (initially the bare `holds`
/// term).
fn collapse_stutters<'ctx>(
    ctx: &'ctx Context,
    mdp: &Mdp,
    stutter_length: u32,
    registry: &mut Registry<'ctx>,
    prefix: &QuantifierPrefix,
    pairs: &[(StateId, ActionId)],
    j_remaining: usize,
    acc: Bool<'ctx>,
) -> Bool<'ctx> {
    let _ = mdp;
    if j_remaining == 0 {
        return acc;
    }
    let j = j_remaining as u32;
    let mut parts: Vec<Bool<'ctx>> = Vec::new();
    for assignment in stutter_assignments(pairs.len(), stutter_length) {
        let precond = stutter_precondition(ctx, registry, j, pairs, &assignment);
        let part = match prefix.stutter_polarities[j_remaining - 1] {
            Polarity::Exists => Bool::and(ctx, &[&precond, &acc]),
            Polarity::Forall => precond.implies(&acc),
        };
        parts.push(part);
    }
    let refs: Vec<&Bool<'ctx>> = parts.iter().collect();
    let combined = match prefix.stutter_polarities[j_remaining - 1] {
        Polarity::Exists => Bool::or(ctx, &refs),
        Polarity::Forall => Bool::and(ctx, &refs),
    };
    collapse_stutters(ctx, mdp, stutter_length, registry, prefix, pairs, j_remaining - 1, combined)
}

fn stutter_precondition<'ctx>(
    ctx: &'ctx Context,
    registry: &mut Registry<'ctx>,
    stut_idx: u32,
    pairs: &[(StateId, ActionId)],
    assignment: &[u32],
) -> Bool<'ctx> {
    let mut eqs: Vec<Bool<'ctx>> = Vec::new();
    for (&(state, action), &value) in pairs.iter().zip(assignment.iter()) {
        let t_var = registry.real_var(VarKey::Stutter { stut_idx, state, action });
        let val = Real::from_real(ctx, value as i32, 1);
        eqs.push(t_var._eq(&val));
    }
    let refs: Vec<&Bool<'ctx>> = eqs.iter().collect();
    Bool::and(ctx, &refs)
}

/// Every length-`len` assignment of values in `0..k` (an odometer).
fn stutter_assignments(len: usize, k: u32) -> Vec<Vec<u32>> {
    let mut out = vec![Vec::new()];
    for _ in 0..len {
        let mut next = Vec::with_capacity(out.len() * k as usize);
        for partial in &out {
            for v in 0..k {
                let mut e = partial.clone();
                e.push(v);
                next.push(e);
            }
        }
        out = next;
    }
    out
}
