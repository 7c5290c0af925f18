//! The Quantifier Analyzer (§4.2): validates a formula's quantifier prefix.
//!
//! Grounded in `propertyparser.py`'s `checkStateQuantifiers` /
//! `checkStutterQuantifiers`: state indices must be exactly `1..m` in
//! order, stutter indices exactly `1..n` in order, every state must have at
//! least one associated stutter, every stutter's associated state must be
//! quantified, and every stutter referenced in the body must be quantified
//! (and vice versa).

use std::collections::BTreeSet;

use crate::error::{CheckError, CheckResult};
use crate::ir::{Formula, FormulaNode, Polarity, StateIdx, StutterIdx, TemporalNode};

/// The validated quantifier prefix of a formula.
#[derive(Debug, Clone)]
pub struct QuantifierPrefix {
    pub scheduler_polarity: Polarity,
    /// State quantifier polarities, indexed `state_idx - 1`.
    pub state_polarities: Vec<Polarity>,
    /// Stutter quantifier polarities, indexed `stut_idx - 1`.
    pub stutter_polarities: Vec<Polarity>,
    /// `assoc[stut_idx - 1] = state_idx` (1-based).
    pub stutter_assoc_state: Vec<StateIdx>,
    /// The formula body beneath every quantifier.
    pub body: Formula,
}

impl QuantifierPrefix {
    pub fn num_states(&self) -> usize {
        self.state_polarities.len()
    }

    pub fn num_stutters(&self) -> usize {
        self.stutter_polarities.len()
    }
}

/// Validate and strip the quantifier prefix from `formula`.
pub fn analyze(formula: &Formula) -> CheckResult<QuantifierPrefix> {
    let (scheduler_polarity, rest) = match formula.as_ref() {
        FormulaNode::SchedQuant { polarity, body } => (*polarity, body.clone()),
        other => {
            return Err(CheckError::malformed_quantifier_prefix(format!(
                "formula must begin with a scheduler quantifier, found {other:?}"
            )))
        }
    };

    if scheduler_polarity == Polarity::Forall {
        return Err(CheckError::unsupported_operator(
            "forall-scheduler",
            "universal scheduler quantification is rejected; see the reject_universal_scheduler configuration option",
        ));
    }

    let mut state_polarities = Vec::new();
    let mut state_indices = Vec::new();
    let mut cursor = rest;
    loop {
        match cursor.as_ref() {
            FormulaNode::StateQuant { polarity, idx, body } => {
                state_polarities.push(*polarity);
                state_indices.push(*idx);
                cursor = body.clone();
            }
            _ => break,
        }
    }

    let m = state_polarities.len();
    let expected_order: Vec<StateIdx> = (1..=m as u32).collect();
    if state_indices != expected_order {
        return Err(CheckError::malformed_quantifier_prefix(
            "state variables are not named s1, ..., sm in order",
        ));
    }
    let expected: BTreeSet<StateIdx> = expected_order.into_iter().collect();

    let mut stutter_polarities = Vec::new();
    let mut stutter_indices = Vec::new();
    let mut stutter_assoc_state = Vec::new();
    loop {
        match cursor.as_ref() {
            FormulaNode::StutterQuant {
                polarity,
                stut_idx,
                assoc_state_idx,
                body,
            } => {
                stutter_polarities.push(*polarity);
                stutter_indices.push(*stut_idx);
                stutter_assoc_state.push(*assoc_state_idx);
                cursor = body.clone();
            }
            _ => break,
        }
    }

    let n = stutter_polarities.len();
    let expected_stut_order: Vec<StutterIdx> = (1..=n as u32).collect();
    if stutter_indices != expected_stut_order {
        return Err(CheckError::malformed_quantifier_prefix(
            "stutter variables are not named t1, ..., tn in order",
        ));
    }

    let assoc_states: BTreeSet<StateIdx> = stutter_assoc_state.iter().copied().collect();
    if assoc_states != expected {
        return Err(CheckError::quantifier_coverage(
            "every quantified state must have at least one associated stutter, and every stutter's associated state must be quantified",
        ));
    }

    let used_stutters = collect_stutter_indices(&cursor);
    let quantified_stutters: BTreeSet<StutterIdx> = (1..=n as u32).collect();
    if used_stutters != quantified_stutters {
        return Err(CheckError::quantifier_scoping(
            "every stutter index referenced in the body must be quantified, and every quantified stutter must be used",
        ));
    }

    Ok(QuantifierPrefix {
        scheduler_polarity,
        state_polarities,
        stutter_polarities,
        stutter_assoc_state,
        body: cursor,
    })
}

fn collect_stutter_indices(formula: &Formula) -> BTreeSet<StutterIdx> {
    let mut set = BTreeSet::new();
    walk(formula, &mut set);
    set
}

fn walk(formula: &Formula, set: &mut BTreeSet<StutterIdx>) {
    match formula.as_ref() {
        FormulaNode::SchedQuant { body, .. } => walk(body, set),
        FormulaNode::StateQuant { body, .. } => walk(body, set),
        FormulaNode::StutterQuant { body, .. } => walk(body, set),
        FormulaNode::True => {}
        FormulaNode::AtomicProp { stut_idx, .. } => {
            set.insert(*stut_idx);
        }
        FormulaNode::Not(a) => walk(a, set),
        FormulaNode::Bool { left, right, .. } => {
            walk(left, set);
            walk(right, set);
        }
        FormulaNode::Compare { left, right, .. } => {
            walk(left, set);
            walk(right, set);
        }
        FormulaNode::ConstProb(_) => {}
        FormulaNode::Arith { left, right, .. } => {
            walk(left, set);
            walk(right, set);
        }
        FormulaNode::Prob(t) => walk_temporal(t, set),
        FormulaNode::Reward { inner, .. } => walk_temporal(inner, set),
    }
}

fn walk_temporal(t: &TemporalNode, set: &mut BTreeSet<StutterIdx>) {
    match t {
        TemporalNode::Next(a) => walk(a, set),
        TemporalNode::UntilUnbounded { left, right } => {
            walk(left, set);
            walk(right, set);
        }
        TemporalNode::UntilBounded { left, right, .. } => {
            walk(left, set);
            walk(right, set);
        }
        TemporalNode::Future(a) => walk(a, set),
        TemporalNode::Global(a) => walk(a, set),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::*;

    fn valid_body() -> Formula {
        let p = atomic_prop("end", 1);
        let q = atomic_prop("end", 2);
        compare(CompareOp::Eq, prob(next(p)), prob(next(q)))
    }

    fn wrap(body: Formula) -> Formula {
        sched_exists(state_quant(
            Polarity::Forall,
            1,
            state_quant(
                Polarity::Forall,
                2,
                stutter_quant(
                    Polarity::Forall,
                    1,
                    1,
                    stutter_quant(Polarity::Forall, 2, 2, body),
                ),
            ),
        ))
    }

    #[test]
    fn accepts_well_formed_prefix() {
        let formula = wrap(valid_body());
        let prefix = analyze(&formula).unwrap();
        assert_eq!(prefix.num_states(), 2);
        assert_eq!(prefix.num_stutters(), 2);
        assert_eq!(prefix.stutter_assoc_state, vec![1, 2]);
    }

    #[test]
    fn rejects_out_of_order_state_names() {
        let body = valid_body();
        let formula = sched_exists(state_quant(
            Polarity::Forall,
            2,
            state_quant(
                Polarity::Forall,
                1,
                stutter_quant(
                    Polarity::Forall,
                    1,
                    1,
                    stutter_quant(Polarity::Forall, 2, 2, body),
                ),
            ),
        ));
        let err = analyze(&formula).unwrap_err();
        assert_eq!(err.kind, crate::error::CheckErrorKind::MalformedQuantifierPrefix);
    }

    #[test]
    fn rejects_missing_stutter_coverage() {
        let p = atomic_prop("end", 1);
        let formula = sched_exists(state_quant(
            Polarity::Forall,
            1,
            state_quant(
                Polarity::Forall,
                2,
                stutter_quant(Polarity::Forall, 1, 1, prob(next(p))),
            ),
        ));
        let err = analyze(&formula).unwrap_err();
        assert_eq!(err.kind, crate::error::CheckErrorKind::QuantifierCoverage);
    }

    #[test]
    fn rejects_forall_scheduler() {
        let formula = sched_forall(valid_body());
        let err = analyze(&formula).unwrap_err();
        assert!(matches!(
            err.kind,
            crate::error::CheckErrorKind::UnsupportedOperator { .. }
        ));
    }
}
