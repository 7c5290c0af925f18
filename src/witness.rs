//! The Result Extractor (§4.11): reconstructs a witness from the solver's
//! model by reading the structured `VarKey`s the registry already holds —
//! no string re-parsing of solver output, per §9.

use std::collections::BTreeSet;

use z3::ast::Ast;
use z3::{Model, SatResult};

use crate::error::{CheckError, CheckResult};
use crate::index::SubformulaId;
use crate::mdp::{ActionId, StateId};
use crate::rational::Rational;
use crate::registry::{Registry, VarKey};

/// The outcome of one model-checking run.
#[derive(Debug)]
pub enum CheckOutcome {
    Holds(Witness),
    DoesNotHold,
    Unknown { reason: String },
}

/// A reconstructed witness: the scheduler the solver found, the stutter
/// durations it chose, and which initial state-tuples satisfy the formula.
#[derive(Debug, Default)]
pub struct Witness {
    pub scheduler: Vec<SchedulerChoice>,
    pub stutter: Vec<StutterChoice>,
    pub satisfying_state_tuples: Vec<Vec<StateId>>,
}

#[derive(Debug, Clone)]
pub struct SchedulerChoice {
    pub action_set: BTreeSet<ActionId>,
    pub action: ActionId,
    pub probability: Rational,
}

#[derive(Debug, Clone)]
pub struct StutterChoice {
    pub stut_idx: u32,
    pub state: StateId,
    pub action: ActionId,
    pub duration: u32,
}

/// Interpret a solver result into a `CheckOutcome`, extracting a witness on
/// SAT.
pub fn extract<'ctx>(
    result: SatResult,
    model: Option<Model<'ctx>>,
    registry: &Registry<'ctx>,
    top_id: SubformulaId,
) -> CheckResult<CheckOutcome> {
    match result {
        SatResult::Unsat => Ok(CheckOutcome::DoesNotHold),
        SatResult::Unknown => Err(CheckError::solver_unknown("the solver could not decide this query")),
        SatResult::Sat => {
            let model = model.ok_or_else(|| CheckError::solver_failure("sat result carried no model"))?;
            Ok(CheckOutcome::Holds(build_witness(&model, registry, top_id)))
        }
    }
}

fn build_witness<'ctx>(model: &Model<'ctx>, registry: &Registry<'ctx>, top_id: SubformulaId) -> Witness {
    let mut witness = Witness::default();

    for key in registry.real_keys() {
        if let VarKey::Sched { action_set, action } = key {
            if let Some(term) = registry.get_real_term(key) {
                if let Some(value) = model.eval(term, true).and_then(|r| r.as_real()) {
                    witness.scheduler.push(SchedulerChoice {
                        action_set: action_set.clone(),
                        action: *action,
                        probability: Rational::new(value.0, value.1),
                    });
                }
            }
        }
        if let VarKey::Stutter { stut_idx, state, action } = key {
            if let Some(term) = registry.get_real_term(key) {
                if let Some(value) = model.eval(term, true).and_then(|r| r.as_real()) {
                    witness.stutter.push(StutterChoice {
                        stut_idx: *stut_idx,
                        state: *state,
                        action: *action,
                        duration: value.0.max(0) as u32,
                    });
                }
            }
        }
    }

    for key in registry.bool_keys() {
        if let VarKey::Holds { subformula, tuple } = key {
            if *subformula != top_id {
                continue;
            }
            if !tuple.iter().all(|es| es.is_fresh()) {
                continue;
            }
            if let Some(term) = registry.get_bool_term(key) {
                if model.eval(term, true).and_then(|b| b.as_bool()) == Some(true) {
                    witness.satisfying_state_tuples.push(tuple.iter().map(|es| es.state).collect());
                }
            }
        }
    }

    // `registry.{real,bool}_keys()` iterate a `HashMap` in unspecified
    // order; sort every collected field so that two runs on identical
    // inputs (§8's round-trip determinism) produce an identical witness,
    // not merely an identical constraint stream.
    witness.scheduler.sort_by(|a, b| {
        a.action_set
            .iter()
            .collect::<Vec<_>>()
            .cmp(&b.action_set.iter().collect::<Vec<_>>())
            .then(a.action.cmp(&b.action))
    });
    witness
        .stutter
        .sort_by_key(|c| (c.stut_idx, c.state, c.action));
    witness.satisfying_state_tuples.sort();

    witness
}
