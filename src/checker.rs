//! Top-level orchestration: given an `Mdp`, a closed `Formula`, and an
//! `EncoderConfig`, run the full pipeline (§2's data flow) and produce a
//! `CheckOutcome`.

use z3::Solver;

use crate::config::EncoderConfig;
use crate::error::CheckResult;
use crate::index::SubformulaIndex;
use crate::ir::Formula;
use crate::mdp::Mdp;
use crate::quantifiers::{self, QuantifierPrefix};
use crate::registry::Registry;
use crate::scheduler::encode_scheduler;
use crate::semantics::SemanticEncoder;
use crate::solver::SolverSession;
use crate::stutter::encode_stutter;
use crate::truth::encode_truth;
use crate::witness::{self, CheckOutcome};

/// A single-threaded, synchronous hyperproperty check (§5: no internal
/// concurrency, the only suspension point is the blocking `solver.check()`
/// call below).
pub struct ModelChecker {
    config: EncoderConfig,
    solver_timeout_ms: u32,
}

impl ModelChecker {
    pub fn new(config: EncoderConfig) -> CheckResult<Self> {
        config.validate()?;
        Ok(ModelChecker {
            config,
            solver_timeout_ms: 10_000,
        })
    }

    pub fn with_timeout(mut self, ms: u32) -> Self {
        self.solver_timeout_ms = ms;
        self
    }

    /// Validate the quantifier prefix, encode, and discharge the query.
    pub fn check(&self, mdp: &Mdp, formula: &Formula) -> CheckResult<CheckOutcome> {
        log::debug!("analyzing quantifier prefix");
        let prefix: QuantifierPrefix = quantifiers::analyze(formula)?;

        let session = SolverSession::new(self.solver_timeout_ms);
        let ctx = session.context();
        let solver = Solver::new(&ctx);
        let mut registry = Registry::new(&ctx);
        let mut index = SubformulaIndex::new();

        let top_id = index.index(prefix.body.clone());

        log::debug!("encoding scheduler over {} states", mdp.num_states());
        encode_scheduler(&ctx, &solver, mdp, &self.config, &mut registry);

        for j in 1..=prefix.num_stutters() as u32 {
            log::debug!("encoding stutter quantifier {j}");
            encode_stutter(&ctx, &solver, mdp, &self.config, j, &mut registry);
        }

        log::debug!("encoding semantics of subformula {top_id}");
        {
            let mut encoder = SemanticEncoder::new(
                &ctx,
                &solver,
                mdp,
                &self.config,
                &mut registry,
                &mut index,
                prefix.num_stutters(),
            );
            encoder.encode(top_id, &prefix.body);
        }

        log::debug!("collapsing quantifier prefix");
        encode_truth(&ctx, &solver, mdp, self.config.stutter_length, &mut registry, &prefix, top_id);

        log::debug!("dispatching to the solver");
        let result = solver.check();
        let model = solver.get_model();
        witness::extract(result, model, &registry, top_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::*;
    use crate::rational::Rational;
    use std::collections::{BTreeMap, BTreeSet};

    fn symmetric_coin_mdp() -> Mdp {
        let mut d0 = BTreeMap::new();
        d0.insert(1, Rational::new(1, 2));
        d0.insert(2, Rational::new(1, 2));
        let mut a0 = BTreeMap::new();
        a0.insert(0, d0);

        let mut d1 = BTreeMap::new();
        d1.insert(1, Rational::ONE);
        let mut a1 = BTreeMap::new();
        a1.insert(0, d1);

        let mut d2 = BTreeMap::new();
        d2.insert(2, Rational::ONE);
        let mut a2 = BTreeMap::new();
        a2.insert(0, d2);

        let mut l1 = BTreeSet::new();
        l1.insert("end".to_string());
        let mut l2 = BTreeSet::new();
        l2.insert("end".to_string());

        Mdp::new(3, vec![a0, a1, a2], vec![BTreeSet::new(), l1, l2]).unwrap()
    }

    /// Scenario 1 (§8): `ES sh. A s1. A s2. AT t1(s1). AT t2(s2).
    /// (P(X end(s1)) = P(X end(s2)))` on a symmetric coin MDP. Every
    /// state-tuple reaches `end` with the same next-step probability from
    /// the single shared root, so this should hold.
    #[test]
    fn coin_flip_equivalence_holds() {
        let mdp = symmetric_coin_mdp();
        let config = EncoderConfig::default();
        let checker = ModelChecker::new(config).unwrap();

        let p1 = atomic_prop("end", 1);
        let p2 = atomic_prop("end", 2);
        let body = compare(CompareOp::Eq, prob(next(p1)), prob(next(p2)));
        let formula = sched_exists(state_quant(
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
        ));

        let outcome = checker.check(&mdp, &formula).unwrap();
        assert!(matches!(outcome, CheckOutcome::Holds(_)));
    }

    /// Scenario 6 (§8): state variables out of order are rejected before
    /// any encoding happens.
    #[test]
    fn malformed_prefix_is_rejected() {
        let mdp = symmetric_coin_mdp();
        let config = EncoderConfig::default();
        let checker = ModelChecker::new(config).unwrap();

        let p1 = atomic_prop("end", 1);
        let p2 = atomic_prop("end", 2);
        let body = compare(CompareOp::Eq, prob(next(p1)), prob(next(p2)));
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

        let err = checker.check(&mdp, &formula).unwrap_err();
        assert_eq!(err.kind, crate::error::CheckErrorKind::MalformedQuantifierPrefix);
    }
}
