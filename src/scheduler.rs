//! The Scheduler Encoder (§4.3): a probabilistic memoryless scheduler tied
//! across states that share an enabled-action set.

use z3::ast::{Ast, Real};
use z3::Context;

use crate::config::EncoderConfig;
use crate::mdp::Mdp;
use crate::registry::{Registry, VarKey};

/// Emit the scheduler constraints into `solver` and populate `registry`
/// with every `a_{A}_{α}` / `a_{s}_{α}` variable.
pub fn encode_scheduler<'ctx>(
    ctx: &'ctx Context,
    solver: &z3::Solver<'ctx>,
    mdp: &Mdp,
    config: &EncoderConfig,
    registry: &mut Registry<'ctx>,
) {
    let max_prob = config.max_sched_prob;
    let min_prob = config.min_sched_prob();
    let max_val = Real::from_real(ctx, max_prob.numer() as i32, max_prob.denom() as i32);
    let min_val = Real::from_real(ctx, min_prob.numer() as i32, min_prob.denom() as i32);
    let one = Real::from_real(ctx, 1, 1);

    for action_set in mdp.distinct_action_sets() {
        let vars: Vec<(u32, Real)> = action_set
            .iter()
            .map(|&alpha| {
                let var = registry.real_var(VarKey::Sched {
                    action_set: action_set.clone(),
                    action: alpha,
                });
                (alpha, var)
            })
            .collect();

        if vars.len() == 1 {
            solver.assert(&vars[0].1._eq(&one));
        } else {
            if !config.dont_restrict_sched {
                for (_, v) in &vars {
                    solver.assert(&v.ge(&min_val));
                    solver.assert(&v.le(&max_val));
                }
            } else {
                let zero = Real::from_real(ctx, 0, 1);
                for (_, v) in &vars {
                    solver.assert(&v.ge(&zero));
                    solver.assert(&v.le(&one));
                }
            }
            let refs: Vec<&Real> = vars.iter().map(|(_, v)| v).collect();
            let sum = Real::add(ctx, &refs);
            solver.assert(&sum._eq(&one));
        }
    }

    for s in mdp.states() {
        let action_set = mdp.action_set(s);
        for alpha in mdp.actions(s) {
            let sched_var = registry.real_var(VarKey::Sched {
                action_set: action_set.clone(),
                action: alpha,
            });
            let state_var = registry.real_var(VarKey::SchedState { state: s, action: alpha });
            solver.assert(&state_var._eq(&sched_var));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::Rational;
    use std::collections::{BTreeMap, BTreeSet};
    use z3::{Config, SatResult, Solver};

    fn two_action_mdp() -> Mdp {
        let mut d0 = BTreeMap::new();
        d0.insert(0, Rational::ONE);
        let mut d1 = BTreeMap::new();
        d1.insert(0, Rational::ONE);
        let mut acts = BTreeMap::new();
        acts.insert(0, d0);
        acts.insert(1, d1);
        Mdp::new(1, vec![acts], vec![BTreeSet::new()]).unwrap()
    }

    #[test]
    fn sibling_probabilities_sum_to_one() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);
        let mdp = two_action_mdp();
        let config = EncoderConfig::default();
        let mut registry = Registry::new(&ctx);
        encode_scheduler(&ctx, &solver, &mdp, &config, &mut registry);
        assert_eq!(solver.check(), SatResult::Sat);
    }

    #[test]
    fn singleton_action_set_forced_to_one() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);
        let mut d0 = BTreeMap::new();
        d0.insert(0, Rational::ONE);
        let mut acts = BTreeMap::new();
        acts.insert(0, d0);
        let mdp = Mdp::new(1, vec![acts], vec![BTreeSet::new()]).unwrap();
        let config = EncoderConfig::default();
        let mut registry = Registry::new(&ctx);
        encode_scheduler(&ctx, &solver, &mdp, &config, &mut registry);
        let action_set: BTreeSet<usize> = [0].into_iter().collect();
        let var = registry.real_var(VarKey::Sched { action_set, action: 0 });
        let model_solver = Solver::new(&ctx);
        model_solver.assert(&var._eq(&Real::from_real(&ctx, 0, 1)));
        for a in solver.get_assertions() {
            model_solver.assert(&a);
        }
        assert_eq!(model_solver.check(), SatResult::Unsat);
    }
}
