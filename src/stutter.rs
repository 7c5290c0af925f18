//! The Stutter Encoder (§4.4): stutter-duration variables and the induced
//! transition (`Tr`) / successor-indicator (`go`) variables linking the
//! extended state space to MDP transitions.

use z3::ast::{Ast, Bool, Real};
use z3::Context;

use crate::config::EncoderConfig;
use crate::extended::ExtendedState;
use crate::mdp::Mdp;
use crate::registry::{Registry, VarKey};

/// A successor candidate from an extended state under one action: either an
/// MDP-induced successor `(s', 0)` (guarded by `i >= t`) or the
/// stutter-successor `(s, i+1)` (guarded by `i < t`), paired with the `Tr`
/// and `go` keys the Semantic Encoder reads.
#[derive(Debug, Clone, Copy)]
pub struct SuccessorCandidate {
    pub to: ExtendedState,
    pub tr: VarKey,
    pub go: VarKey,
}

/// Emit stutter-duration and induced-transition constraints for stutter
/// quantifier `stut_idx`, and return, for every extended state and action,
/// the deterministically-ordered list of successor candidates (§4.4, used
/// directly by `encode_next`/until/future/global in `semantics.rs`).
pub fn encode_stutter<'ctx>(
    ctx: &'ctx Context,
    solver: &z3::Solver<'ctx>,
    mdp: &Mdp,
    config: &EncoderConfig,
    stut_idx: u32,
    registry: &mut Registry<'ctx>,
) {
    let k = config.stutter_length;
    for s in mdp.states() {
        for alpha in mdp.actions(s) {
            let t_var = registry.real_var(VarKey::Stutter {
                stut_idx,
                state: s,
                action: alpha,
            });
            let disjuncts: Vec<Bool> = (0..k)
                .map(|v| t_var._eq(&Real::from_real(ctx, v as i32, 1)))
                .collect();
            let disjunct_refs: Vec<&Bool> = disjuncts.iter().collect();
            solver.assert(&Bool::or(ctx, &disjunct_refs));

            for i in 0..k {
                let from = ExtendedState::new(s, i);
                let i_val = Real::from_real(ctx, i as i32, 1);
                let is_stuttering = i_val.lt(&t_var);

                for (s2, p) in mdp.transitions(s, alpha) {
                    let to = ExtendedState::fresh(s2);
                    let tr_key = VarKey::Tr {
                        stut_idx,
                        from,
                        action: alpha,
                        to,
                    };
                    let go_key = VarKey::Go {
                        stut_idx,
                        from,
                        action: alpha,
                        to,
                    };
                    let tr_var = registry.real_var(tr_key);
                    let go_var = registry.real_var(go_key);

                    let prob_val = Real::from_real(ctx, p.numer() as i32, p.denom() as i32);
                    let zero = Real::from_real(ctx, 0, 1);
                    let one = Real::from_real(ctx, 1, 1);

                    solver.assert(&is_stuttering.ite(&tr_var._eq(&zero), &tr_var._eq(&prob_val)));
                    solver.assert(&is_stuttering.ite(&go_var._eq(&zero), &go_var._eq(&one)));
                }

                if i + 1 < k {
                    let to = ExtendedState::new(s, i + 1);
                    let tr_key = VarKey::Tr {
                        stut_idx,
                        from,
                        action: alpha,
                        to,
                    };
                    let go_key = VarKey::Go {
                        stut_idx,
                        from,
                        action: alpha,
                        to,
                    };
                    let tr_var = registry.real_var(tr_key);
                    let go_var = registry.real_var(go_key);
                    let zero = Real::from_real(ctx, 0, 1);
                    let one = Real::from_real(ctx, 1, 1);

                    solver.assert(&is_stuttering.ite(&tr_var._eq(&one), &tr_var._eq(&zero)));
                    solver.assert(&is_stuttering.ite(&go_var._eq(&one), &go_var._eq(&zero)));
                }
            }
        }
    }
}

/// The successor candidates of extended state `(s,i)` under action `alpha`
/// for stutter quantifier `stut_idx`, in the deterministic order the
/// constraints above were emitted in.
pub fn successors(
    mdp: &Mdp,
    config: &EncoderConfig,
    stut_idx: u32,
    from: ExtendedState,
    alpha: usize,
) -> Vec<SuccessorCandidate> {
    let mut out = Vec::new();
    for (s2, _) in mdp.transitions(from.state, alpha) {
        let to = ExtendedState::fresh(s2);
        out.push(SuccessorCandidate {
            to,
            tr: VarKey::Tr {
                stut_idx,
                from,
                action: alpha,
                to,
            },
            go: VarKey::Go {
                stut_idx,
                from,
                action: alpha,
                to,
            },
        });
    }
    if from.stutter + 1 < config.stutter_length {
        let to = ExtendedState::new(from.state, from.stutter + 1);
        out.push(SuccessorCandidate {
            to,
            tr: VarKey::Tr {
                stut_idx,
                from,
                action: alpha,
                to,
            },
            go: VarKey::Go {
                stut_idx,
                from,
                action: alpha,
                to,
            },
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::Rational;
    use std::collections::{BTreeMap, BTreeSet};
    use z3::{Config, SatResult, Solver};

    fn deterministic_chain() -> Mdp {
        let mut d0 = BTreeMap::new();
        d0.insert(1, Rational::ONE);
        let mut a0 = BTreeMap::new();
        a0.insert(0, d0);
        let mut d1 = BTreeMap::new();
        d1.insert(1, Rational::ONE);
        let mut a1 = BTreeMap::new();
        a1.insert(0, d1);
        Mdp::new(2, vec![a0, a1], vec![BTreeSet::new(), BTreeSet::new()]).unwrap()
    }

    #[test]
    fn stutter_duration_is_satisfiable_within_bound() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);
        let mdp = deterministic_chain();
        let config = EncoderConfig {
            stutter_length: 2,
            ..EncoderConfig::default()
        };
        let mut registry = Registry::new(&ctx);
        encode_stutter(&ctx, &solver, &mdp, &config, 1, &mut registry);
        assert_eq!(solver.check(), SatResult::Sat);
    }

    #[test]
    fn successor_candidates_include_mdp_and_stutter_successor() {
        let mdp = deterministic_chain();
        let config = EncoderConfig {
            stutter_length: 2,
            ..EncoderConfig::default()
        };
        let cands = successors(&mdp, &config, 1, ExtendedState::new(0, 0), 0);
        assert_eq!(cands.len(), 2);
        assert!(cands.iter().any(|c| c.to == ExtendedState::fresh(1)));
        assert!(cands.iter().any(|c| c.to == ExtendedState::new(0, 1)));
    }

    #[test]
    fn no_stutter_successor_at_max_progress() {
        let mdp = deterministic_chain();
        let config = EncoderConfig {
            stutter_length: 2,
            ..EncoderConfig::default()
        };
        let cands = successors(&mdp, &config, 1, ExtendedState::new(0, 1), 0);
        assert_eq!(cands.len(), 1);
    }
}
