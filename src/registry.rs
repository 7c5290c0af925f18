//! The Variable Registry (§3, §9): structured keys to solver term handles.
//!
//! The original implementation recovers a variable's meaning by parsing its
//! name (`name[0] == 'h'` etc. in `modelchecker.py`'s `addToVariableList`).
//! Per the spec's own design notes this is replaced by a structured
//! `VarKey`/`VarKind`: every key the registry ever allocates is remembered,
//! so the Result Extractor reads meaning back directly instead of
//! re-parsing the string handed to the solver. The string name (§6) is
//! still produced — one-way — because it is the actual term name Z3 sees.

use std::collections::{BTreeSet, HashMap};

use z3::ast::{Bool, Real};
use z3::Context;

use crate::extended::{ExtendedState, StateTuple};
use crate::index::SubformulaId;
use crate::mdp::{ActionId, StateId};
use crate::ir::StutterIdx;

/// The eight families of auxiliary variable the encoder introduces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VarKey {
    /// `holds_R_φ` — Boolean.
    Holds { subformula: SubformulaId, tuple: StateTuple },
    /// `prob_R_φ` — real.
    Prob { subformula: SubformulaId, tuple: StateTuple },
    /// `d_R_φ` — real, the LFP witness (§4.8).
    Lfp { subformula: SubformulaId, tuple: StateTuple },
    /// `htoi_R_φ` — real, pseudo-Boolean mirror of a `Holds` (§4.7).
    Htoi { subformula: SubformulaId, tuple: StateTuple },
    /// `a_{A}_{α}` — real, scheduler probability per action-set (§4.3).
    Sched { action_set: BTreeSet<ActionId>, action: ActionId },
    /// `a_{s}_{α}` — real, per-state scheduler mirror (§4.3).
    SchedState { state: StateId, action: ActionId },
    /// `t_{j}_{s}_{α}` — real, stutter duration (§4.4).
    Stutter { stut_idx: StutterIdx, state: StateId, action: ActionId },
    /// `Tr_{j}_{(s,i)}_{α}_{(s',i')}` — real, induced transition prob (§4.4).
    Tr {
        stut_idx: StutterIdx,
        from: ExtendedState,
        action: ActionId,
        to: ExtendedState,
    },
    /// `go_{j}_{(s,i)}_{α}_{(s',i')}` — real, pseudo-Boolean successor flag
    /// (§4.4).
    Go {
        stut_idx: StutterIdx,
        from: ExtendedState,
        action: ActionId,
        to: ExtendedState,
    },
}

fn tuple_name(tuple: &StateTuple) -> String {
    tuple
        .iter()
        .map(|es| es.to_string())
        .collect::<Vec<_>>()
        .join("_")
}

fn action_set_name(set: &BTreeSet<ActionId>) -> String {
    set.iter().map(|a| a.to_string()).collect::<Vec<_>>().join("-")
}

impl VarKey {
    /// The bit-exact name grammar of §6. Prefix determines sort: `h`
    /// (unless `htoi`) is Boolean, everything else real.
    pub fn name(&self) -> String {
        match self {
            VarKey::Holds { subformula, tuple } => format!("holds_{}_{}", tuple_name(tuple), subformula),
            VarKey::Prob { subformula, tuple } => format!("prob_{}_{}", tuple_name(tuple), subformula),
            VarKey::Lfp { subformula, tuple } => format!("d_{}_{}", tuple_name(tuple), subformula),
            VarKey::Htoi { subformula, tuple } => format!("htoi_{}_{}", tuple_name(tuple), subformula),
            VarKey::Sched { action_set, action } => {
                format!("a_{}_{}", action_set_name(action_set), action)
            }
            VarKey::SchedState { state, action } => format!("a_{}_{}", state, action),
            VarKey::Stutter { stut_idx, state, action } => {
                format!("t_{}_{}_{}", stut_idx, state, action)
            }
            VarKey::Tr {
                stut_idx,
                from,
                action,
                to,
            } => format!("Tr_{}_{}_{}_{}", stut_idx, from, action, to),
            VarKey::Go {
                stut_idx,
                from,
                action,
                to,
            } => format!("go_{}_{}_{}_{}", stut_idx, from, action, to),
        }
    }

    pub fn is_boolean_sorted(&self) -> bool {
        matches!(self, VarKey::Holds { .. })
    }
}

/// Owns the solver-term handles for every key allocated during one
/// encoding session.
pub struct Registry<'ctx> {
    ctx: &'ctx Context,
    bools: HashMap<VarKey, Bool<'ctx>>,
    reals: HashMap<VarKey, Real<'ctx>>,
}

impl<'ctx> Registry<'ctx> {
    pub fn new(ctx: &'ctx Context) -> Self {
        Registry {
            ctx,
            bools: HashMap::new(),
            reals: HashMap::new(),
        }
    }

    /// Look up (or lazily create) the Boolean term for `key`. Panics if
    /// `key`'s `VarKind` is not Boolean-sorted — a programming error in the
    /// encoder, never a user-facing condition.
    pub fn bool_var(&mut self, key: VarKey) -> Bool<'ctx> {
        assert!(key.is_boolean_sorted(), "{key:?} is not a boolean variable");
        if let Some(b) = self.bools.get(&key) {
            return b.clone();
        }
        let term = Bool::new_const(self.ctx, key.name());
        self.bools.insert(key, term.clone());
        term
    }

    /// Look up (or lazily create) the real term for `key`.
    pub fn real_var(&mut self, key: VarKey) -> Real<'ctx> {
        assert!(!key.is_boolean_sorted(), "{key:?} is not a real variable");
        if let Some(r) = self.reals.get(&key) {
            return r.clone();
        }
        let term = Real::new_const(self.ctx, key.name());
        self.reals.insert(key, term.clone());
        term
    }

    /// All keys allocated so far of either sort, for the Result Extractor.
    pub fn bool_keys(&self) -> impl Iterator<Item = &VarKey> {
        self.bools.keys()
    }

    pub fn real_keys(&self) -> impl Iterator<Item = &VarKey> {
        self.reals.keys()
    }

    pub fn get_bool_term(&self, key: &VarKey) -> Option<&Bool<'ctx>> {
        self.bools.get(key)
    }

    pub fn get_real_term(&self, key: &VarKey) -> Option<&Real<'ctx>> {
        self.reals.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use z3::Config;

    #[test]
    fn name_prefix_matches_sort_rule() {
        let tuple = vec![ExtendedState::fresh(0)];
        let holds = VarKey::Holds { subformula: 3, tuple: tuple.clone() };
        let prob = VarKey::Prob { subformula: 3, tuple: tuple.clone() };
        let htoi = VarKey::Htoi { subformula: 3, tuple };
        assert!(holds.name().starts_with('h'));
        assert!(holds.is_boolean_sorted());
        assert!(prob.name().starts_with('p'));
        assert!(!prob.is_boolean_sorted());
        assert!(htoi.name().starts_with("htoi"));
        assert!(!htoi.is_boolean_sorted());
    }

    #[test]
    fn repeated_lookup_returns_same_term() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let mut reg = Registry::new(&ctx);
        let key = VarKey::SchedState { state: 0, action: 0 };
        let t1 = reg.real_var(key.clone());
        let t2 = reg.real_var(key);
        assert_eq!(format!("{t1}"), format!("{t2}"));
    }
}
