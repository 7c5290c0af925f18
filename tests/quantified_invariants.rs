//! Property-based tests for the quantified invariants of §8: subformula id
//! stability, variable sort consistency, and extended-state pinning. The
//! teacher crate has no property tests of its own; this follows the
//! `proptest` strategy-composition style used elsewhere in the retrieved
//! pack for exactly this shape of invariant (a rule that must hold for every
//! tree/tuple the encoder can build, not just a handful of worked examples).

use std::collections::BTreeSet;

use proptest::prelude::*;

use hyperprob::extended::{pin_irrelevant, ExtendedState, StateTuple};
use hyperprob::index::SubformulaIndex;
use hyperprob::registry::VarKey;
use hyperprob::{atomic_prop, bool_op, BoolOp, Formula};

/// A small recursive strategy over closed, quantifier-free formulas built
/// from atomic propositions and Boolean connectives: enough shape to
/// exercise the index's structural-equality deduplication without needing a
/// full IR strategy.
fn small_formula() -> impl Strategy<Value = Formula> {
    let leaf = ("[a-c]", 1u32..=2).prop_map(|(name, idx)| atomic_prop(name, idx));
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| bool_op(BoolOp::And, l, r)),
            (inner.clone(), inner)
                .prop_map(|(l, r)| bool_op(BoolOp::Or, l, r)),
        ]
    })
}

proptest! {
    /// Indexing the same formula twice, via independently-built but
    /// structurally-equal trees, always yields the same id (§4.1).
    #[test]
    fn structurally_equal_formulas_get_the_same_subformula_id(
        f1 in small_formula(),
        f2 in small_formula(),
    ) {
        let mut idx = SubformulaIndex::new();
        let id_a = idx.index(f1.clone());
        let id_b = idx.index(f1);
        prop_assert_eq!(id_a, id_b);

        // distinct trees get distinct ids unless they happen to coincide
        // structurally, in which case they must still share an id.
        let id_c = idx.index(f2.clone());
        let id_d = idx.index(f2);
        prop_assert_eq!(id_c, id_d);
    }

    /// Re-indexing never shrinks or reorders already-assigned ids: once a
    /// subformula has an id, every later `index` call on an equal tree
    /// returns that same id, and the index never shrinks.
    #[test]
    fn reindexing_is_monotone_and_stable(f in small_formula()) {
        let mut idx = SubformulaIndex::new();
        let first = idx.index(f.clone());
        let len_after_first = idx.len();
        let second = idx.index(f);
        prop_assert_eq!(first, second);
        prop_assert_eq!(idx.len(), len_after_first);
    }

    /// §6's name grammar is the only thing the Result Extractor trusts to
    /// recover a variable's sort; this must agree with `is_boolean_sorted`
    /// for every `Holds`/`Prob` key the encoder can construct, for any
    /// subformula id and any extended-state tuple.
    #[test]
    fn holds_and_prob_keys_agree_on_sort(
        subformula in 0usize..50,
        states in prop::collection::vec(0usize..8, 1..4),
        stutters in prop::collection::vec(0u32..4, 1..4),
    ) {
        let len = states.len().min(stutters.len());
        let tuple: StateTuple = states
            .into_iter()
            .zip(stutters)
            .take(len)
            .map(|(s, i)| ExtendedState::new(s, i))
            .collect();

        let holds = VarKey::Holds { subformula, tuple: tuple.clone() };
        let prob = VarKey::Prob { subformula, tuple: tuple.clone() };
        let htoi = VarKey::Htoi { subformula, tuple };

        prop_assert!(holds.is_boolean_sorted());
        prop_assert!(holds.name().starts_with("holds_"));
        prop_assert!(!prob.is_boolean_sorted());
        prop_assert!(prob.name().starts_with("prob_"));
        prop_assert!(!htoi.is_boolean_sorted());
        prop_assert!(htoi.name().starts_with("htoi_"));
    }

    /// Pinning a tuple to a relevant index set is idempotent: pinning an
    /// already-pinned tuple to the same set changes nothing (§4.5).
    #[test]
    fn pinning_irrelevant_coordinates_is_idempotent(
        states in prop::collection::vec((0usize..8, 0u32..4), 1..6),
        relevant in prop::collection::vec(0usize..6, 0..6),
    ) {
        let tuple: StateTuple = states
            .into_iter()
            .map(|(s, i)| ExtendedState::new(s, i))
            .collect();
        let relevant: BTreeSet<usize> = relevant.into_iter().collect();
        let relevant: Vec<usize> = relevant.into_iter().collect();

        let once = pin_irrelevant(&tuple, &relevant);
        let twice = pin_irrelevant(&once, &relevant);
        prop_assert_eq!(once, twice);
    }

    /// Every coordinate outside the relevant set is forced to the canonical
    /// fresh `(0, 0)` extended state, and every coordinate inside it is left
    /// untouched (§4.5).
    #[test]
    fn pinning_only_touches_irrelevant_coordinates(
        states in prop::collection::vec((0usize..8, 0u32..4), 1..6),
        relevant in prop::collection::vec(0usize..6, 0..6),
    ) {
        let tuple: StateTuple = states
            .into_iter()
            .map(|(s, i)| ExtendedState::new(s, i))
            .collect();
        let relevant: Vec<usize> = relevant.into_iter().collect::<BTreeSet<_>>().into_iter().collect();

        let pinned = pin_irrelevant(&tuple, &relevant);
        for (j, (original, kept)) in tuple.iter().zip(pinned.iter()).enumerate() {
            if relevant.contains(&j) {
                prop_assert_eq!(original, kept);
            } else {
                prop_assert_eq!(*kept, ExtendedState::fresh(0));
            }
        }
    }
}
