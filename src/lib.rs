//! A probabilistic hyperproperty model checker.
//!
//! Given a finite-state Markov Decision Process (`Mdp`) and a closed formula
//! in a probabilistic hyperlogic that quantifies jointly over schedulers,
//! states, and stutter-schedulers, this crate decides whether the formula
//! holds by reducing the question to a quantifier-free real-arithmetic SMT
//! query and discharging it with Z3. The answer is accompanied by a witness
//! (scheduler probabilities, stutter durations, satisfying state tuples) or
//! a declaration that the solver could not decide.
//!
//! # Architecture
//!
//! This crate covers the SMT encoding engine only; the concrete grammar
//! parser, the PRISM-language MDP parser, and the command-line front-end are
//! out of scope and consume only the types re-exported here
//! ([`Mdp`], [`Formula`], [`EncoderConfig`], [`ModelChecker`]).
//!
//! The pipeline, leaves first: [`ir`] builds the formula tree, [`index`]
//! assigns every subformula a stable id, [`quantifiers`] validates and
//! strips the quantifier prefix, [`scheduler`] and [`stutter`] introduce the
//! scheduler/stutter-scheduler variables, [`semantics`] recursively emits
//! the constraints binding every subformula's meaning, [`truth`] collapses
//! the outer quantifiers into one quantifier-free term, and [`witness`]
//! reconstructs a human-level answer from the solver's model.
//!
//! **Smart Full Mapping Strategy** (inherited from the encoding style this
//! crate is built on): every auxiliary variable the encoder introduces has
//! exactly one intended sort, and the [`registry`] module enforces this
//! structurally (`VarKey` carries its own sort) rather than by convention on
//! a printed name.

pub mod checker;
pub mod config;
pub mod error;
pub mod extended;
pub mod index;
pub mod ir;
pub mod mdp;
pub mod quantifiers;
pub mod rational;
pub mod registry;
pub mod scheduler;
pub mod semantics;
pub mod solver;
pub mod stutter;
pub mod truth;
pub mod witness;

pub use checker::ModelChecker;
pub use config::EncoderConfig;
pub use error::{CheckError, CheckErrorKind, CheckResult};
pub use extended::{ExtendedState, StateTuple};
pub use ir::{
    arith, atomic_prop, bool_op, compare, const_prob, future, global, next, prob, sched_exists,
    sched_forall, state_quant, stutter_quant, truth as truth_formula, until_bounded,
    until_unbounded, ArithOp, BoolOp, CompareOp, Formula, FormulaNode, Polarity, Rat, StateIdx,
    StutterIdx, TemporalNode,
};
pub use mdp::{ActionId, Mdp, StateId};
pub use rational::Rational;
pub use witness::{CheckOutcome, SchedulerChoice, StutterChoice, Witness};
