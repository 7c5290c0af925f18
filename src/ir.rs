//! The Formula IR (§3, §4.1): an immutable tree of hyperlogic nodes.
//!
//! Nodes are reference-counted so the Subformula Index can deduplicate by
//! structural equality without deep-copying subtrees, and so bounded-until
//! recursion can materialize a fresh decremented node cheaply (§9).

use std::rc::Rc;

pub type StateIdx = u32;
pub type StutterIdx = u32;

/// A quantifier polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Forall,
    Exists,
}

/// Boolean/comparison connectives sharing one cases-biconditional encoding
/// pattern (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
    Implies,
    Biconditional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Lt,
    Le,
    Eq,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
}

/// A node of the probabilistic hyperlogic formula tree (§3).
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaNode {
    SchedQuant {
        polarity: Polarity,
        body: Formula,
    },
    StateQuant {
        polarity: Polarity,
        idx: StateIdx,
        body: Formula,
    },
    StutterQuant {
        polarity: Polarity,
        stut_idx: StutterIdx,
        assoc_state_idx: StateIdx,
        body: Formula,
    },

    True,
    AtomicProp {
        name: String,
        stut_idx: StutterIdx,
    },
    Not(Formula),
    Bool {
        op: BoolOp,
        left: Formula,
        right: Formula,
    },
    Compare {
        op: CompareOp,
        left: Formula,
        right: Formula,
    },

    ConstProb(Rat),
    Arith {
        op: ArithOp,
        left: Formula,
        right: Formula,
    },

    Prob(Box<TemporalNode>),
    /// Grammar-accepted but given pass-through semantics (§4.9, §11): the
    /// Subformula Indexer mirrors this onto a `Prob` node over `inner`.
    Reward {
        name: String,
        inner: Box<TemporalNode>,
    },
}

/// A rational literal, kept separate from `crate::rational::Rational` since
/// IR literals only ever need to be printed into a Z3 real constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rat {
    pub num: i64,
    pub den: i64,
}

/// The temporal operators that a `Prob(...)` node wraps.
#[derive(Debug, Clone, PartialEq)]
pub enum TemporalNode {
    Next(Formula),
    UntilUnbounded { left: Formula, right: Formula },
    UntilBounded {
        left: Formula,
        k1: u32,
        k2: u32,
        right: Formula,
    },
    Future(Formula),
    Global(Formula),
}

/// A shared, immutable handle into the Formula IR.
pub type Formula = Rc<FormulaNode>;

impl FormulaNode {
    pub fn into_formula(self) -> Formula {
        Rc::new(self)
    }
}

/// Builder free functions, mirroring the teacher's `VerifyExpr` constructor
/// style (`FormulaNode::and(..)`-shaped calls read like the grammar).
pub fn sched_exists(body: Formula) -> Formula {
    FormulaNode::SchedQuant {
        polarity: Polarity::Exists,
        body,
    }
    .into_formula()
}

pub fn sched_forall(body: Formula) -> Formula {
    FormulaNode::SchedQuant {
        polarity: Polarity::Forall,
        body,
    }
    .into_formula()
}

pub fn state_quant(polarity: Polarity, idx: StateIdx, body: Formula) -> Formula {
    FormulaNode::StateQuant { polarity, idx, body }.into_formula()
}

pub fn stutter_quant(
    polarity: Polarity,
    stut_idx: StutterIdx,
    assoc_state_idx: StateIdx,
    body: Formula,
) -> Formula {
    FormulaNode::StutterQuant {
        polarity,
        stut_idx,
        assoc_state_idx,
        body,
    }
    .into_formula()
}

pub fn atomic_prop(name: impl Into<String>, stut_idx: StutterIdx) -> Formula {
    FormulaNode::AtomicProp {
        name: name.into(),
        stut_idx,
    }
    .into_formula()
}

pub fn truth() -> Formula {
    FormulaNode::True.into_formula()
}

pub fn not(a: Formula) -> Formula {
    FormulaNode::Not(a).into_formula()
}

pub fn bool_op(op: BoolOp, left: Formula, right: Formula) -> Formula {
    FormulaNode::Bool { op, left, right }.into_formula()
}

pub fn compare(op: CompareOp, left: Formula, right: Formula) -> Formula {
    FormulaNode::Compare { op, left, right }.into_formula()
}

pub fn const_prob(num: i64, den: i64) -> Formula {
    FormulaNode::ConstProb(Rat { num, den }).into_formula()
}

pub fn arith(op: ArithOp, left: Formula, right: Formula) -> Formula {
    FormulaNode::Arith { op, left, right }.into_formula()
}

pub fn prob(inner: TemporalNode) -> Formula {
    FormulaNode::Prob(Box::new(inner)).into_formula()
}

pub fn next(a: Formula) -> TemporalNode {
    TemporalNode::Next(a)
}

pub fn until_unbounded(left: Formula, right: Formula) -> TemporalNode {
    TemporalNode::UntilUnbounded { left, right }
}

pub fn until_bounded(left: Formula, k1: u32, k2: u32, right: Formula) -> TemporalNode {
    TemporalNode::UntilBounded { left, k1, k2, right }
}

pub fn future(a: Formula) -> TemporalNode {
    TemporalNode::Future(a)
}

pub fn global(a: Formula) -> TemporalNode {
    TemporalNode::Global(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_small_formula() {
        let p = atomic_prop("end", 1);
        let q = atomic_prop("end", 2);
        let body = compare(CompareOp::Eq, prob(next(p)), prob(next(q)));
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
        assert!(matches!(*formula, FormulaNode::SchedQuant { .. }));
    }

    #[test]
    fn structural_equality_holds_across_separately_built_subtrees() {
        let a = atomic_prop("end", 1);
        let b = atomic_prop("end", 1);
        assert_eq!(a, b);
    }

    #[test]
    fn structural_equality_distinguishes_different_stutter_indices() {
        let a = atomic_prop("end", 1);
        let b = atomic_prop("end", 2);
        assert_ne!(a, b);
    }
}
