//! The Subformula Index (§4.1): a structural-equality-deduplicated list of
//! subformulas whose position is the stable "subformula id" used in every
//! variable name the encoder emits.

use crate::ir::{Formula, FormulaNode, TemporalNode};

pub type SubformulaId = usize;

#[derive(Debug, Default)]
pub struct SubformulaIndex {
    entries: Vec<Formula>,
}

impl SubformulaIndex {
    pub fn new() -> Self {
        SubformulaIndex { entries: Vec::new() }
    }

    pub fn get(&self, id: SubformulaId) -> &Formula {
        &self.entries[id]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the id of an already-indexed structurally-equal node, if any.
    fn find(&self, node: &Formula) -> Option<SubformulaId> {
        self.entries.iter().position(|e| e == node)
    }

    /// Insert `node` if not already present, returning its id either way.
    /// Idempotent: re-inserting a structurally-equal node returns the same
    /// id.
    fn intern(&mut self, node: Formula) -> SubformulaId {
        if let Some(id) = self.find(&node) {
            return id;
        }
        self.entries.push(node);
        self.entries.len() - 1
    }

    /// Walk `node` and all transitively reachable compound subformulas,
    /// inserting each. Returns the id of `node` itself.
    ///
    /// A `Reward` node also causes its mirrored `Prob` node (built from the
    /// reward's inner temporal formula) to be indexed, per §4.1/§4.9: reward
    /// nodes carry probability-operator discipline, not distinct semantics.
    pub fn index(&mut self, node: Formula) -> SubformulaId {
        match node.as_ref() {
            FormulaNode::SchedQuant { body, .. } => {
                self.index(body.clone());
            }
            FormulaNode::StateQuant { body, .. } => {
                self.index(body.clone());
            }
            FormulaNode::StutterQuant { body, .. } => {
                self.index(body.clone());
            }
            FormulaNode::True => {}
            FormulaNode::AtomicProp { .. } => {}
            FormulaNode::Not(a) => {
                self.index(a.clone());
            }
            FormulaNode::Bool { left, right, .. } => {
                self.index(left.clone());
                self.index(right.clone());
            }
            FormulaNode::Compare { left, right, .. } => {
                self.index(left.clone());
                self.index(right.clone());
            }
            FormulaNode::ConstProb(_) => {}
            FormulaNode::Arith { left, right, .. } => {
                self.index(left.clone());
                self.index(right.clone());
            }
            FormulaNode::Prob(inner) => {
                self.index_temporal(inner);
            }
            FormulaNode::Reward { inner, .. } => {
                self.index_temporal(inner);
                let mirrored = FormulaNode::Prob(inner.clone()).into_formula();
                self.intern(mirrored);
            }
        }
        self.intern(node)
    }

    fn index_temporal(&mut self, t: &TemporalNode) {
        match t {
            TemporalNode::Next(a) => {
                self.index(a.clone());
            }
            TemporalNode::UntilUnbounded { left, right } => {
                self.index(left.clone());
                self.index(right.clone());
            }
            TemporalNode::UntilBounded { left, right, .. } => {
                self.index(left.clone());
                self.index(right.clone());
            }
            TemporalNode::Future(a) => {
                self.index(a.clone());
            }
            TemporalNode::Global(a) => {
                self.index(a.clone());
            }
        }
    }

    /// Construct a fresh `UntilBounded` node with decremented bounds,
    /// indexing it afresh (§9: no deep-copy of the original subtree, a new
    /// IR node is built and the index grows monotonically).
    pub fn materialize_decremented_until(&mut self, formula: Formula) -> (SubformulaId, Formula) {
        let node = match formula.as_ref() {
            FormulaNode::Prob(t) => match t.as_ref() {
                TemporalNode::UntilBounded { left, k1, k2, right } => {
                    let (nk1, nk2) = if *k1 > 0 { (*k1 - 1, *k2 - 1) } else { (0, *k2 - 1) };
                    crate::ir::prob(crate::ir::until_bounded(left.clone(), nk1, nk2, right.clone()))
                }
                _ => panic!("materialize_decremented_until called on non-UntilBounded node"),
            },
            _ => panic!("materialize_decremented_until called on non-Prob node"),
        };
        let id = self.index(node.clone());
        (id, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::*;

    #[test]
    fn deduplicates_structurally_equal_subformulas() {
        let mut idx = SubformulaIndex::new();
        let p = atomic_prop("end", 1);
        let q = atomic_prop("end", 1);
        let id1 = idx.index(p);
        let id2 = idx.index(q);
        assert_eq!(id1, id2);
    }

    #[test]
    fn indexing_is_idempotent_and_ids_are_stable() {
        let mut idx = SubformulaIndex::new();
        let p = atomic_prop("end", 1);
        let q = atomic_prop("start", 1);
        let formula = bool_op(BoolOp::And, p.clone(), q.clone());
        let top = idx.index(formula.clone());
        let before = idx.len();
        let top_again = idx.index(formula);
        assert_eq!(top, top_again);
        assert_eq!(idx.len(), before);
    }

    #[test]
    fn reward_node_mirrors_onto_prob_node() {
        let mut idx = SubformulaIndex::new();
        let psi = atomic_prop("goal", 1);
        let reward = FormulaNode::Reward {
            name: "steps".to_string(),
            inner: Box::new(future(psi.clone())),
        }
        .into_formula();
        idx.index(reward);
        let mirrored = prob(future(psi));
        assert!(idx.find(&mirrored).is_some());
    }
}
