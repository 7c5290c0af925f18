//! The Semantic Encoder (§4.5-§4.9): recursive, subformula-directed
//! emission of the constraints binding every `holds_*`/`prob_*` variable to
//! its intended meaning.
//!
//! This is the bulk of the system (§2's budget note). Every public
//! `encode_*` method mirrors one dispatch arm of `semanticencoder.py`'s
//! `encodeSemantics`, kept as separate functions the way the original keeps
//! `encodeNextSemantics`/`encodeUnboundedUntilSemantics`/
//! `encodeBoundedUntilSemantics`/`encodeFutureSemantics`/
//! `encodeGlobalSemantics` separate rather than unified, since each has its
//! own base cases and loop-witness shape.

use std::collections::HashMap;

use z3::ast::{Ast, Bool, Real};
use z3::Context;

use crate::extended::{pin_irrelevant, ExtendedState, StateTuple};
use crate::index::{SubformulaId, SubformulaIndex};
use crate::ir::{ArithOp, BoolOp, CompareOp, Formula, FormulaNode, TemporalNode};
use crate::mdp::Mdp;
use crate::registry::{Registry, VarKey};
use crate::stutter::successors;
use crate::config::EncoderConfig;

/// Drives the recursive semantic encoding of one formula tree.
pub struct SemanticEncoder<'ctx, 'a> {
    ctx: &'ctx Context,
    solver: &'a z3::Solver<'ctx>,
    mdp: &'a Mdp,
    config: &'a EncoderConfig,
    registry: &'a mut Registry<'ctx>,
    index: &'a mut SubformulaIndex,
    num_stutters: usize,
    /// Memoization set of §9: once a subformula id is a key here, its
    /// constraints have been emitted and its relevant quantifier set is
    /// cached, so re-encoding (e.g. a diamond-shaped formula reached via
    /// two parents) is a lookup, not a re-emission.
    relevant: HashMap<SubformulaId, Vec<usize>>,
}

impl<'ctx, 'a> SemanticEncoder<'ctx, 'a> {
    pub fn new(
        ctx: &'ctx Context,
        solver: &'a z3::Solver<'ctx>,
        mdp: &'a Mdp,
        config: &'a EncoderConfig,
        registry: &'a mut Registry<'ctx>,
        index: &'a mut SubformulaIndex,
        num_stutters: usize,
    ) -> Self {
        SemanticEncoder {
            ctx,
            solver,
            mdp,
            config,
            registry,
            index,
            num_stutters,
            relevant: HashMap::new(),
        }
    }

    fn compose(&self, relevant: &[usize]) -> Vec<StateTuple> {
        let k = self.config.stutter_length;
        let mut result = vec![vec![ExtendedState::fresh(0); self.num_stutters]];
        for &j in relevant {
            let mut next = Vec::with_capacity(result.len() * self.mdp.num_states() * k as usize);
            for partial in &result {
                for s in self.mdp.states() {
                    for i in 0..k {
                        let mut t = partial.clone();
                        t[j] = ExtendedState::new(s, i);
                        next.push(t);
                    }
                }
            }
            result = next;
        }
        result
    }

    fn holds(&mut self, id: SubformulaId, tuple: &StateTuple) -> Bool<'ctx> {
        self.registry.bool_var(VarKey::Holds {
            subformula: id,
            tuple: tuple.clone(),
        })
    }

    fn prob(&mut self, id: SubformulaId, tuple: &StateTuple) -> Real<'ctx> {
        self.registry.real_var(VarKey::Prob {
            subformula: id,
            tuple: tuple.clone(),
        })
    }

    fn lfp(&mut self, id: SubformulaId, tuple: &StateTuple) -> Real<'ctx> {
        self.registry.real_var(VarKey::Lfp {
            subformula: id,
            tuple: tuple.clone(),
        })
    }

    fn sched_prob(&mut self, state: usize, action: usize) -> Real<'ctx> {
        self.registry.real_var(VarKey::SchedState { state, action })
    }

    /// Encode `formula` (already present at id `id` in the Subformula
    /// Index), memoized, returning its relevant quantifier set Q(φ).
    pub fn encode(&mut self, id: SubformulaId, formula: &Formula) -> Vec<usize> {
        if let Some(q) = self.relevant.get(&id) {
            return q.clone();
        }
        // Insert a placeholder before recursing so structurally-recursive
        // calls (bounded-until's self-reference through a fresh id) don't
        // loop; the real value is filled in below before any use.
        let q = match formula.as_ref() {
            FormulaNode::True => self.encode_true(id),
            FormulaNode::AtomicProp { name, stut_idx } => self.encode_atomic(id, name, *stut_idx),
            FormulaNode::Not(a) => self.encode_not(id, a),
            FormulaNode::Bool { op, left, right } => self.encode_bool(id, *op, left, right),
            FormulaNode::Compare { op, left, right } => self.encode_compare(id, *op, left, right),
            FormulaNode::ConstProb(r) => self.encode_const_prob(id, *r),
            FormulaNode::Arith { op, left, right } => self.encode_arith(id, *op, left, right),
            FormulaNode::Prob(inner) => self.encode_prob(id, inner),
            FormulaNode::Reward { inner, .. } => self.encode_reward(id, inner),
            FormulaNode::SchedQuant { .. } | FormulaNode::StateQuant { .. } | FormulaNode::StutterQuant { .. } => {
                panic!("encode() must be called on a quantifier-free body; {formula:?} still carries a quantifier")
            }
        };
        self.relevant.insert(id, q.clone());
        q
    }

    fn encode_true(&mut self, id: SubformulaId) -> Vec<usize> {
        let tuple = vec![ExtendedState::fresh(0); self.num_stutters];
        let h = self.holds(id, &tuple);
        self.solver.assert(&h);
        vec![]
    }

    fn encode_atomic(&mut self, id: SubformulaId, name: &str, stut_idx: u32) -> Vec<usize> {
        let j = stut_idx as usize - 1;
        for tuple in self.compose(&[j]) {
            let s = tuple[j].state;
            let label = self.mdp.has_label(s, name);
            let h = self.holds(id, &tuple);
            if label {
                self.solver.assert(&h);
            } else {
                self.solver.assert(&h.not());
            }
        }
        vec![j]
    }

    fn encode_not(&mut self, id: SubformulaId, a: &Formula) -> Vec<usize> {
        let a_id = self.index.index(a.clone());
        let q = self.encode(a_id, a);
        for tuple in self.compose(&q) {
            let h = self.holds(id, &tuple);
            let ha = self.holds(a_id, &tuple);
            solver_assert_xor(self.solver, &h, &ha);
        }
        q
    }

    fn encode_bool(&mut self, id: SubformulaId, op: BoolOp, left: &Formula, right: &Formula) -> Vec<usize> {
        let left_id = self.index.index(left.clone());
        let right_id = self.index.index(right.clone());
        let q1 = self.encode(left_id, left);
        let q2 = self.encode(right_id, right);
        let q = union(&q1, &q2);
        for tuple in self.compose(&q) {
            let h = self.holds(id, &tuple);
            let h1 = self.holds(left_id, &pin_irrelevant(&tuple, &q1));
            let h2 = self.holds(right_id, &pin_irrelevant(&tuple, &q2));
            let truth_table_true = match op {
                BoolOp::And => Bool::and(self.ctx, &[&h1, &h2]),
                BoolOp::Or => Bool::or(self.ctx, &[&h1, &h2]),
                BoolOp::Implies => h1.implies(&h2),
                BoolOp::Biconditional => h1.iff(&h2),
            };
            // holds <-> truth_table_true, assembled as a biconditional
            // by-cases the way the source builds every Boolean node.
            solver_assert_iff(self.solver, self.ctx, &h, &truth_table_true);
        }
        q
    }

    fn encode_compare(&mut self, id: SubformulaId, op: CompareOp, left: &Formula, right: &Formula) -> Vec<usize> {
        let left_id = self.index.index(left.clone());
        let right_id = self.index.index(right.clone());
        let q1 = self.encode(left_id, left);
        let q2 = self.encode(right_id, right);
        let q = union(&q1, &q2);
        for tuple in self.compose(&q) {
            let h = self.holds(id, &tuple);
            let p1 = self.prob(left_id, &pin_irrelevant(&tuple, &q1));
            let p2 = self.prob(right_id, &pin_irrelevant(&tuple, &q2));
            let rel = match op {
                CompareOp::Lt => p1.lt(&p2),
                CompareOp::Le => p1.le(&p2),
                CompareOp::Eq => p1._eq(&p2),
                CompareOp::Gt => p1.gt(&p2),
                CompareOp::Ge => p1.ge(&p2),
            };
            solver_assert_iff(self.solver, self.ctx, &h, &rel);
        }
        q
    }

    fn encode_const_prob(&mut self, id: SubformulaId, r: crate::ir::Rat) -> Vec<usize> {
        let tuple = vec![ExtendedState::fresh(0); self.num_stutters];
        let p = self.prob(id, &tuple);
        let val = Real::from_real(self.ctx, r.num as i32, r.den as i32);
        self.solver.assert(&p._eq(&val));
        vec![]
    }

    fn encode_arith(&mut self, id: SubformulaId, op: ArithOp, left: &Formula, right: &Formula) -> Vec<usize> {
        let left_id = self.index.index(left.clone());
        let right_id = self.index.index(right.clone());
        let q1 = self.encode(left_id, left);
        let q2 = self.encode(right_id, right);
        let q = union(&q1, &q2);
        for tuple in self.compose(&q) {
            let p = self.prob(id, &tuple);
            let p1 = self.prob(left_id, &pin_irrelevant(&tuple, &q1));
            let p2 = self.prob(right_id, &pin_irrelevant(&tuple, &q2));
            let rhs = match op {
                ArithOp::Add => Real::add(self.ctx, &[&p1, &p2]),
                ArithOp::Sub => Real::sub(self.ctx, &[&p1, &p2]),
                ArithOp::Mul => Real::mul(self.ctx, &[&p1, &p2]),
            };
            self.solver.assert(&p._eq(&rhs));
        }
        q
    }

    fn encode_prob(&mut self, id: SubformulaId, inner: &TemporalNode) -> Vec<usize> {
        match inner {
            TemporalNode::Next(psi) => self.encode_next(id, psi),
            TemporalNode::UntilUnbounded { left, right } => self.encode_until_unbounded(id, left, right),
            TemporalNode::UntilBounded { left, k1, k2, right } => {
                self.encode_until_bounded(id, left, *k1, *k2, right)
            }
            TemporalNode::Future(psi) => self.encode_future(id, psi),
            TemporalNode::Global(psi) => self.encode_global(id, psi),
        }
    }

    /// Reward nodes are accepted syntax given probability-operator
    /// discipline, not distinct accumulation semantics (§4.9, §11): this
    /// passes straight through to the mirrored `Prob` node the Subformula
    /// Indexer already inserted.
    fn encode_reward(&mut self, id: SubformulaId, inner: &TemporalNode) -> Vec<usize> {
        let mirrored = FormulaNode::Prob(Box::new(inner.clone())).into_formula();
        let mirrored_id = self.index.index(mirrored.clone());
        let q = self.encode(mirrored_id, &mirrored);
        for tuple in self.compose(&q) {
            let h = self.holds(id, &tuple);
            let hm = self.holds(mirrored_id, &tuple);
            solver_assert_iff(self.solver, self.ctx, &h, &hm);
        }
        q
    }

    fn encode_next(&mut self, id: SubformulaId, psi: &Formula) -> Vec<usize> {
        let psi_id = self.index.index(psi.clone());
        let q = self.encode(psi_id, psi);

        for tuple in self.compose(&q) {
            let p = self.prob(id, &tuple);
            let sum = self.next_sum(psi_id, &q, &tuple);
            self.solver.assert(&p._eq(&sum));
        }
        q
    }

    /// Σ over action-tuples × successor-tuples (restricted to `q`) of
    /// scheduler-prob × `Tr` × `htoi_successor` (§4.7). Shared by Next and
    /// by the inductive case of every reachability operator, which sums the
    /// same way but over `prob_successor_target` instead of `htoi`.
    fn next_sum(&mut self, target_id: SubformulaId, q: &[usize], tuple: &StateTuple) -> Real<'ctx> {
        self.weighted_sum(q, tuple, |enc, succ_tuple| {
            let htoi_succ = enc.registry.real_var(VarKey::Htoi {
                subformula: target_id,
                tuple: pin_irrelevant(succ_tuple, q),
            });
            // holdsToInt mirror, defined once per (target_id, tuple).
            let h = enc.holds(target_id, &pin_irrelevant(succ_tuple, q));
            let one = Real::from_real(enc.ctx, 1, 1);
            let zero = Real::from_real(enc.ctx, 0, 1);
            enc.solver.assert(&Bool::or(
                enc.ctx,
                &[
                    &Bool::and(enc.ctx, &[&htoi_succ._eq(&one), &h]),
                    &Bool::and(enc.ctx, &[&htoi_succ._eq(&zero), &h.not()]),
                ],
            ));
            htoi_succ
        })
    }

    /// Σ over action-tuples × successor-tuples (restricted to `q`) of
    /// scheduler-prob × `Tr` × `prob_successor_phi` — the inductive sum
    /// shared by unbounded/bounded until, future, and global.
    fn recursive_prob_sum(&mut self, phi_id: SubformulaId, q: &[usize], tuple: &StateTuple) -> Real<'ctx> {
        self.weighted_sum(q, tuple, |enc, succ_tuple| enc.prob(phi_id, succ_tuple))
    }

    fn weighted_sum(
        &mut self,
        q: &[usize],
        tuple: &StateTuple,
        mut tail: impl FnMut(&mut Self, &StateTuple) -> Real<'ctx>,
    ) -> Real<'ctx> {
        let mut action_choices: Vec<Vec<usize>> = vec![vec![]];
        for &j in q {
            let s = tuple[j].state;
            let mut next = Vec::new();
            for partial in &action_choices {
                for alpha in self.mdp.actions(s) {
                    let mut c = partial.clone();
                    c.push(alpha);
                    next.push(c);
                }
            }
            action_choices = next;
        }

        let mut terms: Vec<Real<'ctx>> = Vec::new();
        for ca in &action_choices {
            let mut successor_choices: Vec<Vec<crate::stutter::SuccessorCandidate>> = vec![vec![]];
            for (k, &j) in q.iter().enumerate() {
                let cands = successors(self.mdp, self.config, (j + 1) as u32, tuple[j], ca[k]);
                let mut next = Vec::new();
                for partial in &successor_choices {
                    for c in &cands {
                        let mut v = partial.clone();
                        v.push(*c);
                        next.push(v);
                    }
                }
                successor_choices = next;
            }

            for cs in &successor_choices {
                let mut factors: Vec<Real<'ctx>> = Vec::new();
                let mut succ_tuple = tuple.clone();
                for (k, &j) in q.iter().enumerate() {
                    let s = tuple[j].state;
                    let alpha = ca[k];
                    factors.push(self.sched_prob(s, alpha));
                    factors.push(self.registry.real_var(cs[k].go.clone()));
                    factors.push(self.registry.real_var(cs[k].tr.clone()));
                    succ_tuple[j] = cs[k].to;
                }
                let tail_term = tail(self, &succ_tuple);
                factors.push(tail_term);
                let refs: Vec<&Real<'ctx>> = factors.iter().collect();
                terms.push(Real::mul(self.ctx, &refs));
            }
        }
        if terms.is_empty() {
            Real::from_real(self.ctx, 0, 1)
        } else {
            let refs: Vec<&Real<'ctx>> = terms.iter().collect();
            Real::add(self.ctx, &refs)
        }
    }

    fn encode_until_unbounded(&mut self, id: SubformulaId, left: &Formula, right: &Formula) -> Vec<usize> {
        let left_id = self.index.index(left.clone());
        let right_id = self.index.index(right.clone());
        let q1 = self.encode(left_id, left);
        let q2 = self.encode(right_id, right);
        let q = union(&q1, &q2);

        for tuple in self.compose(&q) {
            let h1 = self.holds(left_id, &pin_irrelevant(&tuple, &q1));
            let h2 = self.holds(right_id, &pin_irrelevant(&tuple, &q2));
            let p = self.prob(id, &tuple);
            let one = Real::from_real(self.ctx, 1, 1);
            let zero = Real::from_real(self.ctx, 0, 1);
            self.solver.assert(&h2.implies(&p._eq(&one)));
            self.solver
                .assert(&Bool::and(self.ctx, &[&h1.not(), &h2.not()]).implies(&p._eq(&zero)));

            let sum = self.recursive_prob_sum(id, &q, &tuple);
            let loop_clause = self.loop_witness(right_id, &q, &tuple, true);
            let inductive = Bool::and(
                self.ctx,
                &[&p._eq(&sum), &p.gt(&zero).implies(&loop_clause)],
            );
            self.solver
                .assert(&Bool::and(self.ctx, &[&h1, &h2.not()]).implies(&inductive));
        }
        q
    }

    fn encode_future(&mut self, id: SubformulaId, psi: &Formula) -> Vec<usize> {
        let psi_id = self.index.index(psi.clone());
        let q = self.encode(psi_id, psi);

        for tuple in self.compose(&q) {
            let h = self.holds(psi_id, &tuple);
            let p = self.prob(id, &tuple);
            let one = Real::from_real(self.ctx, 1, 1);
            let zero = Real::from_real(self.ctx, 0, 1);
            self.solver.assert(&h.implies(&p._eq(&one)));

            let sum = self.recursive_prob_sum(id, &q, &tuple);
            let loop_clause = self.loop_witness(psi_id, &q, &tuple, true);
            let inductive = Bool::and(self.ctx, &[&p._eq(&sum), &p.gt(&zero).implies(&loop_clause)]);
            self.solver.assert(&h.not().implies(&inductive));
        }
        q
    }

    fn encode_global(&mut self, id: SubformulaId, psi: &Formula) -> Vec<usize> {
        let psi_id = self.index.index(psi.clone());
        let q = self.encode(psi_id, psi);

        for tuple in self.compose(&q) {
            let h = self.holds(psi_id, &tuple);
            let p = self.prob(id, &tuple);
            let one = Real::from_real(self.ctx, 1, 1);
            let zero = Real::from_real(self.ctx, 0, 1);
            self.solver.assert(&h.not().implies(&p._eq(&zero)));

            let sum = self.recursive_prob_sum(id, &q, &tuple);
            let loop_clause = self.loop_witness(psi_id, &q, &tuple, false);
            let inductive = Bool::and(self.ctx, &[&p._eq(&sum), &p.lt(&one).implies(&loop_clause)]);
            self.solver.assert(&h.implies(&inductive));
        }
        q
    }

    /// The LFP witness clause of §4.8/§9: `∃ (ca,cs) · (Π scheduler probs >
    /// 0) ∧ (target_holds_at_succ[_negated] ∨ d_tuple > d_succ)`. Ruling
    /// this disjunction out for every positive-probability path would mean
    /// the probability equation is satisfied purely by a self-loop with no
    /// real progress toward (or away from, when `negate_target` is false)
    /// `target_id`; demanding a strict `d`-descent along some
    /// scheduler-supported successor forbids that spurious solution.
    fn loop_witness(
        &mut self,
        target_id: SubformulaId,
        q: &[usize],
        tuple: &StateTuple,
        negate_target: bool,
    ) -> Bool<'ctx> {
        let mut action_choices: Vec<Vec<usize>> = vec![vec![]];
        for &j in q {
            let s = tuple[j].state;
            let mut next = Vec::new();
            for partial in &action_choices {
                for alpha in self.mdp.actions(s) {
                    let mut c = partial.clone();
                    c.push(alpha);
                    next.push(c);
                }
            }
            action_choices = next;
        }

        let d_here = self.lfp(target_id, tuple);
        let mut disjuncts: Vec<Bool<'ctx>> = Vec::new();
        for ca in &action_choices {
            let mut successor_choices: Vec<Vec<crate::stutter::SuccessorCandidate>> = vec![vec![]];
            for (k, &j) in q.iter().enumerate() {
                let cands = successors(self.mdp, self.config, (j + 1) as u32, tuple[j], ca[k]);
                let mut next = Vec::new();
                for partial in &successor_choices {
                    for c in &cands {
                        let mut v = partial.clone();
                        v.push(*c);
                        next.push(v);
                    }
                }
                successor_choices = next;
            }
            for cs in &successor_choices {
                let mut prod_terms: Vec<Real<'ctx>> = Vec::new();
                let mut succ_tuple = tuple.clone();
                for (k, &j) in q.iter().enumerate() {
                    let s = tuple[j].state;
                    let alpha = ca[k];
                    prod_terms.push(self.sched_prob(s, alpha));
                    prod_terms.push(self.registry.real_var(cs[k].go.clone()));
                    succ_tuple[j] = cs[k].to;
                }
                let refs: Vec<&Real<'ctx>> = prod_terms.iter().collect();
                let prod = Real::mul(self.ctx, &refs);
                let zero = Real::from_real(self.ctx, 0, 1);
                let positive = prod.gt(&zero);

                let h_succ = self.holds(target_id, &pin_irrelevant(&succ_tuple, q));
                let d_succ = self.lfp(target_id, &pin_irrelevant(&succ_tuple, q));
                let progress = d_here.gt(&d_succ);
                let target_clause = if negate_target {
                    Bool::or(self.ctx, &[&h_succ, &progress])
                } else {
                    Bool::or(self.ctx, &[&h_succ.not(), &progress])
                };
                disjuncts.push(Bool::and(self.ctx, &[&positive, &target_clause]));
            }
        }
        if disjuncts.is_empty() {
            Bool::from_bool(self.ctx, false)
        } else {
            let refs: Vec<&Bool<'ctx>> = disjuncts.iter().collect();
            Bool::or(self.ctx, &refs)
        }
    }

    fn encode_until_bounded(
        &mut self,
        id: SubformulaId,
        left: &Formula,
        k1: u32,
        k2: u32,
        right: &Formula,
    ) -> Vec<usize> {
        let left_id = self.index.index(left.clone());
        let right_id = self.index.index(right.clone());
        let q1 = self.encode(left_id, left);
        let q2 = self.encode(right_id, right);
        let q = union(&q1, &q2);

        if k2 == 0 {
            for tuple in self.compose(&q) {
                let h2 = self.holds(right_id, &pin_irrelevant(&tuple, &q2));
                let p = self.prob(id, &tuple);
                let one = Real::from_real(self.ctx, 1, 1);
                let zero = Real::from_real(self.ctx, 0, 1);
                self.solver.assert(&h2.implies(&p._eq(&one)));
                self.solver.assert(&h2.not().implies(&p._eq(&zero)));
            }
            return q;
        }

        let full = crate::ir::prob(crate::ir::until_bounded(left.clone(), k1, k2, right.clone()));
        let (next_id, next_formula) = self.index.materialize_decremented_until(full);
        self.encode(next_id, &next_formula);

        for tuple in self.compose(&q) {
            let h1 = self.holds(left_id, &pin_irrelevant(&tuple, &q1));
            let h2 = self.holds(right_id, &pin_irrelevant(&tuple, &q2));
            let p = self.prob(id, &tuple);
            let one = Real::from_real(self.ctx, 1, 1);
            let zero = Real::from_real(self.ctx, 0, 1);
            let sum = self.recursive_prob_sum(next_id, &q, &tuple);

            if k1 == 0 {
                self.solver.assert(&h2.implies(&p._eq(&one)));
                self.solver
                    .assert(&Bool::and(self.ctx, &[&h1.not(), &h2.not()]).implies(&p._eq(&zero)));
                self.solver
                    .assert(&Bool::and(self.ctx, &[&h1, &h2.not()]).implies(&p._eq(&sum)));
            } else {
                self.solver.assert(&h1.not().implies(&p._eq(&zero)));
                self.solver.assert(&h1.implies(&p._eq(&sum)));
            }
        }
        q
    }
}

fn union(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = a.to_vec();
    for &x in b {
        if !out.contains(&x) {
            out.push(x);
        }
    }
    out.sort_unstable();
    out
}

fn solver_assert_xor<'ctx>(solver: &z3::Solver<'ctx>, a: &Bool<'ctx>, b: &Bool<'ctx>) {
    solver.assert(&a.xor(b));
}

/// Assert `lhs <-> rhs` via the cases-biconditional pattern used throughout
/// the source: `(lhs ∧ rhs) ∨ (¬lhs ∧ ¬rhs)`.
fn solver_assert_iff<'ctx>(solver: &z3::Solver<'ctx>, ctx: &'ctx Context, lhs: &Bool<'ctx>, rhs: &Bool<'ctx>) {
    let first = Bool::and(ctx, &[lhs, rhs]);
    let second = Bool::and(ctx, &[&lhs.not(), &rhs.not()]);
    solver.assert(&Bool::or(ctx, &[&first, &second]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncoderConfig;
    use crate::ir::*;
    use crate::rational::Rational;
    use crate::scheduler::encode_scheduler;
    use crate::stutter::encode_stutter;
    use std::collections::{BTreeMap, BTreeSet};
    use z3::{Config, SatResult, Solver};

    fn coin_mdp() -> Mdp {
        // s0 --a--> {s1: 1/2, s2: 1/2}; s1, s2 absorbing, s2 labeled "end".
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

        let mut l2 = BTreeSet::new();
        l2.insert("end".to_string());

        Mdp::new(3, vec![a0, a1, a2], vec![BTreeSet::new(), BTreeSet::new(), l2]).unwrap()
    }

    #[test]
    fn atomic_proposition_holds_matches_labeling() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);
        let mdp = coin_mdp();
        let config = EncoderConfig::default();
        let mut registry = Registry::new(&ctx);
        let mut index = SubformulaIndex::new();

        let formula = atomic_prop("end", 1);
        let id = index.index(formula.clone());
        let mut enc = SemanticEncoder::new(&ctx, &solver, &mdp, &config, &mut registry, &mut index, 1);
        enc.encode(id, &formula);

        assert_eq!(solver.check(), SatResult::Sat);
    }

    #[test]
    fn next_probability_matches_expected_value() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);
        let mdp = coin_mdp();
        let config = EncoderConfig::default();
        let mut registry = Registry::new(&ctx);
        let mut index = SubformulaIndex::new();

        encode_scheduler(&ctx, &solver, &mdp, &config, &mut registry);
        encode_stutter(&ctx, &solver, &mdp, &config, 1, &mut registry);

        let psi = atomic_prop("end", 1);
        let formula = prob(next(psi));
        let id = index.index(formula.clone());
        let mut enc = SemanticEncoder::new(&ctx, &solver, &mdp, &config, &mut registry, &mut index, 1);
        enc.encode(id, &formula);

        // At extended state (0,0), P(X end) should be forced to 1/2.
        let tuple = vec![ExtendedState::fresh(0)];
        let p = registry.real_var(VarKey::Prob { subformula: id, tuple });
        let half = Real::from_real(&ctx, 1, 2);
        let check = Solver::new(&ctx);
        for a in solver.get_assertions() {
            check.assert(&a);
        }
        check.assert(&p._eq(&half));
        assert_eq!(check.check(), SatResult::Sat);

        let check_ne = Solver::new(&ctx);
        for a in solver.get_assertions() {
            check_ne.assert(&a);
        }
        let third = Real::from_real(&ctx, 1, 3);
        check_ne.assert(&p._eq(&third));
        assert_eq!(check_ne.check(), SatResult::Unsat);
    }
}
