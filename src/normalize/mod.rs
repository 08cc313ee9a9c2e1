//! Boolean normal forms: simplification, then negation normal form, then
//! conjunctive normal form, each iterated until the printed formula stops
//! changing, and finally decomposition into disjunct sets.
mod clausify;
mod cnf;
mod nnf;
mod simplify;

pub use clausify::DisjunctSet;

use crate::ast::Expr;
use crate::deadline::Deadline;
use crate::util::IndexMap;

/// Turns formulas into clause-shaped disjunct sets for one proof attempt.
///
/// Every disjunct set produced is registered under its printed form, so a
/// clause that is syntactically identical, up to variable renaming, to
/// one produced earlier is recognized and not returned again.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    deadline: Deadline,
    seen: IndexMap<String, usize>,
}

impl Normalizer {
    pub fn new(deadline: Deadline) -> Self {
        Normalizer {
            deadline,
            seen: Default::default(),
        }
    }

    /// Number of distinct clauses registered so far.
    pub fn clause_count(&self) -> usize {
        self.seen.len()
    }

    pub fn has_seen(&self, set: &DisjunctSet) -> bool {
        self.seen.contains_key(&set.key())
    }

    /// Runs `stage` until the printed form is stable. `None` once the
    /// deadline has passed.
    fn fixpoint(&self, expr: Expr, stage: impl Fn(&Expr) -> Expr) -> Option<Expr> {
        let mut current = expr;
        let mut printed = current.to_string();
        loop {
            if self.deadline.is_past() {
                return None;
            }
            let next = stage(&current);
            let next_printed = next.to_string();
            if next_printed == printed {
                return Some(next);
            }
            current = next;
            printed = next_printed;
        }
    }

    /// The CNF of `expr`, or `None` if the deadline passed first.
    pub fn normalize(&self, expr: &Expr) -> Option<Expr> {
        let simplified = self.fixpoint(expr.clone(), simplify::simplify)?;
        let nnf = self.fixpoint(simplified, |e| nnf::nnf(e, false))?;
        let cnf = self.fixpoint(nnf, cnf::cnf)?;
        debug_assert!(cnf::is_cnf(&cnf), "not in CNF: {cnf}");
        Some(cnf)
    }

    /// Clauses of `expr` not produced before by this normalizer. `None` if
    /// the deadline passed; nothing is registered in that case.
    pub fn clauses(&mut self, expr: &Expr) -> Option<Vec<DisjunctSet>> {
        let cnf = self.normalize(expr)?;
        let mut fresh = vec![];
        for set in clausify::decompose(&cnf) {
            let next = self.seen.len();
            let key = set.key();
            if self.seen.contains_key(&key) {
                log::trace!("clause {key} already registered");
                continue;
            }
            self.seen.insert(key, next);
            fresh.push(set);
        }
        Some(fresh)
    }
}
