//! Congruence closure over the flattened term store.
//!
//! Formulas are interned bottom-up: every application becomes a
//! [`FlatTerm`] whose slots are union-find roots, and whose value is a
//! fresh constant (or variable) id. Asserting a formula merges its value
//! with `true`. Each merge relocates the terms mentioning the absorbed id,
//! which is where congruences are discovered, and re-evaluates the boolean
//! builtins among them. Merging `true` with `false` refutes the whole set
//! of assertions.
use smallvec::SmallVec;

use crate::ast::{Expr, Op, Sort, Symbol};
use crate::clause::Clause;
use crate::deadline::Deadline;
use crate::ids::{Id, TermId};
use crate::report::ProofLog;
use crate::root_map::RootMap;
use crate::symbols::{SymbolTable, Usage};
use crate::term::FlatTerm;
use crate::unionfind::{Priority, Union, UnionFind};
use crate::util::{IndexMap, IndexSet};
use crate::Error;

/// Binding of quantified variables to class roots.
pub type Subst = IndexMap<Symbol, Id>;

/// Ids of the builtin operators, interned up front.
#[derive(Debug, Clone, Copy)]
struct Builtins {
    and: Id,
    or: Id,
    not: Id,
    eq: Id,
}

#[derive(Debug, Clone)]
pub struct CongruenceClosure {
    symbols: SymbolTable,
    unionfind: UnionFind,
    roots: RootMap,
    builtins: Builtins,
    deadline: Deadline,
    evaluates_to_false: bool,
    timed_out: bool,
    log: ProofLog,
}

impl Default for CongruenceClosure {
    fn default() -> Self {
        Self::new(Deadline::never())
    }
}

impl CongruenceClosure {
    pub fn new(deadline: Deadline) -> Self {
        let mut symbols = SymbolTable::new();
        let builtins = Builtins {
            and: symbols.intern_op(Op::And, 2),
            or: symbols.intern_op(Op::Or, 2),
            not: symbols.intern_op(Op::Not, 1),
            eq: symbols.intern_op(Op::Eq, 2),
        };
        let unionfind = UnionFind::with_distinct(symbols.true_id(), symbols.false_id());
        let mut closure = CongruenceClosure {
            symbols,
            unionfind,
            roots: Default::default(),
            builtins,
            deadline,
            evaluates_to_false: false,
            timed_out: false,
            log: ProofLog::default(),
        };
        closure.sync_unionfind();
        closure
    }

    pub fn with_proof_log(mut self, enabled: bool) -> Self {
        self.log = ProofLog::new(enabled);
        self
    }

    pub fn true_id(&self) -> Id {
        self.symbols.true_id()
    }

    pub fn false_id(&self) -> Id {
        self.symbols.false_id()
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn roots(&self) -> &RootMap {
        &self.roots
    }

    /// Set once `true` and `false` have been merged. Never cleared.
    pub fn evaluates_to_false(&self) -> bool {
        self.evaluates_to_false
    }

    /// Set once some operation was cut short by the deadline.
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn n_merges(&self) -> usize {
        self.unionfind.n_unions()
    }

    pub fn log(&self) -> &ProofLog {
        &self.log
    }

    /// Appends a line to the proof log.
    pub fn note(&mut self, line: impl FnOnce() -> String) {
        self.log.push(line);
    }

    pub fn take_log(&mut self) -> ProofLog {
        let enabled = self.log.is_enabled();
        std::mem::replace(&mut self.log, ProofLog::new(enabled))
    }

    pub fn find(&mut self, id: Id) -> Id {
        self.unionfind.find(id)
    }

    pub fn find_naive(&self, id: Id) -> Id {
        self.unionfind.find_naive(id)
    }

    /// Root of the class containing the constant `name`.
    pub fn root_of_name(&self, name: &str) -> Result<Id, Error> {
        self.symbols
            .lookup(Symbol::from(name))
            .map(|id| self.find_naive(id))
            .ok_or_else(|| Error::UnknownSymbol(name.to_string()))
    }

    /// Gives every symbol interned since the last call its union-find set,
    /// so symbol ids and union-find ids stay the same numbers.
    fn sync_unionfind(&mut self) {
        while self.unionfind.len() < self.symbols.len() {
            let info = self.symbols.get(Id::from_usize(self.unionfind.len()));
            let priority = Priority {
                internal: info.is_internal,
                variable: info.usage == Usage::Variable,
            };
            let id = self.unionfind.make_set_with(priority);
            debug_assert_eq!(id, info.id);
        }
    }

    fn stopped(&mut self) -> bool {
        self.evaluates_to_false || self.deadline_passed()
    }

    fn deadline_passed(&mut self) -> bool {
        if self.deadline.is_past() {
            self.timed_out = true;
        }
        self.timed_out
    }

    /// Asserts a boolean formula.
    pub fn add_expression(&mut self, expr: &Expr) -> Result<(), Error> {
        expr.check_well_formed()?;
        self.assert_formula(expr)
    }

    fn assert_formula(&mut self, expr: &Expr) -> Result<(), Error> {
        if self.stopped() {
            return Ok(());
        }
        if let Some((a, b)) = expr.binary(Op::And) {
            self.assert_formula(a)?;
            return self.assert_formula(b);
        }
        if let Some((a, b)) = expr.binary(Op::Eq) {
            let left = self.formula_root(a, &Subst::default())?;
            let right = self.formula_root(b, &Subst::default())?;
            self.merge(left, right);
            return Ok(());
        }
        match expr {
            Expr::Bool(true) => {}
            Expr::Bool(false) => self.merge(self.true_id(), self.false_id()),
            _ => {
                let root = self.formula_root(expr, &Subst::default())?;
                self.merge(root, self.true_id());
            }
        }
        Ok(())
    }

    /// Interns `expr` and returns the root of its value.
    pub fn add_formula(&mut self, expr: &Expr) -> Result<Id, Error> {
        self.add_formula_with(expr, &Subst::default())
    }

    /// Like [`Self::add_formula`], resolving bound quantified variables
    /// through `bindings`.
    pub fn add_formula_with(&mut self, expr: &Expr, bindings: &Subst) -> Result<Id, Error> {
        expr.check_well_formed()?;
        self.formula_root(expr, bindings)
    }

    /// Root of the value of `expr`, interning whatever is missing. Once the
    /// deadline has passed nothing is interned: a formula already stored
    /// resolves to its root and anything else to the wildcard id.
    fn formula_root(&mut self, expr: &Expr, bindings: &Subst) -> Result<Id, Error> {
        if self.deadline_passed() {
            return Ok(self.lookup_formula(expr, bindings).unwrap_or(Id::WILDCARD));
        }
        if let Some(lowered) = lower(expr)? {
            return self.formula_root(&lowered, bindings);
        }
        let id = match expr {
            Expr::Bool(true) => self.true_id(),
            Expr::Bool(false) => self.false_id(),
            Expr::Var {
                name,
                quantified: true,
                ..
            } if bindings.contains_key(name) => bindings[name],
            Expr::Var {
                name,
                sort,
                quantified,
            } => self.intern_var(*name, *sort, *quantified),
            Expr::App { op, args, sort } => {
                let mut arg_roots: SmallVec<[Id; 4]> = SmallVec::new();
                for arg in args {
                    arg_roots.push(self.formula_root(arg, bindings)?);
                }
                let op_id = self.symbols.intern_op(*op, args.len());
                self.sync_unionfind();
                // interning a later argument may have merged an earlier one
                let op_root = self.unionfind.find(op_id);
                let mut term = FlatTerm::new(
                    op_root,
                    arg_roots.iter().map(|&a| self.unionfind.find(a)),
                );
                term.canonicalize(self.symbols.is_commutative(op_root));
                match self.roots.get(&term) {
                    Some(root) => root,
                    None => self.insert_term(term, *sort),
                }
            }
        };
        Ok(self.unionfind.find(id))
    }

    /// Root of an already stored formula, without interning anything.
    fn lookup_formula(&self, expr: &Expr, bindings: &Subst) -> Option<Id> {
        if let Some(lowered) = lower(expr).ok().flatten() {
            return self.lookup_formula(&lowered, bindings);
        }
        let id = match expr {
            Expr::Bool(true) => self.true_id(),
            Expr::Bool(false) => self.false_id(),
            Expr::Var {
                name,
                quantified: true,
                ..
            } if bindings.contains_key(name) => bindings[name],
            Expr::Var {
                name, quantified, ..
            } => self.symbols.lookup(var_symbol(*name, *quantified))?,
            Expr::App { op, args, .. } => {
                let arg_roots = args
                    .iter()
                    .map(|arg| self.lookup_formula(arg, bindings))
                    .collect::<Option<SmallVec<[Id; 4]>>>()?;
                let op_root = self.find_naive(self.symbols.lookup_op(*op)?);
                let mut term = FlatTerm::new(op_root, arg_roots);
                term.canonicalize(self.symbols.is_commutative(op_root));
                self.roots.get(&term)?
            }
        };
        Some(self.find_naive(id))
    }

    fn intern_var(&mut self, name: Symbol, sort: Sort, quantified: bool) -> Id {
        let sort_id = self.symbols.intern_sort(sort);
        let usage = if quantified {
            Usage::Variable
        } else {
            Usage::Constant
        };
        let id = self
            .symbols
            .intern_with(var_symbol(name, quantified), usage, 0, Some(sort_id));
        self.sync_unionfind();
        id
    }

    /// Stores a term not seen before under a fresh id, which is a variable
    /// exactly when some argument is.
    fn insert_term(&mut self, term: FlatTerm, sort: Sort) -> Id {
        let fresh = if term.args().iter().any(|&a| self.symbols.is_variable(a)) {
            self.symbols.make_fresh_variable(sort)
        } else {
            self.symbols.make_fresh_constant(sort)
        };
        self.sync_unionfind();
        log::trace!("{} := {}", self.symbols.name(fresh), term.to_string_with(&self.symbols));
        let t = self.roots.insert(term, fresh);
        let mut pending = vec![];
        self.propagate_builtin(t, &mut pending);
        self.run(&mut pending);
        fresh
    }

    /// Merges the classes of `a` and `b` and everything that follows by
    /// congruence.
    pub fn merge(&mut self, a: Id, b: Id) {
        let mut pending = vec![(a, b)];
        self.run(&mut pending);
    }

    fn run(&mut self, pending: &mut Vec<(Id, Id)>) {
        while let Some((a, b)) = pending.pop() {
            if self.stopped() {
                pending.clear();
                return;
            }
            match self.unionfind.union(a, b) {
                Union::Same(_) => {}
                Union::Contradiction => {
                    log::debug!("contradiction after {} merges", self.unionfind.n_unions());
                    let (symbols, roots) = (&self.symbols, &self.roots);
                    self.log.push(|| {
                        format!(
                            "contradiction: {} = {}",
                            describe(symbols, roots, a),
                            describe(symbols, roots, b)
                        )
                    });
                    self.evaluates_to_false = true;
                    pending.clear();
                }
                Union::Merged { parent, child } => {
                    log::trace!("merge {child} into {parent}");
                    let (symbols, roots) = (&self.symbols, &self.roots);
                    self.log.push(|| {
                        format!(
                            "{} = {}",
                            describe(symbols, roots, child),
                            describe(symbols, roots, parent)
                        )
                    });
                    self.merge_only_argument_operators(parent, child, pending);
                }
            }
        }
    }

    /// Re-establishes the root invariant after `child` was attached below
    /// `parent`.
    ///
    /// Terms valued `child` are revalued `parent`. Terms mentioning `child`
    /// are taken out, rewritten, re-canonicalized and looked up again; if the
    /// rewritten term is already stored under another value, the two values
    /// are congruent and their merge is queued instead of reinserting the
    /// term. Affected terms then get their builtin rules re-run.
    fn merge_only_argument_operators(
        &mut self,
        parent: Id,
        child: Id,
        pending: &mut Vec<(Id, Id)>,
    ) {
        let revalued = self.roots.terms_with_root(child);
        let mentioning = self.roots.terms_mentioning(child);

        for &t in &revalued {
            self.roots.set_root(t, parent);
        }
        let mut touched = revalued;
        for t in mentioning {
            if !self.roots.is_live(t) {
                continue;
            }
            let (mut term, root) = self.roots.remove(t);
            term.replace(child, parent);
            term.canonicalize(self.symbols.is_commutative(term.op()));
            match self.roots.lookup(&term) {
                Some(existing) => {
                    let other = self.roots.root_of(existing);
                    if other != root {
                        log::trace!("congruent: {term} is both {other} and {root}");
                        pending.push((other, root));
                    }
                    touched.push(existing);
                }
                None => touched.push(self.roots.insert(term, root)),
            }
        }

        for t in touched {
            if self.roots.is_live(t) {
                self.propagate_builtin(t, pending);
            }
        }
    }

    fn builtin(&self, op: Id) -> Option<Op> {
        let b = self.builtins;
        [(b.and, Op::And), (b.or, Op::Or), (b.not, Op::Not), (b.eq, Op::Eq)]
            .into_iter()
            .find(|&(id, _)| self.find_naive(id) == op)
            .map(|(_, op)| op)
    }

    /// Queues the merges implied by the truth values known around a stored
    /// `and`, `or`, `not` or `=` term.
    fn propagate_builtin(&self, t: TermId, pending: &mut Vec<(Id, Id)>) {
        let term = self.roots.term(t);
        let Some(op) = self.builtin(term.op()) else {
            return;
        };
        let root = self.roots.root_of(t);
        let tt = self.find_naive(self.true_id());
        let ff = self.find_naive(self.false_id());
        let value = |id: Id| {
            if id == tt {
                Some(true)
            } else if id == ff {
                Some(false)
            } else {
                None
            }
        };
        let of = |b: bool| if b { tt } else { ff };

        match (op, term.args()) {
            (Op::Not, &[a]) => match (value(root), value(a)) {
                (Some(r), _) => pending.push((a, of(!r))),
                (None, Some(v)) => pending.push((root, of(!v))),
                (None, None) => {}
            },
            // `unit` is the value that, held by the term, forces both
            // arguments: true for `and`, false for `or`
            (Op::And | Op::Or, &[a, b]) => {
                let unit = op == Op::And;
                let (vr, va, vb) = (value(root), value(a), value(b));
                if vr == Some(unit) {
                    pending.push((a, of(unit)));
                    pending.push((b, of(unit)));
                }
                if vr == Some(!unit) {
                    if va == Some(unit) {
                        pending.push((b, of(!unit)));
                    }
                    if vb == Some(unit) {
                        pending.push((a, of(!unit)));
                    }
                }
                if va == Some(!unit) || vb == Some(!unit) {
                    pending.push((root, of(!unit)));
                }
                if va == Some(unit) && vb == Some(unit) {
                    pending.push((root, of(unit)));
                }
            }
            (Op::Eq, &[a, b]) => {
                let (vr, va, vb) = (value(root), value(a), value(b));
                if vr == Some(true) {
                    pending.push((a, b));
                }
                if a == b {
                    pending.push((root, tt));
                }
                if let (Some(x), Some(y)) = (va, vb) {
                    if x != y {
                        pending.push((root, ff));
                    }
                }
                if vr == Some(false) {
                    if let Some(x) = va {
                        pending.push((b, of(!x)));
                    }
                    if let Some(y) = vb {
                        pending.push((a, of(!y)));
                    }
                }
            }
            _ => {}
        }
    }

    /// Truth value of a signed literal, if its class has one.
    pub fn literal_value(&self, literal: i64) -> Option<bool> {
        let root = self.find_naive(Id::of_literal(literal));
        let value = if root == self.find_naive(self.true_id()) {
            true
        } else if root == self.find_naive(self.false_id()) {
            false
        } else {
            return None;
        };
        Some(value == (literal > 0))
    }

    /// Asserts a signed literal: `k` merges `k` with `true`, `-k` with `false`.
    pub fn assert_literal(&mut self, literal: i64) {
        let target = if literal > 0 {
            self.true_id()
        } else {
            self.false_id()
        };
        self.merge(Id::of_literal(literal), target);
    }

    /// Asserts each antecedent and the negated consequent. A contradiction
    /// afterwards means the condition holds.
    pub fn add_vc(&mut self, antecedents: &[Expr], consequent: &Expr) -> Result<(), Error> {
        for antecedent in antecedents {
            self.add_expression(antecedent)?;
        }
        self.add_expression(&Expr::not(consequent.clone()))
    }

    /// Interns the literals of a disjunction into a [`Clause`].
    pub fn introduce_clause(&mut self, literals: &[Expr]) -> Result<Clause, Error> {
        self.introduce_clause_with(literals, &Subst::default())
    }

    /// Interns an instance of a disjunction whose quantified variables are
    /// bound by `bindings`. The clause is ground when every quantified
    /// variable is bound.
    ///
    /// Past the deadline nothing is interned and the clause comes back
    /// marked as a tautology, so a [`crate::ClauseSet`] discards it.
    pub fn introduce_clause_with(
        &mut self,
        literals: &[Expr],
        bindings: &Subst,
    ) -> Result<Clause, Error> {
        let ground = literals
            .iter()
            .all(|l| l.quantified_vars().iter().all(|v| bindings.contains_key(v)));
        let mut clause = Clause::new(ground);
        if self.deadline_passed() {
            clause.mark_tautology();
            return Ok(clause);
        }
        for literal in literals {
            match literal {
                Expr::Bool(true) => clause.mark_tautology(),
                Expr::Bool(false) => {}
                _ => match literal.negated_atom() {
                    Some(atom) => {
                        let id = self.add_formula_with(atom, bindings)?;
                        clause.add_premise(id);
                    }
                    None => {
                        let id = self.add_formula_with(literal, bindings)?;
                        clause.add_conclusion(id);
                    }
                },
            }
        }
        Ok(clause)
    }

    /// Every extension of `subst` under which `pattern` denotes the class
    /// `root`.
    pub fn ematch(&self, pattern: &Expr, root: Id, subst: &Subst) -> Vec<Subst> {
        let mut out = vec![];
        self.ematch_into(pattern, self.find_naive(root), subst, &mut out);
        out
    }

    fn ematch_into(&self, pattern: &Expr, root: Id, subst: &Subst, out: &mut Vec<Subst>) {
        let push = |s: Subst, out: &mut Vec<Subst>| {
            if !out.contains(&s) {
                out.push(s);
            }
        };
        match pattern {
            Expr::Bool(b) => {
                let id = if *b { self.true_id() } else { self.false_id() };
                if self.find_naive(id) == root {
                    push(subst.clone(), out);
                }
            }
            Expr::Var {
                name,
                quantified: true,
                ..
            } => match subst.get(name) {
                Some(&bound) if self.find_naive(bound) == root => push(subst.clone(), out),
                Some(_) => {}
                None => {
                    let mut s = subst.clone();
                    s.insert(*name, root);
                    push(s, out);
                }
            },
            Expr::Var { name, .. } => {
                if self.symbols.lookup(*name).map(|id| self.find_naive(id)) == Some(root) {
                    push(subst.clone(), out);
                }
            }
            Expr::App { op, args, .. } => {
                if let Ok(Some(lowered)) = lower(pattern) {
                    self.ematch_into(&lowered, root, subst, out);
                    return;
                }
                let Some(op_id) = self.symbols.lookup_op(*op) else {
                    return;
                };
                let op_root = self.find_naive(op_id);
                let commutative = args.len() == 2 && self.symbols.is_commutative(op_root);
                for t in self.roots.terms_with_root(root) {
                    let term = self.roots.term(t);
                    if term.op() != op_root || term.arity() != args.len() {
                        continue;
                    }
                    for s in self.ematch_args(args, term.args(), subst) {
                        push(s, out);
                    }
                    if commutative {
                        let swapped = [term.args()[1], term.args()[0]];
                        for s in self.ematch_args(args, &swapped, subst) {
                            push(s, out);
                        }
                    }
                }
            }
        }
    }

    fn ematch_args(&self, patterns: &[Expr], ids: &[Id], subst: &Subst) -> Vec<Subst> {
        let mut substs = vec![subst.clone()];
        for (pattern, &id) in patterns.iter().zip(ids) {
            let mut next = vec![];
            for s in &substs {
                self.ematch_into(pattern, id, s, &mut next);
            }
            substs = next;
            if substs.is_empty() {
                break;
            }
        }
        substs
    }

    /// Roots of the live terms headed by `op` with `arity` arguments.
    pub fn roots_with_op(&self, op: Op, arity: usize) -> Vec<Id> {
        let Some(op_id) = self.symbols.lookup_op(op) else {
            return vec![];
        };
        let op_root = self.find_naive(op_id);
        let mut out = IndexSet::default();
        for (_, term, root) in self.roots.iter() {
            if term.op() == op_root && term.arity() == arity {
                out.insert(root);
            }
        }
        out.into_iter().collect()
    }

    /// Checks that every slot and value of every stored term is a root.
    pub fn debug_assert_invariants(&self) {
        if cfg!(debug_assertions) {
            for (t, term, root) in self.roots.iter() {
                assert!(self.unionfind.is_root(root), "{t:?} valued by non-root {root}");
                for &slot in term.slots() {
                    assert!(self.unionfind.is_root(slot), "{t:?} holds non-root {slot}");
                }
            }
        }
    }
}

/// Rewrites a top-level `implies` or `iff` into the builtins the store
/// knows: `(implies a b)` is `(or (not a) b)` and `(iff a b)` is `(= a b)`.
fn lower(expr: &Expr) -> Result<Option<Expr>, Error> {
    let Expr::App { op, args, .. } = expr else {
        return Ok(None);
    };
    let lowered = match (op, args.as_slice()) {
        (Op::Implies, [a, b]) => Expr::or(Expr::not(a.clone()), b.clone()),
        (Op::Iff, [a, b]) => Expr::eq(a.clone(), b.clone()),
        (Op::Implies | Op::Iff, _) => {
            return Err(Error::Malformed(format!("`{op}` expects 2 arguments in {expr}")))
        }
        _ => return Ok(None),
    };
    Ok(Some(lowered))
}

/// Name under which a variable is interned. Quantified variables carry a
/// `?` so they never collide with a constant of the same name.
fn var_symbol(name: Symbol, quantified: bool) -> Symbol {
    if quantified {
        Symbol::from(format!("?{name}").as_str())
    } else {
        name
    }
}

/// Readable name for a class: a term valued by it if there is one.
fn describe(symbols: &SymbolTable, roots: &RootMap, id: Id) -> String {
    match roots.terms_with_root(id).first() {
        Some(&t) => roots.term(t).to_string_with(symbols),
        None => symbols.name(id).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse_expr;

    fn assert_all(cc: &mut CongruenceClosure, formulas: &[&str]) {
        for f in formulas {
            cc.add_expression(&parse_expr(f).unwrap()).unwrap();
        }
    }

    #[test]
    fn direct_contradiction() {
        let mut cc = CongruenceClosure::default();
        assert_all(&mut cc, &["p"]);
        assert!(!cc.evaluates_to_false());
        assert_all(&mut cc, &["(not p)"]);
        assert!(cc.evaluates_to_false());
        assert!(!cc.timed_out());
    }

    #[test]
    fn congruence_chain() {
        let mut cc = CongruenceClosure::default();
        assert_all(&mut cc, &["(= x y)", "(= y z)", "(not (= (f x) (f z)))"]);
        assert!(cc.evaluates_to_false());
    }

    #[test]
    fn congruence_is_found_after_the_fact() {
        let mut cc = CongruenceClosure::default();
        let fa = cc.add_formula(&parse_expr("(f a)").unwrap()).unwrap();
        let fb = cc.add_formula(&parse_expr("(f b)").unwrap()).unwrap();
        let gfa = cc.add_formula(&parse_expr("(g (f a) c)").unwrap()).unwrap();
        let gfb = cc.add_formula(&parse_expr("(g (f b) c)").unwrap()).unwrap();
        assert_ne!(cc.find(fa), cc.find(fb));
        assert_ne!(cc.find(gfa), cc.find(gfb));

        assert_all(&mut cc, &["(= a b)"]);
        assert_eq!(cc.find(fa), cc.find(fb));
        assert_eq!(cc.find(gfa), cc.find(gfb));
        assert!(!cc.evaluates_to_false());
        cc.debug_assert_invariants();
    }

    #[test]
    fn commutative_terms_share_a_root() {
        let mut cc = CongruenceClosure::default();
        let xy = cc.add_formula(&parse_expr("(+ x y)").unwrap()).unwrap();
        let yx = cc.add_formula(&parse_expr("(+ y x)").unwrap()).unwrap();
        assert_eq!(xy, yx);
        assert_eq!(cc.roots().len(), 1);

        let eq1 = cc.add_formula(&parse_expr("(= a b)").unwrap()).unwrap();
        let eq2 = cc.add_formula(&parse_expr("(= b a)").unwrap()).unwrap();
        assert_eq!(eq1, eq2);
    }

    #[test]
    fn visible_constants_stay_roots() {
        let mut cc = CongruenceClosure::default();
        assert_all(&mut cc, &["(= (f a) b)"]);
        let fa = cc.add_formula(&parse_expr("(f a)").unwrap()).unwrap();
        assert_eq!(fa, cc.root_of_name("b").unwrap());
        assert!(matches!(cc.root_of_name("nope"), Err(Error::UnknownSymbol(_))));
    }

    #[test]
    fn boolean_builtins_propagate() {
        let mut cc = CongruenceClosure::default();
        assert_all(&mut cc, &["(and p q)"]);
        assert_eq!(cc.root_of_name("p").unwrap(), cc.true_id());
        assert_eq!(cc.root_of_name("q").unwrap(), cc.true_id());

        let mut cc = CongruenceClosure::default();
        assert_all(&mut cc, &["(not (or p q))"]);
        assert_eq!(cc.root_of_name("p").unwrap(), cc.false_id());
        assert_eq!(cc.root_of_name("q").unwrap(), cc.false_id());

        // unit propagation through a disjunction
        let mut cc = CongruenceClosure::default();
        assert_all(&mut cc, &["(or p q)", "(not p)"]);
        assert_eq!(cc.root_of_name("q").unwrap(), cc.true_id());

        // an equality asserted false with one side known
        let mut cc = CongruenceClosure::default();
        assert_all(&mut cc, &["(not (= p q))", "p"]);
        assert_eq!(cc.root_of_name("q").unwrap(), cc.false_id());
    }

    #[test]
    fn implication_and_iff_are_lowered() {
        let mut cc = CongruenceClosure::default();
        assert_all(&mut cc, &["(implies p q)", "p", "(iff q r)"]);
        assert_eq!(cc.root_of_name("r").unwrap(), cc.true_id());
        assert_all(&mut cc, &["(not r)"]);
        assert!(cc.evaluates_to_false());
    }

    #[test]
    fn false_assertion_refutes() {
        let mut cc = CongruenceClosure::default();
        cc.add_expression(&Expr::Bool(false)).unwrap();
        assert!(cc.evaluates_to_false());
    }

    #[test]
    fn add_vc_negates_the_consequent() {
        let mut cc = CongruenceClosure::default();
        let antecedents = [parse_expr("(= x y)").unwrap()];
        cc.add_vc(&antecedents, &parse_expr("(= (f y) (f x))").unwrap()).unwrap();
        assert!(cc.evaluates_to_false());
    }

    #[test]
    fn malformed_input_is_rejected() {
        let mut cc = CongruenceClosure::default();
        let bad = Expr::App {
            op: Op::Eq,
            args: vec![Expr::constant("a")],
            sort: Sort::boolean(),
        };
        assert!(matches!(cc.add_expression(&bad), Err(Error::Malformed(_))));
    }

    #[test]
    fn expired_deadline_leaves_store_consistent() {
        let mut cc = CongruenceClosure::new(Deadline::expired());
        assert_all(&mut cc, &["(= x y)", "(not (= (f x) (f y)))"]);
        assert!(cc.timed_out());
        assert!(!cc.evaluates_to_false());
        assert_eq!(cc.n_merges(), 0);

        let fx = cc.add_formula(&parse_expr("(f x)").unwrap()).unwrap();
        assert_eq!(cc.find(fx), cc.find_naive(fx));
        cc.debug_assert_invariants();
    }

    #[test]
    fn expired_deadline_interns_nothing() {
        let mut cc = CongruenceClosure::new(Deadline::expired());
        let n_symbols = cc.symbols().len();
        let fghx = cc.add_formula(&parse_expr("(f (g (h a)))").unwrap()).unwrap();
        assert_eq!(fghx, Id::WILDCARD);
        assert!(cc.timed_out());

        let clause = cc
            .introduce_clause(&[parse_expr("(p (k b))").unwrap()])
            .unwrap();
        assert!(clause.is_tautology());
        assert!(cc.roots().is_empty());
        assert_eq!(cc.symbols().len(), n_symbols);
        assert_eq!(cc.add_formula(&Expr::Bool(true)).unwrap(), cc.true_id());
    }

    #[test]
    fn literals_read_their_truth_value() {
        let mut cc = CongruenceClosure::default();
        let clause = cc
            .introduce_clause(&[parse_expr("(not p)").unwrap(), parse_expr("q").unwrap()])
            .unwrap();
        assert!(clause.is_ground());
        assert_eq!(clause.len(), 2);
        let p = cc.root_of_name("p").unwrap();
        assert_eq!(cc.literal_value(p.positive()), None);
        cc.assert_literal(p.positive());
        assert_eq!(cc.literal_value(p.positive()), Some(true));
        assert_eq!(cc.literal_value(p.negative()), Some(false));
    }

    #[test]
    fn true_literal_makes_a_tautology() {
        let mut cc = CongruenceClosure::default();
        let clause = cc
            .introduce_clause(&[parse_expr("p").unwrap(), Expr::Bool(true)])
            .unwrap();
        assert!(clause.is_tautology());
    }

    #[test]
    fn ematch_binds_variables_to_classes() {
        let mut cc = CongruenceClosure::default();
        assert_all(&mut cc, &["(= (f a) b)", "(p (g c))"]);
        let b = cc.root_of_name("b").unwrap();
        let matches = cc.ematch(&parse_expr("(f ?x)").unwrap(), b, &Subst::default());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0][&Symbol::from("x")], cc.root_of_name("a").unwrap());

        let tt = cc.true_id();
        let matches = cc.ematch(&parse_expr("(p (g ?y))").unwrap(), tt, &Subst::default());
        assert_eq!(matches.len(), 1);
        assert!(cc
            .ematch(&parse_expr("(f ?x)").unwrap(), tt, &Subst::default())
            .is_empty());
    }

    #[test]
    fn instances_bind_through_the_substitution() {
        let mut cc = CongruenceClosure::default();
        assert_all(&mut cc, &["(p a)"]);
        let a = cc.root_of_name("a").unwrap();
        let mut bindings = Subst::default();
        bindings.insert(Symbol::from("x"), a);
        let clause = cc
            .introduce_clause_with(
                &[parse_expr("(not (p ?x))").unwrap(), parse_expr("(q ?x)").unwrap()],
                &bindings,
            )
            .unwrap();
        assert!(clause.is_ground());
        // the premise is already true, so only the conclusion is open
        let open: Vec<i64> = clause
            .literals()
            .iter()
            .copied()
            .filter(|&l| cc.literal_value(l).is_none())
            .collect();
        assert_eq!(open.len(), 1);
        assert!(open[0] > 0);
    }
}
