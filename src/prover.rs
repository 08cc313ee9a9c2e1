//! Driving one proof attempt per verification condition.
//!
//! An attempt owns a fresh [`CongruenceClosure`], normalizes the
//! assumptions and the negated goal into clauses, and then alternates two
//! steps until `true = false` is derived, the deadline passes, or a round
//! changes nothing:
//!
//! 1. unit propagation of the ground clauses against the closure;
//! 2. theorem instantiation: live terms are looked up in a trie of theorem
//!    triggers, candidate triggers are e-matched against the closure, and
//!    each new instance becomes a ground clause.
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use instant::{Duration, Instant};

use crate::ast::{parse_exprs, Expr, Op, Symbol};
use crate::clause::{Clause, ClauseSet, Introduced};
use crate::congruence::{CongruenceClosure, Subst};
use crate::deadline::Deadline;
use crate::ids::Id;
use crate::normalize::{DisjunctSet, Normalizer};
use crate::report::{ProofResult, VcReport};
use crate::trie::Trie;
use crate::util::{IndexSet, ListDisplay};
use crate::Error;

/// Which inference steps an attempt may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProofMode {
    /// Closure, clause propagation and theorem instantiation.
    #[default]
    Full,
    /// Closure and clause propagation only; theorems contribute only their
    /// ground clauses.
    GroundOnly,
}

impl Display for ProofMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ProofMode::Full => write!(f, "full"),
            ProofMode::GroundOnly => write!(f, "ground-only"),
        }
    }
}

impl FromStr for ProofMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(ProofMode::Full),
            "ground-only" => Ok(ProofMode::GroundOnly),
            _ => Err(format!("Unknown proof mode: {s}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProverConfig {
    /// Wall-clock budget of each attempt.
    pub timeout: Duration,
    pub max_rounds: usize,
    /// Theorem instances allowed per attempt.
    pub max_instances: usize,
    pub proof_log: bool,
    /// In [`Prover::prove_all`], VCs after this many failures are skipped.
    pub failure_budget: Option<usize>,
    pub mode: ProofMode,
}

impl Default for ProverConfig {
    fn default() -> Self {
        ProverConfig {
            timeout: Duration::from_secs(5),
            max_rounds: 64,
            max_instances: 10_000,
            proof_log: true,
            failure_budget: None,
            mode: ProofMode::default(),
        }
    }
}

/// `antecedents` imply `consequent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCondition {
    pub name: String,
    pub antecedents: Vec<Expr>,
    pub consequent: Expr,
}

impl VerificationCondition {
    pub fn new(name: impl Into<String>, antecedents: Vec<Expr>, consequent: Expr) -> Self {
        VerificationCondition {
            name: name.into(),
            antecedents,
            consequent,
        }
    }

    /// Reads the antecedents and the consequent from s-expressions.
    pub fn parse(
        name: impl Into<String>,
        antecedents: &str,
        consequent: &str,
    ) -> Result<Self, Error> {
        let antecedents = parse_exprs(antecedents)?;
        let mut consequent = parse_exprs(consequent)?;
        if consequent.len() != 1 {
            return Err(Error::Malformed(format!(
                "expected one consequent, found {}",
                consequent.len()
            )));
        }
        Ok(Self::new(name, antecedents, consequent.remove(0)))
    }
}

impl Display for VerificationCondition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} => {}",
            self.name,
            ListDisplay(&self.antecedents, ", "),
            self.consequent
        )
    }
}

/// Proves verification conditions against a library of theorems.
///
/// Theorems are normalized once, when added. Every call to
/// [`Prover::prove`] builds its own store, so attempts share nothing.
#[derive(Debug, Clone, Default)]
pub struct Prover {
    config: ProverConfig,
    theorem_normalizer: Normalizer,
    theorems: Vec<DisjunctSet>,
}

impl Prover {
    pub fn new(config: ProverConfig) -> Self {
        Prover {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &ProverConfig {
        &self.config
    }

    /// Number of distinct theorem clauses.
    pub fn n_theorem_clauses(&self) -> usize {
        self.theorems.len()
    }

    /// Adds a theorem. Its quantified variables are universally bound.
    pub fn add_theorem(&mut self, theorem: &Expr) -> Result<(), Error> {
        theorem.check_well_formed()?;
        let clauses = self
            .theorem_normalizer
            .clauses(theorem)
            .unwrap_or_default();
        log::debug!("theorem {theorem} gives {} new clause(s)", clauses.len());
        self.theorems.extend(clauses);
        Ok(())
    }

    /// Parses and adds every theorem in `source`.
    pub fn add_theorems(&mut self, source: &str) -> Result<usize, Error> {
        let theorems = parse_exprs(source)?;
        for theorem in &theorems {
            self.add_theorem(theorem)?;
        }
        Ok(theorems.len())
    }

    pub fn prove(&self, vc: &VerificationCondition) -> Result<VcReport, Error> {
        let start = Instant::now();
        let deadline = Deadline::after(self.config.timeout);
        let mut attempt = Attempt::new(&self.config, deadline);
        let result = attempt.run(vc, &self.theorems)?;
        let report = VcReport {
            name: vc.name.clone(),
            result,
            elapsed: start.elapsed(),
            rounds: attempt.rounds,
            instances: attempt.instances.len(),
            merges: attempt.cc.n_merges(),
            log: attempt.cc.take_log().into_lines(),
        };
        log::debug!("{report}");
        Ok(report)
    }

    /// Proves `vcs` in order. Once `failure_budget` attempts have failed,
    /// the remaining VCs are reported [`ProofResult::Skipped`].
    pub fn prove_all(&self, vcs: &[VerificationCondition]) -> Vec<Result<VcReport, Error>> {
        let mut failures = 0;
        vcs.iter()
            .map(|vc| {
                if self
                    .config
                    .failure_budget
                    .is_some_and(|budget| failures >= budget)
                {
                    log::info!("{}: skipped", vc.name);
                    return Ok(VcReport::skipped(&vc.name));
                }
                let outcome = self.prove(vc);
                match &outcome {
                    Ok(report) => {
                        if !report.result.is_proved() {
                            failures += 1;
                        }
                        log::info!("{report}");
                    }
                    Err(err) => {
                        failures += 1;
                        log::warn!("{}: {err}", vc.name);
                    }
                }
                outcome
            })
            .collect()
    }

    pub fn prove_named(
        &self,
        vcs: &[VerificationCondition],
        name: &str,
    ) -> Result<VcReport, Error> {
        let vc = vcs
            .iter()
            .find(|vc| vc.name == name)
            .ok_or_else(|| Error::NoSuchVc(name.to_string()))?;
        self.prove(vc)
    }
}

/// A quantified clause waiting to be instantiated.
#[derive(Debug, Clone)]
struct TheoremClause {
    literals: Vec<Expr>,
    vars: Vec<Symbol>,
    /// Patterns that together bind every variable; the first is indexed.
    triggers: Vec<Expr>,
}

impl TheoremClause {
    fn new(set: &DisjunctSet) -> Self {
        let vars = set.quantified_vars();
        let triggers = select_triggers(set.literals(), &vars);
        if triggers.is_empty() {
            log::debug!("no trigger covers the variables of {set}");
        }
        TheoremClause {
            literals: set.literals().to_vec(),
            vars: vars.into_iter().collect(),
            triggers,
        }
    }
}

/// Picks a single non-connective subterm mentioning every variable, or
/// failing that a greedy cover by several. Function applications are
/// preferred over equalities, which match far more terms.
fn select_triggers(literals: &[Expr], vars: &IndexSet<Symbol>) -> Vec<Expr> {
    let mut candidates: Vec<&Expr> = vec![];
    for literal in literals {
        trigger_candidates(literal, &mut candidates);
    }
    candidates.sort_by_key(|e| e.op() == Some(Op::Eq));

    let covers = |e: &Expr| vars.iter().all(|&v| e.mentions_var(v));
    if let Some(single) = candidates.iter().copied().find(|&e| covers(e)) {
        return vec![single.clone()];
    }
    let mut covered = IndexSet::default();
    let mut triggers = vec![];
    for candidate in candidates {
        let new = candidate.quantified_vars();
        if new.iter().any(|v| !covered.contains(v)) {
            covered.extend(new);
            triggers.push(candidate.clone());
        }
    }
    if covered.len() < vars.len() {
        return vec![];
    }
    triggers
}

/// Non-ground applications other than connectives, outermost first.
fn trigger_candidates<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    if let Expr::App { op, args, .. } = expr {
        if !op.is_connective() && !expr.is_ground() {
            out.push(expr);
        }
        for arg in args {
            trigger_candidates(arg, out);
        }
    }
}

/// Trie keys of a trigger: its operator followed by the class of each
/// ground atom argument, or a wildcard. Commutative triggers are keyed in
/// both argument orders. Empty if the trigger cannot match yet.
fn trigger_keys(cc: &CongruenceClosure, trigger: &Expr) -> Vec<Vec<Id>> {
    let Expr::App { op, args, .. } = trigger else {
        return vec![];
    };
    let Some(op_id) = cc.symbols().lookup_op(*op) else {
        return vec![];
    };
    let op_root = cc.find_naive(op_id);
    let mut key = vec![op_root];
    for arg in args {
        let slot = match arg {
            Expr::Bool(true) => cc.find_naive(cc.true_id()),
            Expr::Bool(false) => cc.find_naive(cc.false_id()),
            Expr::Var {
                name,
                quantified: false,
                ..
            } => match cc.symbols().lookup(*name) {
                Some(id) => cc.find_naive(id),
                None => return vec![],
            },
            _ => Id::WILDCARD,
        };
        key.push(slot);
    }
    if key.len() == 3 && cc.symbols().is_commutative(op_root) && key[1] != key[2] {
        let swapped = vec![key[0], key[2], key[1]];
        return vec![key, swapped];
    }
    vec![key]
}

/// Substitutions under which every trigger matches some live term, the
/// first one matching the class `root`.
fn match_triggers(cc: &CongruenceClosure, triggers: &[Expr], root: Id) -> Vec<Subst> {
    let Some((first, rest)) = triggers.split_first() else {
        return vec![];
    };
    let mut substs = cc.ematch(first, root, &Subst::default());
    for pattern in rest {
        let Some(op) = pattern.op() else {
            return vec![];
        };
        let roots = cc.roots_with_op(op, pattern.args().len());
        let mut next = vec![];
        for s in &substs {
            for &r in &roots {
                for m in cc.ematch(pattern, r, s) {
                    if !next.contains(&m) {
                        next.push(m);
                    }
                }
            }
        }
        substs = next;
    }
    substs
}

/// Replaces quantified variables by constants, as negating a universally
/// quantified goal asks for a counterexample.
fn skolemize(expr: &Expr) -> Expr {
    match expr {
        Expr::Var {
            name,
            sort,
            quantified: true,
        } => Expr::constant_of(format!("_sk_{name}").as_str(), *sort),
        Expr::Bool(_) | Expr::Var { .. } => expr.clone(),
        Expr::App { op, args, sort } => Expr::App {
            op: *op,
            args: args.iter().map(skolemize).collect(),
            sort: *sort,
        },
    }
}

/// State of a single proof attempt.
struct Attempt<'a> {
    config: &'a ProverConfig,
    deadline: Deadline,
    cc: CongruenceClosure,
    normalizer: Normalizer,
    clauses: ClauseSet,
    theorems: Vec<TheoremClause>,
    /// (theorem, roots of its bindings) pairs already instantiated.
    instances: IndexSet<(usize, Vec<Id>)>,
    rounds: usize,
    normalizer_timed_out: bool,
}

impl<'a> Attempt<'a> {
    fn new(config: &'a ProverConfig, deadline: Deadline) -> Self {
        Attempt {
            config,
            deadline,
            cc: CongruenceClosure::new(deadline).with_proof_log(config.proof_log),
            normalizer: Normalizer::new(deadline),
            clauses: Default::default(),
            theorems: vec![],
            instances: Default::default(),
            rounds: 0,
            normalizer_timed_out: false,
        }
    }

    fn run(
        &mut self,
        vc: &VerificationCondition,
        theorems: &[DisjunctSet],
    ) -> Result<ProofResult, Error> {
        self.setup(vc, theorems)?;
        let mut progressed = true;
        loop {
            if self.cc.evaluates_to_false() {
                return Ok(ProofResult::Proved);
            }
            if self.normalizer_timed_out || self.cc.timed_out() || self.deadline.is_past() {
                return Ok(ProofResult::TimedOut);
            }
            if !progressed || self.rounds >= self.config.max_rounds {
                return Ok(ProofResult::Exhausted);
            }
            self.rounds += 1;
            let before = self.progress();
            self.propagate_clauses();
            if self.config.mode == ProofMode::Full {
                self.instantiate()?;
            }
            progressed = self.progress() != before;
            log::debug!(
                "{} round {}: {} merges, {} clauses, {} instances",
                vc.name,
                self.rounds,
                self.cc.n_merges(),
                self.clauses.len(),
                self.instances.len()
            );
        }
    }

    fn progress(&self) -> (usize, usize, usize, usize) {
        (
            self.cc.n_merges(),
            self.clauses.len(),
            self.clauses.ground_units().count(),
            self.instances.len(),
        )
    }

    fn setup(&mut self, vc: &VerificationCondition, theorems: &[DisjunctSet]) -> Result<(), Error> {
        let consequent = skolemize(&vc.consequent);
        let ground: Vec<Expr> = vc
            .antecedents
            .iter()
            .filter(|a| a.is_ground())
            .cloned()
            .collect();
        self.cc.add_vc(&ground, &consequent)?;

        let negated_goal = Expr::not(consequent);
        for formula in vc.antecedents.iter().chain([&negated_goal]) {
            match self.normalizer.clauses(formula) {
                Some(sets) => {
                    for set in &sets {
                        self.add_disjunct_set(set)?;
                    }
                }
                None => {
                    self.normalizer_timed_out = true;
                    return Ok(());
                }
            }
        }
        for set in theorems {
            self.add_disjunct_set(set)?;
        }
        log::debug!(
            "{}: {} ground clauses, {} quantified clauses, {} terms",
            vc.name,
            self.clauses.len() + self.clauses.ground_units().count(),
            self.theorems.len(),
            self.cc.roots().len()
        );
        Ok(())
    }

    fn add_disjunct_set(&mut self, set: &DisjunctSet) -> Result<(), Error> {
        if set.is_empty() {
            self.cc.merge(self.cc.true_id(), self.cc.false_id());
        } else if set.is_ground() {
            let clause = self.cc.introduce_clause(set.literals())?;
            self.file_clause(clause);
        } else {
            self.theorems.push(TheoremClause::new(set));
        }
        Ok(())
    }

    fn file_clause(&mut self, clause: Clause) -> Introduced {
        let literals: Vec<i64> = clause.literals().to_vec();
        let outcome = self.clauses.introduce(clause);
        if outcome == Introduced::GroundUnit {
            self.cc.assert_literal(literals[0]);
        }
        outcome
    }

    /// Unit resolution of every ground clause against the closure.
    fn propagate_clauses(&mut self) {
        let clauses: Vec<Clause> = self.clauses.ground().cloned().collect();
        for clause in clauses {
            if self.cc.evaluates_to_false() || self.cc.timed_out() {
                return;
            }
            let mut open = vec![];
            let mut satisfied = false;
            for &literal in clause.literals() {
                match self.cc.literal_value(literal) {
                    Some(true) => {
                        satisfied = true;
                        break;
                    }
                    Some(false) => {}
                    None => open.push(literal),
                }
            }
            if satisfied {
                continue;
            }
            match open.as_slice() {
                [] => {
                    log::trace!("clause {clause} is false");
                    self.cc.merge(self.cc.true_id(), self.cc.false_id());
                }
                &[literal] => self.cc.assert_literal(literal),
                _ => {}
            }
        }
    }

    /// One round of trigger-driven theorem instantiation.
    fn instantiate(&mut self) -> Result<(), Error> {
        let mut trie = Trie::default();
        for (i, theorem) in self.theorems.iter().enumerate() {
            if let Some(first) = theorem.triggers.first() {
                for key in trigger_keys(&self.cc, first) {
                    trie.insert(&key, i);
                }
            }
        }
        if trie.is_empty() {
            return Ok(());
        }

        let mut candidates: IndexSet<(usize, Id)> = IndexSet::default();
        for (_, term, root) in self.cc.roots().iter() {
            for i in trie.find_generalizations(term.slots()) {
                candidates.insert((i, root));
            }
        }

        for (i, root) in candidates {
            let theorem = self.theorems[i].clone();
            for subst in match_triggers(&self.cc, &theorem.triggers, root) {
                if self.instances.len() >= self.config.max_instances {
                    log::debug!("instance limit {} reached", self.config.max_instances);
                    return Ok(());
                }
                if self.cc.evaluates_to_false() || self.cc.timed_out() {
                    return Ok(());
                }
                let Some(binding) = theorem
                    .vars
                    .iter()
                    .map(|v| subst.get(v).map(|&id| self.cc.find_naive(id)))
                    .collect::<Option<Vec<Id>>>()
                else {
                    continue;
                };
                if !self.instances.insert((i, binding)) {
                    continue;
                }
                let clause = self.cc.introduce_clause_with(&theorem.literals, &subst)?;
                log::trace!("instance of theorem clause {i}: {clause}");
                if self.config.proof_log {
                    let bound: Vec<String> = subst
                        .iter()
                        .map(|(v, &id)| {
                            let name = self.cc.symbols().name(self.cc.find_naive(id));
                            format!("?{v} := {name}")
                        })
                        .collect();
                    self.cc.note(|| {
                        format!(
                            "instance [{}] with {}",
                            ListDisplay(&theorem.literals, " | "),
                            ListDisplay(&bound, ", ")
                        )
                    });
                }
                self.file_clause(clause);
            }
        }
        Ok(())
    }
}
