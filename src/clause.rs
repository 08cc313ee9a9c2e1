use std::fmt;
use std::hash::{Hash, Hasher};

use smallvec::SmallVec;

use crate::ids::Id;
use crate::util::{IndexSet, ListDisplay};

/// A disjunction of signed literal ids.
///
/// `k` asserts the formula whose root is `k`; `-k` asserts its negation.
/// Literals are kept sorted and deduplicated, so equality and hashing are
/// those of the literal set. A clause becomes tautological the moment a
/// literal is added whose complement is already present.
#[derive(Debug, Clone, Default)]
pub struct Clause {
    literals: SmallVec<[i64; 4]>,
    tautology: bool,
    ground: bool,
}

impl PartialEq for Clause {
    fn eq(&self, other: &Self) -> bool {
        self.literals == other.literals
    }
}

impl Eq for Clause {}

impl Hash for Clause {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.literals.hash(state);
    }
}

impl Clause {
    pub fn new(ground: bool) -> Self {
        Clause {
            ground,
            ..Default::default()
        }
    }

    pub fn from_literals(literals: impl IntoIterator<Item = i64>, ground: bool) -> Self {
        let mut clause = Self::new(ground);
        for literal in literals {
            clause.add(literal);
        }
        clause
    }

    pub fn add(&mut self, literal: i64) {
        debug_assert_ne!(literal, 0, "id 0 is not a formula");
        if self.literals.binary_search(&-literal).is_ok() {
            self.tautology = true;
        }
        if let Err(pos) = self.literals.binary_search(&literal) {
            self.literals.insert(pos, literal);
        }
    }

    /// Adds `¬id`, the contribution of a negated literal.
    pub fn add_premise(&mut self, id: Id) {
        self.add(id.negative())
    }

    /// Adds `id`, the contribution of a positive literal.
    pub fn add_conclusion(&mut self, id: Id) {
        self.add(id.positive())
    }

    /// Marks the clause as trivially true, as for a literal `true`.
    pub fn mark_tautology(&mut self) {
        self.tautology = true;
    }

    pub fn is_tautology(&self) -> bool {
        self.tautology
    }

    pub fn is_ground(&self) -> bool {
        self.ground
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn literals(&self) -> &[i64] {
        &self.literals
    }

    pub fn contains(&self, literal: i64) -> bool {
        self.literals.binary_search(&literal).is_ok()
    }

    /// Every literal of `self` occurs in `other`.
    pub fn is_subset_of(&self, other: &Clause) -> bool {
        self.len() <= other.len() && self.literals.iter().all(|&l| other.contains(l))
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", ListDisplay(self.literals.as_slice(), ", "))
    }
}

/// What happened to a clause handed to [`ClauseSet::introduce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Introduced {
    Tautology,
    /// Filed among the ground unit clauses.
    GroundUnit,
    /// A stored clause already implies it.
    Subsumed,
    Duplicate,
    /// Stored, after removing `removed` clauses it subsumes.
    Added { removed: usize },
}

/// The clauses of one proof attempt.
#[derive(Debug, Clone, Default)]
pub struct ClauseSet {
    clauses: IndexSet<Clause>,
    ground_units: IndexSet<Clause>,
}

impl ClauseSet {
    pub fn introduce(&mut self, clause: Clause) -> Introduced {
        if clause.is_tautology() {
            return Introduced::Tautology;
        }
        if clause.is_ground() && clause.len() == 1 {
            return if self.ground_units.insert(clause) {
                Introduced::GroundUnit
            } else {
                Introduced::Duplicate
            };
        }
        if self.clauses.contains(&clause) {
            return Introduced::Duplicate;
        }
        if self.clauses.iter().any(|stored| stored.is_subset_of(&clause)) {
            return Introduced::Subsumed;
        }
        let before = self.clauses.len();
        self.clauses.retain(|stored| !clause.is_subset_of(stored));
        let removed = before - self.clauses.len();
        self.clauses.insert(clause);
        Introduced::Added { removed }
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn contains(&self, clause: &Clause) -> bool {
        self.clauses.contains(clause) || self.ground_units.contains(clause)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    pub fn ground_units(&self) -> impl Iterator<Item = &Clause> {
        self.ground_units.iter()
    }

    /// Stored clauses without quantified variables, including unit ones.
    pub fn ground(&self) -> impl Iterator<Item = &Clause> {
        self.ground_units
            .iter()
            .chain(self.clauses.iter().filter(|c| c.is_ground()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complementary_literals_make_a_tautology() {
        let mut c = Clause::new(true);
        c.add(4);
        c.add(-7);
        assert!(!c.is_tautology());
        c.add(-4);
        assert!(c.is_tautology());
    }

    #[test]
    fn identity_is_the_literal_set() {
        let a = Clause::from_literals([3, -1, 2, 3], true);
        let b = Clause::from_literals([2, 3, -1], false);
        assert_eq!(a, b);
        assert_eq!(a.literals(), &[-1, 2, 3]);
        assert_eq!(a.to_string(), "{-1, 2, 3}");
    }

    #[test]
    fn smaller_clause_replaces_supersets() {
        let mut set = ClauseSet::default();
        assert_eq!(
            set.introduce(Clause::from_literals([1, 2, 3], true)),
            Introduced::Added { removed: 0 }
        );
        assert_eq!(
            set.introduce(Clause::from_literals([1, 2], true)),
            Introduced::Added { removed: 1 }
        );
        assert_eq!(
            set.iter().cloned().collect::<Vec<_>>(),
            vec![Clause::from_literals([1, 2], true)]
        );
    }

    #[test]
    fn supersets_of_stored_clauses_are_not_added() {
        let mut set = ClauseSet::default();
        set.introduce(Clause::from_literals([1, 2], false));
        assert_eq!(
            set.introduce(Clause::from_literals([1, 2, 5], false)),
            Introduced::Subsumed
        );
        assert_eq!(set.introduce(Clause::from_literals([2, 1], false)), Introduced::Duplicate);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn tautologies_and_units() {
        let mut set = ClauseSet::default();
        assert_eq!(
            set.introduce(Clause::from_literals([5, -5, 6], true)),
            Introduced::Tautology
        );
        assert_eq!(set.introduce(Clause::from_literals([5], true)), Introduced::GroundUnit);
        assert_eq!(set.introduce(Clause::from_literals([5], true)), Introduced::Duplicate);
        assert!(set.is_empty());
        assert_eq!(set.ground().count(), 1);
        assert!(set.iter().all(|c| !c.is_tautology()));
    }
}
