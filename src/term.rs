use std::fmt;

use smallvec::SmallVec;

use crate::ids::Id;
use crate::symbols::SymbolTable;
use crate::util::ListDisplay;

/// A flattened application `[op, arg1, …, argN]`.
///
/// While stored in a [`crate::RootMap`] every slot holds a union-find root.
/// Binary applications of commutative operators keep the smaller argument
/// first, so `+(x, y)` and `+(y, x)` flatten to the same tuple.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlatTerm(SmallVec<[Id; 4]>);

impl FlatTerm {
    pub fn new(op: Id, args: impl IntoIterator<Item = Id>) -> Self {
        let mut slots = SmallVec::new();
        slots.push(op);
        slots.extend(args);
        FlatTerm(slots)
    }

    pub fn op(&self) -> Id {
        self.0[0]
    }

    pub fn args(&self) -> &[Id] {
        &self.0[1..]
    }

    pub fn arity(&self) -> usize {
        self.0.len() - 1
    }

    /// Operator and arguments, as used for trie keys.
    pub fn slots(&self) -> &[Id] {
        &self.0
    }

    /// Orders the two arguments of a commutative binary application.
    pub fn canonicalize(&mut self, commutative: bool) {
        if commutative && self.arity() == 2 && self.0[1] > self.0[2] {
            self.0.swap(1, 2);
        }
    }

    pub fn mentions(&self, id: Id) -> bool {
        self.0.contains(&id)
    }

    /// Rewrites every occurrence of `from` to `to`. Returns whether anything changed.
    pub fn replace(&mut self, from: Id, to: Id) -> bool {
        let mut changed = false;
        for slot in self.0.iter_mut() {
            if *slot == from {
                *slot = to;
                changed = true;
            }
        }
        changed
    }

    /// Renders the term with symbol names in place of ids.
    pub fn to_string_with(&self, symbols: &SymbolTable) -> String {
        let names = self.args().iter().map(|&a| symbols.name(a));
        if self.arity() == 0 {
            format!("({})", symbols.name(self.op()))
        } else {
            format!(
                "({} {})",
                symbols.name(self.op()),
                ListDisplay(names.collect::<Vec<_>>(), " ")
            )
        }
    }
}

impl fmt::Debug for FlatTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for FlatTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.op(), ListDisplay(self.args(), ", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: u32) -> Id {
        Id::new(i)
    }

    #[test]
    fn commutative_arguments_are_sorted() {
        let mut a = FlatTerm::new(id(10), [id(5), id(4)]);
        let mut b = FlatTerm::new(id(10), [id(4), id(5)]);
        a.canonicalize(true);
        b.canonicalize(true);
        assert_eq!(a, b);
        assert_eq!(a.args(), &[id(4), id(5)]);

        let mut c = FlatTerm::new(id(11), [id(5), id(4)]);
        c.canonicalize(false);
        assert_eq!(c.args(), &[id(5), id(4)]);
    }

    #[test]
    fn replace_rewrites_every_slot() {
        let mut t = FlatTerm::new(id(9), [id(3), id(4), id(3)]);
        assert!(t.replace(id(3), id(1)));
        assert_eq!(t.slots(), &[id(9), id(1), id(4), id(1)]);
        assert!(!t.replace(id(3), id(1)));
        assert!(t.mentions(id(4)));
        assert_eq!(t.to_string(), "#9(#1, #4, #1)");
    }
}
