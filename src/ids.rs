//! Small integer newtypes used throughout the store.
//!
//! Every symbol, every fresh constant and every fresh variable is an [`Id`];
//! the union-find and the symbol table are both flat arrays indexed by it.
//! Stored terms live in an arena inside the root map and are addressed by
//! [`TermId`], so terms never hold references to each other.
use std::fmt;

/// Declares a `u32`-backed id type with the conversions the store relies on.
macro_rules! define_id {
    ($v:vis $name:ident, $doc:tt) => {
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[doc = $doc]
        $v struct $name {
            rep: u32,
        }

        impl $name {
            pub const fn new(rep: u32) -> Self {
                Self { rep }
            }

            pub fn from_usize(index: usize) -> Self {
                assert!(
                    index <= u32::MAX as usize,
                    "overflowing id type {}",
                    stringify!($name)
                );
                Self { rep: index as u32 }
            }

            pub fn index(self) -> usize {
                self.rep as usize
            }

            pub fn rep(self) -> u32 {
                self.rep
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self::from_usize(index)
            }
        }

        impl From<$name> for usize {
            fn from(id: $name) -> usize {
                id.index()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.rep)
            }
        }
    };
}

define_id!(pub Id, "An interned symbol, and therefore also a union-find element.");
define_id!(pub TermId, "A slot in the root map's term arena.");

impl Id {
    /// Position value that matches anything in a [`crate::Trie`] key.
    /// No symbol is ever assigned this id.
    pub const WILDCARD: Id = Id::new(0);

    pub fn is_wildcard(self) -> bool {
        self == Self::WILDCARD
    }

    /// The positive literal asserting this id.
    pub fn positive(self) -> i64 {
        self.rep as i64
    }

    /// The negative literal asserting the negation of this id.
    pub fn negative(self) -> i64 {
        -(self.rep as i64)
    }

    /// Recovers the id a signed clause literal refers to.
    pub fn of_literal(literal: i64) -> Id {
        debug_assert_ne!(literal, 0);
        Id::from_usize(literal.unsigned_abs() as usize)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.rep)
    }
}
