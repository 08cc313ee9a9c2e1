//! # vc-closure
//! The decision-procedure core of a program verifier: congruence closure
//! over an integer-keyed term store, a boolean normal-form pipeline that
//! turns formulas into clauses, and a trie-indexed theorem instantiation
//! loop that tries to refute the negation of each verification condition.
//!
//! # Overview
//! A [`Prover`] holds a library of theorems. [`Prover::prove`] takes a
//! [`VerificationCondition`], builds a fresh [`CongruenceClosure`] for it,
//! and reports [`ProofResult::Proved`], [`ProofResult::TimedOut`] or
//! [`ProofResult::Exhausted`] in a [`VcReport`].
//!
//! ```
//! use vc_closure::{ProofResult, Prover, VerificationCondition};
//!
//! let mut prover = Prover::default();
//! prover.add_theorems("(= (len (push ?s ?x)) (succ (len ?s)))").unwrap();
//! let vc = VerificationCondition::parse(
//!     "push_grows",
//!     "(= n (len s))",
//!     "(= (len (push s e)) (succ n))",
//! )
//! .unwrap();
//! assert_eq!(prover.prove(&vc).unwrap().result, ProofResult::Proved);
//! ```
pub mod ast;
mod clause;
mod congruence;
mod deadline;
mod ids;
pub mod normalize;
mod prover;
mod report;
mod root_map;
mod symbols;
mod term;
mod trie;
mod unionfind;
pub mod util;

use thiserror::Error;

pub use ast::{parse_expr, parse_exprs, Expr, Op, ParseError, Sort, Symbol};
pub use clause::{Clause, ClauseSet, Introduced};
pub use congruence::{CongruenceClosure, Subst};
pub use deadline::Deadline;
pub use ids::{Id, TermId};
pub use normalize::{DisjunctSet, Normalizer};
pub use prover::{ProofMode, Prover, ProverConfig, VerificationCondition};
pub use report::{ProofLog, ProofResult, VcReport};
pub use root_map::RootMap;
pub use symbols::{SymbolInfo, SymbolTable, Usage};
pub use term::FlatTerm;
pub use trie::Trie;
pub use unionfind::{Priority, Union, UnionFind};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("malformed formula: {0}")]
    Malformed(String),
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),
    #[error("no such verification condition: {0}")]
    NoSuchVc(String),
}
