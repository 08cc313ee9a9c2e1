//! Typed formulas handed to the engine by the verification-condition
//! generator, and a reader for their s-expression form.
mod expr;
pub mod parse;

pub use expr::*;
pub use parse::{parse_expr, parse_exprs, ParseError};

pub type Symbol = symbol_table::GlobalSymbol;
