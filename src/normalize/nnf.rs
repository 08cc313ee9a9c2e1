//! Negation normal form: negation only directly above atoms, and no
//! `implies` or `iff` left.
use crate::ast::{Expr, Op};

/// Rewrites `expr`, or its negation when `negated` is set, into NNF.
pub(crate) fn nnf(expr: &Expr, negated: bool) -> Expr {
    let Expr::App { op, args, .. } = expr else {
        return match expr {
            Expr::Bool(b) => Expr::Bool(*b != negated),
            _ => atom(expr, negated),
        };
    };
    match (op, args.as_slice()) {
        (Op::Not, [a]) => nnf(a, !negated),
        (Op::And, [a, b]) if !negated => Expr::and(nnf(a, false), nnf(b, false)),
        (Op::And, [a, b]) => Expr::or(nnf(a, true), nnf(b, true)),
        (Op::Or, [a, b]) if !negated => Expr::or(nnf(a, false), nnf(b, false)),
        (Op::Or, [a, b]) => Expr::and(nnf(a, true), nnf(b, true)),
        (Op::Implies, [a, b]) if !negated => Expr::or(nnf(a, true), nnf(b, false)),
        (Op::Implies, [a, b]) => Expr::and(nnf(a, false), nnf(b, true)),
        // a iff b becomes (not a or b) and (a or not b)
        (Op::Iff, [a, b]) if !negated => Expr::and(
            Expr::or(nnf(a, true), nnf(b, false)),
            Expr::or(nnf(a, false), nnf(b, true)),
        ),
        // not (a iff b) becomes (a or b) and (not a or not b)
        (Op::Iff, [a, b]) => Expr::and(
            Expr::or(nnf(a, false), nnf(b, false)),
            Expr::or(nnf(a, true), nnf(b, true)),
        ),
        _ => atom(expr, negated),
    }
}

fn atom(expr: &Expr, negated: bool) -> Expr {
    if negated {
        Expr::not(expr.clone())
    } else {
        expr.clone()
    }
}
