//! Local algebraic rules over the boolean connectives.
use crate::ast::{Expr, Op};

/// One bottom-up simplification pass.
pub(crate) fn simplify(expr: &Expr) -> Expr {
    match expr {
        Expr::Bool(_) | Expr::Var { .. } => expr.clone(),
        Expr::App { op, args, sort } => {
            let args: Vec<Expr> = args.iter().map(simplify).collect();
            match (op, args.as_slice()) {
                (Op::Not, [a]) => a.negate(),
                (Op::And, [a, b]) => and(a, b),
                (Op::Or, [a, b]) => or(a, b),
                (Op::Implies, [a, b]) => implies(a, b),
                (Op::Iff, [a, b]) => iff(a, b),
                (Op::Eq, [a, b]) => eq(a, b),
                _ => Expr::App {
                    op: *op,
                    args,
                    sort: *sort,
                },
            }
        }
    }
}

fn and(a: &Expr, b: &Expr) -> Expr {
    match (a, b) {
        (Expr::Bool(false), _) | (_, Expr::Bool(false)) => Expr::Bool(false),
        (Expr::Bool(true), x) | (x, Expr::Bool(true)) => x.clone(),
        _ if a == b => a.clone(),
        _ if a.is_complement_of(b) => Expr::Bool(false),
        _ => Expr::and(a.clone(), b.clone()),
    }
}

fn or(a: &Expr, b: &Expr) -> Expr {
    match (a, b) {
        (Expr::Bool(true), _) | (_, Expr::Bool(true)) => Expr::Bool(true),
        (Expr::Bool(false), x) | (x, Expr::Bool(false)) => x.clone(),
        _ if a == b => a.clone(),
        _ if a.is_complement_of(b) => Expr::Bool(true),
        _ => Expr::or(a.clone(), b.clone()),
    }
}

fn implies(a: &Expr, b: &Expr) -> Expr {
    match (a, b) {
        (Expr::Bool(false), _) | (_, Expr::Bool(true)) => Expr::Bool(true),
        (Expr::Bool(true), x) => x.clone(),
        (x, Expr::Bool(false)) => x.negate(),
        _ if a == b => Expr::Bool(true),
        // (a implies not a) is not a, and (not a implies a) is a
        _ if a.is_complement_of(b) => b.clone(),
        _ => Expr::implies(a.clone(), b.clone()),
    }
}

fn iff(a: &Expr, b: &Expr) -> Expr {
    match (a, b) {
        (Expr::Bool(true), x) | (x, Expr::Bool(true)) => x.clone(),
        (Expr::Bool(false), x) | (x, Expr::Bool(false)) => x.negate(),
        _ if a == b => Expr::Bool(true),
        _ if a.is_complement_of(b) => Expr::Bool(false),
        _ => Expr::iff(a.clone(), b.clone()),
    }
}

fn eq(a: &Expr, b: &Expr) -> Expr {
    match (a, b) {
        _ if a == b => Expr::Bool(true),
        // only a boolean can equal a boolean literal
        (Expr::Bool(true), x) | (x, Expr::Bool(true)) => x.clone(),
        (Expr::Bool(false), x) | (x, Expr::Bool(false)) => x.negate(),
        _ if a.is_complement_of(b) => Expr::Bool(false),
        _ => Expr::eq(a.clone(), b.clone()),
    }
}
