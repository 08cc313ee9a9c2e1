//! Conjunctive normal form by distributing `or` over `and`.
use crate::ast::{Expr, Op};

/// One bottom-up distribution pass over an NNF formula.
pub(crate) fn cnf(expr: &Expr) -> Expr {
    if let Some((a, b)) = expr.binary(Op::And) {
        Expr::and(cnf(a), cnf(b))
    } else if let Some((a, b)) = expr.binary(Op::Or) {
        distribute(cnf(a), cnf(b))
    } else {
        expr.clone()
    }
}

/// `a or b` with any top-level conjunction of either side pushed outward.
fn distribute(a: Expr, b: Expr) -> Expr {
    if let Some((a1, a2)) = a.binary(Op::And) {
        return Expr::and(distribute(a1.clone(), b.clone()), distribute(a2.clone(), b));
    }
    if let Some((b1, b2)) = b.binary(Op::And) {
        return Expr::and(distribute(a.clone(), b1.clone()), distribute(a, b2.clone()));
    }
    Expr::or(a, b)
}

/// No `or` node has an `and` below it.
pub(crate) fn is_cnf(expr: &Expr) -> bool {
    if let Some((a, b)) = expr.binary(Op::And) {
        is_cnf(a) && is_cnf(b)
    } else if let Some((a, b)) = expr.binary(Op::Or) {
        is_clause(a) && is_clause(b)
    } else {
        true
    }
}

fn is_clause(expr: &Expr) -> bool {
    match expr.binary(Op::Or) {
        Some((a, b)) => is_clause(a) && is_clause(b),
        None => expr.binary(Op::And).is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse_expr;

    fn to_cnf(s: &str) -> Expr {
        cnf(&parse_expr(s).unwrap())
    }

    #[test]
    fn distributes_on_either_side() {
        assert_eq!(to_cnf("(or a (and b c))").to_string(), "(and (or a b) (or a c))");
        assert_eq!(to_cnf("(or (and b c) a)").to_string(), "(and (or b a) (or c a))");
    }

    #[test]
    fn nested_distribution_reaches_cnf() {
        let e = to_cnf("(or (and a b) (and c d))");
        assert!(is_cnf(&e));
        assert_eq!(
            e.to_string(),
            "(and (and (or a c) (or a d)) (and (or b c) (or b d)))"
        );
    }

    #[test]
    fn detects_non_cnf() {
        assert!(!is_cnf(&parse_expr("(or a (and b c))").unwrap()));
        assert!(is_cnf(&parse_expr("(and (or a b) c)").unwrap()));
    }
}
