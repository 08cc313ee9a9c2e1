//! Splitting a CNF formula into disjunct sets.
use std::fmt;

use crate::ast::{Expr, Op, Symbol};
use crate::util::{IndexMap, IndexSet, ListDisplay};

/// The literals of one clause, before they are interned.
///
/// Quantified variables are renamed to `?0`, `?1`, … in order of first
/// occurrence, after the literals are put in a canonical order, so two
/// clauses equal up to variable renaming print identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisjunctSet {
    literals: Vec<Expr>,
}

impl DisjunctSet {
    pub fn literals(&self) -> &[Expr] {
        &self.literals
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// The empty disjunction, which is `false`.
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn is_ground(&self) -> bool {
        self.literals.iter().all(Expr::is_ground)
    }

    pub fn quantified_vars(&self) -> IndexSet<Symbol> {
        let mut vars = IndexSet::default();
        for literal in &self.literals {
            vars.extend(literal.quantified_vars());
        }
        vars
    }

    /// The identity used to recognize a clause seen before.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// The clause as a single formula.
    pub fn to_expr(&self) -> Expr {
        Expr::disjunction(self.literals.iter().cloned())
    }
}

impl fmt::Display for DisjunctSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", ListDisplay(&self.literals, " | "))
    }
}

fn collect<'a>(expr: &'a Expr, op: Op, out: &mut Vec<&'a Expr>) {
    match expr.binary(op) {
        Some((a, b)) => {
            collect(a, op, out);
            collect(b, op, out);
        }
        None => out.push(expr),
    }
}

/// Decomposes a CNF formula into one disjunct set per conjunct, dropping
/// tautologies and quantified boolean disjuncts that nothing else uses.
pub(crate) fn decompose(cnf: &Expr) -> Vec<DisjunctSet> {
    let mut conjuncts = vec![];
    collect(cnf, Op::And, &mut conjuncts);

    let mut sets = vec![];
    'conjuncts: for conjunct in conjuncts {
        let mut disjuncts = vec![];
        collect(conjunct, Op::Or, &mut disjuncts);

        let mut literals: Vec<Expr> = vec![];
        for d in disjuncts {
            match d {
                Expr::Bool(true) => continue 'conjuncts,
                Expr::Bool(false) => {}
                _ if literals.contains(d) => {}
                _ => literals.push(d.clone()),
            }
        }
        for (i, a) in literals.iter().enumerate() {
            if literals[i + 1..].iter().any(|b| a.is_complement_of(b)) {
                log::trace!("dropping tautology {}", ListDisplay(&literals, " | "));
                continue 'conjuncts;
            }
        }
        drop_unused_boolean_vars(&mut literals);
        sets.push(canonicalize(literals));
    }
    sets
}

/// A disjunct `?x` or `not ?x` over a boolean variable that occurs in no
/// other disjunct can be instantiated to `false`, so it adds nothing.
fn drop_unused_boolean_vars(literals: &mut Vec<Expr>) {
    let mut i = 0;
    while i < literals.len() {
        let atom = literals[i].negated_atom().unwrap_or(&literals[i]);
        let unused = match atom {
            Expr::Var {
                name,
                sort,
                quantified: true,
            } if sort.is_boolean() => literals
                .iter()
                .enumerate()
                .all(|(j, other)| j == i || !other.mentions_var(*name)),
            _ => false,
        };
        if unused {
            literals.remove(i);
        } else {
            i += 1;
        }
    }
}

/// Orders the literals and renames their variables so the result does not
/// depend on the variable names of the input.
///
/// Literals are ordered by their shape with every variable masked, then by
/// how their variables are used across the clause. Ties left after that are
/// broken by the renamed form, renaming again until the order is stable.
fn canonicalize(mut literals: Vec<Expr>) -> DisjunctSet {
    let vars: IndexSet<Symbol> = literals.iter().flat_map(Expr::quantified_vars).collect();
    let masked: IndexMap<Symbol, Symbol> = vars.iter().map(|&v| (v, Symbol::from("_"))).collect();
    let uses: IndexMap<Symbol, String> = vars
        .iter()
        .map(|&v| {
            let mut marked = masked.clone();
            marked.insert(v, Symbol::from("*"));
            let mut uses: Vec<String> = literals
                .iter()
                .filter(|l| l.mentions_var(v))
                .map(|l| l.rename_vars(&marked).to_string())
                .collect();
            uses.sort();
            (v, uses.join(" "))
        })
        .collect();
    let mut keys: Vec<(String, String)> = literals
        .iter()
        .map(|l| {
            let var_uses: Vec<&str> = l
                .quantified_vars()
                .iter()
                .map(|v| uses[v].as_str())
                .collect();
            (l.rename_vars(&masked).to_string(), var_uses.join(" , "))
        })
        .collect();

    let mut renamed = rename_by_first_occurrence(&literals);
    for _ in 0..literals.len() {
        let mut order: Vec<usize> = (0..literals.len()).collect();
        order.sort_by_cached_key(|&i| (keys[i].clone(), renamed[i].to_string()));
        if order.iter().enumerate().all(|(i, &j)| i == j) {
            break;
        }
        literals = order.iter().map(|&i| literals[i].clone()).collect();
        keys = order.iter().map(|&i| keys[i].clone()).collect();
        renamed = rename_by_first_occurrence(&literals);
    }
    DisjunctSet { literals: renamed }
}

fn rename_by_first_occurrence(literals: &[Expr]) -> Vec<Expr> {
    let mut renaming: IndexMap<Symbol, Symbol> = IndexMap::default();
    for literal in literals {
        for v in literal.quantified_vars() {
            let next = Symbol::from(renaming.len().to_string().as_str());
            renaming.entry(v).or_insert(next);
        }
    }
    literals.iter().map(|l| l.rename_vars(&renaming)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse_expr;

    fn sets(s: &str) -> Vec<String> {
        decompose(&parse_expr(s).unwrap())
            .iter()
            .map(|d| d.to_string())
            .collect()
    }

    #[test]
    fn one_set_per_conjunct() {
        assert_eq!(sets("(and (or a b) (and c (or d a)))"), ["[a | b]", "[c]", "[a | d]"]);
    }

    #[test]
    fn tautologies_are_dropped() {
        assert_eq!(sets("(and (or a (or b (not a))) c)"), ["[c]"]);
        assert!(sets("(or a true)").is_empty());
    }

    #[test]
    fn false_disjuncts_vanish() {
        assert_eq!(sets("(or a false)"), ["[a]"]);
        assert_eq!(sets("false"), ["[]"]);
        assert!(decompose(&Expr::Bool(false))[0].is_empty());
    }

    #[test]
    fn variables_are_renamed_canonically() {
        let a = sets("(or (p ?y) (q ?x ?y))");
        let b = sets("(or (q ?b ?a) (p ?a))");
        assert_eq!(a, b);
        assert_eq!(a, ["[(p ?0) | (q ?1 ?0)]"]);
    }

    #[test]
    fn renaming_ignores_variable_names_in_ties() {
        let a = sets("(or (or (p ?a) (q ?a)) (or (p ?b) (r ?b)))");
        let b = sets("(or (or (p ?b) (q ?b)) (or (p ?a) (r ?a)))");
        assert_eq!(a, b);
        assert_eq!(a, ["[(p ?0) | (p ?1) | (q ?0) | (r ?1)]"]);

        // same clause with the disjuncts in another order
        let c = sets("(or (or (p ?v) (r ?v)) (or (q ?u) (p ?u)))");
        assert_eq!(a, c);
    }

    #[test]
    fn unused_boolean_variables_are_dropped() {
        let d = decompose(&Expr::or(
            Expr::forall_of("b", crate::ast::Sort::boolean()),
            Expr::pred("p", [Expr::forall("x")]),
        ));
        assert_eq!(d[0].to_string(), "[(p ?0)]");
        assert_eq!(sets("(or ?b (p ?x))"), ["[(p ?0)]"]);

        // still used by another disjunct
        let d = decompose(&Expr::or(
            Expr::not(Expr::forall_of("b", crate::ast::Sort::boolean())),
            Expr::pred("p", [Expr::forall_of("b", crate::ast::Sort::boolean())]),
        ));
        assert_eq!(d[0].len(), 2);
    }
}
