use std::fmt::{self, Display};

use crate::ast::Symbol;
use crate::util::{IndexMap, IndexSet, ListDisplay};
use crate::Error;

lazy_static::lazy_static! {
    static ref BOOLEAN: Symbol = Symbol::from("Boolean");
    static ref ENTITY: Symbol = Symbol::from("Entity");
}

/// The resolved semantic type of a formula, as supplied by the type checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sort(pub Symbol);

impl Sort {
    pub fn new(name: impl Into<Symbol>) -> Self {
        Sort(name.into())
    }

    /// The distinguished boolean type; `true` and `false` inhabit it.
    pub fn boolean() -> Self {
        Sort(*BOOLEAN)
    }

    /// Sort given to unannotated non-boolean symbols.
    pub fn entity() -> Self {
        Sort(*ENTITY)
    }

    pub fn is_boolean(&self) -> bool {
        self.0 == *BOOLEAN
    }

    pub fn name(&self) -> Symbol {
        self.0
    }
}

impl Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operators of an application node.
///
/// The boolean connectives and equality are builtins so the normalizer and
/// the closure engine can match on them exhaustively; everything else is an
/// uninterpreted function or predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Op {
    And,
    Or,
    Not,
    Implies,
    Iff,
    Eq,
    Func(Symbol),
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::And => "and",
            Op::Or => "or",
            Op::Not => "not",
            Op::Implies => "implies",
            Op::Iff => "iff",
            Op::Eq => "=",
            Op::Func(name) => name.as_str(),
        }
    }

    /// Maps an operator name to its builtin, if it is one.
    pub fn from_name(name: &str) -> Op {
        match name {
            "and" => Op::And,
            "or" => Op::Or,
            "not" => Op::Not,
            "implies" => Op::Implies,
            "iff" => Op::Iff,
            "=" => Op::Eq,
            _ => Op::Func(name.into()),
        }
    }

    /// Number of arguments a builtin requires. `None` for functions.
    pub fn builtin_arity(&self) -> Option<usize> {
        match self {
            Op::Not => Some(1),
            Op::And | Op::Or | Op::Implies | Op::Iff | Op::Eq => Some(2),
            Op::Func(_) => None,
        }
    }

    pub fn is_connective(&self) -> bool {
        matches!(self, Op::And | Op::Or | Op::Not | Op::Implies | Op::Iff)
    }
}

impl Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed formula or term.
///
/// Variables carry their quantification tag: a `quantified` variable is
/// universally bound at the top of the formula it occurs in, anything else
/// is a constant of the verification condition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Expr {
    Bool(bool),
    Var {
        name: Symbol,
        sort: Sort,
        quantified: bool,
    },
    App {
        op: Op,
        args: Vec<Expr>,
        sort: Sort,
    },
}

impl Expr {
    pub fn constant(name: impl Into<Symbol>) -> Self {
        Self::constant_of(name, Sort::entity())
    }

    pub fn constant_of(name: impl Into<Symbol>, sort: Sort) -> Self {
        Expr::Var {
            name: name.into(),
            sort,
            quantified: false,
        }
    }

    /// A boolean constant (a proposition).
    pub fn prop(name: impl Into<Symbol>) -> Self {
        Self::constant_of(name, Sort::boolean())
    }

    pub fn forall(name: impl Into<Symbol>) -> Self {
        Self::forall_of(name, Sort::entity())
    }

    pub fn forall_of(name: impl Into<Symbol>, sort: Sort) -> Self {
        Expr::Var {
            name: name.into(),
            sort,
            quantified: true,
        }
    }

    /// An application of an uninterpreted function.
    pub fn app(f: impl Into<Symbol>, args: impl IntoIterator<Item = Expr>) -> Self {
        Self::app_of(f, args, Sort::entity())
    }

    /// An application of an uninterpreted predicate.
    pub fn pred(p: impl Into<Symbol>, args: impl IntoIterator<Item = Expr>) -> Self {
        Self::app_of(p, args, Sort::boolean())
    }

    pub fn app_of(f: impl Into<Symbol>, args: impl IntoIterator<Item = Expr>, sort: Sort) -> Self {
        Expr::App {
            op: Op::Func(f.into()),
            args: args.into_iter().collect(),
            sort,
        }
    }

    fn builtin(op: Op, args: Vec<Expr>) -> Self {
        Expr::App {
            op,
            args,
            sort: Sort::boolean(),
        }
    }

    pub fn and(a: Expr, b: Expr) -> Self {
        Self::builtin(Op::And, vec![a, b])
    }

    pub fn or(a: Expr, b: Expr) -> Self {
        Self::builtin(Op::Or, vec![a, b])
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(a: Expr) -> Self {
        Self::builtin(Op::Not, vec![a])
    }

    pub fn implies(a: Expr, b: Expr) -> Self {
        Self::builtin(Op::Implies, vec![a, b])
    }

    pub fn iff(a: Expr, b: Expr) -> Self {
        Self::builtin(Op::Iff, vec![a, b])
    }

    pub fn eq(a: Expr, b: Expr) -> Self {
        Self::builtin(Op::Eq, vec![a, b])
    }

    /// Folds a list of conjuncts into right-nested binary `and`s.
    pub fn conjunction(exprs: impl IntoIterator<Item = Expr>) -> Self {
        let mut exprs: Vec<Expr> = exprs.into_iter().collect();
        let Some(mut acc) = exprs.pop() else {
            return Expr::Bool(true);
        };
        while let Some(e) = exprs.pop() {
            acc = Expr::and(e, acc);
        }
        acc
    }

    /// Folds a list of disjuncts into right-nested binary `or`s.
    pub fn disjunction(exprs: impl IntoIterator<Item = Expr>) -> Self {
        let mut exprs: Vec<Expr> = exprs.into_iter().collect();
        let Some(mut acc) = exprs.pop() else {
            return Expr::Bool(false);
        };
        while let Some(e) = exprs.pop() {
            acc = Expr::or(e, acc);
        }
        acc
    }

    pub fn sort(&self) -> Sort {
        match self {
            Expr::Bool(_) => Sort::boolean(),
            Expr::Var { sort, .. } | Expr::App { sort, .. } => *sort,
        }
    }

    pub fn op(&self) -> Option<Op> {
        match self {
            Expr::App { op, .. } => Some(*op),
            _ => None,
        }
    }

    pub fn args(&self) -> &[Expr] {
        match self {
            Expr::App { args, .. } => args,
            Expr::Bool(_) | Expr::Var { .. } => &[],
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, Expr::Bool(true))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Expr::Bool(false))
    }

    pub fn is_quantified_var(&self) -> bool {
        matches!(self, Expr::Var { quantified: true, .. })
    }

    /// If this is a binary application of `op`, returns its two arguments.
    pub fn binary(&self, op: Op) -> Option<(&Expr, &Expr)> {
        match self {
            Expr::App { op: o, args, .. } if *o == op && args.len() == 2 => {
                Some((&args[0], &args[1]))
            }
            _ => None,
        }
    }

    /// `self` and `other` are `e` and `not e` in some order.
    pub fn is_complement_of(&self, other: &Expr) -> bool {
        self.negated_atom() == Some(other) || other.negated_atom() == Some(self)
    }

    /// If this is `not e`, returns `e`.
    pub fn negated_atom(&self) -> Option<&Expr> {
        match self {
            Expr::App {
                op: Op::Not, args, ..
            } if args.len() == 1 => Some(&args[0]),
            _ => None,
        }
    }

    /// Negation that strips an outer `not` instead of stacking a second one.
    pub fn negate(&self) -> Expr {
        match self {
            Expr::Bool(b) => Expr::Bool(!b),
            _ => match self.negated_atom() {
                Some(inner) => inner.clone(),
                None => Expr::not(self.clone()),
            },
        }
    }

    /// True when no quantified variable occurs anywhere in the formula.
    pub fn is_ground(&self) -> bool {
        match self {
            Expr::Bool(_) => true,
            Expr::Var { quantified, .. } => !quantified,
            Expr::App { args, .. } => args.iter().all(Expr::is_ground),
        }
    }

    /// Quantified variables in order of first occurrence.
    pub fn quantified_vars(&self) -> IndexSet<Symbol> {
        let mut vars = IndexSet::default();
        self.walk(&mut |e| {
            if let Expr::Var {
                name,
                quantified: true,
                ..
            } = e
            {
                vars.insert(*name);
            }
        });
        vars
    }

    pub fn mentions_var(&self, var: Symbol) -> bool {
        match self {
            Expr::Bool(_) => false,
            Expr::Var {
                name, quantified, ..
            } => *quantified && *name == var,
            Expr::App { args, .. } => args.iter().any(|a| a.mentions_var(var)),
        }
    }

    /// Pre-order traversal.
    pub fn walk(&self, f: &mut impl FnMut(&Expr)) {
        f(self);
        for arg in self.args() {
            arg.walk(f);
        }
    }

    /// Renames quantified variables. Variables missing from the map are kept.
    pub fn rename_vars(&self, renaming: &IndexMap<Symbol, Symbol>) -> Expr {
        match self {
            Expr::Bool(_) => self.clone(),
            Expr::Var {
                name,
                sort,
                quantified: true,
            } => Expr::Var {
                name: *renaming.get(name).unwrap_or(name),
                sort: *sort,
                quantified: true,
            },
            Expr::Var { .. } => self.clone(),
            Expr::App { op, args, sort } => Expr::App {
                op: *op,
                args: args.iter().map(|a| a.rename_vars(renaming)).collect(),
                sort: *sort,
            },
        }
    }

    /// Rejects connectives and equalities applied to the wrong number of
    /// arguments.
    pub fn check_well_formed(&self) -> Result<(), Error> {
        if let Expr::App { op, args, .. } = self {
            if let Some(arity) = op.builtin_arity() {
                if args.len() != arity {
                    return Err(Error::Malformed(format!(
                        "`{op}` expects {arity} argument(s), found {} in {self}",
                        args.len()
                    )));
                }
            }
            for arg in args {
                arg.check_well_formed()?;
            }
        }
        Ok(())
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Bool(b) => write!(f, "{b}"),
            Expr::Var {
                name,
                quantified: true,
                ..
            } => write!(f, "?{name}"),
            Expr::Var { name, .. } => write!(f, "{name}"),
            Expr::App { op, args, .. } if args.is_empty() => write!(f, "({op})"),
            Expr::App { op, args, .. } => write!(f, "({op} {})", ListDisplay(args, " ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_an_s_expression() {
        let e = Expr::implies(
            Expr::pred("p", [Expr::forall("x")]),
            Expr::eq(Expr::app("f", [Expr::constant("a")]), Expr::Bool(true)),
        );
        assert_eq!(e.to_string(), "(implies (p ?x) (= (f a) true))");
    }

    #[test]
    fn negate_strips_one_not() {
        let p = Expr::prop("p");
        assert_eq!(Expr::not(p.clone()).negate(), p);
        assert_eq!(p.negate(), Expr::not(p.clone()));
        assert_eq!(Expr::Bool(true).negate(), Expr::Bool(false));
    }

    #[test]
    fn quantified_vars_in_first_occurrence_order() {
        let e = Expr::pred(
            "r",
            [Expr::forall("y"), Expr::constant("c"), Expr::forall("x"), Expr::forall("y")],
        );
        let vars: Vec<_> = e.quantified_vars().into_iter().map(|s| s.to_string()).collect();
        assert_eq!(vars, ["y", "x"]);
        assert!(!e.is_ground());
        assert!(Expr::pred("r", [Expr::constant("c")]).is_ground());
    }

    #[test]
    fn conjunction_folds_right() {
        let e = Expr::conjunction([Expr::prop("a"), Expr::prop("b"), Expr::prop("c")]);
        assert_eq!(e.to_string(), "(and a (and b c))");
        assert_eq!(Expr::conjunction([]), Expr::Bool(true));
        assert_eq!(Expr::disjunction([]), Expr::Bool(false));
    }

    #[test]
    fn wrong_arity_is_malformed() {
        let bad = Expr::App {
            op: Op::Eq,
            args: vec![Expr::constant("a")],
            sort: Sort::boolean(),
        };
        assert!(matches!(bad.check_well_formed(), Err(Error::Malformed(_))));
        assert!(Expr::not(Expr::prop("p")).check_well_formed().is_ok());
    }
}
