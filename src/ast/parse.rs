//! Parse a string into formulas.
//!
//! The surface syntax is a plain s-expression: `true`, `false`, constants
//! `a`, quantified variables `?x`, and applications `(f a ?x)`. Any atom or
//! operator may carry a sort annotation, as in `c:Int` or `(p:Boolean ?x)`.
//! Without one, an atom or application in formula position (at the top
//! level or under a connective) is `Boolean`, and anything else, such as
//! the arguments of `=` or of a function, is `Entity`.
//! `and` and `or` accept any number of arguments and are folded into
//! binary nodes.
use thiserror::Error;

use crate::ast::{Expr, Op, Sort};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected end of input at offset {0}")]
    Eof(usize),
    #[error("unexpected `{1}` at offset {0}")]
    Unexpected(usize, char),
    #[error("empty name at offset {0}")]
    EmptyName(usize),
    #[error("trailing input at offset {0}")]
    Trailing(usize),
}

/// Parses exactly one formula.
pub fn parse_expr(input: &str) -> Result<Expr, ParseError> {
    let (out, rest) = expr(&Context::new(input), true)?;
    if !rest.is_at_end() {
        return Err(ParseError::Trailing(rest.index));
    }
    Ok(out)
}

/// Parses a whitespace-separated sequence of formulas.
pub fn parse_exprs(input: &str) -> Result<Vec<Expr>, ParseError> {
    let mut ctx = Context::new(input);
    let mut out = vec![];
    while !ctx.is_at_end() {
        let (e, next) = expr(&ctx, true)?;
        out.push(e);
        ctx = next;
    }
    Ok(out)
}

#[derive(Clone, Debug)]
struct Context<'a> {
    source: &'a str,
    index: usize,
}

impl<'a> Context<'a> {
    fn new(source: &'a str) -> Self {
        let mut next = Context { source, index: 0 };
        next.advance_past_whitespace();
        next
    }

    fn rest(&self) -> &'a str {
        &self.source[self.index..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn is_at_end(&self) -> bool {
        self.index == self.source.len()
    }

    fn advance_char(&self) -> Context<'a> {
        let mut next = self.clone();
        next.index += self.peek().map_or(0, char::len_utf8);
        next.advance_past_whitespace();
        next
    }

    fn advance_past_whitespace(&mut self) {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.index += rest.len() - trimmed.len();
            if trimmed.starts_with(';') {
                self.index += trimmed.find('\n').unwrap_or(trimmed.len());
            } else {
                break;
            }
        }
    }

    /// Reads a bare name. Stops at whitespace, parentheses, `:` and `;`.
    fn name(&self) -> Result<(&'a str, Context<'a>), ParseError> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '(' | ')' | ':' | ';'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(match self.peek() {
                Some(c) if c != ':' => ParseError::Unexpected(self.index, c),
                _ => ParseError::EmptyName(self.index),
            });
        }
        let mut next = self.clone();
        next.index += len;
        let name = &rest[..len];
        next.advance_past_whitespace();
        Ok((name, next))
    }

    /// Reads a name followed by an optional `:Sort` annotation.
    fn annotated_name(&self) -> Result<(&'a str, Option<Sort>, Context<'a>), ParseError> {
        let (name, next) = self.name()?;
        if next.peek() == Some(':') && next.index == self.index + name.len() {
            let (sort, next) = next.advance_char().name()?;
            Ok((name, Some(Sort::new(sort)), next))
        } else {
            Ok((name, None, next))
        }
    }
}

/// Sort of an unannotated atom or application.
fn default_sort(formula: bool) -> Sort {
    if formula {
        Sort::boolean()
    } else {
        Sort::entity()
    }
}

fn expr<'a>(ctx: &Context<'a>, formula: bool) -> Result<(Expr, Context<'a>), ParseError> {
    match ctx.peek() {
        None => Err(ParseError::Eof(ctx.index)),
        Some('(') => app(&ctx.advance_char(), formula),
        Some(')') => Err(ParseError::Unexpected(ctx.index, ')')),
        Some('?') => {
            let (name, sort, next) = ctx.advance_char().annotated_name()?;
            let sort = sort.unwrap_or_else(|| default_sort(formula));
            Ok((Expr::forall_of(name, sort), next))
        }
        Some(_) => {
            let (name, sort, next) = ctx.annotated_name()?;
            let e = match (name, sort) {
                ("true", None) => Expr::Bool(true),
                ("false", None) => Expr::Bool(false),
                (name, sort) => {
                    Expr::constant_of(name, sort.unwrap_or_else(|| default_sort(formula)))
                }
            };
            Ok((e, next))
        }
    }
}

fn app<'a>(ctx: &Context<'a>, formula: bool) -> Result<(Expr, Context<'a>), ParseError> {
    let (head, sort, mut ctx) = ctx.annotated_name()?;
    let op = Op::from_name(head);
    let connective = matches!(op, Op::And | Op::Or | Op::Not | Op::Implies | Op::Iff);
    let mut args = vec![];
    loop {
        match ctx.peek() {
            None => return Err(ParseError::Eof(ctx.index)),
            Some(')') => {
                ctx = ctx.advance_char();
                break;
            }
            Some(_) => {
                let (arg, next) = expr(&ctx, connective)?;
                args.push(arg);
                ctx = next;
            }
        }
    }
    let e = match op {
        Op::And => Expr::conjunction(args),
        Op::Or => Expr::disjunction(args),
        Op::Func(f) => Expr::app_of(f, args, sort.unwrap_or_else(|| default_sort(formula))),
        op => Expr::App {
            op,
            args,
            sort: Sort::boolean(),
        },
    };
    Ok((e, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_applications() {
        let e = parse_expr("(implies (p ?x) (= (f a) b))").unwrap();
        assert_eq!(e.to_string(), "(implies (p ?x) (= (f a) b))");
        assert!(!e.is_ground());
    }

    #[test]
    fn folds_n_ary_connectives() {
        let e = parse_expr("(and a b c)").unwrap();
        assert_eq!(e.to_string(), "(and a (and b c))");
        assert_eq!(parse_expr("(or)").unwrap(), Expr::Bool(false));
    }

    #[test]
    fn reads_sort_annotations() {
        let e = parse_expr("(p:Boolean c:Int)").unwrap();
        assert_eq!(e.sort(), Sort::boolean());
        assert_eq!(e.args()[0].sort(), Sort::new("Int"));
        assert_eq!(parse_expr("?n:Int").unwrap(), Expr::forall_of("n", Sort::new("Int")));
    }

    #[test]
    fn formula_positions_default_to_boolean() {
        let e = parse_expr("(or ?b (not (p (f a))))").unwrap();
        assert_eq!(e.args()[0], Expr::forall_of("b", Sort::boolean()));
        let p = &e.args()[1].args()[0];
        assert_eq!(p.sort(), Sort::boolean());
        assert_eq!(p.args()[0].sort(), Sort::entity());
        assert_eq!(p.args()[0].args()[0].sort(), Sort::entity());

        let eq = parse_expr("(= x ?y)").unwrap();
        assert_eq!(eq.args()[0].sort(), Sort::entity());
        assert_eq!(eq.args()[1].sort(), Sort::entity());
    }

    #[test]
    fn skips_comments() {
        let es = parse_exprs("; two formulas\n(p a) ; trailing\n true").unwrap();
        assert_eq!(es, vec![Expr::pred("p", [Expr::constant("a")]), Expr::Bool(true)]);
    }

    #[test]
    fn reports_errors() {
        assert_eq!(parse_expr("(p a"), Err(ParseError::Eof(4)));
        assert_eq!(parse_expr(")"), Err(ParseError::Unexpected(0, ')')));
        assert_eq!(parse_expr("a b"), Err(ParseError::Trailing(2)));
        assert_eq!(parse_expr(""), Err(ParseError::Eof(0)));
    }
}
