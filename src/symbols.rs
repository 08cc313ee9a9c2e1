//! Per-VC interning of symbol names to small integer ids.
use std::fmt;

use crate::ast::{Op, Sort, Symbol};
use crate::ids::Id;
use crate::util::{HashMap, SymbolGen, FRESH_CONSTANT_PREFIX, FRESH_VARIABLE_PREFIX};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Usage {
    Constant,
    Variable,
    Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolInfo {
    pub id: Id,
    pub name: Symbol,
    pub usage: Usage,
    pub arity: usize,
    pub is_internal: bool,
    /// Id of the symbol's sort, itself interned with [`Usage::Type`].
    pub sort: Option<Id>,
}

impl fmt::Display for SymbolInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Interns names for one proof attempt.
///
/// Ids start at 1; id 0 is the trie wildcard and never names a symbol.
/// The `Boolean` sort, `true` and `false` are interned first as ids 1, 2 and 3. Symbols
/// are never removed.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<SymbolInfo>,
    by_name: HashMap<Symbol, Id>,
    fresh_constants: SymbolGen,
    fresh_variables: SymbolGen,
    true_id: Id,
    false_id: Id,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        let placeholder = SymbolInfo {
            id: Id::WILDCARD,
            name: Symbol::from("*"),
            usage: Usage::Type,
            arity: 0,
            is_internal: true,
            sort: None,
        };
        let mut table = SymbolTable {
            symbols: vec![placeholder],
            by_name: Default::default(),
            fresh_constants: SymbolGen::new(FRESH_CONSTANT_PREFIX),
            fresh_variables: SymbolGen::new(FRESH_VARIABLE_PREFIX),
            true_id: Id::WILDCARD,
            false_id: Id::WILDCARD,
        };
        let boolean = table.intern_sort(Sort::boolean());
        table.true_id = table.push("true".into(), Usage::Constant, 0, false, Some(boolean));
        table.false_id = table.push("false".into(), Usage::Constant, 0, false, Some(boolean));
        table
    }

    pub fn true_id(&self) -> Id {
        self.true_id
    }

    pub fn false_id(&self) -> Id {
        self.false_id
    }

    /// Number of ids handed out so far, including the reserved id 0.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.len() <= 1
    }

    fn push(
        &mut self,
        name: Symbol,
        usage: Usage,
        arity: usize,
        is_internal: bool,
        sort: Option<Id>,
    ) -> Id {
        let id = Id::from_usize(self.symbols.len());
        self.symbols.push(SymbolInfo {
            id,
            name,
            usage,
            arity,
            is_internal,
            sort,
        });
        self.by_name.insert(name, id);
        id
    }

    /// Returns the id of `name`, interning it as a constant if unseen.
    pub fn intern(&mut self, name: impl Into<Symbol>) -> Id {
        self.intern_with(name.into(), Usage::Constant, 0, None)
    }

    /// Interns `name` with the given usage. An already interned name keeps
    /// its original entry; only a missing arity is filled in.
    pub fn intern_with(
        &mut self,
        name: Symbol,
        usage: Usage,
        arity: usize,
        sort: Option<Id>,
    ) -> Id {
        if let Some(&id) = self.by_name.get(&name) {
            let info = &mut self.symbols[id.index()];
            if info.arity == 0 && arity > 0 {
                info.arity = arity;
            }
            return id;
        }
        self.push(name, usage, arity, false, sort)
    }

    pub fn intern_sort(&mut self, sort: Sort) -> Id {
        self.intern_with(sort.name(), Usage::Type, 0, None)
    }

    /// Interns the symbol standing for an operator applied to `arity` arguments.
    pub fn intern_op(&mut self, op: Op, arity: usize) -> Id {
        self.intern_with(Symbol::from(op.name()), Usage::Constant, arity, None)
    }

    pub fn lookup(&self, name: Symbol) -> Option<Id> {
        self.by_name.get(&name).copied()
    }

    pub fn lookup_op(&self, op: Op) -> Option<Id> {
        self.lookup(Symbol::from(op.name()))
    }

    /// A fresh internal constant of the given sort, named `_k<N>`.
    pub fn make_fresh_constant(&mut self, sort: Sort) -> Id {
        let sort = self.intern_sort(sort);
        let name = self.fresh_constants.fresh();
        self.push(name.into(), Usage::Constant, 0, true, Some(sort))
    }

    /// A fresh internal variable of the given sort, named `_v<N>`.
    pub fn make_fresh_variable(&mut self, sort: Sort) -> Id {
        let sort = self.intern_sort(sort);
        let name = self.fresh_variables.fresh();
        self.push(name.into(), Usage::Variable, 0, true, Some(sort))
    }

    pub fn get(&self, id: Id) -> &SymbolInfo {
        &self.symbols[id.index()]
    }

    pub fn name(&self, id: Id) -> Symbol {
        self.get(id).name
    }

    pub fn usage(&self, id: Id) -> Usage {
        self.get(id).usage
    }

    pub fn is_variable(&self, id: Id) -> bool {
        self.usage(id) == Usage::Variable
    }

    pub fn is_internal(&self, id: Id) -> bool {
        self.get(id).is_internal
    }

    /// `=` and `+` are the commutative operators; their binary applications
    /// are stored with the smaller argument id first.
    pub fn is_commutative(&self, id: Id) -> bool {
        matches!(self.name(id).as_str(), "=" | "+")
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolInfo> {
        self.symbols.iter().skip(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_come_first() {
        let table = SymbolTable::new();
        assert_eq!(table.true_id(), Id::new(2));
        assert_eq!(table.false_id(), Id::new(3));
        assert_eq!(table.name(table.true_id()).as_str(), "true");
        assert_eq!(table.usage(Id::new(1)), Usage::Type);
    }

    #[test]
    fn intern_is_idempotent() {
        let mut table = SymbolTable::new();
        let a = table.intern("a");
        let b = table.intern("b");
        assert_ne!(a, b);
        assert_eq!(table.intern("a"), a);
        assert_eq!(table.lookup("b".into()), Some(b));
        assert_eq!(table.lookup("c".into()), None);
        assert!(!table.is_internal(a));
    }

    #[test]
    fn fresh_symbols_are_internal_and_deterministic() {
        let mut table = SymbolTable::new();
        let k0 = table.make_fresh_constant(Sort::entity());
        let v0 = table.make_fresh_variable(Sort::boolean());
        let k1 = table.make_fresh_constant(Sort::entity());
        assert_eq!(table.name(k0).as_str(), "_k0");
        assert_eq!(table.name(k1).as_str(), "_k1");
        assert_eq!(table.name(v0).as_str(), "_v0");
        assert!(table.is_internal(k0) && table.is_internal(v0));
        assert!(table.is_variable(v0));
        assert!(!table.is_variable(k1));
        assert_eq!(table.get(k0).sort, table.lookup("Entity".into()));
    }

    #[test]
    fn commutativity() {
        let mut table = SymbolTable::new();
        let eq = table.intern_op(Op::Eq, 2);
        let plus = table.intern_with("+".into(), Usage::Constant, 2, None);
        let f = table.intern_with("f".into(), Usage::Constant, 2, None);
        assert!(table.is_commutative(eq));
        assert!(table.is_commutative(plus));
        assert!(!table.is_commutative(f));
        assert_eq!(table.get(f).arity, 2);
    }
}
