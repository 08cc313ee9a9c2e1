use std::fmt::{self, Display};

/// Prefix of generated constants standing for the value of a ground term.
pub const FRESH_CONSTANT_PREFIX: &str = "_k";
/// Prefix of generated variables standing for the value of a non-ground term.
pub const FRESH_VARIABLE_PREFIX: &str = "_v";

pub(crate) type BuildHasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;
pub(crate) type HashMap<K, V> = hashbrown::HashMap<K, V, BuildHasher>;
pub type IndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasher>;
pub type IndexSet<K> = indexmap::IndexSet<K, BuildHasher>;

/// Generates deterministic names for synthesized symbols.
///
/// The counter is owned by one symbol table, so two proof attempts never
/// share generated names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolGen {
    count: usize,
    reserved_string: String,
}

impl SymbolGen {
    pub fn new(reserved_string: impl Into<String>) -> Self {
        Self {
            count: 0,
            reserved_string: reserved_string.into(),
        }
    }

    pub fn has_been_used(&self) -> bool {
        self.count > 0
    }

    pub fn is_reserved(&self, symbol: &str) -> bool {
        !self.reserved_string.is_empty() && symbol.starts_with(&self.reserved_string)
    }

    pub fn fresh(&mut self) -> String {
        let s = format!("{}{}", self.reserved_string, self.count);
        self.count += 1;
        s
    }
}

/// Displays the items of a list separated by the given string.
pub struct ListDisplay<'a, T>(pub T, pub &'a str);

impl<T> Display for ListDisplay<'_, T>
where
    T: Clone + IntoIterator,
    T::Item: Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut did_something = false;
        for item in self.0.clone().into_iter() {
            if did_something {
                f.write_str(self.1)?;
            }
            Display::fmt(&item, f)?;
            did_something = true;
        }
        Ok(())
    }
}
