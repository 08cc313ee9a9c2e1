//! Discrimination trie over flattened terms.
//!
//! Keys are `[op, arg1, …, argN]` slices of ids. A stored [`Id::WILDCARD`]
//! slot stands for "any id", which is how a pattern with variable or nested
//! arguments is indexed. Lookups collect every value reachable by matching
//! each position either exactly or through a wildcard branch.
use std::hash::Hash;

use smallvec::SmallVec;

use crate::ids::Id;
use crate::util::{HashMap, IndexSet};

#[derive(Debug, Clone)]
struct Node<V> {
    children: HashMap<Id, usize>,
    values: SmallVec<[V; 1]>,
}

impl<V> Default for Node<V> {
    fn default() -> Self {
        Node {
            children: Default::default(),
            values: SmallVec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Trie<V> {
    nodes: Vec<Node<V>>,
    len: usize,
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Trie {
            nodes: vec![Node::default()],
            len: 0,
        }
    }
}

impl<V: Copy + Eq + Hash> Trie<V> {
    /// Number of stored (key, value) pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, key: &[Id], value: V) {
        let mut node = 0;
        for &slot in key {
            node = match self.nodes[node].children.get(&slot) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node].children.insert(slot, child);
                    child
                }
            };
        }
        if !self.nodes[node].values.contains(&value) {
            self.nodes[node].values.push(value);
            self.len += 1;
        }
    }

    /// Values whose stored key matches `key`, where a wildcard on either
    /// side matches anything.
    pub fn find(&self, key: &[Id]) -> Vec<V> {
        let mut out = IndexSet::default();
        self.find_from(0, key, 0, true, &mut out);
        out.into_iter().collect()
    }

    /// Values whose stored key generalizes `key`: only stored wildcards
    /// match arbitrary ids, a wildcard in `key` matches only a stored wildcard.
    pub fn find_generalizations(&self, key: &[Id]) -> Vec<V> {
        let mut out = IndexSet::default();
        self.find_from(0, key, 0, false, &mut out);
        out.into_iter().collect()
    }

    fn find_from(
        &self,
        node: usize,
        key: &[Id],
        pos: usize,
        specialize: bool,
        out: &mut IndexSet<V>,
    ) {
        let node = &self.nodes[node];
        if pos == key.len() {
            out.extend(node.values.iter().copied());
            return;
        }
        let slot = key[pos];
        if specialize && slot.is_wildcard() {
            for &child in node.children.values() {
                self.find_from(child, key, pos + 1, specialize, out);
            }
            return;
        }
        if let Some(&child) = node.children.get(&slot) {
            self.find_from(child, key, pos + 1, specialize, out);
        }
        if !slot.is_wildcard() {
            if let Some(&child) = node.children.get(&Id::WILDCARD) {
                self.find_from(child, key, pos + 1, specialize, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(slots: &[u32]) -> Vec<Id> {
        slots.iter().map(|&s| Id::new(s)).collect()
    }

    #[test]
    fn generalizations_use_stored_wildcards() {
        let mut trie = Trie::default();
        trie.insert(&key(&[7, 0, 0]), 'a');
        trie.insert(&key(&[7, 3, 0]), 'b');
        trie.insert(&key(&[7, 4, 5]), 'c');
        trie.insert(&key(&[8, 0]), 'd');

        let mut found = trie.find_generalizations(&key(&[7, 3, 9]));
        found.sort();
        assert_eq!(found, vec!['a', 'b']);
        let mut found = trie.find_generalizations(&key(&[7, 4, 5]));
        found.sort();
        assert_eq!(found, vec!['a', 'c']);
        assert!(trie.find_generalizations(&key(&[9, 1])).is_empty());
        assert_eq!(trie.len(), 4);
    }

    #[test]
    fn query_wildcards_find_instances() {
        let mut trie = Trie::default();
        trie.insert(&key(&[7, 3, 1]), 1);
        trie.insert(&key(&[7, 4, 1]), 2);
        trie.insert(&key(&[7, 4, 2]), 3);

        let mut found = trie.find(&key(&[7, 0, 1]));
        found.sort();
        assert_eq!(found, vec![1, 2]);
        assert_eq!(trie.find_generalizations(&key(&[7, 0, 1])), Vec::<i32>::new());
    }

    #[test]
    fn keys_of_different_length_do_not_mix() {
        let mut trie = Trie::default();
        trie.insert(&key(&[7]), 1);
        trie.insert(&key(&[7, 2]), 2);
        assert_eq!(trie.find_generalizations(&key(&[7])), vec![1]);
        assert_eq!(trie.find_generalizations(&key(&[7, 2])), vec![2]);
    }

    #[test]
    fn duplicate_values_are_stored_once() {
        let mut trie = Trie::default();
        trie.insert(&key(&[1, 0]), 1);
        trie.insert(&key(&[1, 0]), 1);
        trie.insert(&key(&[1, 2]), 1);
        assert_eq!(trie.len(), 2);
        assert_eq!(trie.find_generalizations(&key(&[1, 2])), vec![1]);
    }
}
