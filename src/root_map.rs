//! Association between stored terms and the id representing their value.
//!
//! Terms live in an arena addressed by [`TermId`]. Besides the forward map
//! from a term to its arena slot, two reverse indices are maintained so a
//! merge can find its affected terms without scanning everything:
//! root id to the terms having that root, and id to the terms mentioning
//! it in any slot.
use crate::ids::{Id, TermId};
use crate::term::FlatTerm;
use crate::util::{HashMap, IndexSet};

#[derive(Debug, Clone, Default)]
pub struct RootMap {
    terms: Vec<Option<(FlatTerm, Id)>>,
    forward: HashMap<FlatTerm, TermId>,
    by_root: HashMap<Id, IndexSet<TermId>>,
    by_sub: HashMap<Id, IndexSet<TermId>>,
    live: usize,
}

impl RootMap {
    /// Number of live terms.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn get(&self, term: &FlatTerm) -> Option<Id> {
        self.forward.get(term).map(|&t| self.root_of(t))
    }

    pub fn lookup(&self, term: &FlatTerm) -> Option<TermId> {
        self.forward.get(term).copied()
    }

    pub fn is_live(&self, t: TermId) -> bool {
        matches!(self.terms.get(t.index()), Some(Some(_)))
    }

    pub fn term(&self, t: TermId) -> &FlatTerm {
        &self.slot(t).0
    }

    pub fn root_of(&self, t: TermId) -> Id {
        self.slot(t).1
    }

    fn slot(&self, t: TermId) -> &(FlatTerm, Id) {
        self.terms[t.index()]
            .as_ref()
            .unwrap_or_else(|| panic!("{t:?} was removed from the root map"))
    }

    /// Records `term` with value `root`. The term must not be present yet.
    pub fn insert(&mut self, term: FlatTerm, root: Id) -> TermId {
        debug_assert!(!self.forward.contains_key(&term), "{term} stored twice");
        let t = TermId::from_usize(self.terms.len());
        for &sub in term.slots() {
            self.by_sub.entry(sub).or_default().insert(t);
        }
        self.by_root.entry(root).or_default().insert(t);
        self.forward.insert(term.clone(), t);
        self.terms.push(Some((term, root)));
        self.live += 1;
        t
    }

    /// Takes a term out of the map and every index.
    pub fn remove(&mut self, t: TermId) -> (FlatTerm, Id) {
        let (term, root) = self.terms[t.index()]
            .take()
            .unwrap_or_else(|| panic!("{t:?} removed twice"));
        self.forward.remove(&term);
        for &sub in term.slots() {
            detach(&mut self.by_sub, sub, t);
        }
        detach(&mut self.by_root, root, t);
        self.live -= 1;
        (term, root)
    }

    /// Changes the value recorded for a live term.
    pub fn set_root(&mut self, t: TermId, root: Id) {
        let slot = self.terms[t.index()].as_mut().expect("live term");
        let old = std::mem::replace(&mut slot.1, root);
        if old == root {
            return;
        }
        detach(&mut self.by_root, old, t);
        self.by_root.entry(root).or_default().insert(t);
    }

    /// Live terms whose value is `root`.
    pub fn terms_with_root(&self, root: Id) -> Vec<TermId> {
        self.by_root
            .get(&root)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Live terms with `id` in any slot, operator included.
    pub fn terms_mentioning(&self, id: Id) -> Vec<TermId> {
        self.by_sub
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, &FlatTerm, Id)> {
        self.terms.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref()
                .map(|(term, root)| (TermId::from_usize(i), term, *root))
        })
    }
}

/// Drops `t` from the bucket of `key`, and the bucket itself once empty.
fn detach(index: &mut HashMap<Id, IndexSet<TermId>>, key: Id, t: TermId) {
    if let Some(set) = index.get_mut(&key) {
        set.swap_remove(&t);
        if set.is_empty() {
            index.remove(&key);
        }
    }
}
