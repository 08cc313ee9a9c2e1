//! Union-find over symbol ids with a prioritized choice of representative.
//!
//! Unlike a textbook union by rank, the surviving root of a merge is picked
//! by [`Priority`]: visible symbols beat internal ones, constants beat
//! variables, and lower ids beat higher ones. Theorem matching relies on
//! this to see literal symbols rather than synthesized ones as roots.
use std::cmp::Ordering;

use crate::ids::Id;

/// Ranking key of a union-find element. Smaller is preferred as a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Priority {
    pub internal: bool,
    pub variable: bool,
}

/// Outcome of [`UnionFind::union`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Union {
    /// Both ids were already in the class rooted here.
    Same(Id),
    /// `child`'s class was attached below `parent`. Every term mentioning
    /// `child` must now be relocated by the caller.
    Merged { parent: Id, child: Id },
    /// The merge would identify `true` with `false`; nothing was changed.
    Contradiction,
}

#[derive(Debug, Clone)]
pub struct UnionFind {
    parents: Vec<(Id, Priority)>,
    n_unions: usize,
    distinct: Option<(Id, Id)>,
}

impl Default for UnionFind {
    fn default() -> Self {
        Self {
            parents: Default::default(),
            n_unions: Default::default(),
            distinct: None,
        }
    }
}

impl UnionFind {
    /// A union-find in which the classes of `t` and `f` may never merge.
    pub fn with_distinct(t: Id, f: Id) -> Self {
        Self {
            distinct: Some((t, f)),
            ..Self::default()
        }
    }

    pub fn n_unions(&self) -> usize {
        self.n_unions
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn make_set_with(&mut self, priority: Priority) -> Id {
        let id = Id::from_usize(self.parents.len());
        self.parents.push((id, priority));
        id
    }

    pub fn make_set(&mut self) -> Id {
        self.make_set_with(Priority::default())
    }

    pub fn priority(&self, id: Id) -> Priority {
        self.parents[id.index()].1
    }

    fn parent(&self, id: Id) -> Id {
        self.parents[id.index()].0
    }

    pub fn is_root(&self, id: Id) -> bool {
        self.parent(id) == id
    }

    /// Find the representative of an equivalence class, halving the path.
    pub fn find(&mut self, id: Id) -> Id {
        let mut cur = id;
        loop {
            let parent = self.parent(cur);
            if cur == parent {
                break;
            }
            let grand = self.parent(parent);
            self.parents[cur.index()].0 = grand;
            cur = grand;
        }
        cur
    }

    /// Find the representative of an equivalence class without path compression.
    pub fn find_naive(&self, id: Id) -> Id {
        let mut cur = id;
        loop {
            let parent = self.parent(cur);
            if cur == parent {
                break;
            }
            cur = parent;
        }
        cur
    }

    fn prefer(&self, a: Id, b: Id) -> Ordering {
        (self.priority(a), a).cmp(&(self.priority(b), b))
    }

    /// Merge the classes of `a` and `b`.
    pub fn union(&mut self, a: Id, b: Id) -> Union {
        let a = self.find(a);
        let b = self.find(b);
        if a == b {
            return Union::Same(a);
        }
        if let Some((t, f)) = self.distinct {
            let t = self.find(t);
            let f = self.find(f);
            if (a == t && b == f) || (a == f && b == t) {
                return Union::Contradiction;
            }
        }
        let (parent, child) = match self.prefer(a, b) {
            Ordering::Greater => (b, a),
            _ => (a, b),
        };
        self.parents[child.index()].0 = parent;
        self.n_unions += 1;
        debug_assert_eq!(self.find_naive(child), parent);
        Union::Merged { parent, child }
    }

    /// All classes with more than one member, each listed root first.
    pub fn sets(&self) -> Vec<Vec<Id>> {
        let mut sets = vec![vec![]; self.len()];
        for i in 0..self.len() {
            let id = Id::from_usize(i);
            let root = self.find_naive(id);
            if root == id {
                sets[root.index()].insert(0, id);
            } else {
                sets[root.index()].push(id);
            }
        }
        sets.retain(|set| set.len() > 1);
        sets
    }
}
