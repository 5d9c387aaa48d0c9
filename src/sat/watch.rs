#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Two-watched-literal index.
//!
//! `watches[p]` holds the clauses that must be re-examined when `p`
//! becomes true (their watched literal `!p` just became false). Each
//! watcher caches a blocker literal; if the blocker is already true the
//! clause needs no inspection at all.

use crate::sat::clause::ClauseRef;
use crate::sat::literal::Literal;
use smallvec::SmallVec;
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watcher {
    pub clause: ClauseRef,
    pub blocker: Literal,
}

pub type WatchList = SmallVec<[Watcher; 4]>;

#[derive(Debug, Clone, Default)]
pub struct Watches(Vec<WatchList>);

impl Watches {
    #[must_use]
    pub fn new(n_vars: usize) -> Self {
        Self(vec![WatchList::new(); 2 * n_vars])
    }

    pub fn grow_to(&mut self, n_vars: usize) {
        if 2 * n_vars > self.0.len() {
            self.0.resize(2 * n_vars, WatchList::new());
        }
    }

    /// Registers the first two literals of a clause. The clause must have
    /// length at least two.
    pub fn attach(&mut self, cref: ClauseRef, lits: &[Literal]) {
        debug_assert!(lits.len() >= 2);
        self[!lits[0]].push(Watcher {
            clause: cref,
            blocker: lits[1],
        });
        self[!lits[1]].push(Watcher {
            clause: cref,
            blocker: lits[0],
        });
    }

    pub fn detach(&mut self, cref: ClauseRef, lits: &[Literal]) {
        debug_assert!(lits.len() >= 2);
        self[!lits[0]].retain(|w| w.clause != cref);
        self[!lits[1]].retain(|w| w.clause != cref);
    }

    pub fn clear_all(&mut self) {
        for list in &mut self.0 {
            list.clear();
        }
    }

    /// Takes a list out so it can be scanned while other lists are
    /// modified; must be paired with [`Watches::put_back`].
    pub fn take(&mut self, lit: Literal) -> WatchList {
        std::mem::take(&mut self[lit])
    }

    pub fn put_back(&mut self, lit: Literal, list: WatchList) {
        debug_assert!(self[lit].is_empty());
        self[lit] = list;
    }
}

impl Index<Literal> for Watches {
    type Output = WatchList;

    fn index(&self, index: Literal) -> &Self::Output {
        &self.0[index.code()]
    }
}

impl IndexMut<Literal> for Watches {
    fn index_mut(&mut self, index: Literal) -> &mut Self::Output {
        &mut self.0[index.code()]
    }
}
