#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Arena-backed clause storage.
//!
//! All clauses live in one contiguous literal buffer and are addressed by
//! stable integer handles ([`ClauseRef`]). Deleting a learnt clause only
//! marks its header and counts the space as waste; the literals are
//! reclaimed by copying every live clause into a fresh arena
//! (`garbage collection`), during which old handles forward to their new
//! location so that watchers and trail reasons can be rewritten in one
//! pass. No component ever observes a dangling handle.

use crate::sat::error::SolverError;
use crate::sat::literal::Literal;

/// Opaque handle to a clause in the arena. Stable for the lifetime of the
/// clause; remapped explicitly during compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClauseRef(u32);

impl ClauseRef {
    #[must_use]
    pub const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Packed clause metadata.
///
/// Layout: `mark:2 | learnt:1 | reloced:1 | size:28`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClauseHeader(u32);

const SIZE_BITS: u32 = 28;
const SIZE_MASK: u32 = (1 << SIZE_BITS) - 1;

impl ClauseHeader {
    fn new(learnt: bool, size: u32) -> Self {
        debug_assert!(size <= SIZE_MASK);
        Self(u32::from(learnt) << 29 | size)
    }

    const fn mark(self) -> u32 {
        self.0 >> 30
    }

    const fn learnt(self) -> bool {
        self.0 & (1 << 29) != 0
    }

    const fn reloced(self) -> bool {
        self.0 & (1 << 28) != 0
    }

    const fn size(self) -> u32 {
        self.0 & SIZE_MASK
    }

    fn set_mark(&mut self) {
        self.0 |= 1 << 30;
    }

    fn set_reloced(&mut self) {
        self.0 |= 1 << 28;
    }
}

/// The clause store. Original clauses are never freed; learnt clauses are
/// freed only through [`ClauseArena::delete`] followed by compaction.
#[derive(Debug, Clone, Default)]
pub struct ClauseArena {
    headers: Vec<ClauseHeader>,
    /// Offset of the clause's literals, or the forwarding handle once the
    /// clause has been relocated into a successor arena.
    offsets: Vec<u32>,
    activity: Vec<f32>,
    lits: Vec<Literal>,
    wasted: usize,
}

impl ClauseArena {
    #[must_use]
    pub fn with_capacity(lits: usize) -> Self {
        Self {
            headers: Vec::new(),
            offsets: Vec::new(),
            activity: Vec::new(),
            lits: Vec::with_capacity(lits),
            wasted: 0,
        }
    }

    /// Number of literal slots in use, live or wasted.
    #[must_use]
    pub fn lits_len(&self) -> usize {
        self.lits.len()
    }

    #[must_use]
    pub const fn wasted(&self) -> usize {
        self.wasted
    }

    /// Stores a clause. Fails with [`SolverError::OutOfMemory`] if the
    /// backing storage cannot grow; the arena is unchanged in that case.
    pub fn alloc(&mut self, literals: &[Literal], learnt: bool) -> Result<ClauseRef, SolverError> {
        self.lits
            .try_reserve(literals.len())
            .map_err(|_| SolverError::OutOfMemory)?;
        self.headers
            .try_reserve(1)
            .and_then(|()| self.offsets.try_reserve(1))
            .and_then(|()| self.activity.try_reserve(1))
            .map_err(|_| SolverError::OutOfMemory)?;

        Ok(self.push_clause(literals, ClauseHeader::new(learnt, literals.len() as u32)))
    }

    fn push_clause(&mut self, literals: &[Literal], header: ClauseHeader) -> ClauseRef {
        let cref = ClauseRef(self.headers.len() as u32);
        self.offsets.push(self.lits.len() as u32);
        self.headers.push(header);
        self.activity.push(0.0);
        self.lits.extend_from_slice(literals);
        cref
    }

    #[must_use]
    pub fn lits(&self, cref: ClauseRef) -> &[Literal] {
        let header = self.headers[cref.idx()];
        debug_assert!(!header.reloced());
        let offset = self.offsets[cref.idx()] as usize;
        &self.lits[offset..offset + header.size() as usize]
    }

    pub fn lits_mut(&mut self, cref: ClauseRef) -> &mut [Literal] {
        let header = self.headers[cref.idx()];
        debug_assert!(!header.reloced());
        let offset = self.offsets[cref.idx()] as usize;
        &mut self.lits[offset..offset + header.size() as usize]
    }

    #[must_use]
    pub fn len(&self, cref: ClauseRef) -> usize {
        self.headers[cref.idx()].size() as usize
    }

    #[must_use]
    pub fn is_empty(&self, cref: ClauseRef) -> bool {
        self.len(cref) == 0
    }

    #[must_use]
    pub fn is_learnt(&self, cref: ClauseRef) -> bool {
        self.headers[cref.idx()].learnt()
    }

    #[must_use]
    pub fn is_deleted(&self, cref: ClauseRef) -> bool {
        self.headers[cref.idx()].mark() != 0
    }

    #[must_use]
    pub fn activity(&self, cref: ClauseRef) -> f32 {
        self.activity[cref.idx()]
    }

    pub fn set_activity(&mut self, cref: ClauseRef, activity: f32) {
        self.activity[cref.idx()] = activity;
    }

    pub fn rescale_activities(&mut self, factor: f32) {
        for a in &mut self.activity {
            *a *= factor;
        }
    }

    /// Marks a clause as deleted. The handle stays valid until compaction;
    /// watchers must be cleared by the caller before the next collection.
    pub fn delete(&mut self, cref: ClauseRef) {
        debug_assert!(!self.is_deleted(cref));
        self.headers[cref.idx()].set_mark();
        self.wasted += self.len(cref);
    }

    /// Relocates `cref` into `to`, rewriting the handle in place. Calling
    /// this twice for the same clause yields the same target handle, so
    /// every alias (clause list, watcher, trail reason) can be remapped
    /// independently.
    pub fn reloc(&mut self, cref: &mut ClauseRef, to: &mut Self) {
        let header = self.headers[cref.idx()];
        if header.reloced() {
            *cref = ClauseRef(self.offsets[cref.idx()]);
            return;
        }

        debug_assert!(header.mark() == 0, "deleted clause reached relocation");
        let offset = self.offsets[cref.idx()] as usize;
        let moved = to.push_clause(&self.lits[offset..offset + header.size() as usize], header);
        to.activity[moved.idx()] = self.activity[cref.idx()];

        self.headers[cref.idx()].set_reloced();
        self.offsets[cref.idx()] = moved.0;
        *cref = moved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(xs: &[i32]) -> Vec<Literal> {
        xs.iter().map(|&x| Literal::from_dimacs(x)).collect()
    }

    #[test]
    fn test_alloc_and_read() {
        let mut arena = ClauseArena::default();
        let a = arena.alloc(&lits(&[1, -2, 3]), false).unwrap();
        let b = arena.alloc(&lits(&[-1, 2]), true).unwrap();

        assert_eq!(arena.lits(a), lits(&[1, -2, 3]).as_slice());
        assert_eq!(arena.len(b), 2);
        assert!(!arena.is_learnt(a));
        assert!(arena.is_learnt(b));
    }

    #[test]
    fn test_delete_counts_waste() {
        let mut arena = ClauseArena::default();
        let a = arena.alloc(&lits(&[1, 2, 3]), true).unwrap();
        assert_eq!(arena.wasted(), 0);
        arena.delete(a);
        assert!(arena.is_deleted(a));
        assert_eq!(arena.wasted(), 3);
    }

    #[test]
    fn test_reloc_forwards_aliases() {
        let mut arena = ClauseArena::default();
        let kept = arena.alloc(&lits(&[1, 2, 3]), false).unwrap();
        let dead = arena.alloc(&lits(&[4, 5]), true).unwrap();
        let live = arena.alloc(&lits(&[-1, -3]), true).unwrap();
        arena.set_activity(live, 2.5);
        arena.delete(dead);

        let mut to = ClauseArena::default();
        let mut first = kept;
        let mut second = live;
        let mut alias = live;
        arena.reloc(&mut first, &mut to);
        arena.reloc(&mut second, &mut to);
        arena.reloc(&mut alias, &mut to);

        assert_eq!(second, alias);
        assert_eq!(to.lits(first), lits(&[1, 2, 3]).as_slice());
        assert_eq!(to.lits(second), lits(&[-1, -3]).as_slice());
        assert!(to.is_learnt(second));
        assert!((to.activity(second) - 2.5).abs() < f32::EPSILON);
        assert_eq!(to.wasted(), 0);
    }
}
