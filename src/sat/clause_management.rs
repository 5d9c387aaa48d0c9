#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Learnt-clause database reduction.
//!
//! Learnt clauses carry an activity score bumped when they participate in
//! conflict derivations and decayed by scaling the increment. When the
//! learnt database outgrows its budget, the lower-activity half is removed.
//! Clauses currently serving as a propagation reason and clauses of size
//! two or less are always kept: removing a reason would leave a dangling
//! antecedent, and binary clauses are cheap to keep and expensive to
//! relearn.

use crate::sat::clause::{ClauseArena, ClauseRef};
use ordered_float::OrderedFloat;

const RESCALE_LIMIT: f32 = 1e20;

#[derive(Debug, Clone, PartialEq)]
pub struct Reducer {
    cla_inc: f32,
    clause_decay: f32,
    /// Allowed number of learnt clauses in excess of assigned variables.
    max_learnts: f64,
    removed: u64,
}

impl Reducer {
    #[must_use]
    pub fn new(clause_decay: f64) -> Self {
        Self {
            cla_inc: 1.0,
            clause_decay: clause_decay as f32,
            max_learnts: 0.0,
            removed: 0,
        }
    }

    /// Sets the initial budget from the size of the original problem.
    pub fn init_budget(&mut self, n_original_clauses: usize) {
        self.max_learnts = (n_original_clauses as f64 / 3.0).max(100.0);
    }

    #[must_use]
    pub fn should_reduce(&self, n_learnts: usize, n_assigned: usize) -> bool {
        n_learnts as f64 - n_assigned as f64 >= self.max_learnts
    }

    pub fn bump(&mut self, arena: &mut ClauseArena, cref: ClauseRef) {
        let activity = arena.activity(cref) + self.cla_inc;
        arena.set_activity(cref, activity);
        if activity > RESCALE_LIMIT {
            arena.rescale_activities(1.0 / RESCALE_LIMIT);
            self.cla_inc /= RESCALE_LIMIT;
        }
    }

    pub fn decay(&mut self) {
        self.cla_inc /= self.clause_decay;
    }

    /// Selects the learnt clauses to remove: the lowest-activity half of
    /// the eligible clauses, never locked clauses and never clauses of
    /// size ≤ 2. Sparing a locked clause shrinks the quota rather than
    /// pushing removal onto a higher-activity one. `locked` reports
    /// whether a clause is the reason of a trail assignment.
    #[must_use]
    pub fn plan_removals(
        &self,
        arena: &ClauseArena,
        learnts: &[ClauseRef],
        locked: impl Fn(ClauseRef) -> bool,
    ) -> Vec<ClauseRef> {
        let mut candidates: Vec<ClauseRef> = learnts
            .iter()
            .copied()
            .filter(|&c| arena.len(c) > 2 && !locked(c))
            .collect();
        candidates.sort_unstable_by_key(|&c| OrderedFloat(arena.activity(c)));
        let quota = candidates.len() / 2;
        candidates.truncate(quota);
        candidates
    }

    /// Grows the budget after a reduction pass.
    pub fn on_reduced(&mut self, removed: usize) {
        self.removed += removed as u64;
        self.max_learnts *= 1.1;
    }

    #[must_use]
    pub const fn num_removed(&self) -> u64 {
        self.removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::literal::Literal;

    fn lits(xs: &[i32]) -> Vec<Literal> {
        xs.iter().map(|&x| Literal::from_dimacs(x)).collect()
    }

    #[test]
    fn test_plan_skips_locked_and_binary() {
        let mut arena = ClauseArena::default();
        let binary = arena.alloc(&lits(&[1, 2]), true).unwrap();
        let locked = arena.alloc(&lits(&[1, 2, 3]), true).unwrap();
        let cold = arena.alloc(&lits(&[2, 3, 4]), true).unwrap();
        let hot = arena.alloc(&lits(&[3, 4, 5]), true).unwrap();

        let mut reducer = Reducer::new(0.999);
        reducer.bump(&mut arena, hot);
        reducer.bump(&mut arena, hot);

        let learnts = vec![binary, locked, cold, hot];
        let removals = reducer.plan_removals(&arena, &learnts, |c| c == locked);

        // only `cold` and `hot` are eligible, so the quota is one clause
        // and the hot clause survives even though half the database is
        // locked or binary
        assert_eq!(removals, vec![cold]);
    }

    #[test]
    fn test_budget_grows_after_reduction() {
        let mut reducer = Reducer::new(0.999);
        reducer.init_budget(3000);
        assert!(reducer.should_reduce(1000, 0));
        assert!(!reducer.should_reduce(999, 0));
        assert!(!reducer.should_reduce(1000, 10));

        reducer.on_reduced(500);
        assert_eq!(reducer.num_removed(), 500);
        assert!(!reducer.should_reduce(1000, 0));
        assert!(reducer.should_reduce(1101, 0));
    }

    #[test]
    fn test_decay_favours_recent_clauses() {
        let mut arena = ClauseArena::default();
        let old = arena.alloc(&lits(&[1, 2, 3]), true).unwrap();
        let new = arena.alloc(&lits(&[2, 3, 4]), true).unwrap();

        let mut reducer = Reducer::new(0.5);
        reducer.bump(&mut arena, old);
        reducer.decay();
        reducer.bump(&mut arena, new);

        assert!(arena.activity(new) > arena.activity(old));
    }
}
