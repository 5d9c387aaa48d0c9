#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! First-UIP conflict analysis and clause minimisation.
//!
//! Starting from a conflicting clause, the analyser resolves backwards over
//! the reasons of current-level literals until a single current-level
//! literal remains. The resulting clause is asserting: after backjumping to
//! its second-highest decision level it immediately propagates. Redundant
//! literals are removed according to the configured minimisation strength.

use crate::sat::clause::{ClauseArena, ClauseRef};
use crate::sat::config::CcminMode;
use crate::sat::literal::{Literal, Variable};
use crate::sat::trail::{Reason, Trail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyseResult {
    /// The learnt clause; `learnt[0]` is the asserting literal, the sole
    /// literal assigned at the conflict's decision level.
    pub learnt: Vec<Literal>,
    pub backtrack_level: u32,
    /// Variables involved in the derivation, for activity bumping.
    pub bump_vars: Vec<Variable>,
    /// Antecedent clauses used in the derivation, for clause-activity
    /// bumping.
    pub bump_clauses: Vec<ClauseRef>,
}

/// Reusable analysis state; buffers persist across conflicts to avoid
/// re-allocation in the hot path.
#[derive(Debug, Clone, Default)]
pub struct Analyser {
    seen: Vec<bool>,
    to_clear: Vec<Variable>,
    stack: Vec<Literal>,
}

impl Analyser {
    #[must_use]
    pub fn new(n_vars: usize) -> Self {
        Self {
            seen: vec![false; n_vars],
            to_clear: Vec::new(),
            stack: Vec::new(),
        }
    }

    pub fn grow_to(&mut self, n_vars: usize) {
        if n_vars > self.seen.len() {
            self.seen.resize(n_vars, false);
        }
    }

    fn mark(&mut self, var: Variable) {
        self.seen[var as usize] = true;
        self.to_clear.push(var);
    }

    /// Derives the first-UIP clause for the conflict `confl`. The caller
    /// guarantees the conflict occurred above decision level 0.
    pub fn analyse(
        &mut self,
        arena: &ClauseArena,
        trail: &Trail,
        confl: ClauseRef,
        ccmin: CcminMode,
    ) -> AnalyseResult {
        debug_assert!(trail.decision_level() > 0);

        let mut learnt: Vec<Literal> = vec![Literal::default()];
        let mut bump_vars = Vec::new();
        let mut bump_clauses = Vec::new();

        let conflict_level = trail.decision_level();
        let mut path_count: u32 = 0;
        let mut resolved: Option<Literal> = None;
        let mut index = trail.len();
        let mut reason_cref = confl;

        loop {
            bump_clauses.push(reason_cref);
            let lits = arena.lits(reason_cref);
            // the first literal of a reason clause is the one it implied
            let skip = usize::from(resolved.is_some());

            for &q in &lits[skip..] {
                let var = q.variable();
                if !self.seen[var as usize] && trail.level(var) > 0 {
                    self.mark(var);
                    bump_vars.push(var);
                    if trail.level(var) >= conflict_level {
                        path_count += 1;
                    } else {
                        learnt.push(q);
                    }
                }
            }

            // walk back to the most recently assigned marked literal
            loop {
                index -= 1;
                if self.seen[trail[index].variable() as usize] {
                    break;
                }
            }

            let p = trail[index];
            self.seen[p.variable() as usize] = false;
            path_count -= 1;
            if path_count == 0 {
                learnt[0] = !p;
                break;
            }

            resolved = Some(p);
            reason_cref = match trail.reason(p.variable()) {
                Reason::Clause(cref) => cref,
                Reason::Decision => unreachable!("non-UIP literal without a reason"),
            };
        }

        self.minimise(arena, trail, &mut learnt, ccmin);

        let backtrack_level = if learnt.len() == 1 {
            0
        } else {
            // move the literal of the second-highest level into slot 1; it
            // becomes the other watched literal after the backjump
            let mut max_i = 1;
            for i in 2..learnt.len() {
                if trail.level(learnt[i].variable()) > trail.level(learnt[max_i].variable()) {
                    max_i = i;
                }
            }
            learnt.swap(1, max_i);
            trail.level(learnt[1].variable())
        };

        for var in self.to_clear.drain(..) {
            self.seen[var as usize] = false;
        }

        AnalyseResult {
            learnt,
            backtrack_level,
            bump_vars,
            bump_clauses,
        }
    }

    fn minimise(
        &mut self,
        arena: &ClauseArena,
        trail: &Trail,
        learnt: &mut Vec<Literal>,
        ccmin: CcminMode,
    ) {
        match ccmin {
            CcminMode::None => {}
            CcminMode::Basic => {
                learnt_retain(learnt, |lit| !self.basic_redundant(arena, trail, lit));
            }
            CcminMode::Deep => {
                let mut abstract_levels = 0u32;
                for &lit in &learnt[1..] {
                    abstract_levels |= abstract_level(trail.level(lit.variable()));
                }
                learnt_retain(learnt, |lit| {
                    trail.reason(lit.variable()) == Reason::Decision
                        || !self.deep_redundant(arena, trail, lit, abstract_levels)
                });
            }
        }
    }

    /// A literal is redundant if every other literal of its reason clause
    /// is already part of the learnt clause (self-subsumption).
    fn basic_redundant(&self, arena: &ClauseArena, trail: &Trail, lit: Literal) -> bool {
        match trail.reason(lit.variable()) {
            Reason::Decision => false,
            Reason::Clause(cref) => arena.lits(cref)[1..].iter().all(|&q| {
                self.seen[q.variable() as usize] || trail.level(q.variable()) == 0
            }),
        }
    }

    /// Recursive reason-walk: a literal is redundant if its whole reason
    /// tree bottoms out in literals already in the learnt clause (or at
    /// level 0). `abstract_levels` prunes walks that leave the levels the
    /// learnt clause touches.
    fn deep_redundant(
        &mut self,
        arena: &ClauseArena,
        trail: &Trail,
        lit: Literal,
        abstract_levels: u32,
    ) -> bool {
        self.stack.clear();
        self.stack.push(lit);
        let top = self.to_clear.len();

        while let Some(p) = self.stack.pop() {
            let cref = match trail.reason(p.variable()) {
                Reason::Clause(cref) => cref,
                Reason::Decision => unreachable!("stack only holds propagated literals"),
            };

            for &q in &arena.lits(cref)[1..] {
                let var = q.variable();
                if self.seen[var as usize] || trail.level(var) == 0 {
                    continue;
                }
                let has_reason = trail.reason(var) != Reason::Decision;
                if has_reason && abstract_level(trail.level(var)) & abstract_levels != 0 {
                    self.mark(var);
                    self.stack.push(q);
                } else {
                    // undo marks made during this walk only
                    for &u in &self.to_clear[top..] {
                        self.seen[u as usize] = false;
                    }
                    self.to_clear.truncate(top);
                    return false;
                }
            }
        }

        true
    }

    /// Computes the subset of assumption literals responsible for forcing
    /// `p` false, by walking the implication graph from `p` back to
    /// decisions. Used to report failed assumptions.
    pub fn analyse_final(
        &mut self,
        arena: &ClauseArena,
        trail: &Trail,
        p: Literal,
    ) -> Vec<Literal> {
        let mut out = vec![p];
        if trail.decision_level() == 0 {
            return out;
        }

        self.seen[p.variable() as usize] = true;

        for i in (trail.level_start(1)..trail.len()).rev() {
            let var = trail[i].variable();
            if !self.seen[var as usize] {
                continue;
            }
            match trail.reason(var) {
                Reason::Decision => {
                    debug_assert!(trail.level(var) > 0);
                    out.push(!trail[i]);
                }
                Reason::Clause(cref) => {
                    for &q in &arena.lits(cref)[1..] {
                        if trail.level(q.variable()) > 0 {
                            self.seen[q.variable() as usize] = true;
                        }
                    }
                }
            }
            self.seen[var as usize] = false;
        }

        self.seen[p.variable() as usize] = false;
        out
    }
}

const fn abstract_level(level: u32) -> u32 {
    1 << (level & 31)
}

/// Retains `learnt[0]` unconditionally and filters the tail.
fn learnt_retain(learnt: &mut Vec<Literal>, mut keep: impl FnMut(Literal) -> bool) {
    let mut i = 1;
    while i < learnt.len() {
        if keep(learnt[i]) {
            i += 1;
        } else {
            learnt.swap_remove(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::assignment::Assignment;

    fn lit(x: i32) -> Literal {
        Literal::from_dimacs(x)
    }

    /// Builds the classic two-level implication scenario:
    /// level 1 decides -1; level 2 decides -2, which forces 3 through
    /// (2 v 3) being false on 2... constructed directly on the trail.
    #[test]
    fn test_first_uip_single_current_level_literal() {
        // clauses: c0 = (1 v 2 v 3), c1 = (1 v 2 v -3)
        // decisions: -1 @1, -2 @2  =>  c0 forces 3 @2, c1 conflicts
        let mut arena = ClauseArena::default();
        let c0 = arena.alloc(&[lit(3), lit(1), lit(2)], false).unwrap();
        let c1 = arena.alloc(&[lit(-3), lit(1), lit(2)], false).unwrap();

        let mut assignment = Assignment::new(3);
        let mut trail = Trail::new(3);
        trail.new_decision_level();
        trail.push(lit(-1), Reason::Decision, &mut assignment);
        trail.new_decision_level();
        trail.push(lit(-2), Reason::Decision, &mut assignment);
        trail.push(lit(3), Reason::Clause(c0), &mut assignment);

        let mut analyser = Analyser::new(3);
        let result = analyser.analyse(&arena, &trail, c1, CcminMode::None);

        // the UIP is the decision -2: learnt = (2 v 1), backjump to level 1
        assert_eq!(result.learnt[0], lit(2));
        assert!(result.learnt.contains(&lit(1)));
        assert_eq!(result.learnt.len(), 2);
        assert_eq!(result.backtrack_level, 1);

        // exactly one literal of the learnt clause sits at the conflict level
        let at_conflict_level = result
            .learnt
            .iter()
            .filter(|l| trail.level(l.variable()) == trail.decision_level())
            .count();
        assert_eq!(at_conflict_level, 1);
    }

    #[test]
    fn test_unit_resolvent_backjumps_to_ground() {
        // single decision conflicts through two binary clauses:
        // c0 = (1 v 2), c1 = (1 v -2); decision -1 @1 forces 2 then conflicts
        let mut arena = ClauseArena::default();
        let c0 = arena.alloc(&[lit(2), lit(1)], false).unwrap();
        let c1 = arena.alloc(&[lit(-2), lit(1)], false).unwrap();

        let mut assignment = Assignment::new(2);
        let mut trail = Trail::new(2);
        trail.new_decision_level();
        trail.push(lit(-1), Reason::Decision, &mut assignment);
        trail.push(lit(2), Reason::Clause(c0), &mut assignment);

        let mut analyser = Analyser::new(2);
        let result = analyser.analyse(&arena, &trail, c1, CcminMode::Deep);

        assert_eq!(result.learnt, vec![lit(1)]);
        assert_eq!(result.backtrack_level, 0);
    }

    #[test]
    fn test_minimisation_drops_subsumed_literal() {
        // level 1: decision -1 forces 2 via c0 = (2 v 1).
        // level 2: decision 3; c1 forces 4, c2 forces 5, c3 conflicts.
        // The raw first-UIP clause is (-4 v -2 v 1); literal -2 is
        // redundant because its reason c0 only contributes literal 1,
        // which the clause already contains.
        let mut arena = ClauseArena::default();
        let c0 = arena.alloc(&[lit(2), lit(1)], false).unwrap();
        let c1 = arena.alloc(&[lit(4), lit(-3), lit(-2)], false).unwrap();
        let c2 = arena.alloc(&[lit(5), lit(-4), lit(1)], false).unwrap();
        let c3 = arena.alloc(&[lit(-5), lit(-4), lit(-2)], false).unwrap();

        let mut assignment = Assignment::new(5);
        let mut trail = Trail::new(5);
        trail.new_decision_level();
        trail.push(lit(-1), Reason::Decision, &mut assignment);
        trail.push(lit(2), Reason::Clause(c0), &mut assignment);
        trail.new_decision_level();
        trail.push(lit(3), Reason::Decision, &mut assignment);
        trail.push(lit(4), Reason::Clause(c1), &mut assignment);
        trail.push(lit(5), Reason::Clause(c2), &mut assignment);

        let mut analyser = Analyser::new(5);
        let plain = analyser.analyse(&arena, &trail, c3, CcminMode::None);
        assert_eq!(plain.learnt[0], lit(-4));
        assert!(plain.learnt.contains(&lit(-2)));
        assert!(plain.learnt.contains(&lit(1)));

        let minimised = analyser.analyse(&arena, &trail, c3, CcminMode::Basic);
        assert_eq!(minimised.learnt[0], lit(-4));
        assert!(!minimised.learnt.contains(&lit(-2)));
        assert!(minimised.learnt.contains(&lit(1)));
        assert_eq!(minimised.backtrack_level, 1);

        let deep = analyser.analyse(&arena, &trail, c3, CcminMode::Deep);
        assert_eq!(deep.learnt, minimised.learnt);
    }

    #[test]
    fn test_analyse_final_traces_to_assumptions() {
        // assumption -1 @1 forces -2 via c0 = (-2 v 1); asking why 2 fails
        // must point back at the assumption.
        let mut arena = ClauseArena::default();
        let c0 = arena.alloc(&[lit(-2), lit(1)], false).unwrap();

        let mut assignment = Assignment::new(2);
        let mut trail = Trail::new(2);
        trail.new_decision_level();
        trail.push(lit(-1), Reason::Decision, &mut assignment);
        trail.push(lit(-2), Reason::Clause(c0), &mut assignment);

        let mut analyser = Analyser::new(2);
        let conflict = analyser.analyse_final(&arena, &trail, lit(2));
        assert!(conflict.contains(&lit(2)));
        assert!(conflict.contains(&lit(1)));
    }
}
