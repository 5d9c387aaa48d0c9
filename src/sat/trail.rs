#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Chronological record of literal assignments.
//!
//! Each assigned literal carries its decision level and, for propagated
//! literals, the clause that forced it. Decision-level boundaries are kept
//! as indices into the trail so a backjump is a single truncation.

use crate::sat::assignment::Assignment;
use crate::sat::clause::ClauseRef;
use crate::sat::literal::{Literal, Variable};
use crate::sat::phase_saving::SavedPhases;
use crate::sat::variable_selection::Vsids;
use std::ops::Index;

/// Why a literal is on the trail. Decisions have no antecedent clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reason {
    #[default]
    Decision,
    Clause(ClauseRef),
}

#[derive(Debug, Clone, Default)]
pub struct Trail {
    trail: Vec<Literal>,
    /// Trail length at the start of each decision level; `lim.len()` is the
    /// current decision level.
    lim: Vec<usize>,
    /// Next trail position the propagator has not processed yet.
    pub qhead: usize,
    level: Vec<u32>,
    reason: Vec<Reason>,
}

impl Trail {
    #[must_use]
    pub fn new(n_vars: usize) -> Self {
        Self {
            trail: Vec::with_capacity(n_vars),
            lim: Vec::new(),
            qhead: 0,
            level: vec![0; n_vars],
            reason: vec![Reason::Decision; n_vars],
        }
    }

    pub fn grow_to(&mut self, n_vars: usize) {
        if n_vars > self.level.len() {
            self.level.resize(n_vars, 0);
            self.reason.resize(n_vars, Reason::Decision);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.trail.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trail.is_empty()
    }

    #[must_use]
    pub fn decision_level(&self) -> u32 {
        self.lim.len() as u32
    }

    #[must_use]
    pub fn level(&self, var: Variable) -> u32 {
        self.level[var as usize]
    }

    #[must_use]
    pub fn reason(&self, var: Variable) -> Reason {
        self.reason[var as usize]
    }

    pub fn reason_mut(&mut self, var: Variable) -> &mut Reason {
        &mut self.reason[var as usize]
    }

    /// Whether `cref` is the reason of some current assignment; such a
    /// clause must not be removed.
    #[must_use]
    pub fn is_locked(&self, cref: ClauseRef, first_lit: Literal, assignment: &Assignment) -> bool {
        self.reason(first_lit.variable()) == Reason::Clause(cref)
            && assignment.literal_value(first_lit) == Some(true)
    }

    pub fn new_decision_level(&mut self) {
        self.lim.push(self.trail.len());
    }

    /// Trail position at which `level` starts.
    #[must_use]
    pub fn level_start(&self, level: u32) -> usize {
        if level == 0 {
            0
        } else {
            self.lim[level as usize - 1]
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.trail.iter()
    }

    /// Puts `lit` on the trail and makes it true. The caller has already
    /// checked that the variable is unassigned.
    pub fn push(&mut self, lit: Literal, reason: Reason, assignment: &mut Assignment) {
        let var = lit.variable() as usize;
        assignment.assign(lit);
        self.level[var] = self.decision_level();
        self.reason[var] = reason;
        self.trail.push(lit);
    }

    /// Undoes every assignment above `target_level`, saving phases and
    /// re-inserting the freed variables into the activity order.
    pub fn backtrack_to(
        &mut self,
        target_level: u32,
        assignment: &mut Assignment,
        phases: &mut SavedPhases,
        order: &mut Vsids,
    ) {
        if self.decision_level() <= target_level {
            return;
        }

        let keep = self.lim[target_level as usize];
        for &lit in self.trail[keep..].iter().rev() {
            let var = lit.variable();
            phases.save(lit);
            assignment.unassign(var);
            self.reason[var as usize] = Reason::Decision;
            order.insert(var);
        }
        self.trail.truncate(keep);
        self.lim.truncate(target_level as usize);
        self.qhead = keep;
    }
}

impl Index<usize> for Trail {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.trail[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::config::SolverConfig;

    #[test]
    fn test_push_levels() {
        let mut trail = Trail::new(4);
        let mut assignment = Assignment::new(4);

        trail.push(Literal::new(0, true), Reason::Decision, &mut assignment);
        trail.new_decision_level();
        trail.push(Literal::new(1, false), Reason::Decision, &mut assignment);

        assert_eq!(trail.decision_level(), 1);
        assert_eq!(trail.level(0), 0);
        assert_eq!(trail.level(1), 1);
        assert_eq!(trail.len(), 2);
    }

    #[test]
    fn test_backtrack_unassigns_above_level() {
        let config = SolverConfig::default();
        let mut trail = Trail::new(4);
        let mut assignment = Assignment::new(4);
        let mut phases = SavedPhases::new(4, &config);
        let mut order = Vsids::new(4, config.var_decay);

        trail.push(Literal::new(0, true), Reason::Decision, &mut assignment);
        trail.new_decision_level();
        trail.push(Literal::new(1, true), Reason::Decision, &mut assignment);
        trail.new_decision_level();
        trail.push(Literal::new(2, false), Reason::Decision, &mut assignment);

        trail.backtrack_to(1, &mut assignment, &mut phases, &mut order);

        assert_eq!(trail.decision_level(), 1);
        assert_eq!(trail.len(), 2);
        assert!(assignment.is_assigned(0));
        assert!(assignment.is_assigned(1));
        assert!(!assignment.is_assigned(2));
        // the saved phase remembers the undone value
        assert_eq!(phases.saved(2), Some(false));
    }
}
