#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The current (partial) truth assignment.

use crate::sat::literal::{Literal, Variable};
use std::ops::Index;

/// Tri-state value of a variable. `Unassigned` means the variable is not on
/// the trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, PartialOrd, Ord)]
pub enum VarState {
    #[default]
    Unassigned,
    Assigned(bool),
}

impl VarState {
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        !self.is_assigned()
    }
}

/// Dense per-variable value store with O(1) lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment {
    values: Vec<VarState>,
    assigned: usize,
}

impl Assignment {
    #[must_use]
    pub fn new(n_vars: usize) -> Self {
        Self {
            values: vec![VarState::Unassigned; n_vars],
            assigned: 0,
        }
    }

    pub fn grow_to(&mut self, n_vars: usize) {
        if n_vars > self.values.len() {
            self.values.resize(n_vars, VarState::Unassigned);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub const fn num_assigned(&self) -> usize {
        self.assigned
    }

    #[must_use]
    pub const fn all_assigned(&self) -> bool {
        self.assigned == self.values.len()
    }

    #[must_use]
    pub fn var_value(&self, var: Variable) -> Option<bool> {
        match self.values[var as usize] {
            VarState::Assigned(b) => Some(b),
            VarState::Unassigned => None,
        }
    }

    /// Value of a literal under the current assignment, `None` if its
    /// variable is unassigned.
    #[must_use]
    pub fn literal_value(&self, lit: Literal) -> Option<bool> {
        self.var_value(lit.variable())
            .map(|b| b ^ lit.is_negated())
    }

    #[must_use]
    pub fn is_assigned(&self, var: Variable) -> bool {
        self.values[var as usize].is_assigned()
    }

    /// Makes `lit` true. The variable must currently be unassigned.
    pub fn assign(&mut self, lit: Literal) {
        debug_assert!(!self.is_assigned(lit.variable()));
        self.values[lit.variable() as usize] = VarState::Assigned(lit.polarity());
        self.assigned += 1;
    }

    pub fn unassign(&mut self, var: Variable) {
        debug_assert!(self.is_assigned(var));
        self.values[var as usize] = VarState::Unassigned;
        self.assigned -= 1;
    }

    /// Snapshot of the full model; only meaningful once every variable is
    /// assigned.
    #[must_use]
    pub fn model(&self) -> Vec<bool> {
        self.values
            .iter()
            .map(|s| matches!(s, VarState::Assigned(true)))
            .collect()
    }
}

impl Index<Variable> for Assignment {
    type Output = VarState;

    fn index(&self, index: Variable) -> &Self::Output {
        &self.values[index as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_unassign() {
        let mut a = Assignment::new(3);
        assert!(!a.all_assigned());

        a.assign(Literal::new(1, false));
        assert_eq!(a.var_value(1), Some(false));
        assert_eq!(a.literal_value(Literal::new(1, false)), Some(true));
        assert_eq!(a.literal_value(Literal::new(1, true)), Some(false));
        assert_eq!(a.num_assigned(), 1);

        a.unassign(1);
        assert_eq!(a.var_value(1), None);
        assert_eq!(a.num_assigned(), 0);
    }

    #[test]
    fn test_model() {
        let mut a = Assignment::new(2);
        a.assign(Literal::new(0, true));
        a.assign(Literal::new(1, false));
        assert!(a.all_assigned());
        assert_eq!(a.model(), vec![true, false]);
    }
}
