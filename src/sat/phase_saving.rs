#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Layered polarity selection.
//!
//! When a variable is branched on, its polarity is chosen from the first
//! applicable layer: the phase saved when the variable was last unassigned,
//! then the caller-supplied preference from variable creation, then the
//! circuit-derived initial hint, then the configured default.

use crate::sat::config::SolverConfig;
use crate::sat::literal::{Literal, Variable};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SavedPhases {
    saved: Vec<Option<bool>>,
    user: Vec<Option<bool>>,
    hint: Vec<Option<bool>>,
    default_polarity: bool,
}

impl SavedPhases {
    #[must_use]
    pub fn new(n_vars: usize, config: &SolverConfig) -> Self {
        Self {
            saved: vec![None; n_vars],
            user: vec![None; n_vars],
            hint: vec![None; n_vars],
            default_polarity: config.default_polarity,
        }
    }

    pub fn grow_to(&mut self, n_vars: usize) {
        if n_vars > self.saved.len() {
            self.saved.resize(n_vars, None);
            self.user.resize(n_vars, None);
            self.hint.resize(n_vars, None);
        }
    }

    /// Records the value a variable held when it was backtracked away.
    pub fn save(&mut self, lit: Literal) {
        self.saved[lit.variable() as usize] = Some(lit.polarity());
    }

    #[must_use]
    pub fn saved(&self, var: Variable) -> Option<bool> {
        self.saved[var as usize]
    }

    pub fn set_user_preference(&mut self, var: Variable, polarity: Option<bool>) {
        self.user[var as usize] = polarity;
    }

    /// Installs the circuit-derived initial polarity for a variable.
    pub fn set_hint(&mut self, var: Variable, polarity: bool) {
        self.hint[var as usize] = Some(polarity);
    }

    /// Forgets all saved phases; used when the heuristic regime switches
    /// with `reset_polarity_on_switch` set.
    pub fn reset_saved(&mut self) {
        for p in &mut self.saved {
            *p = None;
        }
    }

    /// Polarity to branch with for `var`.
    #[must_use]
    pub fn next_polarity(&self, var: Variable) -> bool {
        let i = var as usize;
        self.saved[i]
            .or(self.user[i])
            .or(self.hint[i])
            .unwrap_or(self.default_polarity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phases() -> SavedPhases {
        SavedPhases::new(3, &SolverConfig::default())
    }

    #[test]
    fn test_default_when_nothing_known() {
        let p = phases();
        assert!(!p.next_polarity(0));
    }

    #[test]
    fn test_layer_precedence() {
        let mut p = phases();
        p.set_hint(0, true);
        assert!(p.next_polarity(0));

        p.set_user_preference(0, Some(false));
        assert!(!p.next_polarity(0));

        p.save(Literal::new(0, true));
        assert!(p.next_polarity(0));
    }

    #[test]
    fn test_reset_restores_lower_layers() {
        let mut p = phases();
        p.set_hint(1, true);
        p.save(Literal::new(1, false));
        assert!(!p.next_polarity(1));

        p.reset_saved();
        assert!(p.next_polarity(1));
    }
}
