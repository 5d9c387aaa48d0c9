#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Runtime solver configuration.
//!
//! Every heuristic knob is an explicit runtime value, so heuristic regimes
//! can be tested independently and combined without recompilation.

use clap::ValueEnum;
use std::fmt;

/// Strength of conflict-clause minimisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CcminMode {
    /// Keep the first-UIP clause as derived.
    None,
    /// Drop literals whose reason clause is already subsumed by the learnt
    /// clause.
    #[default]
    Basic,
    /// Recursive reason-walk elimination of redundant literals.
    Deep,
}

/// Back-propagation flavour used to bias branch-variable selection. A
/// tagged variant: the flavours are mutually exclusive by construction, so
/// the inconsistent combinations expressible in the original compile-time
/// switches cannot be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BackpropVariant {
    Off,
    /// Prefer the better-connected of two circuit-adjacent candidates.
    #[default]
    Connectivity,
    /// Compare candidates by activity score.
    Activity,
    /// Prefer candidates sitting in XOR-shaped substructures.
    PreferXor,
}

impl fmt::Display for CcminMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Basic => "basic",
            Self::Deep => "deep",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for BackpropVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Off => "off",
            Self::Connectivity => "connectivity",
            Self::Activity => "activity",
            Self::PreferXor => "prefer-xor",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    pub ccmin_mode: CcminMode,
    /// Polarity used when no saved phase, caller preference, or circuit
    /// hint applies.
    pub default_polarity: bool,
    /// Derive initial polarities from the clause structure instead of the
    /// uniform default.
    pub polarity_init: bool,
    pub backprop: BackpropVariant,
    /// Start with the circuit-SAT decision heuristic and switch to the
    /// activity order later.
    pub csat_start: bool,
    /// Number of restarts after which the circuit-SAT phase ends.
    pub csat_restarts_before_switch: u64,
    pub reset_activity_on_switch: bool,
    pub reset_polarity_on_switch: bool,
    pub reset_restarts_on_switch: bool,
    /// Base unit of the Luby restart schedule.
    pub rfirst: u64,
    /// Base unit while the circuit-SAT phase is active.
    pub rfirst_csat: u64,
    pub var_decay: f64,
    pub clause_decay: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            ccmin_mode: CcminMode::Basic,
            default_polarity: false,
            polarity_init: true,
            backprop: BackpropVariant::Connectivity,
            csat_start: true,
            csat_restarts_before_switch: 1,
            reset_activity_on_switch: true,
            reset_polarity_on_switch: false,
            reset_restarts_on_switch: true,
            rfirst: 100,
            rfirst_csat: 100,
            var_decay: 0.95,
            clause_decay: 0.999,
        }
    }
}

impl SolverConfig {
    /// A configuration with every circuit-aware heuristic disabled;
    /// classical CDCL behaviour.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            polarity_init: false,
            backprop: BackpropVariant::Off,
            csat_start: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_settings() {
        let c = SolverConfig::default();
        assert_eq!(c.ccmin_mode, CcminMode::Basic);
        assert_eq!(c.rfirst, 100);
        assert_eq!(c.rfirst_csat, 100);
        assert!(!c.default_polarity);
        assert!(c.csat_start);
        assert_eq!(c.csat_restarts_before_switch, 1);
        assert!(c.reset_activity_on_switch);
        assert!(!c.reset_polarity_on_switch);
    }

    #[test]
    fn test_plain_disables_circuit_heuristics() {
        let c = SolverConfig::plain();
        assert!(!c.csat_start);
        assert!(!c.polarity_init);
        assert_eq!(c.backprop, BackpropVariant::Off);
    }
}
