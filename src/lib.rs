#![warn(missing_docs)]
//! A circuit-aware CDCL SAT solver.
//!
//! The solver is a conflict-driven clause-learning engine in the MiniSat
//! tradition, extended with heuristics for formulas derived from logic
//! circuits: a structural start order, polarity initialisation from clause
//! occurrence balance, and activity back-propagation along gate adjacency.

/// The `sat` module implements the decision engine: clause storage, unit
/// propagation, conflict analysis, heuristics, and the search loop.
pub mod sat;

pub use sat::config::{BackpropVariant, CcminMode, SolverConfig};
pub use sat::error::SolverError;
pub use sat::literal::{Literal, Variable};
pub use sat::solver::{Solver, Verdict};
