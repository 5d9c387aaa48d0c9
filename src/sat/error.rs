#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Error taxonomy of the engine boundary.
//!
//! Proven unsatisfiability is a result, not an error, and is reported
//! through [`crate::sat::solver::Verdict`]. Errors cover caller contract
//! violations and resource exhaustion only.

use crate::sat::literal::Variable;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// A clause referenced a variable that was never allocated through
    /// `new_var`.
    #[error("literal references unknown variable {0}")]
    UnknownVariable(Variable),

    /// Clause or watch storage could not grow. The solver state stays
    /// valid; the current solve reports an indeterminate verdict.
    #[error("clause storage exhausted")]
    OutOfMemory,
}
