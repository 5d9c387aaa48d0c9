#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
pub mod assignment;
pub mod circuit;
pub mod clause;
pub mod clause_management;
pub mod config;
pub mod conflict_analysis;
pub mod dimacs;
pub mod error;
pub mod literal;
pub mod phase_saving;
pub mod restarter;
pub mod solver;
pub mod trail;
pub mod variable_selection;
pub mod watch;
