#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! DIMACS CNF reader.
//!
//! Kept outside the engine contract: the solver consumes clauses through
//! `add_clause` and knows nothing about the textual format. Comment (`c`)
//! and problem (`p`) lines are skipped, a `%` line ends the data, every
//! other line is a whitespace-separated clause terminated by `0`. The
//! variable count is taken from the problem line when present and widened
//! to the largest variable actually used.

use itertools::Itertools;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: '{token}' is not a literal")]
    BadLiteral { line: usize, token: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DimacsFormula {
    pub num_vars: usize,
    pub clauses: Vec<Vec<i32>>,
}

/// Parses DIMACS CNF data from a buffered reader.
///
/// # Errors
/// Fails on I/O errors and on clause tokens that are not integers.
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<DimacsFormula, DimacsError> {
    let mut formula = DimacsFormula::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let mut parts = line.split_whitespace().peekable();

        match parts.peek() {
            None | Some(&"c") => {}
            Some(&"%") => break,
            Some(&"p") => {
                // "p cnf <vars> <clauses>"; clause count is advisory
                if let Some(vars) = parts.nth(2).and_then(|s| s.parse::<usize>().ok()) {
                    formula.num_vars = formula.num_vars.max(vars);
                }
            }
            Some(_) => {
                let literals: Vec<i32> = parts
                    .map(|token| {
                        token.parse::<i32>().map_err(|_| DimacsError::BadLiteral {
                            line: line_no + 1,
                            token: token.to_owned(),
                        })
                    })
                    .filter_ok(|&l| l != 0)
                    .try_collect()?;

                for &l in &literals {
                    formula.num_vars = formula.num_vars.max(l.unsigned_abs() as usize);
                }
                if !line.split_whitespace().next_back().is_some_and(|t| t == "0")
                    && literals.is_empty()
                {
                    continue;
                }
                formula.clauses.push(literals);
            }
        }
    }

    Ok(formula)
}

/// Parses a DIMACS CNF file.
///
/// # Errors
/// Fails when the file cannot be opened or parsed.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<DimacsFormula, DimacsError> {
    parse_dimacs(BufReader::new(File::open(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let input = "c a comment\np cnf 3 2\n1 -2 0\n2 3 0\n";
        let formula = parse_dimacs(input.as_bytes()).unwrap();
        assert_eq!(formula.num_vars, 3);
        assert_eq!(formula.clauses, vec![vec![1, -2], vec![2, 3]]);
    }

    #[test]
    fn test_widens_var_count_beyond_header() {
        let input = "p cnf 2 1\n1 -5 0\n";
        let formula = parse_dimacs(input.as_bytes()).unwrap();
        assert_eq!(formula.num_vars, 5);
    }

    #[test]
    fn test_percent_terminates() {
        let input = "1 0\n%\n2 0\n";
        let formula = parse_dimacs(input.as_bytes()).unwrap();
        assert_eq!(formula.clauses, vec![vec![1]]);
    }

    #[test]
    fn test_empty_clause_is_kept() {
        let input = "1 2 0\n0\n";
        let formula = parse_dimacs(input.as_bytes()).unwrap();
        assert_eq!(formula.clauses.len(), 2);
        assert!(formula.clauses[1].is_empty());
    }

    #[test]
    fn test_bad_literal_is_reported() {
        let err = parse_dimacs("1 x 0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DimacsError::BadLiteral { line: 1, .. }));
    }
}
