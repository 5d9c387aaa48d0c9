#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Variables and literals.
//!
//! A variable is a dense integer identity in `[0, n_vars)`. A literal packs
//! a variable together with a sign bit as `var << 1 | negated`, so the two
//! literals of a variable occupy adjacent codes and per-literal tables can
//! be indexed directly.

use core::ops::Not;
use std::fmt;

pub type Variable = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Literal(u32);

impl Literal {
    #[must_use]
    pub const fn new(var: Variable, polarity: bool) -> Self {
        Self(var << 1 | !polarity as u32)
    }

    #[must_use]
    pub const fn variable(self) -> Variable {
        self.0 >> 1
    }

    /// `true` for the positive literal of the variable.
    #[must_use]
    pub const fn polarity(self) -> bool {
        self.0 & 1 == 0
    }

    #[must_use]
    pub const fn is_negated(self) -> bool {
        self.0 & 1 != 0
    }

    #[must_use]
    pub const fn negated(self) -> Self {
        Self(self.0 ^ 1)
    }

    /// Dense index usable for per-literal tables (watch lists).
    #[must_use]
    pub const fn code(self) -> usize {
        self.0 as usize
    }

    /// Maps a DIMACS-style signed integer onto a literal; variable `n` in
    /// the textual format becomes variable `n - 1` here.
    ///
    /// # Panics
    /// Panics if `value` is zero (the DIMACS clause terminator is not a
    /// literal).
    #[must_use]
    pub fn from_dimacs(value: i32) -> Self {
        assert_ne!(value, 0, "0 is not a literal");
        Self::new(value.unsigned_abs() - 1, value.is_positive())
    }

    #[must_use]
    pub const fn to_dimacs(self) -> i32 {
        let v = self.variable() as i32 + 1;
        if self.is_negated() {
            -v
        } else {
            v
        }
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negation() {
        let l = Literal::new(3, true);
        assert_eq!(!l, Literal::new(3, false));
        assert_eq!(!!l, l);
        assert!(l.polarity());
        assert!((!l).is_negated());
    }

    #[test]
    fn test_codes_adjacent() {
        let p = Literal::new(7, true);
        assert_eq!(p.code(), 14);
        assert_eq!((!p).code(), 15);
        assert_eq!(p.variable(), 7);
    }

    #[test]
    fn test_dimacs_round_trip() {
        assert_eq!(Literal::from_dimacs(1), Literal::new(0, true));
        assert_eq!(Literal::from_dimacs(-4), Literal::new(3, false));
        assert_eq!(Literal::from_dimacs(-4).to_dimacs(), -4);
    }
}
