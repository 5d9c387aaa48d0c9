#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Circuit structure recovered from the clause database.
//!
//! The engine never sees the original gate-level description, only its CNF
//! translation. For a Tseitin-style encoding the short clauses trace the
//! gate graph closely: variables co-occurring in clauses of up to three
//! literals are treated as circuit neighbours, occurrence polarity balance
//! approximates the signal polarity a variable prefers, and groups of four
//! or more ternary clauses over one variable triple are the footprint of an
//! XOR gate. The decision heuristics consume these approximations.

use crate::sat::clause::{ClauseArena, ClauseRef};
use crate::sat::literal::Variable;
use bit_vec::BitVec;
use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Neighbour lists are capped; a hub variable's first few short-clause
/// partners carry most of the structural signal.
const MAX_NEIGHBOURS: usize = 8;
/// Clauses longer than this do not contribute adjacency edges.
const GATE_CLAUSE_LEN: usize = 3;
/// A variable triple covered by at least this many ternary clauses is
/// treated as an XOR gate.
const XOR_CLAUSE_COUNT: u8 = 4;

#[derive(Debug, Clone, Default)]
pub struct CircuitGraph {
    pos_occs: Vec<u32>,
    neg_occs: Vec<u32>,
    score: Vec<f64>,
    neighbours: Vec<SmallVec<[Variable; MAX_NEIGHBOURS]>>,
    xor_mark: BitVec,
    /// Variables in descending score order; the circuit-SAT start
    /// heuristic walks this list.
    order: Vec<Variable>,
}

impl CircuitGraph {
    #[must_use]
    pub fn build(arena: &ClauseArena, clauses: &[ClauseRef], n_vars: usize) -> Self {
        let mut graph = Self {
            pos_occs: vec![0; n_vars],
            neg_occs: vec![0; n_vars],
            score: vec![0.0; n_vars],
            neighbours: vec![SmallVec::new(); n_vars],
            xor_mark: BitVec::from_elem(n_vars, false),
            order: Vec::with_capacity(n_vars),
        };

        let mut triples: FxHashMap<[Variable; 3], u8> = FxHashMap::default();

        for &cref in clauses {
            let lits = arena.lits(cref);
            let weight = (-(lits.len() as f64)).exp2();

            for &lit in lits {
                let var = lit.variable() as usize;
                if lit.polarity() {
                    graph.pos_occs[var] += 1;
                } else {
                    graph.neg_occs[var] += 1;
                }
                graph.score[var] += weight;
            }

            if lits.len() <= GATE_CLAUSE_LEN {
                for &a in lits {
                    for &b in lits {
                        if a.variable() != b.variable() {
                            graph.add_edge(a.variable(), b.variable());
                        }
                    }
                }
            }

            if lits.len() == 3 {
                let mut triple = [
                    lits[0].variable(),
                    lits[1].variable(),
                    lits[2].variable(),
                ];
                triple.sort_unstable();
                *triples.entry(triple).or_insert(0) += 1;
            }
        }

        for (triple, count) in &triples {
            if *count >= XOR_CLAUSE_COUNT {
                for &var in triple {
                    graph.xor_mark.set(var as usize, true);
                }
            }
        }

        graph.order = (0..n_vars as Variable).collect();
        graph
            .order
            .sort_unstable_by_key(|&v| OrderedFloat(-graph.score[v as usize]));
        graph
    }

    fn add_edge(&mut self, from: Variable, to: Variable) {
        let list = &mut self.neighbours[from as usize];
        if list.len() < MAX_NEIGHBOURS && !list.contains(&to) {
            list.push(to);
        }
    }

    /// Initial polarity hint: prefer the sign that satisfies the majority
    /// of the clauses the variable occurs in.
    #[must_use]
    pub fn polarity_hint(&self, var: Variable) -> bool {
        self.pos_occs[var as usize] >= self.neg_occs[var as usize]
    }

    /// Occurrence-weighted structural score (short clauses dominate).
    #[must_use]
    pub fn score(&self, var: Variable) -> f64 {
        self.score[var as usize]
    }

    /// Total occurrence count, the connectivity measure used by the plain
    /// back-propagation comparison.
    #[must_use]
    pub fn degree(&self, var: Variable) -> u32 {
        self.pos_occs[var as usize] + self.neg_occs[var as usize]
    }

    #[must_use]
    pub fn neighbours(&self, var: Variable) -> &[Variable] {
        &self.neighbours[var as usize]
    }

    #[must_use]
    pub fn is_xor(&self, var: Variable) -> bool {
        self.xor_mark.get(var as usize).unwrap_or(false)
    }

    /// Static decision order for the circuit-SAT start phase.
    #[must_use]
    pub fn static_order(&self) -> &[Variable] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::literal::Literal;

    fn arena_with(clauses: &[&[i32]]) -> (ClauseArena, Vec<ClauseRef>) {
        let mut arena = ClauseArena::default();
        let mut refs = Vec::new();
        for c in clauses {
            let lits: Vec<Literal> = c.iter().map(|&x| Literal::from_dimacs(x)).collect();
            refs.push(arena.alloc(&lits, false).unwrap());
        }
        (arena, refs)
    }

    #[test]
    fn test_occurrence_balance_drives_polarity_hint() {
        let (arena, refs) = arena_with(&[&[1, 2], &[1, -2], &[-2, 3]]);
        let graph = CircuitGraph::build(&arena, &refs, 3);
        assert!(graph.polarity_hint(0));
        assert!(!graph.polarity_hint(1));
    }

    #[test]
    fn test_neighbours_from_short_clauses_only() {
        let (arena, refs) = arena_with(&[&[1, 2], &[3, 4, 5, 6]]);
        let graph = CircuitGraph::build(&arena, &refs, 6);
        assert_eq!(graph.neighbours(0), &[1]);
        assert!(graph.neighbours(2).is_empty());
    }

    #[test]
    fn test_xor_footprint_detected() {
        // full CNF of x1 = x2 XOR x3: four ternary clauses over one triple
        let (arena, refs) = arena_with(&[
            &[-1, 2, 3],
            &[-1, -2, -3],
            &[1, -2, 3],
            &[1, 2, -3],
        ]);
        let graph = CircuitGraph::build(&arena, &refs, 3);
        assert!(graph.is_xor(0));
        assert!(graph.is_xor(1));
        assert!(graph.is_xor(2));
    }

    #[test]
    fn test_static_order_prefers_short_clause_variables() {
        let (arena, refs) = arena_with(&[&[1, 2], &[1, 2], &[3, 4, 5, 6]]);
        let graph = CircuitGraph::build(&arena, &refs, 6);
        let first = graph.static_order()[0];
        assert!(first == 0 || first == 1);
        assert!(graph.score(0) > graph.score(2));
    }
}
