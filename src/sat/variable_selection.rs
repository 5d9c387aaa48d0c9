#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Activity-ordered variable selection (VSIDS).
//!
//! Activities are bumped for variables involved in conflicts and decayed
//! multiplicatively by scaling the bump increment. An indexed binary
//! max-heap keeps the highest-activity unassigned variable reachable in
//! O(log n); backtracking re-inserts freed variables.

use crate::sat::literal::Variable;

const RESCALE_LIMIT: f64 = 1e100;

#[derive(Debug, Clone, PartialEq)]
pub struct Vsids {
    heap: Vec<Variable>,
    /// Position of each variable inside `heap`, `None` when absent.
    indices: Vec<Option<u32>>,
    activity: Vec<f64>,
    var_inc: f64,
    var_decay: f64,
}

impl Vsids {
    #[must_use]
    pub fn new(n_vars: usize, var_decay: f64) -> Self {
        let mut order = Self {
            heap: Vec::with_capacity(n_vars),
            indices: vec![None; n_vars],
            activity: vec![0.0; n_vars],
            var_inc: 1.0,
            var_decay,
        };
        for var in 0..n_vars as Variable {
            order.insert(var);
        }
        order
    }

    pub fn grow_to(&mut self, n_vars: usize) {
        while self.indices.len() < n_vars {
            self.indices.push(None);
            self.activity.push(0.0);
            self.insert(self.indices.len() as Variable - 1);
        }
    }

    #[must_use]
    pub fn activity(&self, var: Variable) -> f64 {
        self.activity[var as usize]
    }

    #[must_use]
    pub fn in_heap(&self, var: Variable) -> bool {
        self.indices[var as usize].is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Increases the activity of `var` by the current increment.
    pub fn bump(&mut self, var: Variable) {
        self.bump_by(var, self.var_inc);
    }

    /// Weighted bump, used by the back-propagation heuristic to pass a
    /// damped share of activity to circuit neighbours.
    pub fn bump_by(&mut self, var: Variable, amount: f64) {
        self.activity[var as usize] += amount;
        if self.activity[var as usize] > RESCALE_LIMIT {
            for a in &mut self.activity {
                *a *= 1.0 / RESCALE_LIMIT;
            }
            self.var_inc *= 1.0 / RESCALE_LIMIT;
        }
        if let Some(pos) = self.indices[var as usize] {
            self.sift_up(pos as usize);
        }
    }

    #[must_use]
    pub const fn increment(&self) -> f64 {
        self.var_inc
    }

    /// Decays all activities by inflating future bumps.
    pub fn decay(&mut self) {
        self.var_inc /= self.var_decay;
    }

    /// Wholesale reset of the activity state, used when the heuristic
    /// regime switches.
    pub fn reset_activities(&mut self) {
        for a in &mut self.activity {
            *a = 0.0;
        }
        self.var_inc = 1.0;
    }

    pub fn insert(&mut self, var: Variable) {
        if self.in_heap(var) {
            return;
        }
        self.heap.push(var);
        let pos = self.heap.len() - 1;
        self.indices[var as usize] = Some(pos as u32);
        self.sift_up(pos);
    }

    /// Removes and returns the highest-activity variable in the heap. The
    /// caller filters out variables that are already assigned.
    pub fn pop_max(&mut self) -> Option<Variable> {
        let top = *self.heap.first()?;
        let last = self.heap.pop().filter(|_| !self.heap.is_empty());
        self.indices[top as usize] = None;
        if let Some(last) = last {
            self.heap[0] = last;
            self.indices[last as usize] = Some(0);
            self.sift_down(0);
        }
        Some(top)
    }

    fn before(&self, a: Variable, b: Variable) -> bool {
        self.activity[a as usize] > self.activity[b as usize]
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.before(self.heap[pos], self.heap[parent]) {
                self.swap(pos, parent);
                pos = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        loop {
            let left = 2 * pos + 1;
            if left >= self.heap.len() {
                break;
            }
            let right = left + 1;
            let child = if right < self.heap.len() && self.before(self.heap[right], self.heap[left]) {
                right
            } else {
                left
            };
            if self.before(self.heap[child], self.heap[pos]) {
                self.swap(pos, child);
                pos = child;
            } else {
                break;
            }
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.indices[self.heap[a] as usize] = Some(a as u32);
        self.indices[self.heap[b] as usize] = Some(b as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_order_follows_activity() {
        let mut order = Vsids::new(4, 0.95);
        order.bump(2);
        order.bump(2);
        order.bump(0);

        assert_eq!(order.pop_max(), Some(2));
        assert_eq!(order.pop_max(), Some(0));
        let rest = [order.pop_max(), order.pop_max()];
        assert!(rest.contains(&Some(1)) && rest.contains(&Some(3)));
        assert_eq!(order.pop_max(), None);
    }

    #[test]
    fn test_reinsert_after_pop() {
        let mut order = Vsids::new(2, 0.95);
        let first = order.pop_max().unwrap();
        assert!(!order.in_heap(first));
        order.insert(first);
        assert!(order.in_heap(first));
    }

    #[test]
    fn test_decay_inflates_later_bumps() {
        let mut order = Vsids::new(2, 0.5);
        order.bump(0);
        order.decay();
        order.bump(1);
        assert!(order.activity(1) > order.activity(0));
    }

    #[test]
    fn test_rescale_keeps_relative_order() {
        let mut order = Vsids::new(2, 0.95);
        order.bump_by(0, RESCALE_LIMIT * 2.0);
        order.bump(1);
        assert!(order.activity(0) > order.activity(1));
        assert!(order.activity(0) < RESCALE_LIMIT);
    }

    #[test]
    fn test_reset_activities() {
        let mut order = Vsids::new(3, 0.95);
        order.bump(1);
        order.reset_activities();
        assert!((order.activity(1) - 0.0).abs() < f64::EPSILON);
        assert!((order.increment() - 1.0).abs() < f64::EPSILON);
    }
}
