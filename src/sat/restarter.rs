#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Luby-scheduled restarts.
//!
//! The conflict budget between restarts follows the Luby sequence
//! (1, 1, 2, 1, 1, 2, 4, ...) scaled by a base unit. The base is a runtime
//! value because the circuit-SAT start phase runs on its own base unit and
//! hands over to the standard one at the heuristic switch. A restart only
//! abandons the decision stack; it never touches the clause database.

/// The `i`-th element (0-based) of the Luby sequence.
#[must_use]
pub fn luby(mut i: u64) -> u64 {
    let mut size = 1u64;
    let mut seq = 0u32;
    while size < i + 1 {
        seq += 1;
        size = 2 * size + 1;
    }
    while size - 1 != i {
        size = (size - 1) / 2;
        seq -= 1;
        i %= size;
    }
    1 << seq
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restarter {
    base: u64,
    conflicts: u64,
    index: u64,
    limit: u64,
    restarts: u64,
}

impl Restarter {
    #[must_use]
    pub fn new(base: u64) -> Self {
        Self {
            base,
            conflicts: 0,
            index: 0,
            limit: luby(0) * base.max(1),
            restarts: 0,
        }
    }

    /// Registers one conflict; `true` when the current budget is spent and
    /// the search should restart.
    pub fn on_conflict(&mut self) -> bool {
        self.conflicts += 1;
        self.conflicts >= self.limit
    }

    /// Advances to the next Luby interval.
    pub fn restart(&mut self) {
        self.restarts += 1;
        self.index += 1;
        self.conflicts = 0;
        self.limit = luby(self.index) * self.base.max(1);
    }

    #[must_use]
    pub const fn num_restarts(&self) -> u64 {
        self.restarts
    }

    /// Switches the base unit without losing the position in the schedule.
    pub fn set_base(&mut self, base: u64) {
        self.base = base;
        self.limit = luby(self.index) * self.base.max(1);
    }

    /// Rewinds the schedule and the restart counter; used when the
    /// heuristic switch is configured to reset restarts.
    pub fn reset(&mut self) {
        self.conflicts = 0;
        self.index = 0;
        self.restarts = 0;
        self.limit = luby(0) * self.base.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luby_prefix() {
        let prefix: Vec<u64> = (0..15).map(luby).collect();
        assert_eq!(prefix, vec![1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8]);
    }

    #[test]
    fn test_budget_scales_with_base() {
        let mut r = Restarter::new(2);
        assert!(!r.on_conflict());
        assert!(r.on_conflict());
        r.restart();
        assert_eq!(r.num_restarts(), 1);
        // second interval is again luby(1) * base = 2
        assert!(!r.on_conflict());
        assert!(r.on_conflict());
        r.restart();
        // third interval is luby(2) * base = 4
        assert!(!r.on_conflict());
        assert!(!r.on_conflict());
        assert!(!r.on_conflict());
        assert!(r.on_conflict());
    }

    #[test]
    fn test_reset_rewinds_schedule() {
        let mut r = Restarter::new(1);
        while !r.on_conflict() {}
        r.restart();
        r.reset();
        assert_eq!(r.num_restarts(), 0);
        assert!(r.on_conflict());
    }
}
