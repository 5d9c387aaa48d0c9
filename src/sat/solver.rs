#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The CDCL decision procedure.
//!
//! One mutable [`Solver`] owns every component: assignment, trail, clause
//! arena, watch index, heuristic state and the restart/reduction
//! controllers. The search loop drives unit propagation to closure, learns
//! a clause from every conflict, backjumps, and branches by activity order
//! with circuit-aware overrides during the initial circuit-SAT phase.

use crate::sat::assignment::Assignment;
use crate::sat::circuit::CircuitGraph;
use crate::sat::clause::{ClauseArena, ClauseRef};
use crate::sat::clause_management::Reducer;
use crate::sat::config::{BackpropVariant, SolverConfig};
use crate::sat::conflict_analysis::Analyser;
use crate::sat::error::SolverError;
use crate::sat::literal::{Literal, Variable};
use crate::sat::phase_saving::SavedPhases;
use crate::sat::restarter::Restarter;
use crate::sat::trail::{Reason, Trail};
use crate::sat::variable_selection::Vsids;
use crate::sat::watch::{Watcher, Watches};
use rustc_hash::FxHashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Outcome of a `solve` call. `Indeterminate` is reported for interruption
/// and resource exhaustion; it is never silently collapsed into
/// `Unsatisfiable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Satisfiable,
    Unsatisfiable,
    Indeterminate,
}

/// Which decision heuristic is currently driving branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeuristicMode {
    /// Initial circuit-SAT phase: static structural order.
    Csat,
    /// Standard activity order.
    Activity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub conflicts: u64,
    pub decisions: u64,
    pub propagations: u64,
    pub restarts: u64,
    pub learnts_removed: u64,
    pub arena_collections: u64,
}

#[derive(Debug, Clone)]
pub struct Solver {
    config: SolverConfig,
    arena: ClauseArena,
    /// Original clauses; never removed.
    clauses: Vec<ClauseRef>,
    learnts: Vec<ClauseRef>,
    watches: Watches,
    assignment: Assignment,
    trail: Trail,
    order: Vsids,
    phases: SavedPhases,
    analyser: Analyser,
    reducer: Reducer,
    restarter: Restarter,
    graph: Option<CircuitGraph>,
    graph_stale: bool,
    mode: HeuristicMode,
    n_vars: usize,
    /// `false` once unsatisfiability has been established at level 0.
    ok: bool,
    assumptions: Vec<Literal>,
    conflict: Vec<Literal>,
    model: Vec<bool>,
    interrupt: Arc<AtomicBool>,
    stats: Stats,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl Solver {
    #[must_use]
    pub fn new(config: SolverConfig) -> Self {
        let mode = if config.csat_start {
            HeuristicMode::Csat
        } else {
            HeuristicMode::Activity
        };
        let rfirst = if mode == HeuristicMode::Csat {
            config.rfirst_csat
        } else {
            config.rfirst
        };

        Self {
            arena: ClauseArena::default(),
            clauses: Vec::new(),
            learnts: Vec::new(),
            watches: Watches::new(0),
            assignment: Assignment::new(0),
            trail: Trail::new(0),
            order: Vsids::new(0, config.var_decay),
            phases: SavedPhases::new(0, &config),
            analyser: Analyser::new(0),
            reducer: Reducer::new(config.clause_decay),
            restarter: Restarter::new(rfirst),
            graph: None,
            graph_stale: false,
            mode,
            n_vars: 0,
            ok: true,
            assumptions: Vec::new(),
            conflict: Vec::new(),
            model: Vec::new(),
            interrupt: Arc::new(AtomicBool::new(false)),
            stats: Stats::default(),
            config,
        }
    }

    /// Allocates a fresh variable, optionally with a branching-polarity
    /// preference that sits between saved phases and the circuit hint.
    pub fn new_var(&mut self, polarity_preference: Option<bool>) -> Variable {
        let var = self.n_vars as Variable;
        self.n_vars += 1;
        self.assignment.grow_to(self.n_vars);
        self.trail.grow_to(self.n_vars);
        self.watches.grow_to(self.n_vars);
        self.order.grow_to(self.n_vars);
        self.phases.grow_to(self.n_vars);
        self.analyser.grow_to(self.n_vars);
        self.phases.set_user_preference(var, polarity_preference);
        self.graph_stale = true;
        var
    }

    #[must_use]
    pub const fn num_vars(&self) -> usize {
        self.n_vars
    }

    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn num_learnts(&self) -> usize {
        self.learnts.len()
    }

    #[must_use]
    pub const fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Whether the circuit-SAT start heuristic is still driving branching.
    /// Becomes false permanently once the activity hand-over fires.
    #[must_use]
    pub fn in_csat_mode(&self) -> bool {
        self.mode == HeuristicMode::Csat
    }

    /// Restarts as counted by the Luby scheduler. Unlike
    /// [`Stats::restarts`] this is rewound to zero when the heuristic
    /// switch is configured to reset the restart sequence.
    #[must_use]
    pub const fn scheduled_restarts(&self) -> u64 {
        self.restarter.num_restarts()
    }

    /// The full model found by the last `solve` call that returned
    /// [`Verdict::Satisfiable`]; empty otherwise. Indexed by variable.
    #[must_use]
    pub fn model(&self) -> &[bool] {
        &self.model
    }

    /// Negations of the assumption subset responsible for the last
    /// [`Verdict::Unsatisfiable`] answer under non-empty assumptions.
    #[must_use]
    pub fn failed_assumptions(&self) -> &[Literal] {
        &self.conflict
    }

    /// Shared cancellation token; setting it makes the running (or next)
    /// `solve` return [`Verdict::Indeterminate`] at its next loop
    /// iteration.
    #[must_use]
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    pub fn interrupt(&self) {
        self.interrupt.store(true, Ordering::Relaxed);
    }

    pub fn clear_interrupt(&self) {
        self.interrupt.store(false, Ordering::Relaxed);
    }

    /// Adds a clause over existing variables. Returns `Ok(false)` when the
    /// clause is trivially false under the top-level assignment, at which
    /// point the instance is unsatisfiable.
    ///
    /// # Errors
    /// [`SolverError::UnknownVariable`] for out-of-range literals,
    /// [`SolverError::OutOfMemory`] when clause storage cannot grow.
    pub fn add_clause(&mut self, literals: &[Literal]) -> Result<bool, SolverError> {
        debug_assert_eq!(self.trail.decision_level(), 0);
        for lit in literals {
            if lit.variable() as usize >= self.n_vars {
                return Err(SolverError::UnknownVariable(lit.variable()));
            }
        }
        if !self.ok {
            return Ok(false);
        }

        // sort so duplicates and complementary pairs become adjacent
        let mut lits = literals.to_vec();
        lits.sort_unstable();
        lits.dedup();
        if lits.windows(2).any(|w| w[0] == !w[1]) {
            return Ok(true);
        }
        // drop literals already false at level 0; satisfied clauses are
        // not stored at all
        if lits
            .iter()
            .any(|&l| self.assignment.literal_value(l) == Some(true))
        {
            return Ok(true);
        }
        lits.retain(|&l| self.assignment.literal_value(l).is_none());

        match lits.len() {
            0 => {
                self.ok = false;
                Ok(false)
            }
            1 => {
                self.trail
                    .push(lits[0], Reason::Decision, &mut self.assignment);
                if self.propagate().is_some() {
                    self.ok = false;
                    return Ok(false);
                }
                Ok(true)
            }
            _ => {
                let cref = self.arena.alloc(&lits, false)?;
                self.clauses.push(cref);
                self.watches.attach(cref, &lits);
                self.graph_stale = true;
                Ok(true)
            }
        }
    }

    /// Level-0 unit propagation and cleanup of satisfied learnt clauses.
    /// Returns `false` iff this alone proves unsatisfiability.
    pub fn simplify(&mut self) -> bool {
        debug_assert_eq!(self.trail.decision_level(), 0);
        if !self.ok {
            return false;
        }
        if self.propagate().is_some() {
            self.ok = false;
            return false;
        }

        let removals: Vec<ClauseRef> = self
            .learnts
            .iter()
            .copied()
            .filter(|&cref| {
                self.arena
                    .lits(cref)
                    .iter()
                    .any(|&l| self.assignment.literal_value(l) == Some(true))
            })
            .collect();
        for &cref in &removals {
            // a satisfied clause can still be the reason of a level-0
            // literal; drop the reference before deleting it
            let first = self.arena.lits(cref)[0];
            if self.trail.is_locked(cref, first, &self.assignment) {
                *self.trail.reason_mut(first.variable()) = Reason::Decision;
            }
            self.watches.detach(cref, self.arena.lits(cref));
            self.arena.delete(cref);
        }
        let removed: FxHashSet<ClauseRef> = removals.into_iter().collect();
        self.learnts.retain(|c| !removed.contains(c));

        self.maybe_collect_garbage();
        true
    }

    /// Decides satisfiability under temporary unit assumptions; the
    /// assumptions are dropped again when the call returns.
    ///
    /// # Panics
    /// Panics if an assumption references an unknown variable (caller
    /// contract, same as [`Solver::add_clause`]).
    pub fn solve(&mut self, assumptions: &[Literal]) -> Verdict {
        assert!(
            assumptions
                .iter()
                .all(|l| (l.variable() as usize) < self.n_vars),
            "assumption references unknown variable"
        );

        self.model.clear();
        self.conflict.clear();
        if !self.ok {
            return Verdict::Unsatisfiable;
        }

        self.assumptions = assumptions.to_vec();
        self.prepare_heuristics();
        self.reducer.init_budget(self.clauses.len());

        let verdict = self.search();

        self.trail.backtrack_to(
            0,
            &mut self.assignment,
            &mut self.phases,
            &mut self.order,
        );
        self.assumptions.clear();
        debug!(
            ?verdict,
            conflicts = self.stats.conflicts,
            restarts = self.stats.restarts,
            learnts = self.learnts.len(),
            "solve finished"
        );
        verdict
    }

    fn prepare_heuristics(&mut self) {
        let wants_graph = self.config.polarity_init
            || self.config.csat_start
            || self.config.backprop != BackpropVariant::Off;
        if wants_graph && (self.graph_stale || self.graph.is_none()) {
            let graph = CircuitGraph::build(&self.arena, &self.clauses, self.n_vars);
            if self.config.polarity_init {
                for var in 0..self.n_vars as Variable {
                    self.phases.set_hint(var, graph.polarity_hint(var));
                }
            }
            self.graph = Some(graph);
            self.graph_stale = false;
        }
        self.restarter.set_base(if self.mode == HeuristicMode::Csat {
            self.config.rfirst_csat
        } else {
            self.config.rfirst
        });
    }

    /// The main CDCL loop; see the state machine in the module docs.
    fn search(&mut self) -> Verdict {
        loop {
            // checked once per cycle, never mid-propagation
            if self.interrupt.load(Ordering::Relaxed) {
                return Verdict::Indeterminate;
            }

            if let Some(confl) = self.propagate() {
                self.stats.conflicts += 1;
                if self.trail.decision_level() == 0 {
                    self.ok = false;
                    return Verdict::Unsatisfiable;
                }
                if !self.handle_conflict(confl) {
                    return Verdict::Indeterminate;
                }
                if self.restarter.on_conflict() {
                    self.restart();
                }
            } else {
                if self
                    .reducer
                    .should_reduce(self.learnts.len(), self.trail.len())
                {
                    self.reduce_db();
                }

                match self.next_branch() {
                    Branch::Decide(lit) => {
                        self.trail.new_decision_level();
                        self.trail.push(lit, Reason::Decision, &mut self.assignment);
                    }
                    Branch::AllAssigned => {
                        self.model = self.assignment.model();
                        return Verdict::Satisfiable;
                    }
                    Branch::FailedAssumption(p) => {
                        self.conflict =
                            self.analyser.analyse_final(&self.arena, &self.trail, p);
                        return Verdict::Unsatisfiable;
                    }
                }
            }
        }
    }

    /// Learns from a conflict and backjumps. Returns `false` only when the
    /// learnt clause could not be stored.
    fn handle_conflict(&mut self, confl: ClauseRef) -> bool {
        let result =
            self.analyser
                .analyse(&self.arena, &self.trail, confl, self.config.ccmin_mode);

        for &cref in &result.bump_clauses {
            if self.arena.is_learnt(cref) {
                self.reducer.bump(&mut self.arena, cref);
            }
        }

        self.trail.backtrack_to(
            result.backtrack_level,
            &mut self.assignment,
            &mut self.phases,
            &mut self.order,
        );

        if result.learnt.len() == 1 {
            self.trail
                .push(result.learnt[0], Reason::Decision, &mut self.assignment);
        } else {
            let cref = match self.arena.alloc(&result.learnt, true) {
                Ok(cref) => cref,
                Err(e) => {
                    debug!(error = %e, "aborting search");
                    return false;
                }
            };
            self.learnts.push(cref);
            self.watches.attach(cref, &result.learnt);
            self.reducer.bump(&mut self.arena, cref);
            self.trail
                .push(result.learnt[0], Reason::Clause(cref), &mut self.assignment);
        }

        self.bump_involved(&result.bump_vars);
        self.order.decay();
        self.reducer.decay();
        true
    }

    /// Bumps the variables involved in a conflict and, when back-propagation
    /// is active, passes a damped share of activity to their circuit
    /// neighbours so conflicts near a gate pull its whole cone forward.
    fn bump_involved(&mut self, vars: &[Variable]) {
        for &var in vars {
            self.order.bump(var);
        }
        let Some(graph) = &self.graph else { return };
        let share = self.order.increment() * 0.5;
        match self.config.backprop {
            BackpropVariant::Off => {}
            BackpropVariant::Connectivity => {
                for &var in vars {
                    for &u in graph.neighbours(var) {
                        self.order.bump_by(u, share);
                    }
                }
            }
            BackpropVariant::Activity => {
                for &var in vars {
                    for &u in graph.neighbours(var) {
                        if self.order.activity(u) < self.order.activity(var) {
                            self.order.bump_by(u, share);
                        }
                    }
                }
            }
            BackpropVariant::PreferXor => {
                for &var in vars {
                    for &u in graph.neighbours(var) {
                        if graph.is_xor(u) {
                            self.order.bump_by(u, share);
                        }
                    }
                }
            }
        }
    }

    fn restart(&mut self) {
        self.restarter.restart();
        self.stats.restarts += 1;
        self.trail.backtrack_to(
            0,
            &mut self.assignment,
            &mut self.phases,
            &mut self.order,
        );
        debug!(restarts = self.restarter.num_restarts(), "restart");

        if self.mode == HeuristicMode::Csat
            && self.restarter.num_restarts() >= self.config.csat_restarts_before_switch
        {
            self.switch_to_activity_mode();
        }
    }

    /// Permanent hand-over from the circuit-SAT start heuristic to the
    /// standard activity order, applying the configured resets.
    fn switch_to_activity_mode(&mut self) {
        self.mode = HeuristicMode::Activity;
        debug!(
            reset_activity = self.config.reset_activity_on_switch,
            reset_polarity = self.config.reset_polarity_on_switch,
            reset_restarts = self.config.reset_restarts_on_switch,
            "switching to activity heuristic"
        );
        if self.config.reset_activity_on_switch {
            self.order.reset_activities();
        }
        if self.config.reset_polarity_on_switch {
            self.phases.reset_saved();
        }
        if self.config.reset_restarts_on_switch {
            self.restarter.reset();
        }
        self.restarter.set_base(self.config.rfirst);
    }

    /// Chooses the next step at quiescence: enqueue a pending assumption,
    /// branch on a fresh variable, or report the instance solved.
    fn next_branch(&mut self) -> Branch {
        while (self.trail.decision_level() as usize) < self.assumptions.len() {
            let p = self.assumptions[self.trail.decision_level() as usize];
            match self.assignment.literal_value(p) {
                // already holds; open a dummy level to keep the
                // level-to-assumption mapping aligned
                Some(true) => self.trail.new_decision_level(),
                Some(false) => return Branch::FailedAssumption(!p),
                None => return Branch::Decide(p),
            }
        }

        match self.pick_branch_var() {
            Some(var) => {
                self.stats.decisions += 1;
                Branch::Decide(Literal::new(var, self.phases.next_polarity(var)))
            }
            None => Branch::AllAssigned,
        }
    }

    fn pick_branch_var(&mut self) -> Option<Variable> {
        let var = match self.mode {
            HeuristicMode::Csat => {
                let graph = self.graph.as_ref()?;
                graph
                    .static_order()
                    .iter()
                    .copied()
                    .find(|&v| !self.assignment.is_assigned(v))?
            }
            HeuristicMode::Activity => loop {
                let v = self.order.pop_max()?;
                if !self.assignment.is_assigned(v) {
                    break v;
                }
            },
        };
        Some(self.backprop_bias(var))
    }

    /// Decision-time back-propagation: between a selected variable and its
    /// circuit neighbours, branch on the one the configured comparison
    /// prefers. The displaced variable goes back into the heap.
    fn backprop_bias(&mut self, var: Variable) -> Variable {
        let Some(graph) = &self.graph else { return var };
        if self.config.backprop == BackpropVariant::Off {
            return var;
        }

        let mut best = var;
        for &u in graph.neighbours(var) {
            if self.assignment.is_assigned(u) {
                continue;
            }
            let better = match self.config.backprop {
                BackpropVariant::Off => false,
                BackpropVariant::Connectivity => graph.degree(u) > graph.degree(best),
                BackpropVariant::Activity => self.order.activity(u) > self.order.activity(best),
                BackpropVariant::PreferXor => {
                    (graph.is_xor(u), graph.degree(u)) > (graph.is_xor(best), graph.degree(best))
                }
            };
            if better {
                best = u;
            }
        }

        if best != var && self.mode == HeuristicMode::Activity {
            self.order.insert(var);
        }
        best
    }

    /// Unit propagation to closure. Returns the conflicting clause, if any;
    /// otherwise no stored clause is falsified by the extended assignment.
    fn propagate(&mut self) -> Option<ClauseRef> {
        let mut conflict = None;

        'queue: while self.trail.qhead < self.trail.len() {
            let p = self.trail[self.trail.qhead];
            self.trail.qhead += 1;
            self.stats.propagations += 1;

            let mut ws = self.watches.take(p);
            let mut i = 0;
            while i < ws.len() {
                let blocker = ws[i].blocker;
                if self.assignment.literal_value(blocker) == Some(true) {
                    i += 1;
                    continue;
                }

                let cref = ws[i].clause;
                let false_lit = !p;
                let action = {
                    let lits = self.arena.lits_mut(cref);
                    if lits[0] == false_lit {
                        lits.swap(0, 1);
                    }
                    debug_assert_eq!(lits[1], false_lit);
                    let first = lits[0];

                    if first != blocker
                        && self.assignment.literal_value(first) == Some(true)
                    {
                        WatchAction::Satisfied(first)
                    } else {
                        let mut found = None;
                        for k in 2..lits.len() {
                            if self.assignment.literal_value(lits[k]) != Some(false) {
                                lits.swap(1, k);
                                found = Some(lits[1]);
                                break;
                            }
                        }
                        found.map_or(WatchAction::ForceFirst(first), |w| {
                            WatchAction::NewWatch(w, first)
                        })
                    }
                };

                match action {
                    WatchAction::Satisfied(first) => {
                        ws[i].blocker = first;
                        i += 1;
                    }
                    WatchAction::NewWatch(new_watch, first) => {
                        self.watches[!new_watch].push(Watcher {
                            clause: cref,
                            blocker: first,
                        });
                        ws.swap_remove(i);
                    }
                    WatchAction::ForceFirst(first) => {
                        ws[i].blocker = first;
                        i += 1;
                        match self.assignment.literal_value(first) {
                            Some(false) => {
                                // conflict: flush the queue and stop
                                conflict = Some(cref);
                                self.trail.qhead = self.trail.len();
                                self.watches.put_back(p, ws);
                                break 'queue;
                            }
                            None => {
                                self.trail.push(
                                    first,
                                    Reason::Clause(cref),
                                    &mut self.assignment,
                                );
                            }
                            Some(true) => unreachable!("handled as satisfied"),
                        }
                    }
                }
            }
            self.watches.put_back(p, ws);
        }

        conflict
    }

    /// Removes the lowest-activity half of the learnt database, keeping
    /// locked and binary clauses, then compacts the arena when enough
    /// space is wasted.
    fn reduce_db(&mut self) {
        let arena = &self.arena;
        let trail = &self.trail;
        let assignment = &self.assignment;
        let removals = self.reducer.plan_removals(arena, &self.learnts, |cref| {
            trail.is_locked(cref, arena.lits(cref)[0], assignment)
        });

        let removed: FxHashSet<ClauseRef> = removals.iter().copied().collect();
        for &cref in &removals {
            self.watches.detach(cref, self.arena.lits(cref));
            self.arena.delete(cref);
        }
        self.learnts.retain(|c| !removed.contains(c));

        self.reducer.on_reduced(removals.len());
        self.stats.learnts_removed = self.reducer.num_removed();
        debug!(
            removed = removals.len(),
            remaining = self.learnts.len(),
            "reduced learnt database"
        );

        self.maybe_collect_garbage();
    }

    fn maybe_collect_garbage(&mut self) {
        // compact once a fifth of the literal buffer is waste
        if self.arena.wasted() * 5 >= self.arena.lits_len() && self.arena.wasted() > 0 {
            self.collect_garbage();
        }
    }

    /// Moves all live clauses into a fresh arena and rewrites every clause
    /// handle — clause lists, trail reasons, watchers — in one pass.
    fn collect_garbage(&mut self) {
        let mut to = ClauseArena::with_capacity(self.arena.lits_len() - self.arena.wasted());

        let reason_vars: Vec<Variable> = self
            .trail
            .iter()
            .map(|&l| l.variable())
            .filter(|&v| matches!(self.trail.reason(v), Reason::Clause(_)))
            .collect();
        for var in reason_vars {
            if let Reason::Clause(mut cref) = self.trail.reason(var) {
                self.arena.reloc(&mut cref, &mut to);
                *self.trail.reason_mut(var) = Reason::Clause(cref);
            }
        }
        for cref in &mut self.clauses {
            self.arena.reloc(cref, &mut to);
        }
        for cref in &mut self.learnts {
            self.arena.reloc(cref, &mut to);
        }

        debug!(
            live = to.lits_len(),
            freed = self.arena.lits_len() - to.lits_len(),
            "collected clause arena"
        );
        self.stats.arena_collections += 1;
        self.arena = to;

        self.watches.clear_all();
        for &cref in self.clauses.iter().chain(&self.learnts) {
            self.watches.attach(cref, self.arena.lits(cref));
        }
    }
}

enum WatchAction {
    /// The other watched literal is true; cache it as the blocker.
    Satisfied(Literal),
    /// Found a replacement watch; move the watcher over.
    NewWatch(Literal, Literal),
    /// No replacement: the clause is unit or conflicting on its first
    /// literal.
    ForceFirst(Literal),
}

enum Branch {
    Decide(Literal),
    AllAssigned,
    FailedAssumption(Literal),
}
