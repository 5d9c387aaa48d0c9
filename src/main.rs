//! # circsat
//!
//! `circsat` is a command-line SAT solver for DIMACS CNF files, built
//! around a CDCL engine with heuristics for circuit-derived formulas:
//! a structural start order, occurrence-based polarity initialisation,
//! and activity back-propagation along gate adjacency.
//!
//! ## Usage
//!
//! ```sh
//! circsat problem.cnf
//! circsat problem.cnf --backprop prefer-xor --ccmin deep
//! circsat problem.cnf --plain          # classical CDCL, no circuit heuristics
//! ```
//!
//! The exit code follows the SAT-competition convention: 10 for
//! satisfiable, 20 for unsatisfiable, 0 when no answer was determined.

use circsat::sat::config::{BackpropVariant, CcminMode, SolverConfig};
use circsat::sat::dimacs::{parse_file, DimacsFormula};
use circsat::sat::literal::Literal;
use circsat::sat::solver::{Solver, Verdict};
use clap::Parser;
use itertools::Itertools;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Defines the command-line interface, parsed with `clap`.
#[derive(Parser, Debug)]
#[command(name = "circsat", version, about = "A circuit-aware CDCL SAT solver")]
struct Cli {
    /// Path to the DIMACS .cnf file to solve.
    path: String,

    /// Enable debug-level log output on stderr.
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Conflict-clause minimisation mode.
    #[arg(long, value_enum, default_value_t = CcminMode::Basic)]
    ccmin: CcminMode,

    /// Back-propagation variant used by the circuit heuristics.
    #[arg(long, value_enum, default_value_t = BackpropVariant::Connectivity)]
    backprop: BackpropVariant,

    /// Disable the circuit-SAT start heuristic; branch by activity from
    /// the first decision.
    #[arg(long, default_value_t = false)]
    no_csat_start: bool,

    /// Disable polarity initialisation from clause occurrence balance.
    #[arg(long, default_value_t = false)]
    no_polarity_init: bool,

    /// Number of restarts after which the start heuristic hands over to
    /// the activity order.
    #[arg(long, default_value_t = 1)]
    switch_after: u64,

    /// Base unit of the Luby restart schedule.
    #[arg(long, default_value_t = 100)]
    rfirst: u64,

    /// Restart base while the circuit-SAT phase is active.
    #[arg(long, default_value_t = 100)]
    rfirst_csat: u64,

    /// Branch free variables to true instead of false.
    #[arg(long, default_value_t = false)]
    default_polarity: bool,

    /// Disable every circuit-aware heuristic; classical CDCL behaviour.
    /// Overrides the individual heuristic flags.
    #[arg(long, default_value_t = false)]
    plain: bool,

    /// Verify the model against the formula before reporting it.
    #[arg(long, default_value_t = true)]
    verify: bool,

    /// Print search statistics after solving.
    #[arg(short, long, default_value_t = true)]
    stats: bool,

    /// Print the satisfying assignment as DIMACS `v` lines.
    #[arg(short, long, default_value_t = false)]
    print_model: bool,
}

impl Cli {
    fn to_config(&self) -> SolverConfig {
        if self.plain {
            return SolverConfig {
                ccmin_mode: self.ccmin,
                rfirst: self.rfirst,
                ..SolverConfig::plain()
            };
        }
        SolverConfig {
            ccmin_mode: self.ccmin,
            backprop: self.backprop,
            csat_start: !self.no_csat_start,
            polarity_init: !self.no_polarity_init,
            csat_restarts_before_switch: self.switch_after,
            rfirst: self.rfirst,
            rfirst_csat: self.rfirst_csat,
            default_polarity: self.default_polarity,
            ..SolverConfig::default()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let parse_start = std::time::Instant::now();
    let formula = match parse_file(&cli.path) {
        Ok(formula) => formula,
        Err(e) => {
            eprintln!("c error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let parse_time = parse_start.elapsed();
    info!(
        path = %cli.path,
        vars = formula.num_vars,
        clauses = formula.clauses.len(),
        "parsed formula"
    );

    let mut solver = Solver::new(cli.to_config());
    for _ in 0..formula.num_vars {
        solver.new_var(None);
    }
    for clause in &formula.clauses {
        let lits = clause.iter().map(|&x| Literal::from_dimacs(x)).collect_vec();
        if let Err(e) = solver.add_clause(&lits) {
            eprintln!("c error: {e}");
            return ExitCode::FAILURE;
        }
    }

    let solve_start = std::time::Instant::now();
    let verdict = solver.solve(&[]);
    let elapsed = solve_start.elapsed();

    if cli.verify && verdict == Verdict::Satisfiable {
        assert!(
            verify_model(&formula, solver.model()),
            "model failed verification"
        );
    }

    if cli.stats {
        print_stats(parse_time, elapsed, &solver);
    }

    match verdict {
        Verdict::Satisfiable => {
            println!("s SATISFIABLE");
            if cli.print_model {
                print_model(solver.model());
            }
            ExitCode::from(10)
        }
        Verdict::Unsatisfiable => {
            println!("s UNSATISFIABLE");
            ExitCode::from(20)
        }
        Verdict::Indeterminate => {
            println!("s UNKNOWN");
            ExitCode::SUCCESS
        }
    }
}

/// Checks that every clause of the formula has a literal the model makes
/// true.
fn verify_model(formula: &DimacsFormula, model: &[bool]) -> bool {
    formula.clauses.iter().all(|clause| {
        clause.iter().any(|&x| {
            let value = model[x.unsigned_abs() as usize - 1];
            if x > 0 { value } else { !value }
        })
    })
}

/// Prints the model as DIMACS `v` lines, 10 literals per line, terminated
/// by `0`.
fn print_model(model: &[bool]) {
    for chunk in &model.iter().enumerate().chunks(10) {
        let line = chunk
            .map(|(i, &value)| {
                let var = i as i32 + 1;
                if value { var } else { -var }
            })
            .join(" ");
        println!("v {line}");
    }
    println!("v 0");
}

fn stat_line(label: &str, value: impl std::fmt::Display) {
    println!("c |  {label:<28} {value:>18}  |");
}

fn stat_line_with_rate(label: &str, value: u64, elapsed: f64) {
    let rate = if elapsed > 0.0 {
        value as f64 / elapsed
    } else {
        0.0
    };
    println!("c |  {label:<20} {value:>12} ({rate:>9.0}/sec)  |");
}

fn print_stats(parse_time: Duration, elapsed: Duration, solver: &Solver) {
    let s = solver.stats();
    let elapsed_secs = elapsed.as_secs_f64();

    println!("c =======================[ Problem Statistics ]======================");
    stat_line("Parse time (s)", format!("{:.3}", parse_time.as_secs_f64()));
    stat_line("Variables", solver.num_vars());
    stat_line("Clauses (original)", solver.num_clauses());
    println!("c =======================[ Search Statistics ]=======================");
    stat_line("Learnt clauses", solver.num_learnts());
    stat_line("Learnt clauses removed", s.learnts_removed);
    stat_line("Arena collections", s.arena_collections);
    stat_line_with_rate("Conflicts", s.conflicts, elapsed_secs);
    stat_line_with_rate("Decisions", s.decisions, elapsed_secs);
    stat_line_with_rate("Propagations", s.propagations, elapsed_secs);
    stat_line_with_rate("Restarts", s.restarts, elapsed_secs);
    stat_line("CPU time (s)", format!("{elapsed_secs:.3}"));
    println!("c ===================================================================");
}
