use circsat::sat::config::{BackpropVariant, SolverConfig};
use circsat::sat::literal::Literal;
use circsat::sat::solver::{Solver, Verdict};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::time::Duration;

/// Pigeonhole principle with `holes + 1` pigeons; unsatisfiable.
fn pigeonhole(holes: usize) -> (usize, Vec<Vec<i32>>) {
    let pigeons = holes + 1;
    let var = |p: usize, h: usize| (p * holes + h + 1) as i32;
    let mut clauses = Vec::new();
    for p in 0..pigeons {
        clauses.push((0..holes).map(|h| var(p, h)).collect());
    }
    for h in 0..holes {
        for p in 0..pigeons {
            for q in p + 1..pigeons {
                clauses.push(vec![-var(p, h), -var(q, h)]);
            }
        }
    }
    (pigeons * holes, clauses)
}

/// Ternary XOR chain pinned at both ends; satisfiable, circuit-shaped.
fn xor_chain(length: usize) -> (usize, Vec<Vec<i32>>) {
    let mut clauses: Vec<Vec<i32>> = vec![vec![1]];
    for i in 0..length {
        let (a, b, c) = (i as i32 + 1, i as i32 + 2, i as i32 + 3);
        clauses.push(vec![-a, -b, -c]);
        clauses.push(vec![a, b, -c]);
        clauses.push(vec![a, -b, c]);
        clauses.push(vec![-a, b, c]);
    }
    clauses.push(vec![length as i32 + 2]);
    (length + 2, clauses)
}

fn solve(config: SolverConfig, n_vars: usize, clauses: &[Vec<i32>]) -> Verdict {
    let mut solver = Solver::new(config);
    for _ in 0..n_vars {
        solver.new_var(None);
    }
    for clause in clauses {
        let lits: Vec<Literal> = clause.iter().map(|&x| Literal::from_dimacs(x)).collect();
        solver.add_clause(&lits).expect("well-formed clause");
    }
    solver.solve(&[])
}

fn bench_pigeonhole(c: &mut Criterion) {
    let (n_vars, clauses) = pigeonhole(6);
    let mut group = c.benchmark_group("pigeonhole");
    group.measurement_time(Duration::from_secs(10));
    group.bench_function("default", |b| {
        b.iter(|| black_box(solve(SolverConfig::default(), n_vars, &clauses)));
    });
    group.bench_function("plain", |b| {
        b.iter(|| black_box(solve(SolverConfig::plain(), n_vars, &clauses)));
    });
    group.finish();
}

fn bench_xor_chain(c: &mut Criterion) {
    let (n_vars, clauses) = xor_chain(200);
    let mut group = c.benchmark_group("xor_chain");
    group.bench_function("connectivity", |b| {
        b.iter(|| black_box(solve(SolverConfig::default(), n_vars, &clauses)));
    });
    group.bench_function("prefer_xor", |b| {
        let config = SolverConfig {
            backprop: BackpropVariant::PreferXor,
            ..SolverConfig::default()
        };
        b.iter(|| black_box(solve(config.clone(), n_vars, &clauses)));
    });
    group.bench_function("plain", |b| {
        b.iter(|| black_box(solve(SolverConfig::plain(), n_vars, &clauses)));
    });
    group.finish();
}

criterion_group!(benches, bench_pigeonhole, bench_xor_chain);
criterion_main!(benches);
