//! Parallel fan-out of the per-pattern rule search.
//!
//! Patterns are bucketed by leaf count and fed through a channel to a
//! pool of worker threads; each worker runs the CEGIS loop against its
//! own solver subprocesses. Results land in one mutex-guarded rule
//! list, and the progress print happens inside the same critical
//! section so output lines stay whole.

use crate::ir::expr::Expr;
use crate::rules::{LeafProfile, Rule};
use crate::smt::solver::SolverConfig;
use crate::synth::cegis::synthesize_sized;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

/// Leaf-count buckets considered by the rule search: `2..MAX_LEAVES`
pub const MAX_LEAVES: usize = 10;

/// Configuration for the parallel rule search
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Solver settings shared by all workers
    pub solver: SolverConfig,
    /// Number of worker threads
    pub workers: usize,
    /// Verbose output during synthesis
    pub verbose: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            workers: std::thread::available_parallelism().map_or(1, |n| n.get()),
            verbose: false,
        }
    }
}

impl SearchConfig {
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Patterns worth synthesizing for at a given leaf count: exactly
/// `leaves` variable occurrences, no division anywhere, and at least
/// one repeated variable.
pub fn eligible_patterns(patterns: &BTreeSet<Expr>, leaves: usize) -> Vec<&Expr> {
    patterns
        .iter()
        .filter(|p| {
            let profile = LeafProfile::of(p);
            profile.leaf_count == leaves && !profile.has_division && profile.repeated_var
        })
        .collect()
}

/// Run the rule search over every eligible pattern, blocking until all
/// workers drain the queue.
pub fn run_rule_search(patterns: &BTreeSet<Expr>, config: &SearchConfig) -> Vec<Rule> {
    let (tx, rx) = crossbeam_channel::unbounded::<(Expr, usize)>();
    let rules = Arc::new(Mutex::new(Vec::new()));

    std::thread::scope(|scope| {
        for _ in 0..config.workers.max(1) {
            let rx = rx.clone();
            let rules = Arc::clone(&rules);
            let solver = config.solver.clone();
            let verbose = config.verbose;
            scope.spawn(move || {
                while let Ok((pattern, size)) = rx.recv() {
                    if verbose {
                        println!("Synthesizing a rhs for {} with {} instructions...", pattern, size);
                    }
                    log::debug!("synthesizing rhs for {} at size {}", pattern, size);
                    if let Some(rhs) = synthesize_sized(&pattern, size, &solver) {
                        let mut rules = rules.lock().unwrap();
                        println!("\n{{{}, {}}},", pattern, rhs);
                        rules.push(Rule { lhs: pattern, rhs });
                    } else if verbose {
                        println!("No equivalent of {} instructions for {}", size, pattern);
                    }
                }
            });
        }

        for leaves in 2..MAX_LEAVES {
            println!("\nConsidering patterns with {} leaves ", leaves);
            for pattern in eligible_patterns(patterns, leaves) {
                // The RHS must use strictly fewer ops than the LHS.
                let lhs_ops = leaves - 1;
                let max_rhs_ops = lhs_ops - 1;
                tx.send((pattern.clone(), max_rhs_ops)).unwrap();
            }
        }
        drop(tx);
    });

    Arc::try_unwrap(rules)
        .expect("all workers have exited")
        .into_inner()
        .unwrap()
}
