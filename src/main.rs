use clap::Parser;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

mod corpus;
mod extract;
mod ir;
mod rules;
mod smt;
mod synth;

use extract::all_lhs_patterns;
use ir::{simplify, Expr};
use rules::{filter_subsumed, render_rules};
use smt::SolverConfig;
use synth::{run_rule_search, SearchConfig};

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "rulesmith")]
#[command(about = "Synthesizes algebraic rewrite rules for the expression simplifier")]
#[command(version)]
struct Args {
    /// SMT solver binary to invoke
    #[arg(long, default_value = "z3")]
    solver: PathBuf,

    /// Per-query solver wall-clock limit in seconds
    #[arg(long, default_value_t = 600)]
    solver_timeout: u64,

    /// Number of synthesis workers (defaults to available cores)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Stop after printing candidate patterns, skipping synthesis
    #[arg(long)]
    patterns_only: bool,

    /// Verbose output during synthesis (also enables debug logging)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    // Mine LHS patterns from the expression corpus
    let mut patterns: BTreeSet<Expr> = BTreeSet::new();
    let mut handled = 0usize;
    let mut total = 0usize;
    for e in corpus::corpus() {
        println!("{}", patterns.len());
        let e = simplify(&e);
        total += 1;
        if e.is_const_true() {
            handled += 1;
        } else {
            println!("EXPR: {}", e);
            for p in all_lhs_patterns(&e) {
                patterns.insert(p);
            }
        }
    }

    println!("{} / {} rules already simplify to true", handled, total);

    for p in &patterns {
        println!("PATTERN: {}", p);
    }

    if args.patterns_only {
        return;
    }

    // Synthesize a RHS for each eligible pattern
    let solver = SolverConfig::default()
        .with_solver(args.solver)
        .with_timeout(Duration::from_secs(args.solver_timeout));
    let mut search = SearchConfig::default()
        .with_solver(solver)
        .with_verbose(args.verbose);
    if let Some(jobs) = args.jobs {
        search = search.with_workers(jobs);
    }
    let rules = run_rule_search(&patterns, &search);

    // Drop rules whose LHS a more general rule already covers
    let mut filtered = filter_subsumed(&rules);
    filtered.sort_by(|r1, r2| r1.lhs.cmp(&r2.lhs));

    print!("{}", render_rules(&filtered));
}
