//! External SMT solver driver.
//!
//! Queries are serialized to a temporary file and the solver runs as a
//! subprocess with its stdout redirected to a second temporary file;
//! both files are removed when the handles drop, on every exit path.
//! An `unknown` or `timeout` response is a recoverable per-query
//! outcome; anything else that is not `sat`/`unsat` is a contract
//! violation and aborts with a diagnostic.

use crate::ir::expr::{Expr, ScalarType};
use crate::ir::simplify::simplify;
use crate::ir::visit::{free_vars, Bindings};
use crate::smt::model::parse_model;
use crate::smt::serialize::expr_to_smt2;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

/// Outcome of a satisfiability query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatResult {
    Sat,
    Unsat,
    Unknown,
}

/// Configuration for the external solver
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Solver binary to invoke
    pub solver: PathBuf,
    /// Wall-clock limit per query, enforced by the solver itself
    pub timeout: Duration,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            solver: PathBuf::from("z3"),
            timeout: Duration::from_secs(600),
        }
    }
}

impl SolverConfig {
    pub fn with_solver(mut self, solver: impl Into<PathBuf>) -> Self {
        self.solver = solver.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// Ask the solver for a model of the boolean expression `e`.
///
/// The expression is locally simplified first: a literal `true` is Sat
/// and a literal `false` is Unsat, with no solver round trip and
/// `bindings` untouched. Otherwise every free variable is declared as
/// an `Int` and the query is dispatched. On Sat the model's integer
/// assignments are inserted into `bindings`; on Unknown (including
/// solver timeout) `bindings` is left as it was.
///
/// Panics if `e` is not boolean-typed or the solver produces output
/// that matches no expected response; both are contract violations.
pub fn satisfy(e: &Expr, bindings: &mut Bindings, config: &SolverConfig) -> SatResult {
    let e = simplify(e);

    if e.is_const_true() {
        return SatResult::Sat;
    }
    if e.is_const_false() {
        return SatResult::Unsat;
    }
    if e.ty() != ScalarType::Bool {
        panic!("cannot satisfy non-boolean expression {}", e);
    }

    let mut query = String::new();
    for v in free_vars(&e) {
        writeln!(query, "(declare-const {} Int)", v).unwrap();
    }
    query.push_str("(define-fun my_min ((x Int) (y Int)) Int (ite (< x y) x y))\n");
    query.push_str("(define-fun my_max ((x Int) (y Int)) Int (ite (< x y) y x))\n");
    writeln!(query, "(assert {})", expr_to_smt2(&e)).unwrap();
    query.push_str("(check-sat)\n(get-model)\n");

    log::debug!("solver query:\n{}", query);

    let (status, response) = run_solver(&query, config);

    log::debug!("solver response: {}", response.trim_end());

    if response.starts_with("unknown") || response.starts_with("timeout") {
        return SatResult::Unknown;
    }

    if !status && !response.starts_with("unsat") {
        panic!(
            "solver query failed\nquery was:\n{}\noutput was:\n{}",
            query, response
        );
    }

    if response.starts_with("unsat") {
        return SatResult::Unsat;
    }

    let rest = response
        .strip_prefix("sat")
        .unwrap_or_else(|| panic!("unexpected solver response: {:?}", response));
    if let Err(err) = parse_model(rest, bindings) {
        panic!("{}\nquery was:\n{}\noutput was:\n{}", err, query, response);
    }
    SatResult::Sat
}

/// Run one query through the solver subprocess. Returns whether the
/// process exited successfully along with its full stdout.
fn run_solver(query: &str, config: &SolverConfig) -> (bool, String) {
    let mut input = tempfile::Builder::new()
        .prefix("query")
        .suffix(".smt2")
        .tempfile()
        .expect("failed to create solver input file");
    input
        .write_all(query.as_bytes())
        .and_then(|_| input.flush())
        .expect("failed to write solver input file");

    let output = tempfile::Builder::new()
        .prefix("output")
        .suffix(".txt")
        .tempfile()
        .expect("failed to create solver output file");
    let stdout = output
        .reopen()
        .expect("failed to reopen solver output file");

    let status = Command::new(&config.solver)
        .arg(format!("-T:{}", config.timeout.as_secs()))
        .arg(input.path())
        .stdout(stdout)
        .status()
        .unwrap_or_else(|err| panic!("failed to run solver {:?}: {}", config.solver, err));

    let response = std::fs::read_to_string(output.path())
        .expect("failed to read solver output file");

    (status.success(), response)
}
