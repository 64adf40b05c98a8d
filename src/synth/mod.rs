//! CEGIS rule synthesis: the symbolic interpreter, the
//! counterexample-guided loop, and the parallel pattern fan-out

pub mod cegis;
pub mod interpreter;
pub mod parallel;

pub use cegis::{synthesize, synthesize_sized};
pub use interpreter::interpreter_expr;
pub use parallel::{eligible_patterns, run_rule_search, SearchConfig};
