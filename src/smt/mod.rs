//! Bridge to the external SMT solver: SMT-LIB2 serialization, the
//! subprocess query driver, and the model parser

pub mod model;
pub mod serialize;
pub mod solver;

pub use model::{parse_model, ModelError};
pub use serialize::expr_to_smt2;
pub use solver::{satisfy, SatResult, SolverConfig};
