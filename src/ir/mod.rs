//! Expression IR: tree definitions, traversal, simplification and CSE

pub mod cse;
pub mod expr;
pub mod simplify;
pub mod visit;

pub use cse::common_subexpression_elimination;
pub use expr::{Expr, ExprKind, ExprNode, ScalarType};
pub use simplify::simplify;
pub use visit::{free_vars, substitute, substitute_in_all_lets, Bindings};
