//! Symbolic program interpreter expression.
//!
//! `interpreter_expr` builds a single expression that behaves like a
//! small straight-line program over the given leaf terms, controlled by
//! integer opcode variables. Binding the opcodes to concrete values
//! selects one program; leaving them symbolic lets the solver search
//! over every program of that shape.

use crate::ir::cse::common_subexpression_elimination;
use crate::ir::expr::{add, eq, ge, max, min, mul, ne, select, sub, Expr};
use crate::ir::simplify::simplify;

/// Instruction encodings understood by the interpreter. Division is
/// deliberately absent so synthesized right-hand sides can never divide
/// by zero. Opcodes of 10 and above encode the constant `op - 10`.
const OP_ADD: i64 = 0;
const OP_SUB: i64 = 1;
const OP_MUL: i64 = 2;
const OP_LT: i64 = 4;
const OP_LE: i64 = 5;
const OP_EQ: i64 = 6;
const OP_NE: i64 = 7;
const OP_MIN: i64 = 8;
const OP_MAX: i64 = 9;
const OP_CONST_BASE: i64 = 10;

/// Build the interpreter expression. `opcodes` holds one `(op, i, j)`
/// triple per instruction; each instruction appends its result to the
/// term list and the final expression is the last appended term.
pub fn interpreter_expr(leaves: &[Expr], opcodes: &[Expr]) -> Expr {
    assert!(
        opcodes.len() % 3 == 0,
        "opcode vector length must be a multiple of 3, got {}",
        opcodes.len()
    );

    let mut terms: Vec<Expr> = leaves.to_vec();
    for instr in opcodes.chunks(3) {
        let op = &instr[0];
        let arg1_idx = &instr[1];
        let arg2_idx = &instr[2];

        // Operand lookup is a chained select over the terms so far,
        // defaulting to 0 for an out-of-range index.
        let mut arg1 = Expr::from(0);
        let mut arg2 = Expr::from(0);
        for (j, term) in terms.iter().enumerate() {
            let j = Expr::from(j as i64);
            arg1 = select(eq(arg1_idx.clone(), j.clone()), term.clone(), arg1);
            arg2 = select(eq(arg2_idx.clone(), j), term.clone(), arg2);
        }

        // Dispatch on the op code. The default (innermost) arm is the
        // op itself, which the constant arm then shifts down by 10.
        let mut result = op.clone();
        result = select(eq(op.clone(), OP_ADD), add(arg1.clone(), arg2.clone()), result);
        result = select(eq(op.clone(), OP_SUB), sub(arg1.clone(), arg2.clone()), result);
        result = select(eq(op.clone(), OP_MUL), mul(arg1.clone(), arg2.clone()), result);
        result = select(
            eq(op.clone(), OP_LT),
            select(crate::ir::expr::lt(arg1.clone(), arg2.clone()), 1, 0),
            result,
        );
        result = select(
            eq(op.clone(), OP_LE),
            select(crate::ir::expr::le(arg1.clone(), arg2.clone()), 1, 0),
            result,
        );
        result = select(
            eq(op.clone(), OP_EQ),
            select(eq(arg1.clone(), arg2.clone()), 1, 0),
            result,
        );
        result = select(
            eq(op.clone(), OP_NE),
            select(ne(arg1.clone(), arg2.clone()), 1, 0),
            result,
        );
        result = select(eq(op.clone(), OP_MIN), min(arg1.clone(), arg2.clone()), result);
        result = select(eq(op.clone(), OP_MAX), max(arg1.clone(), arg2.clone()), result);
        result = select(
            ge(op.clone(), OP_CONST_BASE),
            sub(op.clone(), OP_CONST_BASE),
            result,
        );

        terms.push(result);
    }

    let last = terms
        .last()
        .expect("interpreter needs at least one leaf or instruction");
    simplify(&common_subexpression_elimination(last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expr::{Expr, ExprKind};

    fn x() -> Expr {
        Expr::var("x")
    }

    fn y() -> Expr {
        Expr::var("y")
    }

    fn concrete(ops: &[i64]) -> Vec<Expr> {
        ops.iter().map(|&o| Expr::from(o)).collect()
    }

    /// Evaluate the interpreter under a concrete opcode assignment.
    /// CSE may leave Let bindings behind, so inline them before
    /// comparing, the same way the synthesis success path does.
    fn run(leaves: &[Expr], ops: &[i64]) -> Expr {
        let program = interpreter_expr(leaves, &concrete(ops));
        simplify(&crate::ir::visit::substitute_in_all_lets(&program))
    }

    fn contains_kind(e: &Expr, kind: ExprKind) -> bool {
        e.kind() == kind || e.children().into_iter().any(|c| contains_kind(c, kind))
    }

    #[test]
    fn test_single_add_instruction() {
        assert_eq!(run(&[x(), y()], &[OP_ADD, 0, 1]), add(x(), y()));
    }

    #[test]
    fn test_min_of_repeated_operand() {
        // min(x, x) folds away entirely
        assert_eq!(run(&[x(), y()], &[OP_MIN, 0, 0]), x());
    }

    #[test]
    fn test_second_instruction_consumes_the_first() {
        // t2 = x + y; t3 = min(t2, x)
        assert_eq!(
            run(&[x(), y()], &[OP_ADD, 0, 1, OP_MIN, 2, 0]),
            min(add(x(), y()), x())
        );
    }

    #[test]
    fn test_comparison_produces_indicator_value() {
        assert_eq!(
            run(&[x(), y()], &[OP_LT, 0, 1]),
            select(crate::ir::expr::lt(x(), y()), 1, 0)
        );
    }

    #[test]
    fn test_large_opcodes_are_constants() {
        assert_eq!(run(&[x()], &[13, 0, 0]), Expr::from(3));
    }

    #[test]
    fn test_out_of_range_operand_defaults_to_zero() {
        assert_eq!(run(&[x()], &[OP_ADD, 0, 7]), x());
    }

    #[test]
    fn test_symbolic_opcodes_never_introduce_division() {
        let leaves = [x(), y()];
        let opcodes: Vec<Expr> = (0..6).map(|i| Expr::var(format!("op{}", i))).collect();
        let program = interpreter_expr(&leaves, &opcodes);
        let inlined = crate::ir::visit::substitute_in_all_lets(&program);
        assert!(!contains_kind(&inlined, ExprKind::Div));
        assert!(!contains_kind(&inlined, ExprKind::Mod));
        // closed over the leaves and opcode variables only
        let vars = crate::ir::visit::free_vars(&inlined);
        for v in vars {
            assert!(v == "x" || v == "y" || v.starts_with("op"), "unexpected free variable {}", v);
        }
    }

    #[test]
    #[should_panic(expected = "multiple of 3")]
    fn test_partial_instruction_is_rejected() {
        interpreter_expr(&[x()], &concrete(&[OP_ADD, 0]));
    }
}
