//! Expression to SMT-LIB2 serialization.
//!
//! Integer min/max have no SMT-LIB builtins, so they serialize to the
//! `my_min`/`my_max` helper functions declared in the query preamble.

use crate::ir::expr::{Expr, ExprNode};
use std::fmt::Write;

pub fn expr_to_smt2(e: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, e);
    out
}

fn write_binary(out: &mut String, op: &str, a: &Expr, b: &Expr) {
    out.push('(');
    out.push_str(op);
    out.push(' ');
    write_expr(out, a);
    out.push(' ');
    write_expr(out, b);
    out.push(')');
}

fn write_expr(out: &mut String, e: &Expr) {
    match e.node() {
        ExprNode::IntImm(v) => {
            // SMT-LIB numerals are non-negative; negatives use the unary form
            if *v < 0 {
                write!(out, "(- {})", v.unsigned_abs()).unwrap();
            } else {
                write!(out, "{}", v).unwrap();
            }
        }
        ExprNode::UIntImm(v) => write!(out, "{}", v).unwrap(),
        ExprNode::FloatImm(v) => write!(out, "{}", v).unwrap(),
        ExprNode::StringImm(s) => out.push_str(s),
        ExprNode::BoolImm(v) => write!(out, "{}", v).unwrap(),
        ExprNode::Var { name, .. } => out.push_str(name),
        ExprNode::Add(a, b) => write_binary(out, "+", a, b),
        ExprNode::Sub(a, b) => write_binary(out, "-", a, b),
        ExprNode::Mul(a, b) => write_binary(out, "*", a, b),
        ExprNode::Div(a, b) => write_binary(out, "div", a, b),
        ExprNode::Mod(a, b) => write_binary(out, "mod", a, b),
        ExprNode::Min(a, b) => write_binary(out, "my_min", a, b),
        ExprNode::Max(a, b) => write_binary(out, "my_max", a, b),
        ExprNode::Eq(a, b) => write_binary(out, "=", a, b),
        ExprNode::Ne(a, b) => {
            out.push_str("(not ");
            write_binary(out, "=", a, b);
            out.push(')');
        }
        ExprNode::Lt(a, b) => write_binary(out, "<", a, b),
        ExprNode::Le(a, b) => write_binary(out, "<=", a, b),
        ExprNode::Gt(a, b) => write_binary(out, ">", a, b),
        ExprNode::Ge(a, b) => write_binary(out, ">=", a, b),
        ExprNode::And(a, b) => write_binary(out, "and", a, b),
        ExprNode::Or(a, b) => write_binary(out, "or", a, b),
        ExprNode::Not(a) => {
            out.push_str("(not ");
            write_expr(out, a);
            out.push(')');
        }
        ExprNode::Select(c, t, f) => {
            out.push_str("(ite ");
            write_expr(out, c);
            out.push(' ');
            write_expr(out, t);
            out.push(' ');
            write_expr(out, f);
            out.push(')');
        }
        ExprNode::Let { name, value, body } => {
            write!(out, "(let (({} ", name).unwrap();
            write_expr(out, value);
            out.push_str(")) ");
            write_expr(out, body);
            out.push(')');
        }
        ExprNode::Broadcast { value, .. } => write_expr(out, value),
        ExprNode::Ramp { .. } => panic!("unhandled Ramp expression in SMT serializer: {}", e),
    }
}
