//! Local algebraic simplifier.
//!
//! A single bottom-up pass applying sound rules only: constant folding,
//! unit/zero identities, reflexive comparisons and Select collapsing.
//! Division and modulus fold with Euclidean semantics so constant
//! folding agrees with the SMT theory the solver queries run in;
//! division by zero is left unfolded.

use crate::ir::expr::{
    add, and, div, eq, ge, gt, le, let_in, lt, max, min, modulo, mul, ne, not, or, select, sub,
    Expr, ExprNode,
};
use crate::ir::visit::{map_children, substitute, Bindings};

pub fn simplify(e: &Expr) -> Expr {
    match e.node() {
        ExprNode::IntImm(_)
        | ExprNode::UIntImm(_)
        | ExprNode::FloatImm(_)
        | ExprNode::StringImm(_)
        | ExprNode::BoolImm(_)
        | ExprNode::Var { .. } => e.clone(),
        ExprNode::Add(a, b) => simplify_add(&simplify(a), &simplify(b)),
        ExprNode::Sub(a, b) => simplify_sub(&simplify(a), &simplify(b)),
        ExprNode::Mul(a, b) => simplify_mul(&simplify(a), &simplify(b)),
        ExprNode::Div(a, b) => simplify_div(&simplify(a), &simplify(b)),
        ExprNode::Mod(a, b) => simplify_mod(&simplify(a), &simplify(b)),
        ExprNode::Min(a, b) => simplify_min(&simplify(a), &simplify(b)),
        ExprNode::Max(a, b) => simplify_max(&simplify(a), &simplify(b)),
        ExprNode::Eq(a, b) => simplify_eq(&simplify(a), &simplify(b)),
        ExprNode::Ne(a, b) => simplify_ne(&simplify(a), &simplify(b)),
        ExprNode::Lt(a, b) => simplify_cmp(&simplify(a), &simplify(b), |x, y| x < y, false, lt),
        ExprNode::Le(a, b) => simplify_cmp(&simplify(a), &simplify(b), |x, y| x <= y, true, le),
        ExprNode::Gt(a, b) => simplify_cmp(&simplify(a), &simplify(b), |x, y| x > y, false, gt),
        ExprNode::Ge(a, b) => simplify_cmp(&simplify(a), &simplify(b), |x, y| x >= y, true, ge),
        ExprNode::And(a, b) => simplify_and(&simplify(a), &simplify(b)),
        ExprNode::Or(a, b) => simplify_or(&simplify(a), &simplify(b)),
        ExprNode::Not(a) => simplify_not(&simplify(a)),
        ExprNode::Select(c, t, f) => simplify_select(&simplify(c), &simplify(t), &simplify(f)),
        ExprNode::Let { name, value, body } => {
            let value = simplify(value);
            if value.is_leaf() {
                let mut single = Bindings::new();
                single.insert(name.clone(), value);
                simplify(&substitute(&single, body))
            } else {
                let_in(name.clone(), value, simplify(body))
            }
        }
        ExprNode::Broadcast { .. } | ExprNode::Ramp { .. } => map_children(e, &mut simplify),
    }
}

fn both_ints(a: &Expr, b: &Expr) -> Option<(i64, i64)> {
    Some((a.as_int()?, b.as_int()?))
}

/// Structural equality is a sound witness for value equality over the
/// integer types; floats are excluded (NaN).
fn definitely_equal(a: &Expr, b: &Expr) -> bool {
    a == b && !a.ty().is_float()
}

fn simplify_add(a: &Expr, b: &Expr) -> Expr {
    if let Some((x, y)) = both_ints(a, b) {
        return Expr::from(x.wrapping_add(y));
    }
    if b.as_int() == Some(0) {
        return a.clone();
    }
    if a.as_int() == Some(0) {
        return b.clone();
    }
    add(a.clone(), b.clone())
}

fn simplify_sub(a: &Expr, b: &Expr) -> Expr {
    if let Some((x, y)) = both_ints(a, b) {
        return Expr::from(x.wrapping_sub(y));
    }
    if b.as_int() == Some(0) {
        return a.clone();
    }
    if definitely_equal(a, b) {
        return Expr::from(0);
    }
    sub(a.clone(), b.clone())
}

fn simplify_mul(a: &Expr, b: &Expr) -> Expr {
    if let Some((x, y)) = both_ints(a, b) {
        return Expr::from(x.wrapping_mul(y));
    }
    if !a.ty().is_float() && (a.as_int() == Some(0) || b.as_int() == Some(0)) {
        return Expr::from(0);
    }
    if b.as_int() == Some(1) {
        return a.clone();
    }
    if a.as_int() == Some(1) {
        return b.clone();
    }
    mul(a.clone(), b.clone())
}

fn simplify_div(a: &Expr, b: &Expr) -> Expr {
    if let Some((x, y)) = both_ints(a, b) {
        if let Some(q) = x.checked_div_euclid(y) {
            return Expr::from(q);
        }
    }
    if b.as_int() == Some(1) {
        return a.clone();
    }
    div(a.clone(), b.clone())
}

fn simplify_mod(a: &Expr, b: &Expr) -> Expr {
    if let Some((x, y)) = both_ints(a, b) {
        if let Some(r) = x.checked_rem_euclid(y) {
            return Expr::from(r);
        }
    }
    if b.as_int() == Some(1) {
        return Expr::from(0);
    }
    modulo(a.clone(), b.clone())
}

fn simplify_min(a: &Expr, b: &Expr) -> Expr {
    if let Some((x, y)) = both_ints(a, b) {
        return Expr::from(x.min(y));
    }
    if definitely_equal(a, b) {
        return a.clone();
    }
    min(a.clone(), b.clone())
}

fn simplify_max(a: &Expr, b: &Expr) -> Expr {
    if let Some((x, y)) = both_ints(a, b) {
        return Expr::from(x.max(y));
    }
    if definitely_equal(a, b) {
        return a.clone();
    }
    max(a.clone(), b.clone())
}

fn simplify_eq(a: &Expr, b: &Expr) -> Expr {
    if let Some((x, y)) = both_ints(a, b) {
        return Expr::from(x == y);
    }
    if let (ExprNode::BoolImm(x), ExprNode::BoolImm(y)) = (a.node(), b.node()) {
        return Expr::from(x == y);
    }
    if definitely_equal(a, b) {
        return Expr::from(true);
    }
    // A comparison of a Select with constant arms against a constant
    // resolves to a boolean Select, which then collapses further. This
    // is what turns the lifted form (select(c, 1, 0) == 1) back into c.
    if let Some(pushed) = push_eq_into_select(a, b).or_else(|| push_eq_into_select(b, a)) {
        return pushed;
    }
    eq(a.clone(), b.clone())
}

fn push_eq_into_select(sel: &Expr, k: &Expr) -> Option<Expr> {
    let kv = k.as_int()?;
    if let ExprNode::Select(c, t, f) = sel.node() {
        let (tv, fv) = (t.as_int()?, f.as_int()?);
        return Some(simplify_select(c, &Expr::from(tv == kv), &Expr::from(fv == kv)));
    }
    None
}

fn simplify_ne(a: &Expr, b: &Expr) -> Expr {
    if let Some((x, y)) = both_ints(a, b) {
        return Expr::from(x != y);
    }
    if definitely_equal(a, b) {
        return Expr::from(false);
    }
    ne(a.clone(), b.clone())
}

fn simplify_cmp(
    a: &Expr,
    b: &Expr,
    fold: fn(i64, i64) -> bool,
    reflexive: bool,
    rebuild: fn(Expr, Expr) -> Expr,
) -> Expr {
    if let Some((x, y)) = both_ints(a, b) {
        return Expr::from(fold(x, y));
    }
    if definitely_equal(a, b) {
        return Expr::from(reflexive);
    }
    rebuild(a.clone(), b.clone())
}

fn simplify_and(a: &Expr, b: &Expr) -> Expr {
    if a.is_const_false() || b.is_const_false() {
        return Expr::from(false);
    }
    if a.is_const_true() {
        return b.clone();
    }
    if b.is_const_true() {
        return a.clone();
    }
    if a == b {
        return a.clone();
    }
    and(a.clone(), b.clone())
}

fn simplify_or(a: &Expr, b: &Expr) -> Expr {
    if a.is_const_true() || b.is_const_true() {
        return Expr::from(true);
    }
    if a.is_const_false() {
        return b.clone();
    }
    if b.is_const_false() {
        return a.clone();
    }
    if a == b {
        return a.clone();
    }
    or(a.clone(), b.clone())
}

fn simplify_not(a: &Expr) -> Expr {
    match a.node() {
        ExprNode::BoolImm(v) => Expr::from(!*v),
        ExprNode::Not(inner) => inner.clone(),
        _ => not(a.clone()),
    }
}

fn simplify_select(c: &Expr, t: &Expr, f: &Expr) -> Expr {
    if c.is_const_true() {
        return t.clone();
    }
    if c.is_const_false() {
        return f.clone();
    }
    if t == f {
        return t.clone();
    }
    match (t.node(), f.node()) {
        (ExprNode::BoolImm(true), ExprNode::BoolImm(false)) => c.clone(),
        (ExprNode::BoolImm(false), ExprNode::BoolImm(true)) => simplify_not(c),
        _ => select(c.clone(), t.clone(), f.clone()),
    }
}
