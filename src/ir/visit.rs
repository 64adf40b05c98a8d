//! Generic traversal helpers: child rebuilding, free-variable
//! collection, and substitution. Let bindings introduce lexical scope,
//! so every walker here carries a shadow stack.

use crate::ir::expr::{Expr, ExprNode};
use std::collections::{BTreeMap, BTreeSet};

/// Variable-name to expression map. Used for SMT model witnesses, for
/// CEGIS counterexamples, and for subsumption match substitutions.
pub type Bindings = BTreeMap<String, Expr>;

/// Rebuild an expression with `f` applied to each direct child.
/// Leaves are returned unchanged.
pub fn map_children(e: &Expr, f: &mut dyn FnMut(&Expr) -> Expr) -> Expr {
    match e.node() {
        ExprNode::IntImm(_)
        | ExprNode::UIntImm(_)
        | ExprNode::FloatImm(_)
        | ExprNode::StringImm(_)
        | ExprNode::BoolImm(_)
        | ExprNode::Var { .. } => e.clone(),
        ExprNode::Add(a, b) => Expr::new(ExprNode::Add(f(a), f(b))),
        ExprNode::Sub(a, b) => Expr::new(ExprNode::Sub(f(a), f(b))),
        ExprNode::Mul(a, b) => Expr::new(ExprNode::Mul(f(a), f(b))),
        ExprNode::Div(a, b) => Expr::new(ExprNode::Div(f(a), f(b))),
        ExprNode::Mod(a, b) => Expr::new(ExprNode::Mod(f(a), f(b))),
        ExprNode::Min(a, b) => Expr::new(ExprNode::Min(f(a), f(b))),
        ExprNode::Max(a, b) => Expr::new(ExprNode::Max(f(a), f(b))),
        ExprNode::Eq(a, b) => Expr::new(ExprNode::Eq(f(a), f(b))),
        ExprNode::Ne(a, b) => Expr::new(ExprNode::Ne(f(a), f(b))),
        ExprNode::Lt(a, b) => Expr::new(ExprNode::Lt(f(a), f(b))),
        ExprNode::Le(a, b) => Expr::new(ExprNode::Le(f(a), f(b))),
        ExprNode::Gt(a, b) => Expr::new(ExprNode::Gt(f(a), f(b))),
        ExprNode::Ge(a, b) => Expr::new(ExprNode::Ge(f(a), f(b))),
        ExprNode::And(a, b) => Expr::new(ExprNode::And(f(a), f(b))),
        ExprNode::Or(a, b) => Expr::new(ExprNode::Or(f(a), f(b))),
        ExprNode::Not(a) => Expr::new(ExprNode::Not(f(a))),
        ExprNode::Select(c, t, e2) => Expr::new(ExprNode::Select(f(c), f(t), f(e2))),
        ExprNode::Let { name, value, body } => Expr::new(ExprNode::Let {
            name: name.clone(),
            value: f(value),
            body: f(body),
        }),
        ExprNode::Broadcast { value, lanes } => Expr::new(ExprNode::Broadcast {
            value: f(value),
            lanes: *lanes,
        }),
        ExprNode::Ramp { base, stride, lanes } => Expr::new(ExprNode::Ramp {
            base: f(base),
            stride: f(stride),
            lanes: *lanes,
        }),
    }
}

/// Collect the names of free variables, skipping occurrences shadowed by
/// an enclosing Let.
pub fn free_vars(e: &Expr) -> BTreeSet<String> {
    fn go(e: &Expr, scope: &mut Vec<String>, out: &mut BTreeSet<String>) {
        match e.node() {
            ExprNode::Var { name, .. } => {
                if !scope.iter().any(|s| s == name) {
                    out.insert(name.clone());
                }
            }
            ExprNode::Let { name, value, body } => {
                go(value, scope, out);
                scope.push(name.clone());
                go(body, scope, out);
                scope.pop();
            }
            _ => {
                for c in e.children() {
                    go(c, scope, out);
                }
            }
        }
    }
    let mut out = BTreeSet::new();
    go(e, &mut Vec::new(), &mut out);
    out
}

/// Replace free occurrences of the bound variable names with their
/// mapped expressions. Let-bound names shadow the bindings inside the
/// corresponding body.
pub fn substitute(bindings: &Bindings, e: &Expr) -> Expr {
    fn go(bindings: &Bindings, scope: &mut Vec<String>, e: &Expr) -> Expr {
        match e.node() {
            ExprNode::Var { name, .. } => {
                if !scope.iter().any(|s| s == name) {
                    if let Some(replacement) = bindings.get(name) {
                        return replacement.clone();
                    }
                }
                e.clone()
            }
            ExprNode::Let { name, value, body } => {
                let value = go(bindings, scope, value);
                scope.push(name.clone());
                let body = go(bindings, scope, body);
                scope.pop();
                Expr::new(ExprNode::Let {
                    name: name.clone(),
                    value,
                    body,
                })
            }
            _ => map_children(e, &mut |c| go(bindings, scope, c)),
        }
    }
    go(bindings, &mut Vec::new(), e)
}

/// Inline every Let binding, bottom up, producing a Let-free tree.
pub fn substitute_in_all_lets(e: &Expr) -> Expr {
    match e.node() {
        ExprNode::Let { name, value, body } => {
            let value = substitute_in_all_lets(value);
            let body = substitute_in_all_lets(body);
            let mut single = Bindings::new();
            single.insert(name.clone(), value);
            substitute(&single, &body)
        }
        _ => map_children(e, &mut substitute_in_all_lets),
    }
}
