//! Common-subexpression elimination.
//!
//! Interior subexpressions that occur more than once are hoisted into
//! Let bindings named `t0, t1, ...`, innermost first, so later bindings
//! and the body refer to earlier names. Existing Lets are inlined up
//! front, which keeps occurrence counting scope-free and lets repeated
//! passes hand out fresh names without colliding.

use crate::ir::expr::{let_in, Expr};
use crate::ir::visit::{map_children, substitute_in_all_lets};
use rustc_hash::FxHashMap;

pub fn common_subexpression_elimination(e: &Expr) -> Expr {
    let e = substitute_in_all_lets(e);

    let mut counts: FxHashMap<Expr, usize> = FxHashMap::default();
    count_occurrences(&e, &mut counts);

    // Shared subexpressions in post-order, deduplicated, so that a
    // binding only ever refers to names introduced before it.
    let mut shared: Vec<Expr> = Vec::new();
    collect_shared(&e, &counts, &mut shared);

    let mut names: FxHashMap<Expr, String> = FxHashMap::default();
    let mut bindings: Vec<(String, Expr)> = Vec::new();
    for sub in shared {
        let def = replace_shared(&sub, &names);
        let name = format!("t{}", bindings.len());
        bindings.push((name.clone(), def));
        names.insert(sub, name);
    }

    let mut body = replace_shared(&e, &names);
    for (name, def) in bindings.into_iter().rev() {
        body = let_in(name, def, body);
    }
    body
}

fn count_occurrences(e: &Expr, counts: &mut FxHashMap<Expr, usize>) {
    if e.is_leaf() {
        return;
    }
    let n = counts.entry(e.clone()).or_insert(0);
    *n += 1;
    if *n > 1 {
        // children were already counted on the first visit
        return;
    }
    for c in e.children() {
        count_occurrences(c, counts);
    }
}

fn collect_shared(e: &Expr, counts: &FxHashMap<Expr, usize>, out: &mut Vec<Expr>) {
    if e.is_leaf() || out.contains(e) {
        return;
    }
    for c in e.children() {
        collect_shared(c, counts, out);
    }
    if counts.get(e).copied().unwrap_or(0) > 1 {
        out.push(e.clone());
    }
}

fn replace_shared(e: &Expr, names: &FxHashMap<Expr, String>) -> Expr {
    if let Some(name) = names.get(e) {
        return Expr::var(name.clone());
    }
    map_children(e, &mut |c| replace_shared(c, names))
}
