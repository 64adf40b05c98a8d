//! Rewrite rules: leaf profiling, the generality ordering on left-hand
//! sides, subsumption filtering, and the final textual emission.

use crate::ir::expr::{Expr, ExprKind, ExprNode};
use crate::ir::visit::Bindings;
use std::collections::BTreeSet;
use std::fmt::Write;

/// One synthesized rewrite: every instantiation of the wildcards makes
/// `lhs` and `rhs` equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub lhs: Expr,
    pub rhs: Expr,
}

/// Summary of a pattern's leaves, used to bucket and filter candidates
/// before synthesis.
#[derive(Debug, Clone, Default)]
pub struct LeafProfile {
    /// Number of variable occurrences
    pub leaf_count: usize,
    /// Whether any Div node appears
    pub has_division: bool,
    /// Whether some variable occurs more than once
    pub repeated_var: bool,
}

impl LeafProfile {
    pub fn of(e: &Expr) -> Self {
        let mut profile = LeafProfile::default();
        let mut seen = BTreeSet::new();
        profile.walk(e, &mut seen);
        profile
    }

    fn walk(&mut self, e: &Expr, seen: &mut BTreeSet<String>) {
        match e.node() {
            ExprNode::Var { name, .. } => {
                if !seen.insert(name.clone()) {
                    self.repeated_var = true;
                }
                self.leaf_count += 1;
            }
            ExprNode::Div(..) => {
                self.has_division = true;
                for c in e.children() {
                    self.walk(c, seen);
                }
            }
            _ => {
                for c in e.children() {
                    self.walk(c, seen);
                }
            }
        }
    }
}

/// Directional structural match: does `a` match `b` when variables in
/// `a` may bind to arbitrary subtrees of `b`? A variable binds on first
/// sight and must rebind identically afterwards. Non-variable leaves
/// must be equal, interior nodes must agree on kind and match child by
/// child. Successful bindings accumulate in `bindings` and double as
/// the witness substitution.
pub fn more_general_than(a: &Expr, b: &Expr, bindings: &mut Bindings) -> bool {
    if let ExprNode::Var { name, .. } = a.node() {
        return match bindings.get(name) {
            None => {
                bindings.insert(name.clone(), b.clone());
                true
            }
            Some(bound) => bound == b,
        };
    }
    if a.kind() != b.kind() {
        return false;
    }
    if let (ExprNode::Let { name: na, .. }, ExprNode::Let { name: nb, .. }) = (a.node(), b.node()) {
        if na != nb {
            return false;
        }
    }
    let ca = a.children();
    if ca.is_empty() {
        return a == b;
    }
    ca.into_iter()
        .zip(b.children())
        .all(|(x, y)| more_general_than(x, y, bindings))
}

/// Drop every rule whose LHS is matched by a strictly more general LHS
/// of another rule. Rules with equal LHSs never suppress each other.
pub fn filter_subsumed(rules: &[Rule]) -> Vec<Rule> {
    let mut filtered = Vec::new();
    for r1 in rules {
        let duplicate = rules.iter().any(|r2| {
            let mut bindings = Bindings::new();
            r1.lhs != r2.lhs && more_general_than(&r2.lhs, &r1.lhs, &mut bindings)
        });
        if !duplicate {
            filtered.push(r1.clone());
        }
    }
    filtered
}

/// Render the final listing: rules grouped under their LHS root kind,
/// in the order given. Callers sort by LHS first.
pub fn render_rules(rules: &[Rule]) -> String {
    let mut out = String::new();
    let mut current_kind: Option<ExprKind> = None;
    for rule in rules {
        let kind = rule.lhs.kind();
        if current_kind != Some(kind) {
            writeln!(out, "{}:", kind).unwrap();
            current_kind = Some(kind);
        }
        writeln!(out, "    rewrite({}, {}) ||", rule.lhs, rule.rhs).unwrap();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expr::{add, div, le, let_in, max, min, not, or, select, Expr};

    fn v(i: usize) -> Expr {
        Expr::var(format!("v{}", i))
    }

    #[test]
    fn test_leaf_profile_counts_occurrences() {
        let p = max(min(v(0), v(1)), min(v(0), v(2)));
        let profile = LeafProfile::of(&p);
        assert_eq!(profile.leaf_count, 4);
        assert!(profile.repeated_var);
        assert!(!profile.has_division);
    }

    #[test]
    fn test_leaf_profile_flags_division() {
        let p = add(div(v(0), v(1)), v(0));
        let profile = LeafProfile::of(&p);
        assert!(profile.has_division);
    }

    #[test]
    fn test_leaf_profile_no_repeats() {
        let p = min(v(0), v(1));
        let profile = LeafProfile::of(&p);
        assert_eq!(profile.leaf_count, 2);
        assert!(!profile.repeated_var);
    }

    #[test]
    fn test_more_general_than_is_reflexive() {
        let cases = [
            min(v(0), v(1)),
            select(le(v(0), v(1)), v(0), v(1)),
            add(min(v(0), v(1)), max(v(0), v(2))),
            or(le(v(0), v(1)), not(le(v(1), v(0)))),
        ];
        for e in cases {
            let mut b = Bindings::new();
            assert!(more_general_than(&e, &e, &mut b), "not reflexive: {}", e);
        }
    }

    #[test]
    fn test_variable_binds_any_subtree_consistently() {
        let mut b = Bindings::new();
        // min(v0, v1) generalizes min(v0, v0) with v1 -> v0
        assert!(more_general_than(
            &min(v(0), v(1)),
            &min(v(0), v(0)),
            &mut b
        ));
        assert_eq!(b["v1"], v(0));
        // but min(v0, v0) does not generalize min(v0, v1)
        let mut b = Bindings::new();
        assert!(!more_general_than(
            &min(v(0), v(0)),
            &min(v(0), v(1)),
            &mut b
        ));
    }

    #[test]
    fn test_min_does_not_match_max() {
        let mut b = Bindings::new();
        assert!(!more_general_than(
            &min(v(0), v(1)),
            &max(v(0), v(1)),
            &mut b
        ));
    }

    #[test]
    fn test_non_variable_leaves_must_be_equal() {
        let mut b = Bindings::new();
        assert!(more_general_than(
            &add(v(0), Expr::from(1)),
            &add(min(v(0), v(1)), Expr::from(1)),
            &mut b
        ));
        let mut b = Bindings::new();
        assert!(!more_general_than(
            &add(v(0), Expr::from(1)),
            &add(v(0), Expr::from(2)),
            &mut b
        ));
    }

    #[test]
    fn test_let_patterns_match_only_under_the_same_bound_name() {
        let a = let_in("t0", min(v(0), v(1)), add(Expr::var("t0"), v(2)));
        let b = let_in("t0", min(v(0), v(0)), add(Expr::var("t0"), Expr::from(1)));
        let mut m = Bindings::new();
        assert!(more_general_than(&a, &b, &mut m));
        assert_eq!(m["v1"], v(0));
        assert_eq!(m["v2"], Expr::from(1));

        // the same body under a different binder is a different shape
        let renamed = let_in("u0", min(v(0), v(0)), add(Expr::var("u0"), Expr::from(1)));
        let mut m = Bindings::new();
        assert!(!more_general_than(&a, &renamed, &mut m));
    }

    #[test]
    fn test_transitivity_on_matched_kinds() {
        let a = min(v(0), v(1));
        let b = min(v(0), add(v(1), v(2)));
        let c = min(v(0), add(v(1), v(1)));
        let mut m = Bindings::new();
        assert!(more_general_than(&a, &b, &mut m));
        let mut m = Bindings::new();
        assert!(more_general_than(&b, &c, &mut m));
        let mut m = Bindings::new();
        assert!(more_general_than(&a, &c, &mut m));
    }

    #[test]
    fn test_subsumption_filter_drops_the_special_case() {
        let general = Rule {
            lhs: min(v(0), v(1)),
            rhs: v(9),
        };
        let special = Rule {
            lhs: min(v(0), v(0)),
            rhs: v(0),
        };
        let filtered = filter_subsumed(&[general.clone(), special]);
        assert_eq!(filtered, vec![general]);
    }

    #[test]
    fn test_equal_lhs_rules_do_not_suppress_each_other() {
        let r1 = Rule {
            lhs: min(v(0), v(1)),
            rhs: v(0),
        };
        let r2 = Rule {
            lhs: min(v(0), v(1)),
            rhs: v(1),
        };
        let filtered = filter_subsumed(&[r1.clone(), r2.clone()]);
        assert_eq!(filtered, vec![r1, r2]);
    }

    #[test]
    fn test_render_groups_by_root_kind() {
        let mut rules = vec![
            Rule {
                lhs: max(min(v(0), v(1)), min(v(0), v(2))),
                rhs: min(v(0), max(v(1), v(2))),
            },
            Rule {
                lhs: min(max(v(0), v(1)), max(v(0), v(2))),
                rhs: max(v(0), min(v(1), v(2))),
            },
        ];
        rules.sort_by(|r1, r2| r1.lhs.cmp(&r2.lhs));
        let text = render_rules(&rules);
        assert_eq!(
            text,
            "Min:\n    rewrite(min(max(v0, v1), max(v0, v2)), max(v0, min(v1, v2))) ||\n\
             Max:\n    rewrite(max(min(v0, v1), min(v0, v2)), min(v0, max(v1, v2))) ||\n"
        );
    }
}
