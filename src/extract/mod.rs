//! Candidate pattern extraction.
//!
//! An input expression is first indexed as a DAG (structurally equal
//! subexpressions share a node id), then every connected subgraph
//! rooted at an interior node is enumerated. Nodes left outside the
//! subgraph become wildcards, numbered `v0, v1, ...` in encounter
//! order; a shared id always maps to the same wildcard, which is what
//! later lets the rule search prefer patterns with a repeated operand.

#![allow(dead_code)]

use crate::ir::expr::{Expr, ScalarType};
use crate::ir::visit::map_children;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// Most distinct wildcards a pattern may use; needier patterns are discarded.
const MAX_WILDCARDS: usize = 6;

/// Enumerate every candidate left-hand-side pattern of `e`.
///
/// Each returned pattern has at least two interior nodes and at most
/// [`MAX_WILDCARDS`] distinct wildcards. The list may contain
/// duplicates across different subgraph roots; callers dedup.
pub fn all_lhs_patterns(e: &Expr) -> Vec<Expr> {
    let dag = Dag::build(e);

    let mut enumerator = SubgraphEnumerator {
        dag: &dag,
        patterns: Vec::new(),
    };

    let mut rejected = BTreeSet::new();
    let mut current = BTreeSet::new();
    let mut frontier = BTreeSet::new();
    for id in 0..dag.len() {
        // Only interior nodes can root a pattern
        if dag.children[id].is_empty() {
            continue;
        }
        frontier.insert(id);
        enumerator.enumerate(&mut rejected, &mut current, &mut frontier);
        frontier.clear();
    }

    enumerator.patterns
}

/// Shared-subexpression view of one expression. Ids are dense, assigned
/// in first-visit order, so the root is always id 0.
struct Dag {
    id_for_expr: FxHashMap<Expr, usize>,
    expr_for_id: Vec<Expr>,
    children: Vec<BTreeSet<usize>>,
    parents: Vec<BTreeSet<usize>>,
}

impl Dag {
    fn build(e: &Expr) -> Self {
        let mut dag = Dag {
            id_for_expr: FxHashMap::default(),
            expr_for_id: Vec::new(),
            children: Vec::new(),
            parents: Vec::new(),
        };
        dag.record(e, None);
        dag
    }

    fn len(&self) -> usize {
        self.expr_for_id.len()
    }

    fn record(&mut self, e: &Expr, parent: Option<usize>) {
        let (id, unseen) = match self.id_for_expr.get(e) {
            Some(&id) => (id, false),
            None => {
                let id = self.expr_for_id.len();
                self.id_for_expr.insert(e.clone(), id);
                self.expr_for_id.push(e.clone());
                self.children.push(BTreeSet::new());
                self.parents.push(BTreeSet::new());
                (id, true)
            }
        };
        if unseen {
            for c in e.children() {
                self.record(c, Some(id));
            }
        }
        if let Some(p) = parent {
            self.parents[id].insert(p);
            self.children[p].insert(id);
        }
    }
}

struct SubgraphEnumerator<'a> {
    dag: &'a Dag,
    patterns: Vec<Expr>,
}

impl SubgraphEnumerator<'_> {
    /// Depth-first enumeration over three disjoint id sets: nodes
    /// committed to the subgraph, nodes that must stay outside (future
    /// wildcards), and the inclusion frontier. The sets are threaded by
    /// reference and every mutation is undone on return.
    fn enumerate(
        &mut self,
        rejected: &mut BTreeSet<usize>,
        current: &mut BTreeSet<usize>,
        frontier: &mut BTreeSet<usize>,
    ) {
        let Some(&v) = frontier.iter().next() else {
            if !current.is_empty() {
                self.emit(current);
            }
            return;
        };
        frontier.remove(&v);

        // Leave v out. Only Int32 nodes can be abstracted to a
        // wildcard; anything else must be part of the pattern.
        if self.dag.expr_for_id[v].ty() == ScalarType::Int32 {
            rejected.insert(v);
            self.enumerate(rejected, current, frontier);
            rejected.remove(&v);
        }

        // Take v in, extending the frontier with its interior children.
        current.insert(v);
        let added: Vec<usize> = self.dag.children[v]
            .iter()
            .copied()
            .filter(|c| {
                !self.dag.children[*c].is_empty()
                    && !rejected.contains(c)
                    && !current.contains(c)
                    && !frontier.contains(c)
            })
            .collect();
        for &c in &added {
            frontier.insert(c);
        }
        self.enumerate(rejected, current, frontier);
        for &c in &added {
            frontier.remove(&c);
        }
        current.remove(&v);

        frontier.insert(v);
    }

    fn emit(&mut self, current: &BTreeSet<usize>) {
        let root = self.dag.expr_for_id[*current.iter().next().unwrap()].clone();
        let mut renumbering: FxHashMap<usize, usize> = FxHashMap::default();
        let pattern = self.materialize(&root, current, &mut renumbering);
        if current.len() <= 1 || renumbering.len() > MAX_WILDCARDS {
            // too few interior nodes, or too many wildcards
            return;
        }
        self.patterns.push(pattern);
    }

    /// Rebuild the subgraph as a pattern: in-subgraph references stay
    /// structural, everything else becomes a wildcard variable.
    fn materialize(
        &self,
        e: &Expr,
        current: &BTreeSet<usize>,
        renumbering: &mut FxHashMap<usize, usize>,
    ) -> Expr {
        let id = self.dag.id_for_expr[e];
        if current.contains(&id) {
            map_children(e, &mut |c| self.materialize(c, current, renumbering))
        } else {
            let next = renumbering.len();
            let n = *renumbering.entry(id).or_insert(next);
            Expr::var(format!("v{}", n))
        }
    }
}
