//! Input corpus: expressions the simplifier ought to prove, collected
//! from identities it currently fails to discharge. Entries that do
//! simplify to `true` are counted as handled and skipped; the rest seed
//! pattern extraction.

use crate::ir::expr::{add, eq, ge, le, lt, max, min, mul, ne, not, or, select, sub, Expr};

fn x() -> Expr {
    Expr::var("x")
}

fn y() -> Expr {
    Expr::var("y")
}

fn z() -> Expr {
    Expr::var("z")
}

fn w() -> Expr {
    Expr::var("w")
}

pub fn corpus() -> Vec<Expr> {
    vec![
        // already discharged by the local simplifier
        eq(min(x(), x()), x()),
        eq(x() + 0, x()),
        eq(x() * 1, x()),
        eq(sub(x(), x()), 0),
        le(x(), x()),
        // min/max algebra
        eq(min(x(), y()), min(y(), x())),
        eq(max(x(), y()), max(y(), x())),
        eq(min(min(x(), y()), y()), min(x(), y())),
        eq(max(max(x(), y()), y()), max(x(), y())),
        eq(min(max(x(), y()), x()), x()),
        eq(max(min(x(), y()), x()), x()),
        eq(max(min(x(), y()), min(x(), z())), min(x(), max(y(), z()))),
        eq(min(max(x(), y()), max(x(), z())), max(x(), min(y(), z()))),
        eq(add(min(x(), y()), max(x(), y())), add(x(), y())),
        eq(sub(max(x(), y()), min(x(), y())), max(sub(x(), y()), sub(y(), x()))),
        eq(min(add(x(), z()), add(y(), z())), add(min(x(), y()), z())),
        eq(max(add(x(), z()), add(y(), z())), add(max(x(), y()), z())),
        eq(min(sub(z(), x()), sub(z(), y())), sub(z(), max(x(), y()))),
        // select forms
        eq(select(lt(x(), y()), x(), y()), min(x(), y())),
        eq(select(lt(x(), y()), y(), x()), max(x(), y())),
        eq(select(le(x(), y()), x(), y()), min(x(), y())),
        eq(select(lt(x(), y()), 1, 0), select(ge(x(), y()), 0, 1)),
        // comparison consequences
        le(min(x(), y()), x()),
        ge(max(x(), y()), x()),
        le(min(x(), y()), max(x(), y())),
        or(le(x(), y()), le(y(), x())),
        ne(min(x(), y()), add(max(x(), y()), 1)),
        not(lt(max(x(), y()), min(x(), y()))),
        // distribution over arithmetic
        eq(mul(add(x(), y()), z()), add(mul(x(), z()), mul(y(), z()))),
        eq(add(add(x(), y()), sub(z(), y())), add(x(), z())),
        eq(mul(min(x(), y()), 2), add(min(x(), y()), min(x(), y()))),
        // raw subexpressions worth mining even without an equation
        max(min(x(), y()), min(x(), z())),
        select(lt(x(), y()), x(), y()),
        min(add(x(), w()), add(y(), w())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::expr::ScalarType;
    use crate::ir::simplify::simplify;

    #[test]
    fn test_corpus_entries_are_boolean_or_int32() {
        for e in corpus() {
            let ty = e.ty();
            assert!(
                ty == ScalarType::Bool || ty == ScalarType::Int32,
                "unexpected type {:?} for {}",
                ty,
                e
            );
        }
    }

    #[test]
    fn test_corpus_has_entries_the_simplifier_already_handles() {
        let handled = corpus()
            .iter()
            .filter(|e| simplify(e).is_const_true())
            .count();
        assert!(handled >= 5, "expected at least 5 handled entries, got {}", handled);
    }

    #[test]
    fn test_corpus_has_entries_needing_synthesis() {
        let open = corpus()
            .iter()
            .filter(|e| !simplify(e).is_const_true())
            .count();
        assert!(open >= 20, "expected at least 20 open entries, got {}", open);
    }
}
