//! Parser for the solver's textual `(get-model)` output.
//!
//! The accepted grammar is
//!
//! ```text
//! (model?
//!   (define-fun NAME () Int VALUE)
//!   ...
//! )
//! ```
//!
//! where VALUE is a bare integer numeral or `(- N)`. Newer z3 releases
//! omit the leading `model` atom, so it is optional. Definitions whose
//! name starts with `z3name!` are solver-internal skolem constants and
//! are not recorded.

use crate::ir::expr::Expr;
use crate::ir::visit::Bindings;
use std::fmt;

/// Model text did not match the expected grammar
#[derive(Debug, Clone)]
pub struct ModelError {
    pub expected: String,
    pub found: String,
}

impl ModelError {
    fn new(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "model parse failed: expected {}, found {:?}",
            self.expected, self.found
        )
    }
}

impl std::error::Error for ModelError {}

const SKOLEM_PREFIX: &str = "z3name!";

/// Parse a model block, inserting each integer assignment into
/// `bindings`. Assignments for skolem names are skipped; existing
/// entries for other names are overwritten.
pub fn parse_model(text: &str, bindings: &mut Bindings) -> Result<(), ModelError> {
    let mut cur = Cursor::new(text);
    cur.skip_whitespace();
    cur.expect("(")?;
    cur.skip_whitespace();
    cur.consume("model");
    cur.skip_whitespace();
    while cur.consume("(define-fun") {
        cur.skip_whitespace();
        let name = cur.token().to_string();
        cur.skip_whitespace();
        cur.expect("()")?;
        cur.skip_whitespace();
        cur.expect("Int")?;
        cur.skip_whitespace();
        let value = if cur.consume("(-") {
            cur.skip_whitespace();
            let magnitude = parse_int(cur.token())?;
            cur.skip_whitespace();
            cur.consume(")");
            -magnitude
        } else {
            parse_int(cur.token())?
        };
        if !name.starts_with(SKOLEM_PREFIX) {
            bindings.insert(name, Expr::from(value));
        }
        cur.skip_whitespace();
        cur.consume(")");
        cur.skip_whitespace();
    }
    cur.skip_whitespace();
    cur.expect(")")?;
    Ok(())
}

fn parse_int(token: &str) -> Result<i64, ModelError> {
    token
        .parse::<i64>()
        .map_err(|_| ModelError::new("an integer literal", token))
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Cursor { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest().trim_start_matches(|c: char| c.is_whitespace());
        self.pos = self.text.len() - trimmed.len();
    }

    /// Advance past `pattern` if the input starts with it
    fn consume(&mut self, pattern: &str) -> bool {
        if self.rest().starts_with(pattern) {
            self.pos += pattern.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, pattern: &str) -> Result<(), ModelError> {
        if self.consume(pattern) {
            Ok(())
        } else {
            let found: String = self.rest().chars().take(40).collect();
            Err(ModelError::new(format!("{:?}", pattern), found))
        }
    }

    /// A token runs until whitespace or a closing paren
    fn token(&mut self) -> &'a str {
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || c == ')')
            .unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_assignment() {
        let mut b = Bindings::new();
        parse_model("(model\n  (define-fun x () Int 5)\n)\n", &mut b).unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(b["x"], Expr::from(5));
    }

    #[test]
    fn test_negative_assignment() {
        let mut b = Bindings::new();
        parse_model("(model (define-fun x () Int (- 7)))", &mut b).unwrap();
        assert_eq!(b["x"], Expr::from(-7));
    }

    #[test]
    fn test_skolem_names_are_skipped() {
        let mut b = Bindings::new();
        parse_model(
            "(model (define-fun z3name!foo () Int 3) (define-fun y () Int 2))",
            &mut b,
        )
        .unwrap();
        assert_eq!(b.len(), 1);
        assert_eq!(b["y"], Expr::from(2));
    }

    #[test]
    fn test_model_atom_is_optional() {
        let mut b = Bindings::new();
        parse_model("(\n  (define-fun x () Int 1)\n)\n", &mut b).unwrap();
        assert_eq!(b["x"], Expr::from(1));
    }

    #[test]
    fn test_multiple_assignments_overwrite_existing_entries() {
        let mut b = Bindings::new();
        b.insert("op0".to_string(), Expr::from(0));
        parse_model(
            "(model (define-fun op0 () Int 9) (define-fun op1 () Int 1))",
            &mut b,
        )
        .unwrap();
        assert_eq!(b["op0"], Expr::from(9));
        assert_eq!(b["op1"], Expr::from(1));
    }

    #[test]
    fn test_empty_model() {
        let mut b = Bindings::new();
        parse_model("(model )", &mut b).unwrap();
        assert!(b.is_empty());
    }

    #[test]
    fn test_malformed_model_is_an_error() {
        let mut b = Bindings::new();
        assert!(parse_model("(model (define-fun x () Bool true))", &mut b).is_err());
        assert!(parse_model("sat", &mut b).is_err());
    }
}
