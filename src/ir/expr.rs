//! Expression tree definitions for the simplifier IR

#![allow(dead_code)]

use ordered_float::OrderedFloat;
use std::fmt;
use std::sync::Arc;

/// Scalar types carried by expression nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScalarType {
    Bool,
    Int32,
    UInt32,
    Float32,
    Str,
}

impl ScalarType {
    pub fn is_float(&self) -> bool {
        matches!(self, ScalarType::Float32)
    }
}

/// Node kind discriminant, used for grouping and dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExprKind {
    IntImm,
    UIntImm,
    FloatImm,
    StringImm,
    BoolImm,
    Var,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Min,
    Max,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    Select,
    Let,
    Broadcast,
    Ramp,
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExprKind::IntImm => "IntImm",
            ExprKind::UIntImm => "UIntImm",
            ExprKind::FloatImm => "FloatImm",
            ExprKind::StringImm => "StringImm",
            ExprKind::BoolImm => "BoolImm",
            ExprKind::Var => "Var",
            ExprKind::Add => "Add",
            ExprKind::Sub => "Sub",
            ExprKind::Mul => "Mul",
            ExprKind::Div => "Div",
            ExprKind::Mod => "Mod",
            ExprKind::Min => "Min",
            ExprKind::Max => "Max",
            ExprKind::Eq => "EQ",
            ExprKind::Ne => "NE",
            ExprKind::Lt => "LT",
            ExprKind::Le => "LE",
            ExprKind::Gt => "GT",
            ExprKind::Ge => "GE",
            ExprKind::And => "And",
            ExprKind::Or => "Or",
            ExprKind::Not => "Not",
            ExprKind::Select => "Select",
            ExprKind::Let => "Let",
            ExprKind::Broadcast => "Broadcast",
            ExprKind::Ramp => "Ramp",
        };
        write!(f, "{}", name)
    }
}

/// Expression node payload. `Expr` wraps this in an `Arc`, so cloning an
/// expression is cheap and subtrees may be shared freely.
///
/// The derived `Ord` gives a deterministic total order (discriminant
/// first, then fields) which keys every ordered container in the crate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExprNode {
    IntImm(i64),
    UIntImm(u64),
    FloatImm(OrderedFloat<f64>),
    StringImm(String),
    BoolImm(bool),
    Var {
        name: String,
        ty: ScalarType,
    },
    Add(Expr, Expr),
    Sub(Expr, Expr),
    Mul(Expr, Expr),
    Div(Expr, Expr),
    Mod(Expr, Expr),
    Min(Expr, Expr),
    Max(Expr, Expr),
    Eq(Expr, Expr),
    Ne(Expr, Expr),
    Lt(Expr, Expr),
    Le(Expr, Expr),
    Gt(Expr, Expr),
    Ge(Expr, Expr),
    And(Expr, Expr),
    Or(Expr, Expr),
    Not(Expr),
    Select(Expr, Expr, Expr),
    Let {
        name: String,
        value: Expr,
        body: Expr,
    },
    Broadcast {
        value: Expr,
        lanes: u32,
    },
    Ramp {
        base: Expr,
        stride: Expr,
        lanes: u32,
    },
}

/// An immutable expression tree
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Expr(Arc<ExprNode>);

impl Expr {
    pub fn new(node: ExprNode) -> Self {
        Expr(Arc::new(node))
    }

    pub fn node(&self) -> &ExprNode {
        &self.0
    }

    /// Integer variable (all synthesis variables are Int32)
    pub fn var(name: impl Into<String>) -> Self {
        Expr::new(ExprNode::Var {
            name: name.into(),
            ty: ScalarType::Int32,
        })
    }

    pub fn var_typed(name: impl Into<String>, ty: ScalarType) -> Self {
        Expr::new(ExprNode::Var {
            name: name.into(),
            ty,
        })
    }

    pub fn kind(&self) -> ExprKind {
        match self.node() {
            ExprNode::IntImm(_) => ExprKind::IntImm,
            ExprNode::UIntImm(_) => ExprKind::UIntImm,
            ExprNode::FloatImm(_) => ExprKind::FloatImm,
            ExprNode::StringImm(_) => ExprKind::StringImm,
            ExprNode::BoolImm(_) => ExprKind::BoolImm,
            ExprNode::Var { .. } => ExprKind::Var,
            ExprNode::Add(..) => ExprKind::Add,
            ExprNode::Sub(..) => ExprKind::Sub,
            ExprNode::Mul(..) => ExprKind::Mul,
            ExprNode::Div(..) => ExprKind::Div,
            ExprNode::Mod(..) => ExprKind::Mod,
            ExprNode::Min(..) => ExprKind::Min,
            ExprNode::Max(..) => ExprKind::Max,
            ExprNode::Eq(..) => ExprKind::Eq,
            ExprNode::Ne(..) => ExprKind::Ne,
            ExprNode::Lt(..) => ExprKind::Lt,
            ExprNode::Le(..) => ExprKind::Le,
            ExprNode::Gt(..) => ExprKind::Gt,
            ExprNode::Ge(..) => ExprKind::Ge,
            ExprNode::And(..) => ExprKind::And,
            ExprNode::Or(..) => ExprKind::Or,
            ExprNode::Not(..) => ExprKind::Not,
            ExprNode::Select(..) => ExprKind::Select,
            ExprNode::Let { .. } => ExprKind::Let,
            ExprNode::Broadcast { .. } => ExprKind::Broadcast,
            ExprNode::Ramp { .. } => ExprKind::Ramp,
        }
    }

    /// Scalar type of the value this expression produces
    pub fn ty(&self) -> ScalarType {
        match self.node() {
            ExprNode::IntImm(_) => ScalarType::Int32,
            ExprNode::UIntImm(_) => ScalarType::UInt32,
            ExprNode::FloatImm(_) => ScalarType::Float32,
            ExprNode::StringImm(_) => ScalarType::Str,
            ExprNode::BoolImm(_) => ScalarType::Bool,
            ExprNode::Var { ty, .. } => *ty,
            ExprNode::Add(a, _)
            | ExprNode::Sub(a, _)
            | ExprNode::Mul(a, _)
            | ExprNode::Div(a, _)
            | ExprNode::Mod(a, _)
            | ExprNode::Min(a, _)
            | ExprNode::Max(a, _) => a.ty(),
            ExprNode::Eq(..)
            | ExprNode::Ne(..)
            | ExprNode::Lt(..)
            | ExprNode::Le(..)
            | ExprNode::Gt(..)
            | ExprNode::Ge(..)
            | ExprNode::And(..)
            | ExprNode::Or(..)
            | ExprNode::Not(..) => ScalarType::Bool,
            ExprNode::Select(_, t, _) => t.ty(),
            ExprNode::Let { body, .. } => body.ty(),
            ExprNode::Broadcast { value, .. } => value.ty(),
            ExprNode::Ramp { base, .. } => base.ty(),
        }
    }

    /// Direct children, left to right
    pub fn children(&self) -> Vec<&Expr> {
        match self.node() {
            ExprNode::IntImm(_)
            | ExprNode::UIntImm(_)
            | ExprNode::FloatImm(_)
            | ExprNode::StringImm(_)
            | ExprNode::BoolImm(_)
            | ExprNode::Var { .. } => vec![],
            ExprNode::Add(a, b)
            | ExprNode::Sub(a, b)
            | ExprNode::Mul(a, b)
            | ExprNode::Div(a, b)
            | ExprNode::Mod(a, b)
            | ExprNode::Min(a, b)
            | ExprNode::Max(a, b)
            | ExprNode::Eq(a, b)
            | ExprNode::Ne(a, b)
            | ExprNode::Lt(a, b)
            | ExprNode::Le(a, b)
            | ExprNode::Gt(a, b)
            | ExprNode::Ge(a, b)
            | ExprNode::And(a, b)
            | ExprNode::Or(a, b) => vec![a, b],
            ExprNode::Not(a) => vec![a],
            ExprNode::Select(c, t, f) => vec![c, t, f],
            ExprNode::Let { value, body, .. } => vec![value, body],
            ExprNode::Broadcast { value, .. } => vec![value],
            ExprNode::Ramp { base, stride, .. } => vec![base, stride],
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    pub fn as_int(&self) -> Option<i64> {
        match self.node() {
            ExprNode::IntImm(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_var(&self) -> Option<&str> {
        match self.node() {
            ExprNode::Var { name, .. } => Some(name),
            _ => None,
        }
    }

    /// True if this is the literal truth value. Accepts the integer
    /// encodings 1 / 1u alongside the boolean literal so short-circuit
    /// checks behave the same for lifted boolean expressions.
    pub fn is_const_true(&self) -> bool {
        matches!(
            self.node(),
            ExprNode::BoolImm(true) | ExprNode::IntImm(1) | ExprNode::UIntImm(1)
        )
    }

    pub fn is_const_false(&self) -> bool {
        matches!(
            self.node(),
            ExprNode::BoolImm(false) | ExprNode::IntImm(0) | ExprNode::UIntImm(0)
        )
    }
}

impl From<i64> for Expr {
    fn from(v: i64) -> Self {
        Expr::new(ExprNode::IntImm(v))
    }
}

// Lets bare integer literals flow into the builder functions
impl From<i32> for Expr {
    fn from(v: i32) -> Self {
        Expr::new(ExprNode::IntImm(i64::from(v)))
    }
}

impl From<bool> for Expr {
    fn from(v: bool) -> Self {
        Expr::new(ExprNode::BoolImm(v))
    }
}

macro_rules! binary_builder {
    ($(#[$meta:meta])* $name:ident, $variant:ident) => {
        $(#[$meta])*
        pub fn $name(a: impl Into<Expr>, b: impl Into<Expr>) -> Expr {
            Expr::new(ExprNode::$variant(a.into(), b.into()))
        }
    };
}

binary_builder!(add, Add);
binary_builder!(sub, Sub);
binary_builder!(mul, Mul);
binary_builder!(div, Div);
binary_builder!(modulo, Mod);
binary_builder!(min, Min);
binary_builder!(max, Max);
binary_builder!(eq, Eq);
binary_builder!(ne, Ne);
binary_builder!(lt, Lt);
binary_builder!(le, Le);
binary_builder!(gt, Gt);
binary_builder!(ge, Ge);
binary_builder!(and, And);
binary_builder!(or, Or);

pub fn not(a: impl Into<Expr>) -> Expr {
    Expr::new(ExprNode::Not(a.into()))
}

pub fn select(cond: impl Into<Expr>, then: impl Into<Expr>, otherwise: impl Into<Expr>) -> Expr {
    Expr::new(ExprNode::Select(cond.into(), then.into(), otherwise.into()))
}

pub fn let_in(name: impl Into<String>, value: impl Into<Expr>, body: impl Into<Expr>) -> Expr {
    Expr::new(ExprNode::Let {
        name: name.into(),
        value: value.into(),
        body: body.into(),
    })
}

pub fn broadcast(value: impl Into<Expr>, lanes: u32) -> Expr {
    Expr::new(ExprNode::Broadcast {
        value: value.into(),
        lanes,
    })
}

pub fn ramp(base: impl Into<Expr>, stride: impl Into<Expr>, lanes: u32) -> Expr {
    Expr::new(ExprNode::Ramp {
        base: base.into(),
        stride: stride.into(),
        lanes,
    })
}

impl<R: Into<Expr>> std::ops::Add<R> for Expr {
    type Output = Expr;
    fn add(self, rhs: R) -> Expr {
        add(self, rhs)
    }
}

impl<R: Into<Expr>> std::ops::Sub<R> for Expr {
    type Output = Expr;
    fn sub(self, rhs: R) -> Expr {
        sub(self, rhs)
    }
}

impl<R: Into<Expr>> std::ops::Mul<R> for Expr {
    type Output = Expr;
    fn mul(self, rhs: R) -> Expr {
        mul(self, rhs)
    }
}

impl<R: Into<Expr>> std::ops::Div<R> for Expr {
    type Output = Expr;
    fn div(self, rhs: R) -> Expr {
        div(self, rhs)
    }
}

impl<R: Into<Expr>> std::ops::Rem<R> for Expr {
    type Output = Expr;
    fn rem(self, rhs: R) -> Expr {
        modulo(self, rhs)
    }
}

impl std::ops::Not for Expr {
    type Output = Expr;
    fn not(self) -> Expr {
        not(self)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            ExprNode::IntImm(v) => write!(f, "{}", v),
            ExprNode::UIntImm(v) => write!(f, "{}", v),
            ExprNode::FloatImm(v) => write!(f, "{}f", v),
            ExprNode::StringImm(s) => write!(f, "{:?}", s),
            ExprNode::BoolImm(v) => write!(f, "{}", v),
            ExprNode::Var { name, .. } => write!(f, "{}", name),
            ExprNode::Add(a, b) => write!(f, "({} + {})", a, b),
            ExprNode::Sub(a, b) => write!(f, "({} - {})", a, b),
            ExprNode::Mul(a, b) => write!(f, "({} * {})", a, b),
            ExprNode::Div(a, b) => write!(f, "({} / {})", a, b),
            ExprNode::Mod(a, b) => write!(f, "({} % {})", a, b),
            ExprNode::Min(a, b) => write!(f, "min({}, {})", a, b),
            ExprNode::Max(a, b) => write!(f, "max({}, {})", a, b),
            ExprNode::Eq(a, b) => write!(f, "({} == {})", a, b),
            ExprNode::Ne(a, b) => write!(f, "({} != {})", a, b),
            ExprNode::Lt(a, b) => write!(f, "({} < {})", a, b),
            ExprNode::Le(a, b) => write!(f, "({} <= {})", a, b),
            ExprNode::Gt(a, b) => write!(f, "({} > {})", a, b),
            ExprNode::Ge(a, b) => write!(f, "({} >= {})", a, b),
            ExprNode::And(a, b) => write!(f, "({} && {})", a, b),
            ExprNode::Or(a, b) => write!(f, "({} || {})", a, b),
            ExprNode::Not(a) => write!(f, "!{}", a),
            ExprNode::Select(c, t, e) => write!(f, "select({}, {}, {})", c, t, e),
            ExprNode::Let { name, value, body } => {
                write!(f, "(let {} = {} in {})", name, value, body)
            }
            ExprNode::Broadcast { value, lanes } => write!(f, "broadcast({}, {})", value, lanes),
            ExprNode::Ramp { base, stride, lanes } => {
                write!(f, "ramp({}, {}, {})", base, stride, lanes)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality_shares_and_compares_by_content() {
        let a = min(Expr::var("x"), Expr::var("y"));
        let b = min(Expr::var("x"), Expr::var("y"));
        assert_eq!(a, b);
        assert_ne!(a, min(Expr::var("y"), Expr::var("x")));
    }

    #[test]
    fn test_types() {
        let x = Expr::var("x");
        assert_eq!(x.ty(), ScalarType::Int32);
        assert_eq!((x.clone() + 1).ty(), ScalarType::Int32);
        assert_eq!(lt(x.clone(), 3).ty(), ScalarType::Bool);
        assert_eq!(select(lt(x.clone(), 3), x.clone(), 0).ty(), ScalarType::Int32);
        assert_eq!(let_in("t", x.clone(), lt(Expr::var("t"), 2)).ty(), ScalarType::Bool);
    }

    #[test]
    fn test_kind_grouping_order_is_total() {
        let mut kinds = vec![
            max(0, 1).kind(),
            min(0, 1).kind(),
            add(0, 1).kind(),
        ];
        kinds.sort();
        assert_eq!(kinds, vec![ExprKind::Add, ExprKind::Min, ExprKind::Max]);
    }

    #[test]
    fn test_deterministic_order_on_exprs() {
        let a = min(Expr::var("x"), Expr::var("y"));
        let b = max(Expr::var("x"), Expr::var("y"));
        // Min precedes Max in declaration order
        assert!(a < b);
        // ties broken by fields
        assert!(min(Expr::var("x"), Expr::var("y")) < min(Expr::var("x"), Expr::var("z")));
    }

    #[test]
    fn test_display() {
        let x = Expr::var("x");
        let y = Expr::var("y");
        let e = select(lt(x.clone(), y.clone()), x.clone(), y.clone());
        assert_eq!(e.to_string(), "select((x < y), x, y)");
        assert_eq!(min(x.clone(), y.clone()).to_string(), "min(x, y)");
        assert_eq!((x.clone() + 0).to_string(), "(x + 0)");
        assert_eq!(let_in("t0", x + 1, Expr::var("t0")).to_string(), "(let t0 = (x + 1) in t0)");
    }

    #[test]
    fn test_const_truth_values() {
        assert!(Expr::from(true).is_const_true());
        assert!(Expr::from(1).is_const_true());
        assert!(Expr::from(false).is_const_false());
        assert!(Expr::from(0).is_const_false());
        assert!(!Expr::var("x").is_const_true());
    }
}
