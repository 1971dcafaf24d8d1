//! Expression trees.
//!
//! Predicates, projections, set-clauses, and order keys are all values of
//! the closed [`Expr`] union. Trees are built with the free constructors
//! ([`col`], [`col_of`], [`val`], [`null`]) and the [`ExprExt`] combinators;
//! translation happens later, against a resolved source list.

use crate::value::Value;

// ============================================================================
// Sources and operators
// ============================================================================

/// Which joined table a column path resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The root table of the query.
    Root,
    /// The nth join target, in join order.
    Join(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub(crate) fn sql(self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }

    pub(crate) fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Calendar unit for date arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Months,
    Years,
}

impl DateUnit {
    pub(crate) fn modifier(self) -> &'static str {
        match self {
            DateUnit::Seconds => " seconds",
            DateUnit::Minutes => " minutes",
            DateUnit::Hours => " hours",
            DateUnit::Days => " days",
            DateUnit::Months => " months",
            DateUnit::Years => " years",
        }
    }
}

/// Recognized function calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Contains { case_insensitive: bool },
    StartsWith { case_insensitive: bool },
    EndsWith { case_insensitive: bool },
    TextEquals { case_insensitive: bool },
    IndexOf,
    Replace,
    Trim,
    TrimStart,
    TrimEnd,
    Substring,
    Upper,
    Lower,
    Abs,
    Round,
    Ceiling,
    Floor,
    Least,
    Greatest,
    DateAdd(DateUnit),
}

// ============================================================================
// Expr
// ============================================================================

/// A closed expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A dotted member chain rooted at a source.
    Column { source: Source, path: Vec<String> },
    /// A constant leaf, always bound as a parameter at translation time.
    Value(Value),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Call {
        func: Func,
        args: Vec<Expr>,
    },
}

/// A root-table column reference. Dots split the path into member segments.
pub fn col(path: &str) -> Expr {
    Expr::Column {
        source: Source::Root,
        path: path.split('.').map(str::to_string).collect(),
    }
}

/// A column reference against the nth join target.
pub fn col_of(join: usize, path: &str) -> Expr {
    Expr::Column {
        source: Source::Join(join),
        path: path.split('.').map(str::to_string).collect(),
    }
}

/// A constant leaf.
pub fn val(value: impl Into<Value>) -> Expr {
    Expr::Value(value.into())
}

/// The constant NULL.
pub fn null() -> Expr {
    Expr::Value(Value::Null)
}

macro_rules! expr_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Expr {
                fn from(value: $ty) -> Self {
                    Expr::Value(value.into())
                }
            }
        )*
    };
}

expr_from_value!(
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    bool,
    f32,
    f64,
    &str,
    String,
    Vec<u8>,
    uuid::Uuid,
    crate::value::Timestamp,
    Value,
);

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn call(func: Func, args: Vec<Expr>) -> Expr {
    Expr::Call { func, args }
}

// ============================================================================
// ExprExt
// ============================================================================

/// Combinators for building expression trees.
///
/// Comparison and arithmetic operands take `impl Into<Expr>`, so constants
/// can appear directly: `col("price").gt(10.0)`.
pub trait ExprExt: Sized {
    fn into_expr(self) -> Expr;

    fn eq(self, other: impl Into<Expr>) -> Expr {
        binary(BinaryOp::Eq, self.into_expr(), other.into())
    }

    fn ne(self, other: impl Into<Expr>) -> Expr {
        binary(BinaryOp::Ne, self.into_expr(), other.into())
    }

    fn lt(self, other: impl Into<Expr>) -> Expr {
        binary(BinaryOp::Lt, self.into_expr(), other.into())
    }

    fn lte(self, other: impl Into<Expr>) -> Expr {
        binary(BinaryOp::Lte, self.into_expr(), other.into())
    }

    fn gt(self, other: impl Into<Expr>) -> Expr {
        binary(BinaryOp::Gt, self.into_expr(), other.into())
    }

    fn gte(self, other: impl Into<Expr>) -> Expr {
        binary(BinaryOp::Gte, self.into_expr(), other.into())
    }

    fn and(self, other: impl Into<Expr>) -> Expr {
        binary(BinaryOp::And, self.into_expr(), other.into())
    }

    fn or(self, other: impl Into<Expr>) -> Expr {
        binary(BinaryOp::Or, self.into_expr(), other.into())
    }

    fn not(self) -> Expr {
        Expr::Unary {
            op: UnaryOp::Not,
            expr: Box::new(self.into_expr()),
        }
    }

    fn add(self, other: impl Into<Expr>) -> Expr {
        binary(BinaryOp::Add, self.into_expr(), other.into())
    }

    fn sub(self, other: impl Into<Expr>) -> Expr {
        binary(BinaryOp::Sub, self.into_expr(), other.into())
    }

    fn mul(self, other: impl Into<Expr>) -> Expr {
        binary(BinaryOp::Mul, self.into_expr(), other.into())
    }

    fn div(self, other: impl Into<Expr>) -> Expr {
        binary(BinaryOp::Div, self.into_expr(), other.into())
    }

    fn modulo(self, other: impl Into<Expr>) -> Expr {
        binary(BinaryOp::Mod, self.into_expr(), other.into())
    }

    fn neg(self) -> Expr {
        Expr::Unary {
            op: UnaryOp::Neg,
            expr: Box::new(self.into_expr()),
        }
    }

    fn contains(self, needle: impl Into<Expr>) -> Expr {
        call(
            Func::Contains {
                case_insensitive: false,
            },
            vec![self.into_expr(), needle.into()],
        )
    }

    fn contains_nocase(self, needle: impl Into<Expr>) -> Expr {
        call(
            Func::Contains {
                case_insensitive: true,
            },
            vec![self.into_expr(), needle.into()],
        )
    }

    fn starts_with(self, prefix: impl Into<Expr>) -> Expr {
        call(
            Func::StartsWith {
                case_insensitive: false,
            },
            vec![self.into_expr(), prefix.into()],
        )
    }

    fn starts_with_nocase(self, prefix: impl Into<Expr>) -> Expr {
        call(
            Func::StartsWith {
                case_insensitive: true,
            },
            vec![self.into_expr(), prefix.into()],
        )
    }

    fn ends_with(self, suffix: impl Into<Expr>) -> Expr {
        call(
            Func::EndsWith {
                case_insensitive: false,
            },
            vec![self.into_expr(), suffix.into()],
        )
    }

    fn ends_with_nocase(self, suffix: impl Into<Expr>) -> Expr {
        call(
            Func::EndsWith {
                case_insensitive: true,
            },
            vec![self.into_expr(), suffix.into()],
        )
    }

    fn text_eq(self, other: impl Into<Expr>) -> Expr {
        call(
            Func::TextEquals {
                case_insensitive: false,
            },
            vec![self.into_expr(), other.into()],
        )
    }

    fn text_eq_nocase(self, other: impl Into<Expr>) -> Expr {
        call(
            Func::TextEquals {
                case_insensitive: true,
            },
            vec![self.into_expr(), other.into()],
        )
    }

    fn index_of(self, needle: impl Into<Expr>) -> Expr {
        call(Func::IndexOf, vec![self.into_expr(), needle.into()])
    }

    fn replace(self, from: impl Into<Expr>, to: impl Into<Expr>) -> Expr {
        call(Func::Replace, vec![self.into_expr(), from.into(), to.into()])
    }

    fn trim(self) -> Expr {
        call(Func::Trim, vec![self.into_expr()])
    }

    fn trim_start(self) -> Expr {
        call(Func::TrimStart, vec![self.into_expr()])
    }

    fn trim_end(self) -> Expr {
        call(Func::TrimEnd, vec![self.into_expr()])
    }

    /// Zero-based substring from `start` to the end.
    fn substring(self, start: impl Into<Expr>) -> Expr {
        call(Func::Substring, vec![self.into_expr(), start.into()])
    }

    /// Zero-based substring of `len` characters from `start`.
    fn substring_len(self, start: impl Into<Expr>, len: impl Into<Expr>) -> Expr {
        call(
            Func::Substring,
            vec![self.into_expr(), start.into(), len.into()],
        )
    }

    fn upper(self) -> Expr {
        call(Func::Upper, vec![self.into_expr()])
    }

    fn lower(self) -> Expr {
        call(Func::Lower, vec![self.into_expr()])
    }

    fn abs(self) -> Expr {
        call(Func::Abs, vec![self.into_expr()])
    }

    fn round(self) -> Expr {
        call(Func::Round, vec![self.into_expr()])
    }

    fn ceiling(self) -> Expr {
        call(Func::Ceiling, vec![self.into_expr()])
    }

    fn floor(self) -> Expr {
        call(Func::Floor, vec![self.into_expr()])
    }

    fn least(self, other: impl Into<Expr>) -> Expr {
        call(Func::Least, vec![self.into_expr(), other.into()])
    }

    fn greatest(self, other: impl Into<Expr>) -> Expr {
        call(Func::Greatest, vec![self.into_expr(), other.into()])
    }

    fn date_add(self, unit: DateUnit, amount: impl Into<Expr>) -> Expr {
        call(Func::DateAdd(unit), vec![self.into_expr(), amount.into()])
    }
}

impl ExprExt for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
