//! The statement model the translator produces and the emitter consumes.

use crate::value::Value;

use super::fragment::SqlFragment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

impl JoinKind {
    pub(crate) fn sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
        }
    }
}

/// One join clause: kind, target table, its alias, and the ON predicate.
#[derive(Debug, Clone)]
pub struct JoinRecord {
    pub kind: JoinKind,
    pub table: String,
    pub alias: String,
    pub on: SqlFragment,
}

/// One ORDER BY key.
#[derive(Debug, Clone)]
pub struct OrderFragment {
    pub expr: SqlFragment,
    pub descending: bool,
}

/// One result column.
#[derive(Debug, Clone)]
pub struct SelectFragment {
    pub fragment: SqlFragment,
    pub alias: Option<String>,
}

/// A pre-rendered UNION branch. Branches carry no order or limit of their
/// own; those belong to the whole statement.
#[derive(Debug, Clone)]
pub struct UnionBranch {
    pub sql: String,
    pub params: Vec<(String, Value)>,
    pub all: bool,
}

/// What kind of statement the model describes.
#[derive(Debug, Clone)]
pub enum QueryShape {
    Select,
    /// SET clauses as (column, value-fragment) pairs.
    Update(Vec<(String, SqlFragment)>),
    Delete,
}

/// A scalar wrapper applied around the rendered core SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapKind {
    Exists,
    NotExists,
    Count,
    Min,
    Max,
    Sum,
    Avg,
}

/// Everything the emitter needs to render one statement.
#[derive(Debug, Clone)]
pub struct SqlModel {
    pub from_table: String,
    /// None for UPDATE/DELETE, which render unqualified.
    pub alias: Option<String>,
    pub joins: Vec<JoinRecord>,
    /// ANDed WHERE predicates.
    pub predicates: Vec<SqlFragment>,
    pub order: Vec<OrderFragment>,
    pub selects: Vec<SelectFragment>,
    pub unions: Vec<UnionBranch>,
    pub shape: QueryShape,
    pub take: Option<i64>,
    pub skip: Option<i64>,
    pub distinct: bool,
    pub wrap: Option<WrapKind>,
    pub require_row: bool,
    pub reject_extra_row: bool,
    pub reverse_after_fetch: bool,
}

impl SqlModel {
    pub fn new(from_table: String, alias: Option<String>) -> Self {
        Self {
            from_table,
            alias,
            joins: Vec::new(),
            predicates: Vec::new(),
            order: Vec::new(),
            selects: Vec::new(),
            unions: Vec::new(),
            shape: QueryShape::Select,
            take: None,
            skip: None,
            distinct: false,
            wrap: None,
            require_row: false,
            reject_extra_row: false,
            reverse_after_fetch: false,
        }
    }
}

/// A rendered statement: final SQL, its parameters in appearance order, and
/// the flags terminals act on after the fetch.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<(String, Value)>,
    pub require_row: bool,
    pub reject_extra_row: bool,
    pub reverse_after_fetch: bool,
}
