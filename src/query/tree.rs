//! The immutable operator tree behind a query handle.
//!
//! Every operator call pushes one node onto an `Arc`-shared chain; handles
//! derived from the same prefix share structure. Nothing here touches the
//! engine.

use std::sync::Arc;

use crate::expr::{Expr, Source};
use crate::schema::{SchemaResult, TableMapping};

/// Deferred mapping lookup, so building a tree never fails. Resolution
/// errors surface at translation time.
pub type MappingFn = fn() -> SchemaResult<Arc<TableMapping>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStyle {
    Inner,
    Left,
    /// Left join whose rows are regrouped per root row on consumption.
    Group,
}

/// One projected result column set.
#[derive(Debug, Clone)]
pub enum SelectItem {
    /// A computed column with an explicit result name.
    Expr { expr: Expr, alias: String },
    /// Every mapped column of a source, optionally under a dotted prefix.
    Source {
        source: Source,
        prefix: Option<String>,
    },
}

impl SelectItem {
    pub fn expr(expr: Expr, alias: &str) -> Self {
        SelectItem::Expr {
            expr,
            alias: alias.to_string(),
        }
    }

    /// All root-table columns, plain.
    pub fn root() -> Self {
        SelectItem::Source {
            source: Source::Root,
            prefix: None,
        }
    }

    /// All columns of the nth join target under `prefix.`.
    pub fn join(join: usize, prefix: &str) -> Self {
        SelectItem::Source {
            source: Source::Join(join),
            prefix: Some(prefix.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Op {
    Source {
        mapping: MappingFn,
    },
    Filter {
        predicate: Expr,
    },
    Select {
        items: Vec<SelectItem>,
    },
    Join {
        mapping: MappingFn,
        style: JoinStyle,
        on: Expr,
    },
    Order {
        key: Expr,
        descending: bool,
        /// `then_by` appends to the existing key list instead of replacing it.
        then: bool,
    },
    Skip(i64),
    Take(i64),
    Distinct,
    Union {
        other: Arc<Node>,
        all: bool,
    },
    Reverse,
}

#[derive(Debug)]
pub struct Node {
    pub prev: Option<Arc<Node>>,
    pub op: Op,
}

impl Node {
    pub fn root(mapping: MappingFn) -> Arc<Node> {
        Arc::new(Node {
            prev: None,
            op: Op::Source { mapping },
        })
    }

    pub fn push(prev: &Arc<Node>, op: Op) -> Arc<Node> {
        Arc::new(Node {
            prev: Some(Arc::clone(prev)),
            op,
        })
    }

    /// The chain in source-first order.
    pub fn chain(node: &Arc<Node>) -> Vec<Arc<Node>> {
        let mut out = Vec::new();
        let mut current = Some(Arc::clone(node));
        while let Some(n) = current {
            current = n.prev.clone();
            out.push(n);
        }
        out.reverse();
        out
    }
}
