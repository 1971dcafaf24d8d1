//! The lazy query surface.
//!
//! A [`Query`] is an immutable handle over an operator tree plus a database
//! handle. Operators return new handles and never touch the engine;
//! terminals translate the tree, execute the compiled statement under the
//! execution lock, and materialize the result.

pub mod tree;

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::db::Database;
use crate::error::{CardinalityError, Error};
use crate::expr::{col, val, Expr, ExprExt};
use crate::materialize::{FromRow, RowIter, RowView};
use crate::schema::{mapping, Entity};
use crate::sql::CompiledQuery;
use crate::translate::{translate, StatementKind, Terminal};
use crate::value::{FromValue, Value};

pub use tree::SelectItem;
use tree::{JoinStyle, Node, Op};

/// A lazy, composable query over `T`'s table producing `Out` rows.
pub struct Query<T: Entity, Out: FromRow = T> {
    db: Database,
    node: Arc<Node>,
    _types: PhantomData<fn() -> (T, Out)>,
}

impl<T: Entity, Out: FromRow> Clone for Query<T, Out> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            node: Arc::clone(&self.node),
            _types: PhantomData,
        }
    }
}

impl<T: Entity> Query<T, T> {
    pub(crate) fn new(db: Database) -> Self {
        Self {
            db,
            node: Node::root(mapping::<T>),
            _types: PhantomData,
        }
    }
}

// ============================================================================
// Operators
// ============================================================================

impl<T: Entity, Out: FromRow> Query<T, Out> {
    fn push(&self, op: Op) -> Self {
        Self {
            db: self.db.clone(),
            node: Node::push(&self.node, op),
            _types: PhantomData,
        }
    }

    #[must_use]
    pub fn filter(&self, predicate: Expr) -> Self {
        self.push(Op::Filter { predicate })
    }

    /// Project into a different output shape. Expression items materialize
    /// by alias or position; source items expand to whole column sets.
    #[must_use]
    pub fn select_as<P: FromRow>(&self, items: Vec<SelectItem>) -> Query<T, P> {
        let node = Node::push(&self.node, Op::Select { items });
        Query {
            db: self.db.clone(),
            node,
            _types: PhantomData,
        }
    }

    /// Project a single computed value.
    #[must_use]
    pub fn select_value<P: FromRow>(&self, expr: Expr) -> Query<T, P> {
        self.select_as(vec![SelectItem::expr(expr, "val")])
    }

    #[must_use]
    pub fn join<U: Entity>(&self, on: Expr) -> Self {
        self.push(Op::Join {
            mapping: mapping::<U>,
            style: JoinStyle::Inner,
            on,
        })
    }

    #[must_use]
    pub fn left_join<U: Entity>(&self, on: Expr) -> Self {
        self.push(Op::Join {
            mapping: mapping::<U>,
            style: JoinStyle::Left,
            on,
        })
    }

    /// Left join whose matches are regrouped per root row by
    /// [`Query::to_grouped`].
    #[must_use]
    pub fn group_join<U: Entity>(&self, on: Expr) -> Self {
        self.push(Op::Join {
            mapping: mapping::<U>,
            style: JoinStyle::Group,
            on,
        })
    }

    #[must_use]
    pub fn order_by(&self, key: Expr) -> Self {
        self.push(Op::Order {
            key,
            descending: false,
            then: false,
        })
    }

    #[must_use]
    pub fn order_by_desc(&self, key: Expr) -> Self {
        self.push(Op::Order {
            key,
            descending: true,
            then: false,
        })
    }

    #[must_use]
    pub fn then_by(&self, key: Expr) -> Self {
        self.push(Op::Order {
            key,
            descending: false,
            then: true,
        })
    }

    #[must_use]
    pub fn then_by_desc(&self, key: Expr) -> Self {
        self.push(Op::Order {
            key,
            descending: true,
            then: true,
        })
    }

    #[must_use]
    pub fn skip(&self, n: i64) -> Self {
        self.push(Op::Skip(n))
    }

    #[must_use]
    pub fn take(&self, n: i64) -> Self {
        self.push(Op::Take(n))
    }

    #[must_use]
    pub fn distinct(&self) -> Self {
        self.push(Op::Distinct)
    }

    /// Flip existing order keys; with no order present the fetched rows are
    /// reversed in memory instead.
    #[must_use]
    pub fn reverse(&self) -> Self {
        self.push(Op::Reverse)
    }

    #[must_use]
    pub fn union(&self, other: &Query<T, Out>) -> Self {
        self.push(Op::Union {
            other: Arc::clone(&other.node),
            all: false,
        })
    }

    #[must_use]
    pub fn union_all(&self, other: &Query<T, Out>) -> Self {
        self.push(Op::Union {
            other: Arc::clone(&other.node),
            all: true,
        })
    }
}

// ============================================================================
// Terminals
// ============================================================================

impl<T: Entity, Out: FromRow> Query<T, Out> {
    /// The compiled SELECT for this handle, without executing it.
    /// Translating the same handle twice yields identical output.
    pub fn compile(&self) -> Result<CompiledQuery, Error> {
        Ok(translate(&self.node, StatementKind::Select(Terminal::Rows))?)
    }

    /// Compile this handle under an explicit statement kind, without
    /// executing it.
    pub fn compile_statement(&self, kind: StatementKind) -> Result<CompiledQuery, Error> {
        Ok(translate(&self.node, kind)?)
    }

    fn fetch(&self, terminal: Terminal) -> Result<Vec<Out>, Error> {
        let compiled = translate(&self.node, StatementKind::Select(terminal))?;
        let mut rows = self.db.with_cursor(&compiled.sql, &compiled.params, |cursor| {
            RowIter::<Out>::new(cursor).collect::<Result<Vec<_>, _>>()
        })?;
        if compiled.reverse_after_fetch {
            rows.reverse();
        }
        Ok(rows)
    }

    fn scalar<V: FromRow>(&self, terminal: Terminal) -> Result<V, Error> {
        let compiled = translate(&self.node, StatementKind::Select(terminal))?;
        self.db.with_cursor(&compiled.sql, &compiled.params, |cursor| {
            if cursor.step()? {
                let view = RowView::new(cursor.columns(), cursor.row());
                Ok(V::from_row(&view)?)
            } else {
                Err(CardinalityError::NoRows.into())
            }
        })
    }

    pub fn to_vec(&self) -> Result<Vec<Out>, Error> {
        self.fetch(Terminal::Rows)
    }

    pub fn to_set(&self) -> Result<HashSet<Out>, Error>
    where
        Out: Eq + Hash,
    {
        Ok(self.fetch(Terminal::Rows)?.into_iter().collect())
    }

    /// Index fetched rows by a key function. Later rows win on collision.
    pub fn to_map<K, F>(&self, key: F) -> Result<HashMap<K, Out>, Error>
    where
        K: Eq + Hash,
        F: Fn(&Out) -> K,
    {
        let mut out = HashMap::new();
        for row in self.fetch(Terminal::Rows)? {
            out.insert(key(&row), row);
        }
        Ok(out)
    }

    /// Group fetched rows by a key function.
    pub fn to_lookup<K, F>(&self, key: F) -> Result<HashMap<K, Vec<Out>>, Error>
    where
        K: Eq + Hash,
        F: Fn(&Out) -> K,
    {
        let mut out: HashMap<K, Vec<Out>> = HashMap::new();
        for row in self.fetch(Terminal::Rows)? {
            out.entry(key(&row)).or_default().push(row);
        }
        Ok(out)
    }

    pub fn first(&self) -> Result<Out, Error> {
        self.fetch(Terminal::First { required: true })?
            .into_iter()
            .next()
            .ok_or_else(|| CardinalityError::NoRows.into())
    }

    pub fn first_opt(&self) -> Result<Option<Out>, Error> {
        Ok(self
            .fetch(Terminal::First { required: false })?
            .into_iter()
            .next())
    }

    pub fn single(&self) -> Result<Out, Error> {
        let mut rows = self.fetch(Terminal::Single { required: true })?;
        match rows.len() {
            1 => Ok(rows.swap_remove(0)),
            0 => Err(CardinalityError::NoRows.into()),
            _ => Err(CardinalityError::MoreThanOne.into()),
        }
    }

    pub fn single_opt(&self) -> Result<Option<Out>, Error> {
        let mut rows = self.fetch(Terminal::Single { required: false })?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(Some(rows.swap_remove(0))),
            _ => Err(CardinalityError::MoreThanOne.into()),
        }
    }

    pub fn any(&self) -> Result<bool, Error> {
        Ok(self.scalar::<i64>(Terminal::Any)? != 0)
    }

    /// Whether every row satisfies the predicate. Vacuously true on an
    /// empty result.
    pub fn all_match(&self, predicate: Expr) -> Result<bool, Error> {
        Ok(self.scalar::<i64>(Terminal::AllMatch(predicate))? != 0)
    }

    pub fn count(&self) -> Result<i64, Error> {
        self.scalar(Terminal::Count)
    }

    /// Whether a row with this row's primary key exists.
    pub fn contains(&self, row: &T) -> Result<bool, Error> {
        let mapping = mapping::<T>()?;
        let key_idx = mapping
            .columns
            .iter()
            .position(|c| c.primary_key)
            .unwrap_or(0);
        let key = row.values().swap_remove(key_idx);
        self.filter(col(&mapping.primary_key().name).eq(val(key)))
            .any()
    }

    pub fn min_of<V: FromValue>(&self, expr: Expr) -> Result<Option<V>, Error> {
        self.scalar(Terminal::Min(expr))
    }

    pub fn max_of<V: FromValue>(&self, expr: Expr) -> Result<Option<V>, Error> {
        self.scalar(Terminal::Max(expr))
    }

    /// Sum over the expression; an empty result sums to zero.
    pub fn sum_of<V: FromValue>(&self, expr: Expr) -> Result<V, Error>
    where
        V: FromRow,
    {
        self.scalar(Terminal::Sum(expr))
    }

    pub fn avg_of(&self, expr: Expr) -> Result<Option<f64>, Error> {
        self.scalar(Terminal::Avg(expr))
    }

    /// Compile and run as an UPDATE of the root table. Joins are not
    /// supported here.
    pub fn update(&self, sets: Vec<(&str, Expr)>) -> Result<usize, Error> {
        let sets = sets
            .into_iter()
            .map(|(column, value)| (column.to_string(), value))
            .collect();
        let compiled = translate(&self.node, StatementKind::Update(sets))?;
        self.db.execute_sql(&compiled.sql, &compiled.params)
    }

    /// Compile and run as a DELETE on the root table. Joins are not
    /// supported here.
    pub fn delete(&self) -> Result<usize, Error> {
        let compiled = translate(&self.node, StatementKind::Delete)?;
        self.db.execute_sql(&compiled.sql, &compiled.params)
    }
}

impl<T: Entity> Query<T, T> {
    /// Consume a group join: one ordered scan, regrouped into
    /// `(root, matches)` pairs by adjacent primary-key runs. Unmatched
    /// roots get an empty group.
    pub fn to_grouped<U: Entity>(&self) -> Result<Vec<(T, Vec<U>)>, Error> {
        let prefix = self
            .group_join_prefix()
            .ok_or(crate::translate::TranslateError::Unsupported(
                "to_grouped requires a group join",
            ))?;
        let compiled = translate(&self.node, StatementKind::Select(Terminal::Grouped))?;
        let mapping = mapping::<T>()?;
        let pk_name = mapping.primary_key().name.clone();

        self.db.with_cursor(&compiled.sql, &compiled.params, |cursor| {
            let mut out: Vec<(T, Vec<U>)> = Vec::new();
            let mut last_key: Option<Value> = None;
            while cursor.step()? {
                let view = RowView::new(cursor.columns(), cursor.row());
                let key: Value = view.get(&pk_name)?;
                if last_key.as_ref() != Some(&key) {
                    out.push((T::from_row(&view)?, Vec::new()));
                    last_key = Some(key);
                }
                if let Some(child) = view.nested::<U>(&prefix)? {
                    if let Some(last) = out.last_mut() {
                        last.1.push(child);
                    }
                }
            }
            Ok(out)
        })
    }

    /// The nested-column prefix of the first group join in the chain.
    fn group_join_prefix(&self) -> Option<String> {
        let mut join_idx = 0;
        for step in Node::chain(&self.node) {
            if let Op::Join { style, .. } = &step.op {
                if *style == JoinStyle::Group {
                    return Some(format!("g{join_idx}"));
                }
                join_idx += 1;
            }
        }
        None
    }
}
