//! Lowering an operator tree into a [`SqlModel`].
//!
//! The translator resolves column paths against aliased sources, folds
//! constant subtrees into bound parameters, compiles recognized calls into
//! SQL functions, and applies the terminal's shape. Anything it cannot
//! express fails here; no partial SQL ever reaches the engine.

use std::sync::Arc;

use crate::expr::{BinaryOp, Expr, Func, Source, UnaryOp};
use crate::query::tree::{JoinStyle, Node, Op, SelectItem};
use crate::schema::{SchemaError, TableMapping};
use crate::sql::{
    emit, quote_ident, CompiledQuery, JoinKind, JoinRecord, OrderFragment, ParamCounter,
    QueryShape, SelectFragment, SqlFragment, SqlModel, UnionBranch, WrapKind,
};
use crate::value::Value;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("unsupported construct: {0}")]
    Unsupported(&'static str),

    #[error("cannot resolve column path {0}")]
    UnresolvedPath(String),

    #[error("expression references unknown source {0}")]
    UnknownSource(usize),

    #[error("bad constant: {0}")]
    BadConstant(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

pub type TranslateResult<T> = Result<T, TranslateError>;

// ============================================================================
// Terminals
// ============================================================================

/// How the caller consumes the result; decides flags and wrapping, never
/// raw SQL.
#[derive(Debug, Clone)]
pub enum Terminal {
    Rows,
    First { required: bool },
    Single { required: bool },
    Any,
    AllMatch(Expr),
    Count,
    Min(Expr),
    Max(Expr),
    Sum(Expr),
    Avg(Expr),
    /// Ordered scan for adjacent regrouping of a group join.
    Grouped,
}

#[derive(Debug, Clone)]
pub enum StatementKind {
    Select(Terminal),
    /// SET clauses as (column path, value expression) pairs.
    Update(Vec<(String, Expr)>),
    Delete,
}

/// Lower and render one statement.
pub fn translate(node: &Arc<Node>, kind: StatementKind) -> TranslateResult<CompiledQuery> {
    let (model, _) = build(node, kind, ParamCounter::new())?;
    Ok(emit(&model))
}

// ============================================================================
// Translator
// ============================================================================

struct Translator {
    counter: ParamCounter,
    sources: Vec<(Arc<TableMapping>, Option<String>)>,
    used_aliases: Vec<String>,
    join_styles: Vec<JoinStyle>,
    qualified: bool,
}

fn build(
    node: &Arc<Node>,
    kind: StatementKind,
    counter: ParamCounter,
) -> TranslateResult<(SqlModel, ParamCounter)> {
    let chain = Node::chain(node);
    let root_mapping = match &chain[0].op {
        Op::Source { mapping } => mapping()?,
        _ => return Err(TranslateError::Unsupported("query has no source")),
    };

    let qualified = matches!(kind, StatementKind::Select(_));
    let mut tr = Translator {
        counter,
        sources: Vec::new(),
        used_aliases: Vec::new(),
        join_styles: Vec::new(),
        qualified,
    };
    let alias = if qualified {
        Some(tr.short_alias(root_mapping.type_name))
    } else {
        None
    };
    tr.sources.push((Arc::clone(&root_mapping), alias.clone()));

    let mut model = SqlModel::new(root_mapping.table.clone(), alias);
    let mut explicit_select: Option<Vec<SelectItem>> = None;

    for step in chain.iter().skip(1) {
        match &step.op {
            Op::Source { .. } => {
                return Err(TranslateError::Unsupported("nested source"));
            }
            Op::Filter { predicate } => {
                let frag = tr.compile(predicate)?;
                model.predicates.push(frag);
            }
            Op::Select { items } => {
                explicit_select = Some(items.clone());
            }
            Op::Join { mapping, style, on } => {
                if !tr.qualified {
                    return Err(TranslateError::Unsupported(
                        "joins are not supported in update or delete",
                    ));
                }
                let target = mapping()?;
                let join_alias = tr.short_alias(target.type_name);
                tr.sources.push((Arc::clone(&target), Some(join_alias.clone())));
                tr.join_styles.push(*style);
                let on_frag = tr.compile(on)?;
                model.joins.push(JoinRecord {
                    kind: match style {
                        JoinStyle::Inner => JoinKind::Inner,
                        JoinStyle::Left | JoinStyle::Group => JoinKind::Left,
                    },
                    table: target.table.clone(),
                    alias: join_alias,
                    on: on_frag,
                });
            }
            Op::Order {
                key,
                descending,
                then,
            } => {
                let frag = tr.compile(key)?;
                if !then {
                    // A fresh ordering supersedes any pending reverse.
                    model.order.clear();
                    model.reverse_after_fetch = false;
                }
                model.order.push(OrderFragment {
                    expr: frag,
                    descending: *descending,
                });
            }
            Op::Skip(n) => model.skip = Some(*n),
            Op::Take(n) => model.take = Some(*n),
            Op::Distinct => model.distinct = true,
            Op::Union { other, all } => {
                let (mut branch, after) = build(
                    other,
                    StatementKind::Select(Terminal::Rows),
                    ParamCounter::starting_at(tr.counter.issued()),
                )?;
                // Order and limits belong to the whole statement.
                branch.order.clear();
                branch.take = None;
                branch.skip = None;
                branch.reverse_after_fetch = false;
                let rendered = emit(&branch);
                model.unions.push(UnionBranch {
                    sql: rendered.sql,
                    params: rendered.params,
                    all: *all,
                });
                tr.counter = after;
            }
            Op::Reverse => {
                if model.order.is_empty() {
                    model.reverse_after_fetch = !model.reverse_after_fetch;
                } else {
                    for order in &mut model.order {
                        order.descending = !order.descending;
                    }
                }
            }
        }
    }

    match kind {
        StatementKind::Select(terminal) => {
            tr.apply_terminal(&mut model, terminal, explicit_select)?;
        }
        StatementKind::Update(sets) => {
            let mut compiled = Vec::with_capacity(sets.len());
            for (path, value) in &sets {
                let column = root_mapping
                    .column(path)
                    .ok_or_else(|| {
                        TranslateError::UnresolvedPath(format!(
                            "{}.{path}",
                            root_mapping.type_name
                        ))
                    })?
                    .name
                    .clone();
                compiled.push((column, tr.compile(value)?));
            }
            model.shape = QueryShape::Update(compiled);
        }
        StatementKind::Delete => {
            model.shape = QueryShape::Delete;
        }
    }

    Ok((model, tr.counter))
}

impl Translator {
    /// Deterministic short alias from the type name, with numeric-suffix
    /// dedup for repeated sources.
    fn short_alias(&mut self, type_name: &str) -> String {
        let base = type_name
            .chars()
            .find(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase())
            .unwrap_or('t');
        let mut alias = base.to_string();
        let mut n = 1;
        while self.used_aliases.contains(&alias) {
            n += 1;
            alias = format!("{base}{n}");
        }
        self.used_aliases.push(alias.clone());
        alias
    }

    fn source_at(&self, source: Source) -> TranslateResult<&(Arc<TableMapping>, Option<String>)> {
        let idx = match source {
            Source::Root => 0,
            Source::Join(n) => n + 1,
        };
        self.sources
            .get(idx)
            .ok_or(TranslateError::UnknownSource(idx))
    }

    /// Qualified SQL text for a dotted column path.
    fn column_sql(&self, source: Source, path: &[String]) -> TranslateResult<String> {
        let (mapping, alias) = self.source_at(source)?;
        let lookup = if path.len() == 1 {
            mapping.column(&path[0])
        } else {
            mapping.column(&path.join("."))
        };
        let column = lookup.ok_or_else(|| {
            TranslateError::UnresolvedPath(format!("{}.{}", mapping.type_name, path.join(".")))
        })?;
        Ok(match alias {
            Some(a) => format!("{}.{}", quote_ident(a), quote_ident(&column.name)),
            None => quote_ident(&column.name),
        })
    }

    fn param(&mut self, value: Value) -> SqlFragment {
        SqlFragment::param(self.counter.next_name(), value)
    }

    fn compile(&mut self, expr: &Expr) -> TranslateResult<SqlFragment> {
        if let Some(value) = fold(expr) {
            return Ok(self.param(value));
        }
        match expr {
            Expr::Value(value) => Ok(self.param(value.clone())),
            Expr::Column { source, path } => {
                Ok(SqlFragment::raw(self.column_sql(*source, path)?))
            }
            Expr::Binary { op, left, right } => self.compile_binary(*op, left, right),
            Expr::Unary { op, expr } => {
                let inner = self.compile(expr)?;
                let text = match op {
                    UnaryOp::Not => format!("NOT {}", inner.embed()),
                    UnaryOp::Neg => format!("-{}", inner.embed()),
                };
                Ok(SqlFragment::compound(text, inner.params))
            }
            Expr::Call { func, args } => self.compile_call(*func, args),
        }
    }

    fn compile_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
    ) -> TranslateResult<SqlFragment> {
        // eq/ne against a constant NULL is an IS NULL test, not `= NULL`.
        if matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
            let keyword = if op == BinaryOp::Eq { "IS NULL" } else { "IS NOT NULL" };
            if matches!(fold(right), Some(Value::Null)) {
                let l = self.compile(left)?;
                return Ok(SqlFragment::compound(
                    format!("{} {keyword}", l.embed()),
                    l.params,
                ));
            }
            if matches!(fold(left), Some(Value::Null)) {
                let r = self.compile(right)?;
                return Ok(SqlFragment::compound(
                    format!("{} {keyword}", r.embed()),
                    r.params,
                ));
            }
        }
        let l = self.compile(left)?;
        let r = self.compile(right)?;
        let mut params = l.params.clone();
        params.extend(r.params.iter().cloned());
        Ok(SqlFragment::compound(
            format!("{} {} {}", l.embed(), op.sql(), r.embed()),
            params,
        ))
    }

    fn compile_call(&mut self, func: Func, args: &[Expr]) -> TranslateResult<SqlFragment> {
        match func {
            Func::Contains { case_insensitive } => {
                let [x, y] = two(args)?;
                let x = self.compile(x)?;
                if case_insensitive {
                    if let Some(needle) = fold_text(y)? {
                        let pattern = format!("%{}%", escape_like(&needle));
                        return Ok(self.like(x, pattern));
                    }
                    let y = self.compile(y)?;
                    Ok(join_compound(
                        format!("INSTR(LOWER({}), LOWER({})) > 0", x.embed(), y.embed()),
                        [x, y],
                    ))
                } else {
                    let y = self.compile(y)?;
                    Ok(join_compound(
                        format!("INSTR({}, {}) > 0", x.embed(), y.embed()),
                        [x, y],
                    ))
                }
            }
            Func::StartsWith { case_insensitive } => {
                let [x, y] = two(args)?;
                let x = self.compile(x)?;
                if case_insensitive {
                    if let Some(prefix) = fold_text(y)? {
                        let pattern = format!("{}%", escape_like(&prefix));
                        return Ok(self.like(x, pattern));
                    }
                    let y = self.compile(y)?;
                    Ok(join_compound(
                        format!(
                            "SUBSTR(LOWER({}), 1, LENGTH({})) = LOWER({})",
                            x.embed(),
                            y.embed(),
                            y.embed()
                        ),
                        [x, y],
                    ))
                } else {
                    let y = self.compile(y)?;
                    Ok(join_compound(
                        format!(
                            "SUBSTR({}, 1, LENGTH({})) = {}",
                            x.embed(),
                            y.embed(),
                            y.embed()
                        ),
                        [x, y],
                    ))
                }
            }
            Func::EndsWith { case_insensitive } => {
                let [x, y] = two(args)?;
                let x = self.compile(x)?;
                if case_insensitive {
                    if let Some(suffix) = fold_text(y)? {
                        let pattern = format!("%{}", escape_like(&suffix));
                        return Ok(self.like(x, pattern));
                    }
                    let y = self.compile(y)?;
                    Ok(join_compound(
                        format!(
                            "SUBSTR(LOWER({}), -LENGTH({})) = LOWER({})",
                            x.embed(),
                            y.embed(),
                            y.embed()
                        ),
                        [x, y],
                    ))
                } else {
                    let y = self.compile(y)?;
                    Ok(join_compound(
                        format!(
                            "SUBSTR({}, -LENGTH({})) = {}",
                            x.embed(),
                            y.embed(),
                            y.embed()
                        ),
                        [x, y],
                    ))
                }
            }
            Func::TextEquals { case_insensitive } => {
                let [x, y] = two(args)?;
                let x = self.compile(x)?;
                let y = self.compile(y)?;
                let text = if case_insensitive {
                    format!("{} = {} COLLATE NOCASE", x.embed(), y.embed())
                } else {
                    format!("{} = {}", x.embed(), y.embed())
                };
                Ok(join_compound(text, [x, y]))
            }
            Func::IndexOf => {
                let [x, y] = two(args)?;
                let x = self.compile(x)?;
                let y = self.compile(y)?;
                // SQLite INSTR is 1-based; callers see 0-based, -1 for absent.
                Ok(join_compound(
                    format!("INSTR({}, {}) - 1", x.embed(), y.embed()),
                    [x, y],
                ))
            }
            Func::Replace => {
                let [x, from, to] = three(args)?;
                let x = self.compile(x)?;
                let from = self.compile(from)?;
                let to = self.compile(to)?;
                let text = format!(
                    "REPLACE({}, {}, {})",
                    x.embed(),
                    from.embed(),
                    to.embed()
                );
                let mut params = x.params;
                params.extend(from.params);
                params.extend(to.params);
                Ok(SqlFragment {
                    text,
                    needs_brackets: false,
                    params,
                })
            }
            Func::Trim | Func::TrimStart | Func::TrimEnd => {
                let [x] = one(args)?;
                let x = self.compile(x)?;
                let name = match func {
                    Func::TrimStart => "LTRIM",
                    Func::TrimEnd => "RTRIM",
                    _ => "TRIM",
                };
                Ok(SqlFragment {
                    text: format!("{name}({})", x.embed()),
                    needs_brackets: false,
                    params: x.params,
                })
            }
            Func::Substring => {
                let (x, start, len) = match args {
                    [x, start] => (x, start, None),
                    [x, start, len] => (x, start, Some(len)),
                    _ => return Err(TranslateError::Unsupported("substring arity")),
                };
                let x = self.compile(x)?;
                // Callers pass 0-based offsets; SUBSTR is 1-based.
                let start = match fold(start) {
                    Some(Value::Integer(n)) => self.param(Value::Integer(n + 1)),
                    _ => {
                        let s = self.compile(start)?;
                        SqlFragment::compound(format!("{} + 1", s.embed()), s.params)
                    }
                };
                let mut params = x.params.clone();
                params.extend(start.params.iter().cloned());
                let text = match len {
                    None => format!("SUBSTR({}, {})", x.embed(), start.embed()),
                    Some(len) => {
                        let len = self.compile(len)?;
                        params.extend(len.params.iter().cloned());
                        format!("SUBSTR({}, {}, {})", x.embed(), start.embed(), len.embed())
                    }
                };
                Ok(SqlFragment {
                    text,
                    needs_brackets: false,
                    params,
                })
            }
            Func::Upper | Func::Lower | Func::Abs | Func::Round => {
                let [x] = one(args)?;
                let x = self.compile(x)?;
                let name = match func {
                    Func::Upper => "UPPER",
                    Func::Lower => "LOWER",
                    Func::Abs => "ABS",
                    _ => "ROUND",
                };
                Ok(SqlFragment {
                    text: format!("{name}({})", x.embed()),
                    needs_brackets: false,
                    params: x.params,
                })
            }
            Func::Ceiling => {
                let [x] = one(args)?;
                let x = self.compile(x)?;
                let e = x.embed();
                Ok(SqlFragment::compound(
                    format!("CAST({e} AS INTEGER) + ({e} > CAST({e} AS INTEGER))"),
                    x.params,
                ))
            }
            Func::Floor => {
                let [x] = one(args)?;
                let x = self.compile(x)?;
                let e = x.embed();
                Ok(SqlFragment::compound(
                    format!("CAST({e} AS INTEGER) - ({e} < CAST({e} AS INTEGER))"),
                    x.params,
                ))
            }
            Func::Least | Func::Greatest => {
                let [a, b] = two(args)?;
                let a = self.compile(a)?;
                let b = self.compile(b)?;
                let cmp = if func == Func::Least { "<=" } else { ">=" };
                let text = format!(
                    "CASE WHEN {a} {cmp} {b} THEN {a} ELSE {b} END",
                    a = a.embed(),
                    b = b.embed(),
                );
                let mut params = a.params;
                params.extend(b.params);
                Ok(SqlFragment {
                    text,
                    needs_brackets: false,
                    params,
                })
            }
            Func::DateAdd(unit) => {
                let [x, amount] = two(args)?;
                let x = self.compile(x)?;
                match fold(amount) {
                    Some(Value::Integer(n)) => {
                        let modifier = self.param(Value::Text(format!("{n}{}", unit.modifier())));
                        let mut params = x.params.clone();
                        params.extend(modifier.params.iter().cloned());
                        Ok(SqlFragment {
                            text: format!("DATETIME({}, {})", x.embed(), modifier.embed()),
                            needs_brackets: false,
                            params,
                        })
                    }
                    Some(other) => Err(TranslateError::BadConstant(format!(
                        "date offset must be an integer, got {other:?}"
                    ))),
                    None => {
                        let amount = self.compile(amount)?;
                        let mut params = x.params.clone();
                        params.extend(amount.params.iter().cloned());
                        Ok(SqlFragment {
                            text: format!(
                                "DATETIME({}, ({}) || '{}')",
                                x.embed(),
                                amount.embed(),
                                unit.modifier(),
                            ),
                            needs_brackets: false,
                            params,
                        })
                    }
                }
            }
        }
    }

    fn aggregate(
        &mut self,
        model: &mut SqlModel,
        expr: &Expr,
        wrap: WrapKind,
    ) -> TranslateResult<()> {
        let frag = self.compile(expr)?;
        model.selects = vec![SelectFragment {
            fragment: frag,
            alias: Some("val".into()),
        }];
        model.wrap = Some(wrap);
        Ok(())
    }

    fn like(&mut self, subject: SqlFragment, pattern: String) -> SqlFragment {
        let p = self.param(Value::Text(pattern));
        let mut params = subject.params.clone();
        params.extend(p.params.iter().cloned());
        SqlFragment::compound(
            format!("{} LIKE {} ESCAPE '\\'", subject.embed(), p.embed()),
            params,
        )
    }

    fn expand_item(&self, item: &SelectItem) -> TranslateResult<Vec<SelectFragment>> {
        match item {
            SelectItem::Expr { .. } => unreachable!("expr items are compiled, not expanded"),
            SelectItem::Source { source, prefix } => {
                let (mapping, alias) = self.source_at(*source)?;
                Ok(mapping
                    .columns
                    .iter()
                    .map(|column| {
                        let text = match alias {
                            Some(a) => {
                                format!("{}.{}", quote_ident(a), quote_ident(&column.name))
                            }
                            None => quote_ident(&column.name),
                        };
                        SelectFragment {
                            fragment: SqlFragment::raw(text),
                            alias: prefix.as_ref().map(|p| format!("{p}.{}", column.name)),
                        }
                    })
                    .collect())
            }
        }
    }

    fn default_selects(&self) -> TranslateResult<Vec<SelectFragment>> {
        let mut out = self.expand_item(&SelectItem::root())?;
        for (idx, style) in self.join_styles.iter().enumerate() {
            if *style == JoinStyle::Group {
                out.extend(self.expand_item(&SelectItem::join(idx, &format!("g{idx}")))?);
            }
        }
        Ok(out)
    }

    fn resolve_selects(
        &mut self,
        explicit: Option<Vec<SelectItem>>,
    ) -> TranslateResult<Vec<SelectFragment>> {
        match explicit {
            None => self.default_selects(),
            Some(items) => {
                let mut out = Vec::new();
                for item in &items {
                    match item {
                        SelectItem::Expr { expr, alias } => {
                            let frag = self.compile(expr)?;
                            out.push(SelectFragment {
                                fragment: frag,
                                alias: Some(alias.clone()),
                            });
                        }
                        source_item => out.extend(self.expand_item(source_item)?),
                    }
                }
                Ok(out)
            }
        }
    }

    fn apply_terminal(
        &mut self,
        model: &mut SqlModel,
        terminal: Terminal,
        explicit: Option<Vec<SelectItem>>,
    ) -> TranslateResult<()> {
        match terminal {
            Terminal::Rows => {
                model.selects = self.resolve_selects(explicit)?;
            }
            Terminal::First { required } => {
                model.selects = self.resolve_selects(explicit)?;
                if model.take.map_or(true, |t| t > 1) {
                    model.take = Some(1);
                }
                model.require_row = required;
            }
            Terminal::Single { required } => {
                model.selects = self.resolve_selects(explicit)?;
                if model.take.map_or(true, |t| t > 2) {
                    model.take = Some(2);
                }
                model.require_row = required;
                model.reject_extra_row = true;
            }
            Terminal::Any => {
                model.selects = self.resolve_selects(explicit)?;
                model.wrap = Some(WrapKind::Exists);
            }
            Terminal::AllMatch(predicate) => {
                model.selects = self.resolve_selects(explicit)?;
                let negated = Expr::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(predicate),
                };
                let frag = self.compile(&negated)?;
                model.predicates.push(frag);
                model.wrap = Some(WrapKind::NotExists);
            }
            Terminal::Count => {
                model.selects = self.resolve_selects(explicit)?;
                model.wrap = Some(WrapKind::Count);
            }
            Terminal::Min(expr) => self.aggregate(model, &expr, WrapKind::Min)?,
            Terminal::Max(expr) => self.aggregate(model, &expr, WrapKind::Max)?,
            Terminal::Sum(expr) => self.aggregate(model, &expr, WrapKind::Sum)?,
            Terminal::Avg(expr) => self.aggregate(model, &expr, WrapKind::Avg)?,
            Terminal::Grouped => {
                model.selects = self.resolve_selects(explicit)?;
                let pk = self.column_sql(Source::Root, &[self.sources[0]
                    .0
                    .primary_key()
                    .name
                    .clone()])?;
                model.order.insert(
                    0,
                    OrderFragment {
                        expr: SqlFragment::raw(pk),
                        descending: false,
                    },
                );
            }
        }
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn one(args: &[Expr]) -> TranslateResult<[&Expr; 1]> {
    match args {
        [a] => Ok([a]),
        _ => Err(TranslateError::Unsupported("call arity")),
    }
}

fn two(args: &[Expr]) -> TranslateResult<[&Expr; 2]> {
    match args {
        [a, b] => Ok([a, b]),
        _ => Err(TranslateError::Unsupported("call arity")),
    }
}

fn three(args: &[Expr]) -> TranslateResult<[&Expr; 3]> {
    match args {
        [a, b, c] => Ok([a, b, c]),
        _ => Err(TranslateError::Unsupported("call arity")),
    }
}

fn join_compound<const N: usize>(text: String, frags: [SqlFragment; N]) -> SqlFragment {
    let mut params = Vec::new();
    for frag in frags {
        params.extend(frag.params);
    }
    SqlFragment::compound(text, params)
}

/// Evaluate a pure constant subtree, if it is one.
fn fold(expr: &Expr) -> Option<Value> {
    match expr {
        Expr::Value(value) => Some(value.clone()),
        Expr::Binary { op, left, right } => {
            let l = fold(left)?;
            let r = fold(right)?;
            fold_arith(*op, l, r)
        }
        Expr::Unary {
            op: UnaryOp::Neg,
            expr,
        } => match fold(expr)? {
            Value::Integer(i) => Some(Value::Integer(-i)),
            Value::Real(f) => Some(Value::Real(-f)),
            _ => None,
        },
        Expr::Unary {
            op: UnaryOp::Not,
            expr,
        } => match fold(expr)? {
            Value::Integer(i) => Some(Value::Integer(i64::from(i == 0))),
            _ => None,
        },
        _ => None,
    }
}

fn fold_arith(op: BinaryOp, left: Value, right: Value) -> Option<Value> {
    use BinaryOp::*;
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => match op {
            Add => Some(Value::Integer(a.checked_add(b)?)),
            Sub => Some(Value::Integer(a.checked_sub(b)?)),
            Mul => Some(Value::Integer(a.checked_mul(b)?)),
            Div => Some(Value::Integer(a.checked_div(b)?)),
            Mod => Some(Value::Integer(a.checked_rem(b)?)),
            _ => None,
        },
        (a, b) => {
            let (a, b) = (as_real(&a)?, as_real(&b)?);
            match op {
                Add => Some(Value::Real(a + b)),
                Sub => Some(Value::Real(a - b)),
                Mul => Some(Value::Real(a * b)),
                Div => Some(Value::Real(a / b)),
                Mod => Some(Value::Real(a % b)),
                _ => None,
            }
        }
    }
}

fn as_real(value: &Value) -> Option<f64> {
    match value {
        Value::Real(f) => Some(*f),
        Value::Integer(i) => Some(*i as f64),
        _ => None,
    }
}

/// A constant text operand, or None when the operand is dynamic.
fn fold_text(expr: &Expr) -> TranslateResult<Option<String>> {
    match fold(expr) {
        Some(Value::Text(text)) => Ok(Some(text)),
        Some(other) => Err(TranslateError::BadConstant(format!(
            "text operand expected, got {other:?}"
        ))),
        None => Ok(None),
    }
}

/// Escape LIKE wildcards in a needle bound with `ESCAPE '\'`.
fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
