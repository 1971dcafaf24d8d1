//! Rendering a [`SqlModel`] into final SQL text.

use crate::value::Value;

use super::model::{CompiledQuery, QueryShape, SqlModel, WrapKind};
use super::quote_ident;

/// Render the model. Parameters are collected in appearance order.
pub fn emit(model: &SqlModel) -> CompiledQuery {
    let mut params: Vec<(String, Value)> = Vec::new();
    let sql = match &model.shape {
        QueryShape::Select => emit_select(model, &mut params),
        QueryShape::Update(sets) => emit_update(model, sets, &mut params),
        QueryShape::Delete => emit_delete(model, &mut params),
    };
    CompiledQuery {
        sql,
        params,
        require_row: model.require_row,
        reject_extra_row: model.reject_extra_row,
        reverse_after_fetch: model.reverse_after_fetch,
    }
}

fn emit_select(model: &SqlModel, params: &mut Vec<(String, Value)>) -> String {
    let mut sql = String::from("SELECT ");
    if model.distinct {
        sql.push_str("DISTINCT ");
    }

    let exists_wrap = matches!(model.wrap, Some(WrapKind::Exists | WrapKind::NotExists));
    if exists_wrap {
        sql.push('1');
    } else {
        for (idx, select) in model.selects.iter().enumerate() {
            if idx > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&select.fragment.embed());
            params.extend(select.fragment.params.iter().cloned());
            if let Some(alias) = &select.alias {
                sql.push_str(" AS ");
                sql.push_str(&quote_ident(alias));
            }
        }
    }

    sql.push_str(" FROM ");
    sql.push_str(&quote_ident(&model.from_table));
    if let Some(alias) = &model.alias {
        sql.push_str(" AS ");
        sql.push_str(&quote_ident(alias));
    }

    for join in &model.joins {
        sql.push(' ');
        sql.push_str(join.kind.sql());
        sql.push(' ');
        sql.push_str(&quote_ident(&join.table));
        sql.push_str(" AS ");
        sql.push_str(&quote_ident(&join.alias));
        sql.push_str(" ON ");
        sql.push_str(&join.on.embed());
        params.extend(join.on.params.iter().cloned());
    }

    append_where(&mut sql, model, params);

    for branch in &model.unions {
        sql.push_str(if branch.all { " UNION ALL " } else { " UNION " });
        sql.push_str(&branch.sql);
        params.extend(branch.params.iter().cloned());
    }

    if !model.order.is_empty() {
        sql.push_str(" ORDER BY ");
        for (idx, order) in model.order.iter().enumerate() {
            if idx > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&order.expr.embed());
            params.extend(order.expr.params.iter().cloned());
            if order.descending {
                sql.push_str(" DESC");
            }
        }
    }

    append_limit(&mut sql, model);

    match model.wrap {
        None => sql,
        Some(WrapKind::Exists) => format!("SELECT EXISTS({sql})"),
        Some(WrapKind::NotExists) => format!("SELECT NOT EXISTS({sql})"),
        Some(WrapKind::Count) => format!("SELECT COUNT(*) FROM ({sql})"),
        Some(WrapKind::Min) => format!("SELECT MIN(\"val\") FROM ({sql})"),
        Some(WrapKind::Max) => format!("SELECT MAX(\"val\") FROM ({sql})"),
        Some(WrapKind::Sum) => format!("SELECT IFNULL(SUM(\"val\"), 0) FROM ({sql})"),
        Some(WrapKind::Avg) => format!("SELECT AVG(\"val\") FROM ({sql})"),
    }
}

fn emit_update(
    model: &SqlModel,
    sets: &[(String, crate::sql::SqlFragment)],
    params: &mut Vec<(String, Value)>,
) -> String {
    let mut sql = format!("UPDATE {} SET ", quote_ident(&model.from_table));
    for (idx, (column, value)) in sets.iter().enumerate() {
        if idx > 0 {
            sql.push_str(", ");
        }
        sql.push_str(&quote_ident(column));
        sql.push_str(" = ");
        sql.push_str(&value.embed());
        params.extend(value.params.iter().cloned());
    }
    append_where(&mut sql, model, params);
    sql
}

fn emit_delete(model: &SqlModel, params: &mut Vec<(String, Value)>) -> String {
    let mut sql = format!("DELETE FROM {}", quote_ident(&model.from_table));
    append_where(&mut sql, model, params);
    sql
}

fn append_where(sql: &mut String, model: &SqlModel, params: &mut Vec<(String, Value)>) {
    if model.predicates.is_empty() {
        return;
    }
    sql.push_str(" WHERE ");
    for (idx, predicate) in model.predicates.iter().enumerate() {
        if idx > 0 {
            sql.push_str(" AND ");
        }
        sql.push_str(&predicate.embed());
        params.extend(predicate.params.iter().cloned());
    }
}

fn append_limit(sql: &mut String, model: &SqlModel) {
    match (model.take, model.skip) {
        (Some(take), Some(skip)) => {
            sql.push_str(&format!(" LIMIT {take} OFFSET {skip}"));
        }
        (Some(take), None) => {
            sql.push_str(&format!(" LIMIT {take}"));
        }
        // SQLite has no bare OFFSET.
        (None, Some(skip)) => {
            sql.push_str(&format!(" LIMIT -1 OFFSET {skip}"));
        }
        (None, None) => {}
    }
}
