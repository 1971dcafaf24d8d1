//! Rendering checks for the model-to-text emitter.

use quarry::sql::{
    emit, JoinKind, JoinRecord, OrderFragment, QueryShape, SelectFragment, SqlFragment, SqlModel,
    UnionBranch, WrapKind,
};
use quarry::prelude::Value;

fn model() -> SqlModel {
    let mut model = SqlModel::new("books".into(), Some("b".into()));
    model.selects.push(SelectFragment {
        fragment: SqlFragment::raw("\"b\".\"id\""),
        alias: None,
    });
    model.selects.push(SelectFragment {
        fragment: SqlFragment::raw("\"b\".\"title\""),
        alias: None,
    });
    model
}

#[test]
fn test_join_rendering() {
    let mut m = model();
    m.joins.push(JoinRecord {
        kind: JoinKind::Left,
        table: "authors".into(),
        alias: "a".into(),
        on: SqlFragment::compound("\"a\".\"id\" = \"b\".\"author_id\"", Vec::new()),
    });
    let q = emit(&m);
    assert_eq!(
        q.sql,
        "SELECT \"b\".\"id\", \"b\".\"title\" FROM \"books\" AS \"b\" \
         LEFT JOIN \"authors\" AS \"a\" ON (\"a\".\"id\" = \"b\".\"author_id\")"
    );
}

#[test]
fn test_distinct_and_multi_key_order() {
    let mut m = model();
    m.distinct = true;
    m.order.push(OrderFragment {
        expr: SqlFragment::raw("\"b\".\"title\""),
        descending: false,
    });
    m.order.push(OrderFragment {
        expr: SqlFragment::raw("\"b\".\"id\""),
        descending: true,
    });
    let q = emit(&m);
    assert!(q.sql.starts_with("SELECT DISTINCT "));
    assert!(q
        .sql
        .ends_with("ORDER BY \"b\".\"title\", \"b\".\"id\" DESC"));
}

#[test]
fn test_union_branch_params_follow_core_params() {
    let mut m = model();
    m.predicates.push(SqlFragment::compound(
        "\"b\".\"price\" < @p1",
        vec![("@p1".into(), Value::Real(5.0))],
    ));
    m.unions.push(UnionBranch {
        sql: "SELECT \"b\".\"id\", \"b\".\"title\" FROM \"books\" AS \"b\" \
              WHERE (\"b\".\"price\" > @p2)"
            .into(),
        params: vec![("@p2".into(), Value::Real(50.0))],
        all: true,
    });
    let q = emit(&m);
    assert!(q.sql.contains(" UNION ALL SELECT "));
    let names: Vec<&str> = q.params.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["@p1", "@p2"]);
}

#[test]
fn test_not_exists_wrap() {
    let mut m = model();
    m.wrap = Some(WrapKind::NotExists);
    let q = emit(&m);
    assert_eq!(
        q.sql,
        "SELECT NOT EXISTS(SELECT 1 FROM \"books\" AS \"b\")"
    );
}

#[test]
fn test_avg_wrap_keeps_null_on_empty() {
    let mut m = SqlModel::new("books".into(), Some("b".into()));
    m.selects.push(SelectFragment {
        fragment: SqlFragment::raw("\"b\".\"price\""),
        alias: Some("val".into()),
    });
    m.wrap = Some(WrapKind::Avg);
    let q = emit(&m);
    assert_eq!(
        q.sql,
        "SELECT AVG(\"val\") FROM (SELECT \"b\".\"price\" AS \"val\" FROM \"books\" AS \"b\")"
    );
}

#[test]
fn test_delete_without_predicates_has_no_where() {
    let mut m = SqlModel::new("books".into(), None);
    m.shape = QueryShape::Delete;
    let q = emit(&m);
    assert_eq!(q.sql, "DELETE FROM \"books\"");
}
