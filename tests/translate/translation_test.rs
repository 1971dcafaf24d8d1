//! SQL goldens for the tree-to-SQL compiler.

#[path = "../support/entities.rs"]
mod entities;

use entities::{Author, Book};
use quarry::prelude::*;
use quarry::translate::{StatementKind, Terminal, TranslateError};

const BOOK_COLUMNS: &str =
    "\"b\".\"id\", \"b\".\"title\", \"b\".\"author_id\", \"b\".\"price\", \"b\".\"pages\"";

fn db() -> Database {
    Database::open_in_memory().unwrap()
}

#[test]
fn test_filter_and_order_desc() {
    let q = db()
        .table::<Book>()
        .filter(col("price").gt(10.0))
        .order_by_desc(col("title"));
    let compiled = q.compile().unwrap();
    assert_eq!(
        compiled.sql,
        format!(
            "SELECT {BOOK_COLUMNS} FROM \"books\" AS \"b\" \
             WHERE (\"b\".\"price\" > @p1) ORDER BY \"b\".\"title\" DESC"
        )
    );
    assert_eq!(compiled.params, vec![("@p1".to_string(), Value::Real(10.0))]);
}

#[test]
fn test_translation_is_idempotent() {
    let q = db()
        .table::<Book>()
        .filter(col("title").contains_nocase("dune").and(col("price").lt(20.0)))
        .order_by(col("price"))
        .take(3);
    let first = q.compile().unwrap();
    let second = q.compile().unwrap();
    assert_eq!(first.sql, second.sql);
    assert_eq!(first.params, second.params);
}

#[test]
fn test_constant_subtree_folds_to_one_parameter() {
    let q = db().table::<Book>().filter(col("pages").gt(val(2).mul(10)));
    let compiled = q.compile().unwrap();
    assert!(compiled.sql.ends_with("WHERE (\"b\".\"pages\" > @p1)"));
    assert_eq!(
        compiled.params,
        vec![("@p1".to_string(), Value::Integer(20))]
    );
}

#[test]
fn test_eq_null_becomes_is_null() {
    let q = db().table::<Book>().filter(col("pages").eq(null()));
    let compiled = q.compile().unwrap();
    assert!(compiled.sql.ends_with("WHERE (\"b\".\"pages\" IS NULL)"));
    assert!(compiled.params.is_empty());

    let q = db().table::<Book>().filter(col("pages").ne(null()));
    let compiled = q.compile().unwrap();
    assert!(compiled.sql.ends_with("WHERE (\"b\".\"pages\" IS NOT NULL)"));
}

#[test]
fn test_self_join_aliases_are_unique() {
    let q = db()
        .table::<Book>()
        .join::<Book>(col_of(0, "author_id").eq(col("author_id")))
        .join::<Book>(col_of(1, "id").eq(col("id")));
    let compiled = q.compile().unwrap();
    assert!(compiled.sql.contains("FROM \"books\" AS \"b\""));
    assert!(compiled
        .sql
        .contains("INNER JOIN \"books\" AS \"b2\" ON (\"b2\".\"author_id\" = \"b\".\"author_id\")"));
    assert!(compiled
        .sql
        .contains("INNER JOIN \"books\" AS \"b3\" ON (\"b3\".\"id\" = \"b\".\"id\")"));
}

#[test]
fn test_contains_nocase_compiles_to_like() {
    let q = db().table::<Book>().filter(col("title").contains_nocase("dune"));
    let compiled = q.compile().unwrap();
    assert!(compiled
        .sql
        .ends_with("WHERE (\"b\".\"title\" LIKE @p1 ESCAPE '\\')"));
    assert_eq!(
        compiled.params,
        vec![("@p1".to_string(), Value::Text("%dune%".into()))]
    );
}

#[test]
fn test_like_needle_wildcards_are_escaped() {
    let q = db()
        .table::<Book>()
        .filter(col("title").starts_with_nocase("50%_done\\"));
    let compiled = q.compile().unwrap();
    assert_eq!(
        compiled.params,
        vec![(
            "@p1".to_string(),
            Value::Text("50\\%\\_done\\\\%".into())
        )]
    );
}

#[test]
fn test_case_sensitive_contains_uses_instr() {
    let q = db().table::<Book>().filter(col("title").contains("Dune"));
    let compiled = q.compile().unwrap();
    assert!(compiled
        .sql
        .ends_with("WHERE (INSTR(\"b\".\"title\", @p1) > 0)"));
}

#[test]
fn test_date_add_constant_binds_modifier() {
    let q = db()
        .table::<Book>()
        .select_value::<Option<String>>(col("title").date_add(DateUnit::Days, 5));
    let compiled = q.compile().unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT DATETIME(\"b\".\"title\", @p1) AS \"val\" FROM \"books\" AS \"b\""
    );
    assert_eq!(
        compiled.params,
        vec![("@p1".to_string(), Value::Text("5 days".into()))]
    );
}

#[test]
fn test_skip_without_take_renders_negative_limit() {
    let compiled = db().table::<Book>().skip(3).compile().unwrap();
    assert!(compiled.sql.ends_with(" LIMIT -1 OFFSET 3"));
}

#[test]
fn test_reverse_flips_order_or_sets_flag() {
    let ordered = db()
        .table::<Book>()
        .order_by(col("title"))
        .reverse()
        .compile()
        .unwrap();
    assert!(ordered.sql.ends_with("ORDER BY \"b\".\"title\" DESC"));
    assert!(!ordered.reverse_after_fetch);

    let unordered = db().table::<Book>().reverse().compile().unwrap();
    assert!(unordered.reverse_after_fetch);
}

#[test]
fn test_order_by_supersedes_pending_reverse() {
    let compiled = db()
        .table::<Book>()
        .reverse()
        .order_by(col("title"))
        .compile()
        .unwrap();
    assert!(compiled.sql.ends_with("ORDER BY \"b\".\"title\""));
    assert!(!compiled.reverse_after_fetch);
}

#[test]
fn test_union_branches_share_the_parameter_counter() {
    let d = db();
    let cheap = d.table::<Book>().filter(col("price").lt(5.0));
    let dear = d.table::<Book>().filter(col("price").gt(50.0));
    let compiled = cheap.union(&dear).compile().unwrap();
    assert!(compiled.sql.contains(" UNION SELECT "));
    let names: Vec<&str> = compiled.params.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["@p1", "@p2"]);
}

#[test]
fn test_count_wraps_the_core_select() {
    let compiled = db()
        .table::<Book>()
        .compile_statement(StatementKind::Select(Terminal::Count))
        .unwrap();
    assert_eq!(
        compiled.sql,
        format!("SELECT COUNT(*) FROM (SELECT {BOOK_COLUMNS} FROM \"books\" AS \"b\")")
    );
}

#[test]
fn test_any_wraps_in_exists() {
    let compiled = db()
        .table::<Book>()
        .filter(col("price").gt(10.0))
        .compile_statement(StatementKind::Select(Terminal::Any))
        .unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT EXISTS(SELECT 1 FROM \"books\" AS \"b\" WHERE (\"b\".\"price\" > @p1))"
    );
}

#[test]
fn test_all_match_is_a_negated_not_exists() {
    let compiled = db()
        .table::<Book>()
        .compile_statement(StatementKind::Select(Terminal::AllMatch(
            col("price").gt(0.0),
        )))
        .unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT NOT EXISTS(SELECT 1 FROM \"books\" AS \"b\" \
         WHERE (NOT (\"b\".\"price\" > @p1)))"
    );
}

#[test]
fn test_sum_is_coalesced_to_zero() {
    let compiled = db()
        .table::<Book>()
        .compile_statement(StatementKind::Select(Terminal::Sum(col("price"))))
        .unwrap();
    assert_eq!(
        compiled.sql,
        "SELECT IFNULL(SUM(\"val\"), 0) FROM \
         (SELECT \"b\".\"price\" AS \"val\" FROM \"books\" AS \"b\")"
    );
}

#[test]
fn test_single_limits_to_two_and_sets_flags() {
    let compiled = db()
        .table::<Book>()
        .compile_statement(StatementKind::Select(Terminal::Single { required: true }))
        .unwrap();
    assert!(compiled.sql.ends_with(" LIMIT 2"));
    assert!(compiled.require_row);
    assert!(compiled.reject_extra_row);
}

#[test]
fn test_update_compiles_unqualified() {
    let compiled = db()
        .table::<Book>()
        .filter(col("title").eq("Dune"))
        .compile_statement(StatementKind::Update(vec![("price".into(), val(1.5))]))
        .unwrap();
    assert_eq!(
        compiled.sql,
        "UPDATE \"books\" SET \"price\" = @p2 WHERE (\"title\" = @p1)"
    );
    assert_eq!(compiled.params[0], ("@p2".to_string(), Value::Real(1.5)));
    assert_eq!(
        compiled.params[1],
        ("@p1".to_string(), Value::Text("Dune".into()))
    );
}

#[test]
fn test_delete_compiles_unqualified() {
    let compiled = db()
        .table::<Book>()
        .filter(col("price").lt(1.0))
        .compile_statement(StatementKind::Delete)
        .unwrap();
    assert_eq!(
        compiled.sql,
        "DELETE FROM \"books\" WHERE (\"price\" < @p1)"
    );
}

#[test]
fn test_delete_with_join_is_rejected() {
    let result = db()
        .table::<Book>()
        .join::<Author>(col_of(0, "id").eq(col("author_id")))
        .compile_statement(StatementKind::Delete);
    assert!(matches!(
        result,
        Err(Error::Translate(TranslateError::Unsupported(_)))
    ));
}

#[test]
fn test_unknown_column_fails_translation() {
    let result = db().table::<Book>().filter(col("nope").eq(1)).compile();
    assert!(matches!(
        result,
        Err(Error::Translate(TranslateError::UnresolvedPath(_)))
    ));
}
