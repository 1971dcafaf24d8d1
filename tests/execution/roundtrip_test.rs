//! End-to-end checks against an in-memory database.

#[path = "../support/entities.rs"]
mod entities;

use entities::{book, seeded, Author, Book};
use quarry::prelude::*;

#[test]
fn test_insert_then_get_round_trips() {
    let db = Database::open_in_memory().unwrap();
    db.create_table::<Book>().unwrap();

    let mut dune = book("Dune", 1, 9.99, Some(412));
    let key = db.insert(&mut dune).unwrap();
    assert_eq!(dune.id, key);

    let fetched: Book = db.get(key).unwrap().unwrap();
    assert_eq!(fetched, dune);
    assert!(db.get::<Book>(key + 1).unwrap().is_none());
}

#[test]
fn test_filter_and_order_desc_executes() {
    let db = seeded();
    let titles: Vec<Book> = db
        .table::<Book>()
        .filter(col("price").gt(7.0))
        .order_by_desc(col("price"))
        .to_vec()
        .unwrap();
    let titles: Vec<&str> = titles.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Neuromancer", "Dune", "Dune Messiah"]);
}

#[test]
fn test_count_and_sum_over_empty_are_zero() {
    let db = Database::open_in_memory().unwrap();
    db.create_table::<Book>().unwrap();
    assert_eq!(db.table::<Book>().count().unwrap(), 0);
    assert_eq!(db.table::<Book>().sum_of::<f64>(col("price")).unwrap(), 0.0);
    assert!(db.table::<Book>().min_of::<f64>(col("price")).unwrap().is_none());
    assert!(db.table::<Book>().avg_of(col("price")).unwrap().is_none());
}

#[test]
fn test_contains_nocase_matches_across_case() {
    let db = seeded();
    let matches = db
        .table::<Book>()
        .filter(col("title").contains_nocase("DUNE"))
        .count()
        .unwrap();
    assert_eq!(matches, 2);

    // The case-sensitive form must not match.
    let strict = db
        .table::<Book>()
        .filter(col("title").contains("DUNE"))
        .count()
        .unwrap();
    assert_eq!(strict, 0);
}

#[test]
fn test_first_and_single_cardinality() {
    let db = seeded();
    let none = db.table::<Book>().filter(col("price").gt(1000.0));
    assert!(matches!(
        none.first(),
        Err(Error::Cardinality(CardinalityError::NoRows))
    ));
    assert!(none.first_opt().unwrap().is_none());
    assert!(matches!(
        none.single(),
        Err(Error::Cardinality(CardinalityError::NoRows))
    ));
    assert!(none.single_opt().unwrap().is_none());

    let dunes = db.table::<Book>().filter(col("title").contains("Dune"));
    assert!(matches!(
        dunes.single(),
        Err(Error::Cardinality(CardinalityError::MoreThanOne))
    ));
    assert!(matches!(
        dunes.single_opt(),
        Err(Error::Cardinality(CardinalityError::MoreThanOne))
    ));

    let one = db.table::<Book>().filter(col("title").eq("Neuromancer"));
    assert_eq!(one.single().unwrap().title, "Neuromancer");
    assert_eq!(one.first().unwrap().title, "Neuromancer");
}

#[test]
fn test_query_update_and_delete_report_counts() {
    let db = seeded();
    let touched = db
        .table::<Book>()
        .filter(col("price").lt(8.0))
        .update(vec![("price", val(8.0))])
        .unwrap();
    assert_eq!(touched, 2);
    assert_eq!(
        db.table::<Book>().min_of::<f64>(col("price")).unwrap(),
        Some(8.0)
    );

    let removed = db
        .table::<Book>()
        .filter(col("title").contains("Dune"))
        .delete()
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(db.table::<Book>().count().unwrap(), 2);
}

#[test]
fn test_row_level_operations() {
    let db = seeded();
    let mut neuromancer = db
        .table::<Book>()
        .filter(col("title").eq("Neuromancer"))
        .single()
        .unwrap();
    neuromancer.price = 15.0;
    assert_eq!(db.update_row(&neuromancer).unwrap(), 1);
    let reread: Book = db.get(neuromancer.id).unwrap().unwrap();
    assert_eq!(reread.price, 15.0);

    assert!(db.table::<Book>().contains(&neuromancer).unwrap());
    assert_eq!(db.delete_row(&neuromancer).unwrap(), 1);
    assert!(!db.table::<Book>().contains(&neuromancer).unwrap());

    let dune_id: i64 = db
        .table::<Book>()
        .filter(col("title").eq("Dune"))
        .single()
        .unwrap()
        .id;
    assert_eq!(db.delete_by_key::<Book>(dune_id).unwrap(), 1);
    assert_eq!(db.delete_by_key::<Book>(dune_id).unwrap(), 0);
}

#[test]
fn test_insert_all_rolls_back_as_a_unit() {
    let db = Database::open_in_memory().unwrap();
    db.create_table::<Author>().unwrap();

    let mut batch = vec![
        Author {
            id: 0,
            name: "Unique".into(),
        },
        Author {
            id: 0,
            name: "Unique".into(),
        },
    ];
    // The second row violates the unique name index; nothing may land.
    assert!(db.insert_all(&mut batch).is_err());
    assert_eq!(db.table::<Author>().count().unwrap(), 0);
}

#[test]
fn test_nullable_column_round_trips() {
    let db = seeded();
    let no_pages = db
        .table::<Book>()
        .filter(col("pages").eq(null()))
        .single()
        .unwrap();
    assert_eq!(no_pages.title, "Count Zero");
    assert_eq!(no_pages.pages, None);

    let with_pages = db
        .table::<Book>()
        .filter(col("pages").ne(null()))
        .count()
        .unwrap();
    assert_eq!(with_pages, 3);
}
