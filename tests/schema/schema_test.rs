//! Mapping registry, DDL, and value-conversion checks over real entities.

#[path = "../support/entities.rs"]
mod entities;

use std::sync::Arc;

use entities::{Author, Book};
use quarry::prelude::*;
use quarry::schema::{ddl, mapping};
use quarry::value::FromValue;

#[test]
fn test_mapping_is_cached_per_type() {
    let first = mapping::<Book>().unwrap();
    let second = mapping::<Book>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_book_mapping() {
    let m = mapping::<Book>().unwrap();
    assert_eq!(m.table, "books");
    assert_eq!(m.primary_key().name, "id");
    assert!(m.primary_key().auto_increment);
    assert!(!m.column("title").unwrap().nullable);
    assert!(m.column("pages").unwrap().nullable);
}

#[test]
fn test_author_ddl() {
    let m = mapping::<Author>().unwrap();
    assert_eq!(
        ddl::create_table(&m),
        "CREATE TABLE IF NOT EXISTS \"authors\" (\
         \"id\" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, \
         \"name\" TEXT NOT NULL)"
    );
    assert_eq!(
        ddl::create_indexes(&m),
        vec![
            "CREATE UNIQUE INDEX IF NOT EXISTS \"idx_authors_name\" ON \"authors\"(\"name\")"
                .to_string()
        ]
    );
    assert_eq!(ddl::drop_table(&m), "DROP TABLE IF EXISTS \"authors\"");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shelf {
    Fiction,
    Reference,
}

quarry::impl_enum_value!(Shelf { Fiction = 0, Reference = 1 });

#[test]
fn test_enum_conversions() {
    assert_eq!(Value::from(Shelf::Reference), Value::Integer(1));
    assert_eq!(Shelf::from_value(&Value::Integer(0)).unwrap(), Shelf::Fiction);
    // An out-of-range stored discriminant is absence, not an error.
    assert_eq!(
        Option::<Shelf>::from_value(&Value::Integer(9)).unwrap(),
        None
    );
    assert!(Shelf::from_value(&Value::Integer(9)).is_err());
}

#[test]
fn test_timestamp_text_form() {
    let ts = Timestamp(0);
    assert_eq!(ts.to_text(), "1970-01-01 00:00:00");
    let read = Timestamp::from_value(&Value::Text("1970-01-01 00:00:00".into())).unwrap();
    assert_eq!(read, ts);
    let ticks = Timestamp::from_value(&Value::Integer(86_400)).unwrap();
    assert_eq!(ticks.to_text(), "1970-01-02 00:00:00");
}
