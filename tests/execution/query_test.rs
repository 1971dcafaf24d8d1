//! Joins, projections, grouping, and set operators end to end.

#[path = "../support/entities.rs"]
mod entities;

use entities::{book, seeded, Author, Book};
use quarry::prelude::*;

#[derive(Debug, PartialEq)]
struct BookWithAuthor {
    book: Book,
    author: Option<Author>,
}

impl FromRow for BookWithAuthor {
    fn from_row(row: &RowView<'_>) -> MaterializeResult<Self> {
        Ok(Self {
            book: Book::from_row(row)?,
            author: row.nested("author")?,
        })
    }
}

#[test]
fn test_left_join_with_nested_projection() {
    let db = seeded();
    let mut orphan = book("Anonymous", 9999, 1.0, None);
    db.insert(&mut orphan).unwrap();

    let rows: Vec<BookWithAuthor> = db
        .table::<Book>()
        .left_join::<Author>(col_of(0, "id").eq(col("author_id")))
        .order_by(col("title"))
        .select_as::<BookWithAuthor>(vec![SelectItem::root(), SelectItem::join(0, "author")])
        .to_vec()
        .unwrap();
    assert_eq!(rows.len(), 5);

    let anonymous = rows.iter().find(|r| r.book.title == "Anonymous").unwrap();
    // Unmatched outer join: absence, never a default author.
    assert_eq!(anonymous.author, None);

    let dune = rows.iter().find(|r| r.book.title == "Dune").unwrap();
    assert_eq!(dune.author.as_ref().unwrap().name, "Frank Herbert");
}

#[test]
fn test_inner_join_filters_unmatched() {
    let db = seeded();
    let mut orphan = book("Anonymous", 9999, 1.0, None);
    db.insert(&mut orphan).unwrap();

    let joined = db
        .table::<Book>()
        .join::<Author>(col_of(0, "id").eq(col("author_id")))
        .count()
        .unwrap();
    assert_eq!(joined, 4);
}

#[test]
fn test_group_join_regroups_per_root_row() {
    let db = seeded();
    let grouped: Vec<(Author, Vec<Book>)> = db
        .table::<Author>()
        .group_join::<Book>(col_of(0, "author_id").eq(col("id")))
        .to_grouped::<Book>()
        .unwrap();

    assert_eq!(grouped.len(), 3);
    let by_name: Vec<(&str, usize)> = grouped
        .iter()
        .map(|(a, books)| (a.name.as_str(), books.len()))
        .collect();
    assert!(by_name.contains(&("Frank Herbert", 2)));
    assert!(by_name.contains(&("William Gibson", 2)));
    assert!(by_name.contains(&("Quiet Author", 0)));

    let herbert = grouped
        .iter()
        .find(|(a, _)| a.name == "Frank Herbert")
        .unwrap();
    assert!(herbert.1.iter().all(|b| b.author_id == herbert.0.id));
}

#[test]
fn test_tuple_projection_is_positional() {
    let db = seeded();
    let pairs: Vec<(String, f64)> = db
        .table::<Book>()
        .order_by(col("price"))
        .select_as(vec![
            SelectItem::expr(col("title"), "t"),
            SelectItem::expr(col("price"), "p"),
        ])
        .to_vec()
        .unwrap();
    assert_eq!(pairs[0], ("Count Zero".to_string(), 4.25));
    assert_eq!(pairs.last().unwrap().0, "Neuromancer");
}

#[test]
fn test_select_value_computes_expressions() {
    let db = seeded();
    let shouted: Vec<String> = db
        .table::<Book>()
        .filter(col("title").eq("Dune"))
        .select_value(col("title").upper())
        .to_vec()
        .unwrap();
    assert_eq!(shouted, vec!["DUNE".to_string()]);

    let doubled: Option<f64> = db
        .table::<Book>()
        .filter(col("title").eq("Dune"))
        .select_value::<f64>(col("price").mul(2.0))
        .first_opt()
        .unwrap();
    assert_eq!(doubled, Some(19.98));
}

#[test]
fn test_skip_take_distinct() {
    let db = seeded();
    let middle: Vec<Book> = db
        .table::<Book>()
        .order_by(col("title"))
        .skip(1)
        .take(2)
        .to_vec()
        .unwrap();
    let titles: Vec<&str> = middle.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Dune", "Dune Messiah"]);

    let authors: Vec<i64> = db
        .table::<Book>()
        .select_value(col("author_id"))
        .distinct()
        .to_vec()
        .unwrap();
    assert_eq!(authors.len(), 2);
}

#[test]
fn test_reverse_without_order_reverses_in_memory() {
    let db = seeded();
    let forward: Vec<Book> = db.table::<Book>().to_vec().unwrap();
    let backward: Vec<Book> = db.table::<Book>().reverse().to_vec().unwrap();
    let mut expected = forward;
    expected.reverse();
    assert_eq!(backward, expected);
}

#[test]
fn test_order_by_after_reverse_sorts_ascending() {
    let db = seeded();
    let titles: Vec<String> = db
        .table::<Book>()
        .reverse()
        .order_by(col("title"))
        .select_value(col("title"))
        .to_vec()
        .unwrap();
    assert_eq!(
        titles,
        vec!["Count Zero", "Dune", "Dune Messiah", "Neuromancer"]
    );
}

#[test]
fn test_union_and_union_all() {
    let db = seeded();
    let cheap = db.table::<Book>().filter(col("price").lt(8.0));
    let also_cheap = db.table::<Book>().filter(col("price").lt(5.0));

    // UNION deduplicates the overlap, UNION ALL keeps it.
    assert_eq!(cheap.union(&also_cheap).count().unwrap(), 2);
    assert_eq!(cheap.union_all(&also_cheap).count().unwrap(), 3);
}

#[test]
fn test_any_and_all_match() {
    let db = seeded();
    assert!(db
        .table::<Book>()
        .filter(col("price").gt(10.0))
        .any()
        .unwrap());
    assert!(!db
        .table::<Book>()
        .filter(col("price").gt(1000.0))
        .any()
        .unwrap());

    assert!(db.table::<Book>().all_match(col("price").gt(0.0)).unwrap());
    assert!(!db.table::<Book>().all_match(col("price").gt(5.0)).unwrap());
    // Vacuously true on an empty result.
    assert!(db
        .table::<Book>()
        .filter(col("price").gt(1000.0))
        .all_match(col("price").gt(0.0))
        .unwrap());
}

#[test]
fn test_aggregates() {
    let db = seeded();
    let q = db.table::<Book>();
    assert_eq!(q.max_of::<f64>(col("price")).unwrap(), Some(12.0));
    assert_eq!(q.min_of::<f64>(col("price")).unwrap(), Some(4.25));
    assert_eq!(q.sum_of::<f64>(col("pages")).unwrap(), 939.0);
    let avg = q.avg_of(col("price")).unwrap().unwrap();
    assert!((avg - 8.435).abs() < 1e-9);
}

#[test]
fn test_to_map_and_to_lookup() {
    let db = seeded();
    let by_title = db
        .table::<Book>()
        .to_map(|b| b.title.clone())
        .unwrap();
    assert_eq!(by_title["Dune"].price, 9.99);

    let by_author = db
        .table::<Book>()
        .to_lookup(|b| b.author_id)
        .unwrap();
    assert_eq!(by_author.len(), 2);
    assert!(by_author.values().all(|books| books.len() == 2));
}

#[test]
fn test_text_functions_execute() {
    let db = seeded();
    let trimmed: Vec<String> = db
        .table::<Book>()
        .filter(col("title").eq("Dune"))
        .select_value(col("title").replace("u", "o"))
        .to_vec()
        .unwrap();
    assert_eq!(trimmed, vec!["Done".to_string()]);

    let sliced: String = db
        .table::<Book>()
        .filter(col("title").eq("Neuromancer"))
        .select_value(col("title").substring_len(0, 5))
        .single()
        .unwrap();
    assert_eq!(sliced, "Neuro");

    let idx: i64 = db
        .table::<Book>()
        .filter(col("title").eq("Neuromancer"))
        .select_value(col("title").index_of("mancer"))
        .single()
        .unwrap();
    assert_eq!(idx, 5);
}
