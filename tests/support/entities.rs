//! Shared fixture entities for the integration tests.
#![allow(dead_code)]

use quarry::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

impl FromRow for Author {
    fn from_row(row: &RowView<'_>) -> MaterializeResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }
}

impl Entity for Author {
    fn descriptor() -> TableDescriptor {
        TableDescriptor::new("Author")
            .table("authors")
            .column(
                ColumnDescriptor::new("id", DeclaredType::BigInt)
                    .primary_key()
                    .auto_increment(),
            )
            .column(
                ColumnDescriptor::new("name", DeclaredType::Text)
                    .required()
                    .unique_index(),
            )
    }

    fn values(&self) -> Vec<Value> {
        vec![self.id.into(), self.name.clone().into()]
    }

    fn key_assigned(&mut self, key: i64) {
        self.id = key;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author_id: i64,
    pub price: f64,
    pub pages: Option<i64>,
}

impl FromRow for Book {
    fn from_row(row: &RowView<'_>) -> MaterializeResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            author_id: row.get("author_id")?,
            price: row.get("price")?,
            pages: row.get("pages")?,
        })
    }
}

impl Entity for Book {
    fn descriptor() -> TableDescriptor {
        TableDescriptor::new("Book")
            .table("books")
            .column(
                ColumnDescriptor::new("id", DeclaredType::BigInt)
                    .primary_key()
                    .auto_increment(),
            )
            .column(ColumnDescriptor::new("title", DeclaredType::Text).required())
            .column(ColumnDescriptor::new("author_id", DeclaredType::BigInt).required())
            .column(ColumnDescriptor::new("price", DeclaredType::Real).required())
            .column(ColumnDescriptor::new("pages", DeclaredType::BigInt))
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.id.into(),
            self.title.clone().into(),
            self.author_id.into(),
            self.price.into(),
            self.pages.into(),
        ]
    }

    fn key_assigned(&mut self, key: i64) {
        self.id = key;
    }
}

pub fn book(title: &str, author_id: i64, price: f64, pages: Option<i64>) -> Book {
    Book {
        id: 0,
        title: title.to_string(),
        author_id,
        price,
        pages,
    }
}

/// An in-memory database with both tables created and a small fixture set:
/// two authors with books and one author without any.
pub fn seeded() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.create_table::<Author>().unwrap();
    db.create_table::<Book>().unwrap();

    let mut herbert = Author {
        id: 0,
        name: "Frank Herbert".into(),
    };
    let mut gibson = Author {
        id: 0,
        name: "William Gibson".into(),
    };
    let mut quiet = Author {
        id: 0,
        name: "Quiet Author".into(),
    };
    db.insert(&mut herbert).unwrap();
    db.insert(&mut gibson).unwrap();
    db.insert(&mut quiet).unwrap();

    let mut books = vec![
        book("Dune", herbert.id, 9.99, Some(412)),
        book("Dune Messiah", herbert.id, 7.50, Some(256)),
        book("Neuromancer", gibson.id, 12.00, Some(271)),
        book("Count Zero", gibson.id, 4.25, None),
    ];
    db.insert_all(&mut books).unwrap();
    db
}
