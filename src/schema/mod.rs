//! Table metadata: declarative descriptors, derived mappings, and DDL.
//!
//! Types describe themselves ahead of time through [`Entity::descriptor`];
//! the registry derives a [`TableMapping`] from the descriptor once per type
//! and caches it. Nothing here inspects values at runtime.

pub mod ddl;
mod registry;

pub use registry::mapping;

use crate::materialize::FromRow;
use crate::value::{StorageClass, Value};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("{type_name} declares no primary key")]
    MissingPrimaryKey { type_name: &'static str },

    #[error("{type_name} declares {count} primary keys; exactly one is required")]
    AmbiguousPrimaryKey { type_name: &'static str, count: usize },

    #[error("{type_name}.{field}: auto-increment requires an integer primary key")]
    InvalidAutoIncrement {
        type_name: &'static str,
        field: &'static str,
    },

    #[error("{type_name} maps the column {column} more than once")]
    DuplicateColumn {
        type_name: &'static str,
        column: String,
    },
}

pub type SchemaResult<T> = Result<T, SchemaError>;

// ============================================================================
// Declared types
// ============================================================================

/// The declared type of a mapped field, before storage-class erasure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredType {
    Integer,
    BigInt,
    Bool,
    Real,
    Text,
    Blob,
    Timestamp,
    Uuid,
    Enum,
}

impl DeclaredType {
    pub fn storage_class(self) -> StorageClass {
        match self {
            DeclaredType::Integer | DeclaredType::BigInt | DeclaredType::Bool | DeclaredType::Enum => {
                StorageClass::Integer
            }
            DeclaredType::Real => StorageClass::Real,
            DeclaredType::Text | DeclaredType::Timestamp | DeclaredType::Uuid => StorageClass::Text,
            DeclaredType::Blob => StorageClass::Blob,
        }
    }
}

// ============================================================================
// Descriptors
// ============================================================================

/// One index membership declaration on a column.
#[derive(Debug, Clone)]
pub struct IndexSpec {
    pub name: Option<&'static str>,
    pub order: u32,
    pub unique: bool,
}

/// Declarative description of one mapped field.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub field: &'static str,
    pub column: Option<&'static str>,
    pub ty: DeclaredType,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub required: bool,
    pub nullable: bool,
    pub not_mapped: bool,
    pub indexes: Vec<IndexSpec>,
}

impl ColumnDescriptor {
    pub fn new(field: &'static str, ty: DeclaredType) -> Self {
        Self {
            field,
            column: None,
            ty,
            primary_key: false,
            auto_increment: false,
            required: false,
            nullable: true,
            not_mapped: false,
            indexes: Vec::new(),
        }
    }

    #[must_use]
    pub fn named(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }

    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    #[must_use]
    pub fn not_mapped(mut self) -> Self {
        self.not_mapped = true;
        self
    }

    #[must_use]
    pub fn indexed(mut self) -> Self {
        self.indexes.push(IndexSpec {
            name: None,
            order: 0,
            unique: false,
        });
        self
    }

    #[must_use]
    pub fn unique_index(mut self) -> Self {
        self.indexes.push(IndexSpec {
            name: None,
            order: 0,
            unique: true,
        });
        self
    }

    #[must_use]
    pub fn index_named(mut self, name: &'static str, order: u32, unique: bool) -> Self {
        self.indexes.push(IndexSpec {
            name: Some(name),
            order,
            unique,
        });
        self
    }
}

/// Declarative description of a mapped type.
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    pub type_name: &'static str,
    pub table: Option<&'static str>,
    pub without_rowid: bool,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            table: None,
            without_rowid: false,
            columns: Vec::new(),
        }
    }

    #[must_use]
    pub fn table(mut self, table: &'static str) -> Self {
        self.table = Some(table);
        self
    }

    #[must_use]
    pub fn without_rowid(mut self) -> Self {
        self.without_rowid = true;
        self
    }

    #[must_use]
    pub fn column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }
}

// ============================================================================
// Entity
// ============================================================================

/// A type stored as rows of one table.
///
/// `values` returns one [`Value`] per mapped column in descriptor order;
/// `key_assigned` receives the generated rowid after an auto-increment
/// insert.
pub trait Entity: FromRow + Send + Sized + 'static {
    fn descriptor() -> TableDescriptor;

    fn values(&self) -> Vec<Value>;

    fn key_assigned(&mut self, _key: i64) {}
}

// ============================================================================
// Derived mapping
// ============================================================================

/// A mapped column with its mapping decisions applied.
#[derive(Debug, Clone)]
pub struct TableColumn {
    pub name: String,
    pub field: &'static str,
    pub ty: DeclaredType,
    pub storage: StorageClass,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub nullable: bool,
}

/// A named index over one or more mapped columns.
#[derive(Debug, Clone)]
pub struct TableIndex {
    pub name: String,
    pub unique: bool,
    pub columns: Vec<String>,
}

/// The mapping derived from a [`TableDescriptor`], computed once per type.
#[derive(Debug, Clone)]
pub struct TableMapping {
    pub type_name: &'static str,
    pub table: String,
    pub without_rowid: bool,
    pub columns: Vec<TableColumn>,
    pub indexes: Vec<TableIndex>,
    pk: usize,
}

impl TableMapping {
    pub fn primary_key(&self) -> &TableColumn {
        &self.columns[self.pk]
    }

    /// Look a column up by column name, falling back to the field name.
    pub fn column(&self, name: &str) -> Option<&TableColumn> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .or_else(|| self.columns.iter().find(|c| c.field == name))
    }

    pub(crate) fn from_descriptor(desc: &TableDescriptor) -> SchemaResult<Self> {
        let table = desc.table.unwrap_or(desc.type_name).to_string();

        let mut columns = Vec::new();
        let mut index_specs: Vec<(String, u32, bool, String)> = Vec::new();
        for col in desc.columns.iter().filter(|c| !c.not_mapped) {
            let name = col.column.unwrap_or(col.field).to_string();
            if columns.iter().any(|c: &TableColumn| c.name == name) {
                return Err(SchemaError::DuplicateColumn {
                    type_name: desc.type_name,
                    column: name,
                });
            }
            let storage = col.ty.storage_class();
            if col.auto_increment && (!col.primary_key || storage != StorageClass::Integer) {
                return Err(SchemaError::InvalidAutoIncrement {
                    type_name: desc.type_name,
                    field: col.field,
                });
            }
            for spec in &col.indexes {
                let index_name = spec
                    .name
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| format!("idx_{}_{}", table, name));
                index_specs.push((index_name, spec.order, spec.unique, name.clone()));
            }
            columns.push(TableColumn {
                name,
                field: col.field,
                ty: col.ty,
                storage,
                primary_key: col.primary_key,
                auto_increment: col.auto_increment,
                nullable: col.nullable && !col.primary_key && !col.required,
            });
        }

        let keyed: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.primary_key)
            .map(|(i, _)| i)
            .collect();
        let pk = match keyed.as_slice() {
            [one] => *one,
            [] => {
                return Err(SchemaError::MissingPrimaryKey {
                    type_name: desc.type_name,
                })
            }
            many => {
                return Err(SchemaError::AmbiguousPrimaryKey {
                    type_name: desc.type_name,
                    count: many.len(),
                })
            }
        };

        index_specs.sort_by(|a, b| (&a.0, a.1).cmp(&(&b.0, b.1)));
        let mut indexes: Vec<TableIndex> = Vec::new();
        for (name, _, unique, column) in index_specs {
            match indexes.last_mut() {
                Some(last) if last.name == name => {
                    last.unique |= unique;
                    last.columns.push(column);
                }
                _ => indexes.push(TableIndex {
                    name,
                    unique,
                    columns: vec![column],
                }),
            }
        }

        Ok(Self {
            type_name: desc.type_name,
            table,
            without_rowid: desc.without_rowid,
            columns,
            indexes,
            pk,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
