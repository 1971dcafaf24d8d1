//! DDL emission from a derived mapping.

use crate::sql::quote_ident;

use super::TableMapping;

/// `CREATE TABLE IF NOT EXISTS` for the mapping.
pub fn create_table(mapping: &TableMapping) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (", quote_ident(&mapping.table));
    for (idx, col) in mapping.columns.iter().enumerate() {
        if idx > 0 {
            sql.push_str(", ");
        }
        sql.push_str(&quote_ident(&col.name));
        sql.push(' ');
        sql.push_str(col.storage.sql_type());
        if col.primary_key {
            sql.push_str(" NOT NULL PRIMARY KEY");
            if col.auto_increment {
                sql.push_str(" AUTOINCREMENT");
            }
        } else if col.nullable {
            sql.push_str(" NULL");
        } else {
            sql.push_str(" NOT NULL");
        }
    }
    sql.push(')');
    if mapping.without_rowid {
        sql.push_str(" WITHOUT ROWID");
    }
    sql
}

/// `CREATE INDEX IF NOT EXISTS` for every declared index, in name order.
pub fn create_indexes(mapping: &TableMapping) -> Vec<String> {
    mapping
        .indexes
        .iter()
        .map(|index| {
            let unique = if index.unique { "UNIQUE " } else { "" };
            let columns = index
                .columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "CREATE {unique}INDEX IF NOT EXISTS {} ON {}({columns})",
                quote_ident(&index.name),
                quote_ident(&mapping.table),
            )
        })
        .collect()
}

pub fn drop_table(mapping: &TableMapping) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(&mapping.table))
}
