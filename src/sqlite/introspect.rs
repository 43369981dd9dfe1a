//! Catalog introspection: user tables and their columns.
//!
//! Table names that come from outside are untrusted. [`find_table`] is the
//! only way to obtain a [`TableDescriptor`] for a caller-supplied name, and
//! it succeeds only when the name is present in the live catalog.

use rusqlite::Connection;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// A user table as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescriptor {
    pub name: String,
}

/// A column in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Declared type text, empty when the column was declared without one.
    pub data_type: String,
    pub not_null: bool,
    pub primary_key: bool,
}

/// User tables in the engine's catalog order. `sqlite_*` internals are excluded.
pub fn list_tables(conn: &Connection) -> Result<Vec<TableDescriptor>> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'")?;
    let tables = stmt
        .query_map([], |row| Ok(TableDescriptor { name: row.get(0)? }))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    debug!(count = tables.len(), "listed tables");
    Ok(tables)
}

/// Validate a caller-supplied table name against the catalog.
pub fn find_table(conn: &Connection, name: &str) -> Result<TableDescriptor> {
    list_tables(conn)?
        .into_iter()
        .find(|t| t.name == name)
        .ok_or_else(|| Error::UnknownTable(name.to_string()))
}

/// Columns of `table` in declared order.
pub fn list_columns(conn: &Connection, table: &TableDescriptor) -> Result<Vec<ColumnDescriptor>> {
    let mut stmt = conn.prepare(
        "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1) ORDER BY cid",
    )?;
    let columns = stmt
        .query_map([&table.name], |row| {
            Ok(ColumnDescriptor {
                name: row.get(0)?,
                data_type: row.get(1)?,
                not_null: row.get(2)?,
                primary_key: row.get::<_, i64>(3)? > 0,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    // A table dropped between listing and this call has no columns.
    if columns.is_empty() {
        return Err(Error::UnknownTable(table.name.clone()));
    }
    debug!(table = %table.name, count = columns.len(), "listed columns");
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE zeta (id INTEGER PRIMARY KEY, label TEXT NOT NULL, note);
            CREATE TABLE alpha (code TEXT, weight REAL);
            CREATE TABLE "odd""name" (x INTEGER);
            CREATE INDEX idx_alpha ON alpha(code);
            CREATE VIEW v_alpha AS SELECT * FROM alpha;
            CREATE TABLE auto (id INTEGER PRIMARY KEY AUTOINCREMENT);
            "#,
        )
        .unwrap();
        conn
    }

    #[test]
    fn lists_user_tables_in_catalog_order() {
        let conn = db();
        let names: Vec<_> = list_tables(&conn).unwrap().into_iter().map(|t| t.name).collect();
        // sqlite_sequence is created by AUTOINCREMENT and must not appear.
        assert_eq!(names, vec!["zeta", "alpha", "odd\"name", "auto"]);
    }

    #[test]
    fn columns_follow_declared_order() {
        let conn = db();
        let table = find_table(&conn, "zeta").unwrap();
        let columns = list_columns(&conn, &table).unwrap();
        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "label", "note"]);
        assert!(columns[0].primary_key);
        assert!(columns[1].not_null);
        assert_eq!(columns[1].data_type, "TEXT");
        assert_eq!(columns[2].data_type, "");
    }

    #[test]
    fn quoted_names_are_resolved() {
        let conn = db();
        let table = find_table(&conn, "odd\"name").unwrap();
        assert_eq!(list_columns(&conn, &table).unwrap()[0].name, "x");
    }

    #[test]
    fn unknown_and_injected_names_are_rejected() {
        let conn = db();
        for name in ["missing", "v_alpha", "idx_alpha", "alpha; DROP TABLE zeta"] {
            match find_table(&conn, name) {
                Err(Error::UnknownTable(n)) => assert_eq!(n, name),
                other => panic!("expected UnknownTable for {name}, got {other:?}"),
            }
        }
        assert_eq!(list_tables(&conn).unwrap().len(), 4);
    }

    #[test]
    fn dropped_table_has_no_columns() {
        let conn = db();
        let table = find_table(&conn, "alpha").unwrap();
        conn.execute_batch("DROP VIEW v_alpha; DROP TABLE alpha;").unwrap();
        assert!(matches!(
            list_columns(&conn, &table),
            Err(Error::UnknownTable(_))
        ));
    }
}
