use std::collections::HashMap;

use rusqlite::{params, Connection};
use serde::Serialize;
use tracing::debug;

use super::introspect;
use super::schema::quote_identifier;
use super::value::Value;
use crate::error::{Error, Result};

/// One row keyed by column name.
pub type Row = HashMap<String, Value>;

static NULL: Value = Value::Null;

/// A bounded slice of a table plus the table's total row count.
///
/// `columns` fixes the display order of each row's keys. The window and the
/// total are read by two statements without a shared snapshot, so under a
/// concurrent external writer they may disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowWindow {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub row_count: usize,
    pub total_rows: u64,
}

impl RowWindow {
    /// Values of `row` in column order.
    pub fn ordered_values<'a>(&'a self, row: &'a Row) -> impl Iterator<Item = &'a Value> + 'a {
        self.columns
            .iter()
            .map(move |c| row.get(c).unwrap_or(&NULL))
    }
}

/// Read up to `limit` rows of `table` starting at `offset`, in the engine's
/// scan order.
pub fn read_page(conn: &Connection, table: &str, limit: i64, offset: i64) -> Result<RowWindow> {
    if limit < 0 {
        return Err(Error::InvalidArgument(format!(
            "limit must be non-negative, got {limit}"
        )));
    }
    if offset < 0 {
        return Err(Error::InvalidArgument(format!(
            "offset must be non-negative, got {offset}"
        )));
    }

    let table = introspect::find_table(conn, table)?;
    let columns: Vec<String> = introspect::list_columns(conn, &table)?
        .into_iter()
        .map(|c| c.name)
        .collect();
    let ident = quote_identifier(&table.name);

    let mut stmt = conn.prepare(&format!("SELECT * FROM {ident} LIMIT ?1 OFFSET ?2"))?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let rows = stmt
        .query_map(params![limit, offset], |row| {
            let mut values = Row::with_capacity(names.len());
            for (idx, name) in names.iter().enumerate() {
                values.insert(name.clone(), Value::from(row.get_ref(idx)?));
            }
            Ok(values)
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let total_rows: i64 =
        conn.query_row(&format!("SELECT COUNT(*) FROM {ident}"), [], |row| row.get(0))?;

    debug!(
        table = %table.name,
        limit,
        offset,
        rows = rows.len(),
        total = total_rows,
        "read table page"
    );

    Ok(RowWindow {
        columns,
        row_count: rows.len(),
        rows,
        total_rows: total_rows.max(0) as u64,
    })
}
