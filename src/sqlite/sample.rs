//! Demonstration database used on first run and by the "load sample" action.
//!
//! Six tables (`users`, `products`, `orders`, `categories`, `reviews`,
//! `inventory`) each seeded with [`SAMPLE_ROWS`] rows from fixed formulas,
//! so the content is identical on every machine apart from the
//! engine-assigned timestamps.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, Transaction};
use tracing::{info, warn};

use super::schema::{
    ColumnConstraint, ColumnDefinition, DataType, DefaultValue, ForeignKey, Schema,
    TableDefinition,
};
use crate::error::{Error, Result};

/// Rows inserted into every sample table.
pub const SAMPLE_ROWS: i64 = 40;

const CATEGORIES: [&str; 3] = ["Electronics", "Books", "Clothing"];
const LOCATIONS: [&str; 3] = ["Warehouse A", "Store B", "Online"];

/// Provision the sample database at `path` unless a file already exists there.
///
/// An existing file is returned untouched, whatever it contains. On failure
/// the partially written file is removed best-effort and
/// [`Error::ProvisionFailure`] is returned. No handle is left open.
pub fn ensure_sample(path: &Path) -> Result<PathBuf> {
    ensure_with(path, provision)
}

fn ensure_with(path: &Path, build: impl FnOnce(&Path) -> rusqlite::Result<()>) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::provision(path, e))?;
    }

    if let Err(err) = build(path) {
        if let Err(cleanup) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %cleanup, "failed to remove partial sample database");
        }
        return Err(Error::provision(path, err));
    }

    info!(path = %path.display(), "sample database created");
    Ok(path.to_path_buf())
}

/// The sample schema: primary keys, creation timestamps and the
/// `orders`/`reviews`/`inventory` foreign keys into `users` and `products`.
pub fn sample_schema() -> Schema {
    let id = || {
        ColumnDefinition::new("id", DataType::Integer).with_constraint(ColumnConstraint::PrimaryKey)
    };
    let timestamp = |name: &str| {
        ColumnDefinition::new(name, DataType::DateTime).with_default(DefaultValue::CurrentTimestamp)
    };
    let required_text = |name: &str| {
        ColumnDefinition::new(name, DataType::Text).with_constraint(ColumnConstraint::NotNull)
    };

    Schema::new()
        .add_table(
            TableDefinition::new("users")
                .add_column(id())
                .add_column(required_text("name"))
                .add_column(
                    ColumnDefinition::new("email", DataType::Text)
                        .with_constraint(ColumnConstraint::Unique),
                )
                .add_column(ColumnDefinition::new("age", DataType::Integer))
                .add_column(timestamp("created_at")),
        )
        .add_table(
            TableDefinition::new("products")
                .add_column(id())
                .add_column(required_text("name"))
                .add_column(ColumnDefinition::new("price", DataType::Real))
                .add_column(ColumnDefinition::new("category", DataType::Text))
                .add_column(
                    ColumnDefinition::new("stock", DataType::Integer)
                        .with_default(DefaultValue::Integer(0)),
                )
                .add_column(timestamp("created_at")),
        )
        .add_table(
            TableDefinition::new("orders")
                .add_column(id())
                .add_column(ColumnDefinition::new("user_id", DataType::Integer))
                .add_column(ColumnDefinition::new("product_id", DataType::Integer))
                .add_column(ColumnDefinition::new("quantity", DataType::Integer))
                .add_column(ColumnDefinition::new("total_amount", DataType::Real))
                .add_column(timestamp("order_date"))
                .add_foreign_key(ForeignKey::new("user_id", "users", "id"))
                .add_foreign_key(ForeignKey::new("product_id", "products", "id")),
        )
        .add_table(
            TableDefinition::new("categories")
                .add_column(id())
                .add_column(required_text("name"))
                .add_column(ColumnDefinition::new("description", DataType::Text))
                .add_column(timestamp("created_at")),
        )
        .add_table(
            TableDefinition::new("reviews")
                .add_column(id())
                .add_column(ColumnDefinition::new("product_id", DataType::Integer))
                .add_column(ColumnDefinition::new("user_id", DataType::Integer))
                .add_column(ColumnDefinition::new("rating", DataType::Integer))
                .add_column(ColumnDefinition::new("comment", DataType::Text))
                .add_column(timestamp("review_date"))
                .add_foreign_key(ForeignKey::new("product_id", "products", "id"))
                .add_foreign_key(ForeignKey::new("user_id", "users", "id")),
        )
        .add_table(
            TableDefinition::new("inventory")
                .add_column(id())
                .add_column(ColumnDefinition::new("product_id", DataType::Integer))
                .add_column(ColumnDefinition::new("location", DataType::Text))
                .add_column(ColumnDefinition::new("quantity", DataType::Integer))
                .add_column(timestamp("last_updated"))
                .add_foreign_key(ForeignKey::new("product_id", "products", "id")),
        )
}

fn provision(path: &Path) -> rusqlite::Result<()> {
    let mut conn = Connection::open(path)?;
    conn.execute_batch(&sample_schema().to_sql())?;

    let tx = conn.transaction()?;
    seed(&tx)?;
    tx.commit()?;

    conn.close().map_err(|(_, err)| err)
}

fn seed(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    let mut insert = tx.prepare("INSERT INTO users (name, email, age) VALUES (?1, ?2, ?3)")?;
    for i in 1..=SAMPLE_ROWS {
        insert.execute(params![
            format!("User {i}"),
            format!("user{i}@example.com"),
            20 + i % 50
        ])?;
    }

    let mut insert = tx.prepare(
        "INSERT INTO products (name, price, category, stock) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for i in 1..=SAMPLE_ROWS {
        insert.execute(params![
            format!("Product {i}"),
            (10 + i * 5) as f64,
            cycle(&CATEGORIES, i),
            50 + i * 2
        ])?;
    }

    let mut insert = tx.prepare(
        "INSERT INTO orders (user_id, product_id, quantity, total_amount) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for i in 1..=SAMPLE_ROWS {
        insert.execute(params![
            1 + i % 40,
            1 + i % 40,
            1 + i % 10,
            (100 + i * 10) as f64
        ])?;
    }

    let mut insert = tx.prepare("INSERT INTO categories (name, description) VALUES (?1, ?2)")?;
    for i in 1..=SAMPLE_ROWS {
        insert.execute(params![
            format!("Category {i}"),
            format!("Description for category {i}")
        ])?;
    }

    let mut insert = tx.prepare(
        "INSERT INTO reviews (product_id, user_id, rating, comment) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for i in 1..=SAMPLE_ROWS {
        insert.execute(params![
            1 + i % 40,
            1 + i % 40,
            1 + i % 5,
            format!("Review comment {i}")
        ])?;
    }

    let mut insert =
        tx.prepare("INSERT INTO inventory (product_id, location, quantity) VALUES (?1, ?2, ?3)")?;
    for i in 1..=SAMPLE_ROWS {
        insert.execute(params![1 + i % 40, cycle(&LOCATIONS, i), 100 + i * 3])?;
    }

    Ok(())
}

fn cycle<'a>(items: &[&'a str; 3], i: i64) -> &'a str {
    items[(i % 3) as usize]
}
