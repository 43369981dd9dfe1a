//! Terminal host for the browser service.
//!
//! Plays the role of the desktop window: bootstraps the sample database,
//! forwards each command to [`BrowserService`], and renders the results.

use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::service::BrowserService;
use crate::sqlite::{RowWindow, TableDescriptor, Value};

/// Browse tables of a local SQLite database
#[derive(Parser, Debug)]
#[command(name = "dbviewer")]
#[command(version)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the application data directory
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the tables of a database
    Tables {
        /// Path, `sqlite:` URI, or `sample`
        descriptor: String,
    },

    /// Show a page of rows from a table
    Show {
        /// Path, `sqlite:` URI, or `sample`
        descriptor: String,

        /// Table to read
        table: String,

        /// Maximum rows to show [default: configured page size]
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Rows to skip
        #[arg(long, allow_negative_numbers = true)]
        offset: Option<i64>,
    },

    /// Create the sample database if it does not exist
    Sample,

    /// Print the application data directory
    DataDir,
}

/// Execute `command` against `service`, writing output to stdout.
pub async fn run(service: &dyn BrowserService, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Tables { descriptor } => {
            connect(service, &descriptor).await?;
            let tables = service.list_tables().await?;
            if json {
                print_json(&tables)?;
            } else {
                println!("{}", render_tables(&tables));
            }
        }
        Commands::Show {
            descriptor,
            table,
            limit,
            offset,
        } => {
            connect(service, &descriptor).await?;
            let window = service.get_table_data(&table, limit, offset).await?;
            if json {
                print_json(&window)?;
            } else {
                let offset = offset.unwrap_or(0);
                println!("{}", render_window(&window));
                println!("{}", summary(&window, offset));
            }
        }
        Commands::Sample => {
            let sample = service.create_sample().await?;
            if json {
                print_json(&sample)?;
            } else {
                println!("{}", sample.path.display());
                println!("{}", sample.connection_string);
            }
        }
        Commands::DataDir => {
            let dir = service.data_dir().to_path_buf();
            if json {
                print_json(&dir)?;
            } else {
                println!("{}", dir.display());
            }
        }
    }
    service.shutdown().await;
    Ok(())
}

async fn connect(service: &dyn BrowserService, descriptor: &str) -> anyhow::Result<()> {
    let result = service.connect(descriptor).await;
    if !result.success {
        bail!(result.error.unwrap_or_else(|| "connection failed".into()));
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn render_tables(tables: &[TableDescriptor]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Table"]);
    for table in tables {
        builder.push_record([table.name.as_str()]);
    }
    builder.build().with(Style::rounded()).to_string()
}

pub fn render_window(window: &RowWindow) -> String {
    let mut builder = Builder::default();
    builder.push_record(window.columns.iter().map(String::as_str));
    for row in &window.rows {
        builder.push_record(window.ordered_values(row).map(display_value));
    }
    builder.build().with(Style::rounded()).to_string()
}

/// `rows 31-40 of 40`, or `no rows at offset N of T` for an empty window.
pub fn summary(window: &RowWindow, offset: i64) -> String {
    if window.row_count == 0 {
        return format!("no rows at offset {offset} of {}", window.total_rows);
    }
    let first = offset + 1;
    let last = offset + window.row_count as i64;
    format!("rows {first}-{last} of {}", window.total_rows)
}

pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".into(),
        Value::Integer(v) => v.to_string(),
        Value::Real(v) => v.to_string(),
        Value::Text(v) => v.clone(),
        Value::Blob(v) => format!("<{} bytes>", v.len()),
    }
}
