//! Connection and table-data access for a local SQLite database browser.
//!
//! # Intention
//!
//! - Resolve connection descriptors to database files and keep exactly one
//!   of them open at a time.
//! - Enumerate tables and columns, and serve paginated row windows with
//!   accurate total counts.
//! - Provision a deterministic sample database for first-run use.
//!
//! # Architectural Boundaries
//!
//! - Only database access lives here; rendering belongs to the caller.
//! - Values leave this crate typed ([`sqlite::Value`]), never pre-formatted.

pub mod cli;
pub mod config;
pub mod error;
pub mod service;
pub mod sqlite;

pub use config::Config;
pub use error::{Error, Result};
pub use service::{BrowserService, ConnectionResult, SampleDatabase, SqliteBrowser};
