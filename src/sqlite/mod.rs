//! SQLite connection and table-data access.
//!
//! - [`resolve`] turns a connection descriptor into an absolute file path.
//! - [`sample`] provisions the demonstration database.
//! - [`session`] owns the single open handle.
//! - [`introspect`] lists tables and columns.
//! - [`page`] serves row windows with total counts.

pub mod introspect;
pub mod page;
pub mod resolve;
pub mod sample;
pub mod schema;
pub mod session;
pub mod value;

pub use introspect::{ColumnDescriptor, TableDescriptor};
pub use page::{Row, RowWindow};
pub use resolve::{connection_string, resolve, SAMPLE_DESCRIPTOR};
pub use sample::{ensure_sample, sample_schema, SAMPLE_ROWS};
pub use session::Session;
pub use value::Value;
