//! The single live database handle.
//!
//! A [`Session`] owns at most one open [`Connection`]. Connecting again
//! closes the current handle before the new one is opened, and both steps
//! happen under the same lock, so a concurrent reader observes either the
//! old database or the new one, never a transient gap it could act on.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::{debug, info, warn};

use super::introspect::{self, ColumnDescriptor, TableDescriptor};
use super::page::{self, RowWindow};
use crate::error::{Error, Result};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(2);

struct OpenDatabase {
    path: PathBuf,
    conn: Connection,
    foreign_keys: bool,
}

pub struct Session {
    slot: Mutex<Option<OpenDatabase>>,
    busy_timeout: Duration,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_busy_timeout(DEFAULT_BUSY_TIMEOUT)
    }

    /// Create a closed session whose handles wait up to `busy_timeout` on a
    /// locked database file.
    pub fn with_busy_timeout(busy_timeout: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            busy_timeout,
        }
    }

    /// Open `path`, superseding any open handle.
    ///
    /// The previous handle is closed first and close errors are ignored.
    /// The file is created if absent. On failure the session is left closed.
    pub fn connect(&self, path: &Path) -> Result<()> {
        self.connect_with(|| Ok(path.to_path_buf())).map(|_| ())
    }

    /// Close any open handle, then open the path produced by `prepare`.
    ///
    /// `prepare` runs under the session lock after the old handle is gone,
    /// so a failure there also leaves the session closed.
    pub fn connect_with(&self, prepare: impl FnOnce() -> Result<PathBuf>) -> Result<PathBuf> {
        let mut slot = self.slot.lock();
        if let Some(previous) = slot.take() {
            close(previous);
        }

        let path = prepare()?;
        let open = open(&path, self.busy_timeout)?;
        info!(
            path = %open.path.display(),
            foreign_keys = open.foreign_keys,
            "database connected"
        );
        *slot = Some(open);
        Ok(path)
    }

    /// Close the handle if one is open. A no-op otherwise.
    pub fn disconnect(&self) {
        if let Some(open) = self.slot.lock().take() {
            close(open);
        }
    }

    pub fn is_open(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Path of the open database, if any.
    pub fn path(&self) -> Option<PathBuf> {
        self.slot.lock().as_ref().map(|open| open.path.clone())
    }

    /// Whether foreign-key enforcement is active on the open handle.
    pub fn foreign_keys_enabled(&self) -> bool {
        self.slot
            .lock()
            .as_ref()
            .is_some_and(|open| open.foreign_keys)
    }

    /// Run `f` against the open handle, holding the session lock for the
    /// duration of the call.
    pub(crate) fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let slot = self.slot.lock();
        let open = slot.as_ref().ok_or(Error::NoConnection)?;
        f(&open.conn)
    }

    pub fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
        self.with_connection(introspect::list_tables)
    }

    /// Columns of `table`, which must name a table of the open database.
    pub fn list_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        self.with_connection(|conn| {
            let table = introspect::find_table(conn, table)?;
            introspect::list_columns(conn, &table)
        })
    }

    pub fn read_page(&self, table: &str, limit: i64, offset: i64) -> Result<RowWindow> {
        self.with_connection(|conn| page::read_page(conn, table, limit, offset))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(open) = self.slot.get_mut().take() {
            close(open);
        }
    }
}

fn open(path: &Path, busy_timeout: Duration) -> Result<OpenDatabase> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::connection(path, e))?;
    }

    let conn = Connection::open(path).map_err(|e| Error::connection(path, e))?;
    conn.busy_timeout(busy_timeout)
        .map_err(|e| Error::connection(path, e))?;

    // Opening is lazy; touching the catalog makes the engine read the header.
    conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
        row.get::<_, i64>(0)
    })
    .map_err(|e| Error::connection(path, e))?;

    conn.pragma_update(None, "foreign_keys", true)
        .map_err(|e| Error::connection(path, e))?;
    let foreign_keys = conn
        .pragma_query_value(None, "foreign_keys", |row| row.get::<_, bool>(0))
        .map_err(|e| Error::connection(path, e))?;

    Ok(OpenDatabase {
        path: path.to_path_buf(),
        conn,
        foreign_keys,
    })
}

fn close(open: OpenDatabase) {
    let path = open.path;
    match open.conn.close() {
        Ok(()) => debug!(path = %path.display(), "database closed"),
        Err((_, err)) => {
            warn!(path = %path.display(), error = %err, "failed to close database cleanly")
        }
    }
}
