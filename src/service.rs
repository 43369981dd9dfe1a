//! The browser service consumed by the presentation layer.
//!
//! Four operations mirror what a view needs: connect, list tables, fetch a
//! page of table data, and provision the sample database. Each call runs on
//! the blocking pool and is bounded by the configured call timeout, so a
//! locked or damaged file cannot stall the caller indefinitely.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::sqlite::{
    connection_string, ensure_sample, resolve, RowWindow, Session, TableDescriptor,
    SAMPLE_DESCRIPTOR,
};

/// Outcome of a connect request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionResult {
    pub fn connected(path: PathBuf) -> Self {
        Self {
            success: true,
            path: Some(path),
            message: Some("Connected successfully".into()),
            error: None,
        }
    }

    pub fn failed(error: &Error) -> Self {
        Self {
            success: false,
            path: None,
            message: None,
            error: Some(error.to_string()),
        }
    }
}

/// Location of a provisioned sample database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleDatabase {
    pub path: PathBuf,
    pub connection_string: String,
}

impl SampleDatabase {
    fn new(path: PathBuf) -> Self {
        let connection_string = connection_string(&path);
        Self {
            path,
            connection_string,
        }
    }
}

#[async_trait]
pub trait BrowserService: Send + Sync {
    /// Resolve `descriptor` and make it the current database.
    ///
    /// The descriptor `"sample"` selects `{data_dir}/sample.db`, provisioning
    /// it first. Failures are reported in the result, not as an error.
    async fn connect(&self, descriptor: &str) -> ConnectionResult;

    async fn list_tables(&self) -> Result<Vec<TableDescriptor>>;

    /// Page of `table`. `None` limit means the configured page size, `None`
    /// offset means zero.
    async fn get_table_data(
        &self,
        table: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<RowWindow>;

    /// Provision a sample database at `path` if none exists there.
    async fn ensure_sample(&self, path: &Path) -> Result<SampleDatabase>;

    /// Provision the sample database in the data directory.
    async fn create_sample(&self) -> Result<SampleDatabase>;

    fn data_dir(&self) -> &Path;

    /// Close the current database, if any.
    async fn shutdown(&self);
}

/// [`BrowserService`] backed by a single [`Session`].
#[derive(Clone)]
pub struct SqliteBrowser {
    session: Arc<Session>,
    data_dir: PathBuf,
    sample_path: PathBuf,
    page_size: i64,
    call_timeout: Duration,
}

impl SqliteBrowser {
    pub fn new(config: &Config) -> Self {
        Self {
            session: Arc::new(Session::with_busy_timeout(config.busy_timeout())),
            data_dir: config.data_dir.clone(),
            sample_path: config.sample_path(),
            page_size: config.page_size,
            call_timeout: config.call_timeout(),
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn sample_path(&self) -> &Path {
        &self.sample_path
    }

    /// Run `f` on the blocking pool, bounded by the call timeout.
    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Session) -> Result<T> + Send + 'static,
    {
        let session = Arc::clone(&self.session);
        let task = tokio::task::spawn_blocking(move || f(&session));
        match tokio::time::timeout(self.call_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => Err(Error::Task(join.to_string())),
            Err(_) => {
                warn!(timeout = ?self.call_timeout, "database call timed out");
                Err(Error::Timeout(self.call_timeout))
            }
        }
    }

    async fn try_connect(&self, descriptor: &str) -> Result<PathBuf> {
        let sample = (descriptor == SAMPLE_DESCRIPTOR).then(|| self.sample_path.clone());
        let descriptor = descriptor.to_string();
        // The old handle is closed before the sample is provisioned, so a
        // provisioning failure cannot leave the previous database in place.
        self.blocking(move |session| {
            session.connect_with(|| match sample {
                Some(sample) => ensure_sample(&sample),
                None => Ok(resolve(&descriptor)),
            })
        })
        .await
    }
}

#[async_trait]
impl BrowserService for SqliteBrowser {
    async fn connect(&self, descriptor: &str) -> ConnectionResult {
        match self.try_connect(descriptor).await {
            Ok(path) => ConnectionResult::connected(path),
            Err(err) => {
                warn!(descriptor, error = %err, "connect failed");
                ConnectionResult::failed(&err)
            }
        }
    }

    async fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
        self.blocking(|session| session.list_tables()).await
    }

    async fn get_table_data(
        &self,
        table: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<RowWindow> {
        let table = table.to_string();
        let limit = limit.unwrap_or(self.page_size);
        let offset = offset.unwrap_or(0);
        self.blocking(move |session| session.read_page(&table, limit, offset))
            .await
    }

    async fn ensure_sample(&self, path: &Path) -> Result<SampleDatabase> {
        let path = path.to_path_buf();
        let path = self.blocking(move |_| ensure_sample(&path)).await?;
        Ok(SampleDatabase::new(path))
    }

    async fn create_sample(&self) -> Result<SampleDatabase> {
        let sample = BrowserService::ensure_sample(self, &self.sample_path).await?;
        info!(path = %sample.path.display(), "sample database ready");
        Ok(sample)
    }

    fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    async fn shutdown(&self) {
        let result = self
            .blocking(|session| {
                session.disconnect();
                Ok(())
            })
            .await;
        if let Err(err) = result {
            warn!(error = %err, "shutdown did not complete");
        }
    }
}
