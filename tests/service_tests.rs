use std::path::PathBuf;
use std::time::Duration;

use dbviewer::sqlite::Value;
use dbviewer::{BrowserService, Config, Error, SqliteBrowser};
use rusqlite::Connection;
use tempfile::TempDir;

fn browser(dir: &TempDir) -> SqliteBrowser {
    let config = Config {
        data_dir: dir.path().join("app-data"),
        ..Config::default()
    };
    SqliteBrowser::new(&config)
}

#[tokio::test]
async fn test_sample_descriptor_provisions_and_connects() {
    let dir = TempDir::new().unwrap();
    let service = browser(&dir);
    let expected = dir.path().join("app-data").join("sample.db");

    let result = service.connect("sample").await;
    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.path, Some(expected.clone()));
    assert_eq!(result.message.as_deref(), Some("Connected successfully"));
    assert!(expected.exists());

    let tables = service.list_tables().await.unwrap();
    assert_eq!(tables.len(), 6);
    assert_eq!(tables[0].name, "users");
}

#[tokio::test]
async fn test_get_table_data_uses_default_page() {
    let dir = TempDir::new().unwrap();
    let service = browser(&dir);
    assert!(service.connect("sample").await.success);

    let window = service.get_table_data("orders", None, None).await.unwrap();
    assert_eq!(window.row_count, 10);
    assert_eq!(window.total_rows, 40);
    assert_eq!(window.rows[0]["user_id"], Value::Integer(2));

    let window = service
        .get_table_data("inventory", Some(10), Some(35))
        .await
        .unwrap();
    assert_eq!(window.row_count, 5);

    let err = service
        .get_table_data("does_not_exist", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnknownTable(_)));
}

#[tokio::test]
async fn test_calls_before_connect_fail() {
    let dir = TempDir::new().unwrap();
    let service = browser(&dir);

    assert!(matches!(
        service.list_tables().await,
        Err(Error::NoConnection)
    ));
    assert!(matches!(
        service.get_table_data("users", None, None).await,
        Err(Error::NoConnection)
    ));
}

#[tokio::test]
async fn test_uri_descriptor_connects_to_plain_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plain.db");
    Connection::open(&path)
        .unwrap()
        .execute_batch("CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (1);")
        .unwrap();

    let service = browser(&dir);
    let result = service.connect(&format!("sqlite://{}", path.display())).await;
    assert!(result.success);
    assert_eq!(result.path, Some(path));

    let window = service.get_table_data("t", Some(5), Some(0)).await.unwrap();
    assert_eq!(window.columns, vec!["a"]);
    assert_eq!(window.rows[0]["a"], Value::Integer(1));
}

#[tokio::test]
async fn test_failed_connect_is_reported_in_result() {
    let dir = TempDir::new().unwrap();
    let corrupt = dir.path().join("corrupt.db");
    std::fs::write(&corrupt, vec![0xffu8; 2048]).unwrap();

    let service = browser(&dir);
    assert!(service.connect("sample").await.success);

    let result = service.connect(corrupt.to_str().unwrap()).await;
    assert!(!result.success);
    assert!(result.path.is_none());
    assert!(result.error.unwrap().contains("corrupt.db"));

    // No silent fallback to the previously open sample.
    assert!(matches!(
        service.list_tables().await,
        Err(Error::NoConnection)
    ));
}

#[tokio::test]
async fn test_failed_sample_provisioning_closes_previous_database() {
    let dir = TempDir::new().unwrap();
    let plain = dir.path().join("plain.db");
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    let config = Config {
        data_dir: blocker.join("app-data"),
        ..Config::default()
    };
    let service = SqliteBrowser::new(&config);
    assert!(service.connect(plain.to_str().unwrap()).await.success);

    let result = service.connect("sample").await;
    assert!(!result.success);
    assert!(result.path.is_none());
    assert!(result.error.unwrap().contains("sample.db"));

    assert!(!service.session().is_open());
    assert!(matches!(
        service.list_tables().await,
        Err(Error::NoConnection)
    ));
}

#[tokio::test]
async fn test_empty_uri_remainder_is_rejected_as_directory() {
    let dir = TempDir::new().unwrap();
    let service = browser(&dir);

    // Resolves to the working directory, which cannot be opened as a database.
    let result = service.connect("sqlite:").await;
    assert!(!result.success);
    assert!(result.path.is_none());
    assert!(!service.session().is_open());
}

#[tokio::test]
async fn test_locked_database_times_out() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("locked.db");
    Connection::open(&path)
        .unwrap()
        .execute_batch("CREATE TABLE t (a INTEGER); INSERT INTO t VALUES (1);")
        .unwrap();

    let config = Config {
        data_dir: dir.path().join("app-data"),
        call_timeout_ms: 50,
        busy_timeout_ms: 2_000,
        ..Config::default()
    };
    let service = SqliteBrowser::new(&config);
    assert!(service.connect(path.to_str().unwrap()).await.success);

    let holder = Connection::open(&path).unwrap();
    holder.execute_batch("BEGIN EXCLUSIVE").unwrap();

    let err = service.get_table_data("t", None, None).await.unwrap_err();
    match err {
        Error::Timeout(limit) => assert_eq!(limit, Duration::from_millis(50)),
        other => panic!("expected Timeout, got {other:?}"),
    }

    // Releasing the lock lets the abandoned read finish.
    drop(holder);
}

#[tokio::test]
async fn test_create_sample_reports_connection_string() {
    let dir = TempDir::new().unwrap();
    let service = browser(&dir);

    let sample = service.create_sample().await.unwrap();
    let expected: PathBuf = dir.path().join("app-data").join("sample.db");
    assert_eq!(sample.path, expected);
    assert_eq!(
        sample.connection_string,
        format!("sqlite://{}", expected.display())
    );
    assert_eq!(service.data_dir(), dir.path().join("app-data"));

    let again = service.create_sample().await.unwrap();
    assert_eq!(again, sample);
}

#[tokio::test]
async fn test_ensure_sample_at_explicit_path() {
    let dir = TempDir::new().unwrap();
    let service = browser(&dir);
    let target = dir.path().join("elsewhere.db");

    let sample = service.ensure_sample(&target).await.unwrap();
    assert_eq!(sample.path, target);

    let result = service.connect(&sample.connection_string).await;
    assert!(result.success);
    let window = service.get_table_data("reviews", Some(1), None).await.unwrap();
    assert_eq!(window.total_rows, 40);
}

#[tokio::test]
async fn test_shutdown_closes_session() {
    let dir = TempDir::new().unwrap();
    let service = browser(&dir);
    assert!(service.connect("sample").await.success);
    assert!(service.session().is_open());

    service.shutdown().await;
    assert!(!service.session().is_open());
    service.shutdown().await;
}
