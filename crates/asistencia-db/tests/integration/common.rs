use asistencia_db::{Database, DatabaseConfig};
use tempfile::TempDir;

/// Create a migrated scratch database backed by a temp file. The TempDir
/// must be kept alive for the duration of the test.
pub async fn setup_test_db() -> (Database, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let config = DatabaseConfig {
        url: format!("sqlite://{}", tmp.path().join("test.db").display()),
        max_connections: 5,
    };

    let db = Database::connect(&config)
        .await
        .expect("Failed to connect to test database");
    db.migrate().await.expect("Failed to run migrations");

    (db, tmp)
}
