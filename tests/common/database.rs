//! Test application and database fixtures
//!
//! Every [`TestApp`] gets its own in-memory SQLite database and a temporary
//! upload directory, so tests never share state.

use axum_test::TestServer;
use love_letters::backend::server::config::{load_database, AppConfig, AppConfigBuilder};
use love_letters::backend::server::create_app;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789";

/// Development defaults with a cheap bcrypt cost
pub fn test_config() -> AppConfigBuilder {
    AppConfig::builder(TEST_JWT_SECRET)
        .database_url("sqlite::memory:")
        .bcrypt_cost(4)
        .public_base_url("http://letters.test")
}

/// Create a migrated in-memory database
pub async fn create_test_pool() -> SqlitePool {
    load_database("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

pub struct TestApp {
    pub server: TestServer,
    pub pool: SqlitePool,
    pub config: AppConfig,
    pub uploads: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(builder: AppConfigBuilder) -> Self {
        let uploads = TempDir::new().expect("Failed to create upload directory");
        let config = builder.upload_dir(uploads.path()).build();
        let pool = create_test_pool().await;

        let app = create_app(config.clone(), pool.clone());
        let server = TestServer::new(app).expect("Failed to start test server");

        Self {
            server,
            pool,
            config,
            uploads,
        }
    }

    /// Names of the files currently in the upload directory
    pub fn stored_uploads(&self) -> Vec<String> {
        std::fs::read_dir(self.uploads.path())
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .map(|entry| entry.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default()
    }
}
