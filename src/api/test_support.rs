//! In-process server for HTTP tests

use axum_test::TestServer;
use tempfile::TempDir;

use crate::config::{Config, UploadConfig};
use crate::db::{create_test_pool, migrations};

pub(crate) struct TestApp {
    pub server: TestServer,
    _uploads: TempDir,
}

impl TestApp {
    /// Fresh in-memory database and a temporary upload directory
    pub async fn new() -> Self {
        let uploads = TempDir::new().expect("Failed to create upload dir");
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let config = Config {
            upload: UploadConfig {
                path: uploads.path().to_path_buf(),
                ..UploadConfig::default()
            },
            ..Config::default()
        };

        let state = super::build_state(pool, &config);
        let router = super::build_router(state, &config);

        Self {
            server: TestServer::new(router).expect("Failed to start test server"),
            _uploads: uploads,
        }
    }
}
