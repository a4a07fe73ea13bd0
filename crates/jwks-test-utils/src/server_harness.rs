//! Test server harness for E2E testing
//!
//! Provides TestJwksServer for spawning real JWKS server instances in tests.

use jwks_service::config::Config;
use jwks_service::db;
use jwks_service::handlers::auth_handler::AppState;
use jwks_service::models::Jwks;
use jwks_service::routes;
use jwks_service::services::key_management_service::{self, BootstrappedKeys};
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Open a fresh, empty in-memory key store.
pub async fn test_pool() -> Result<SqlitePool, anyhow::Error> {
    db::connect("sqlite::memory:")
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open test database: {}", e))
}

/// Test harness for spawning the JWKS server in E2E tests
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_jwks_e2e() -> Result<(), anyhow::Error> {
///     let server = TestJwksServer::spawn().await?;
///     let response = reqwest::Client::new()
///         .get(format!("{}/.well-known/jwks.json", server.url()))
///         .send()
///         .await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestJwksServer {
    addr: SocketAddr,
    pool: SqlitePool,
    config: Config,
    keys: BootstrappedKeys,
    handle: JoinHandle<()>,
}

impl TestJwksServer {
    /// Spawn a server with default configuration and an in-memory key store
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with_config(Config::default()).await
    }

    /// Spawn a new test server instance with isolated database
    ///
    /// The server will:
    /// - Open a private in-memory SQLite key store
    /// - Bootstrap the valid and expired signing keys
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Start the HTTP server in the background
    pub async fn spawn_with_config(mut config: Config) -> Result<Self, anyhow::Error> {
        config.database_url = "sqlite::memory:".to_string();
        config.bind_address = "127.0.0.1:0".to_string();

        let pool = test_pool().await?;

        let keys = key_management_service::bootstrap_signing_keys(&pool, &config)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bootstrap signing keys: {}", e))?;

        let state = Arc::new(AppState {
            pool: pool.clone(),
            config: config.clone(),
        });

        // The global recorder can only be installed once per test process.
        // Later servers get a standalone recorder that is not installed.
        let metrics_handle = match routes::init_metrics_recorder() {
            Ok(handle) => handle,
            Err(_) => {
                use metrics_exporter_prometheus::PrometheusBuilder;
                let recorder = PrometheusBuilder::new().build_recorder();
                recorder.handle()
            }
        };

        // Build routes using jwks-service's real route builder
        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            pool,
            config,
            keys,
            handle,
        })
    }

    /// Get reference to the key store pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the base URL of the test server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get reference to the server configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Identifiers of the keys created at startup
    pub fn keys(&self) -> BootstrappedKeys {
        self.keys
    }

    /// POST /auth, optionally with `expired=true`, and return the token body
    pub async fn request_token(&self, expired: bool) -> Result<String, anyhow::Error> {
        let url = if expired {
            format!("{}/auth?expired=true", self.url())
        } else {
            format!("{}/auth", self.url())
        };

        let response = reqwest::Client::new().post(url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("Token request failed with status {}", response.status());
        }

        Ok(response.text().await?)
    }

    /// GET the published JWKS document
    pub async fn fetch_jwks(&self) -> Result<Jwks, anyhow::Error> {
        let response = reqwest::Client::new()
            .get(format!("{}/.well-known/jwks.json", self.url()))
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("JWKS request failed with status {}", response.status());
        }

        Ok(response.json().await?)
    }
}

impl Drop for TestJwksServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
