use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::{AuthScheme, Credentials};
use crate::bestbets::DEFAULT_BEST_BETS_URL;
use crate::error::ApiError;
use crate::http::client::GraphApiClient;
use crate::http::mock::MockTransport;
use crate::pinned::DEFAULT_GATEWAY_URL;
use crate::storage::{CredentialStore, JsonFileStore, SQLITE_FILE, SqliteStore};

const DEFAULT_DATA_DIR: &str = ".pinman";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnvironment {
    Development,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Json,
    Sqlite,
}

/// Console configuration read from `PINMAN_*` environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: RunEnvironment,
    pub data_dir: PathBuf,
    pub store: StoreBackend,
    /// Signing scheme for every request. Basic unless explicitly switched.
    pub auth_scheme: AuthScheme,
    /// Serve canned demo data instead of calling the service.
    pub use_mock_data: bool,
    pub best_bets_url: String,
    /// Used when stored credentials carry no endpoint of their own.
    pub gateway_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: RunEnvironment::Production,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            store: StoreBackend::Json,
            auth_scheme: AuthScheme::Basic,
            use_mock_data: false,
            best_bets_url: DEFAULT_BEST_BETS_URL.to_string(),
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Build the config from environment variables.
    ///
    /// Recognized env vars (all optional):
    /// - `PINMAN_ENV`: `development` or `production`
    /// - `PINMAN_DATA_DIR`
    /// - `PINMAN_STORE`: `json` or `sqlite`
    /// - `PINMAN_AUTH_SCHEME`: `basic` or `hmac`
    /// - `PINMAN_MOCK_DATA`
    /// - `PINMAN_BESTBETS_URL`
    /// - `PINMAN_GATEWAY_URL`
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (useful for testing).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = get("PINMAN_ENV") {
            config.environment = match value.to_ascii_lowercase().as_str() {
                "development" | "dev" => RunEnvironment::Development,
                "production" | "prod" => RunEnvironment::Production,
                other => {
                    return Err(ApiError::Config(format!(
                        "PINMAN_ENV must be `development` or `production`, got `{other}`"
                    )));
                }
            };
        }
        if let Some(value) = get("PINMAN_DATA_DIR") {
            config.data_dir = PathBuf::from(value);
        }
        if let Some(value) = get("PINMAN_STORE") {
            config.store = match value.to_ascii_lowercase().as_str() {
                "json" => StoreBackend::Json,
                "sqlite" => StoreBackend::Sqlite,
                other => {
                    return Err(ApiError::Config(format!(
                        "PINMAN_STORE must be `json` or `sqlite`, got `{other}`"
                    )));
                }
            };
        }
        if let Some(value) = get("PINMAN_AUTH_SCHEME") {
            config.auth_scheme = value.parse()?;
        }
        if let Some(value) = get("PINMAN_MOCK_DATA") {
            config.use_mock_data = parse_flag("PINMAN_MOCK_DATA", &value)?;
        }
        if let Some(value) = get("PINMAN_BESTBETS_URL") {
            config.best_bets_url = value;
        }
        if let Some(value) = get("PINMAN_GATEWAY_URL") {
            config.gateway_url = value;
        }

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == RunEnvironment::Development
    }

    /// Default `tracing` filter. Development makes request/response lines
    /// visible.
    pub fn default_log_filter(&self) -> &'static str {
        match self.environment {
            RunEnvironment::Development => "pinman=debug",
            RunEnvironment::Production => "pinman=info",
        }
    }

    /// A client for `base_url` signed with the configured scheme, backed by
    /// demo data when mock mode is on.
    pub fn client(&self, base_url: &str, credentials: Credentials) -> GraphApiClient {
        let client = GraphApiClient::new(base_url, credentials).with_scheme(self.auth_scheme);
        if self.use_mock_data {
            client.with_transport(Arc::new(MockTransport))
        } else {
            client
        }
    }

    pub fn open_store(&self) -> Result<Arc<dyn CredentialStore>, ApiError> {
        match self.store {
            StoreBackend::Json => Ok(Arc::new(JsonFileStore::new(&self.data_dir))),
            StoreBackend::Sqlite => {
                std::fs::create_dir_all(&self.data_dir).map_err(|e| {
                    ApiError::Storage(format!(
                        "Failed to create data directory `{}`: {e}",
                        self.data_dir.display()
                    ))
                })?;
                let path = self.data_dir.join(SQLITE_FILE);
                Ok(Arc::new(SqliteStore::open(&path)?))
            }
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ApiError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ApiError::Config(format!(
            "{key} must be a boolean, got `{other}`"
        ))),
    }
}
