/**
 * Server Configuration
 *
 * This module handles loading and validation of server configuration and
 * the SQLite database connection.
 *
 * # Configuration Sources
 *
 * Configuration is read once at startup from environment variables (after
 * `dotenv` has loaded a `.env` file, see `main.rs`). The resulting
 * [`AppConfig`] is shared with handlers through `AppState` as an
 * `Arc<AppConfig>`; nothing reads the environment after startup.
 *
 * # Error Handling
 *
 * Unlike optional integrations, the JWT secret and the bcrypt cost are
 * required. A missing or malformed value produces a [`ConfigError`] and the
 * server refuses to start. Spotify is optional: without all three
 * credentials the Spotify routes answer 503.
 */

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://love_letters.db?mode=rwc";
pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_JWT_EXPIRES_IN: &str = "7d";
pub const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 100;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_SPOTIFY_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

const MIN_JWT_SECRET_LEN: usize = 16;
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

/// Errors raised while loading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

/// Spotify application credentials and endpoints
#[derive(Clone, PartialEq, Eq)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Base of the accounts service (`/authorize`, `/api/token`)
    pub accounts_url: String,
    /// Base of the Web API (`/search`, `/tracks/{id}`, `/me`)
    pub api_url: String,
}

impl std::fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("accounts_url", &self.accounts_url)
            .field("api_url", &self.api_url)
            .finish()
    }
}

/// Process-wide configuration
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub bcrypt_cost: u32,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window: Duration,
    /// Fixed public origin for upload URLs; falls back to the Host header
    pub public_base_url: Option<String>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub spotify: Option<SpotifyConfig>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_ttl", &self.jwt_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .field("rate_limit_requests", &self.rate_limit_requests)
            .field("rate_limit_window", &self.rate_limit_window)
            .field("public_base_url", &self.public_base_url)
            .field("upload_dir", &self.upload_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("spotify", &self.spotify)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.chars().count() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::invalid(
                "JWT_SECRET",
                format!("must be at least {} characters", MIN_JWT_SECRET_LEN),
            ));
        }

        let jwt_ttl = parse_duration(
            &get("JWT_EXPIRES_IN").unwrap_or_else(|| DEFAULT_JWT_EXPIRES_IN.to_string()),
        )
        .map_err(|reason| ConfigError::invalid("JWT_EXPIRES_IN", reason))?;

        let bcrypt_cost = get("BCRYPT_SALT_ROUNDS").ok_or(ConfigError::Missing("BCRYPT_SALT_ROUNDS"))?;
        let bcrypt_cost = parse_number::<u32>("BCRYPT_SALT_ROUNDS", &bcrypt_cost)?;
        validate_bcrypt_cost(bcrypt_cost)?;

        let port = get("PORT")
            .map(|v| parse_number::<u16>("PORT", &v))
            .transpose()?
            .unwrap_or(DEFAULT_PORT);

        let cors_origins = get("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|origin| origin.trim().trim_end_matches('/').to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_CORS_ORIGIN.to_string()]);

        let rate_limit_requests = get("RATE_LIMIT_REQUESTS")
            .map(|v| parse_number::<u32>("RATE_LIMIT_REQUESTS", &v))
            .transpose()?
            .unwrap_or(DEFAULT_RATE_LIMIT_REQUESTS);
        if rate_limit_requests == 0 {
            return Err(ConfigError::invalid("RATE_LIMIT_REQUESTS", "must be greater than zero"));
        }

        let rate_limit_window_secs = get("RATE_LIMIT_WINDOW_SECS")
            .map(|v| parse_number::<u64>("RATE_LIMIT_WINDOW_SECS", &v))
            .transpose()?
            .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS);
        if rate_limit_window_secs == 0 {
            return Err(ConfigError::invalid("RATE_LIMIT_WINDOW_SECS", "must be greater than zero"));
        }

        let max_upload_bytes = get("MAX_UPLOAD_BYTES")
            .map(|v| parse_number::<usize>("MAX_UPLOAD_BYTES", &v))
            .transpose()?
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let spotify = match (
            get("SPOTIFY_CLIENT_ID"),
            get("SPOTIFY_CLIENT_SECRET"),
            get("SPOTIFY_REDIRECT_URI"),
        ) {
            (Some(client_id), Some(client_secret), Some(redirect_uri)) => Some(SpotifyConfig {
                client_id,
                client_secret,
                redirect_uri,
                accounts_url: get("SPOTIFY_ACCOUNTS_URL")
                    .unwrap_or_else(|| DEFAULT_SPOTIFY_ACCOUNTS_URL.to_string()),
                api_url: get("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_SPOTIFY_API_URL.to_string()),
            }),
            (None, None, None) => None,
            _ => {
                tracing::warn!(
                    "Spotify credentials are only partially configured. Spotify routes will be disabled."
                );
                None
            }
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
            jwt_ttl,
            bcrypt_cost,
            port,
            cors_origins,
            rate_limit_requests,
            rate_limit_window: Duration::from_secs(rate_limit_window_secs),
            public_base_url: get("PUBLIC_BASE_URL").map(|url| url.trim_end_matches('/').to_string()),
            upload_dir: PathBuf::from(get("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string())),
            max_upload_bytes,
            spotify,
        })
    }

    /// Start a builder with development defaults, used by tests
    pub fn builder(jwt_secret: impl Into<String>) -> AppConfigBuilder {
        AppConfigBuilder {
            config: AppConfig {
                database_url: "sqlite::memory:".to_string(),
                jwt_secret: jwt_secret.into(),
                jwt_ttl: Duration::from_secs(7 * 24 * 60 * 60),
                bcrypt_cost: bcrypt::DEFAULT_COST,
                port: DEFAULT_PORT,
                cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
                rate_limit_requests: DEFAULT_RATE_LIMIT_REQUESTS,
                rate_limit_window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECS),
                public_base_url: None,
                upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
                spotify: None,
            },
        }
    }
}

/// Builder for [`AppConfig`]
#[derive(Debug, Clone)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = url.into();
        self
    }

    pub fn jwt_ttl(mut self, ttl: Duration) -> Self {
        self.config.jwt_ttl = ttl;
        self
    }

    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.config.bcrypt_cost = cost;
        self
    }

    pub fn cors_origins(mut self, origins: Vec<String>) -> Self {
        self.config.cors_origins = origins;
        self
    }

    pub fn rate_limit(mut self, requests: u32, window: Duration) -> Self {
        self.config.rate_limit_requests = requests;
        self.config.rate_limit_window = window;
        self
    }

    pub fn public_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.public_base_url = Some(url.into());
        self
    }

    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.upload_dir = dir.into();
        self
    }

    pub fn max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.max_upload_bytes = bytes;
        self
    }

    pub fn spotify(mut self, spotify: SpotifyConfig) -> Self {
        self.config.spotify = Some(spotify);
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

/// Parse a duration such as `30s`, `15m`, `12h`, `7d`, or a bare number of seconds
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    let (digits, multiplier) = match input.char_indices().last() {
        Some((idx, 's')) => (&input[..idx], 1),
        Some((idx, 'm')) => (&input[..idx], 60),
        Some((idx, 'h')) => (&input[..idx], 60 * 60),
        Some((idx, 'd')) => (&input[..idx], 24 * 60 * 60),
        Some(_) => (input, 1),
        None => return Err("duration is empty".to_string()),
    };

    let amount: u64 = digits
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a duration like 30s, 15m, 12h or 7d", input))?;

    if amount == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    amount
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("'{}' is too large", input))
}

fn parse_number<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .parse::<T>()
        .map_err(|_| ConfigError::invalid(name, format!("'{}' is not a valid number", value)))
}

fn validate_bcrypt_cost(cost: u32) -> Result<(), ConfigError> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(ConfigError::invalid(
            "BCRYPT_SALT_ROUNDS",
            format!("must be between {} and {}", MIN_BCRYPT_COST, MAX_BCRYPT_COST),
        ));
    }
    Ok(())
}

/// Connect to SQLite and apply migrations
///
/// Foreign keys are switched on for every connection so that deleting a
/// user cascades to their letters. In-memory URLs get a single, never
/// recycled connection, otherwise each pooled connection would see its own
/// empty database.
pub async fn load_database(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    tracing::info!("Connecting to database...");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?
    };

    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    sqlx::migrate!().run(&pool).await.map_err(|e| {
        tracing::error!("Failed to run database migrations: {}", e);
        sqlx::Error::from(e)
    })?;
    tracing::info!("Database migrations completed successfully");

    Ok(pool)
}
