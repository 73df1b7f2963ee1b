//! Application configuration
//!
//! Everything comes from environment variables, with `.env` loaded first when
//! present. Optional variables fall back to defaults; a variable that is set
//! but does not parse is an error rather than a silent default.

use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
    pub import: ImportConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "staging" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Token lifetimes are in seconds
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst: u32,
}

#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SnowflakeConfig {
    pub worker_id: u16,
}

/// Limits for the listing importer's outbound fetches
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub timeout_secs: u64,
    pub max_body_bytes: usize,
    pub max_items: usize,
    pub user_agent: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            max_body_bytes: 5 * 1024 * 1024,
            max_items: 20,
            user_agent: "MartImporter/1.0 (+https://mart.az)".to_string(),
        }
    }
}

const DEFAULT_APP_NAME: &str = "mart";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a set variable
    /// cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let import_defaults = ImportConfig::default();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| DEFAULT_APP_NAME.to_string()),
                env: parse_or("APP_ENV", Environment::default())?,
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
                port: parse_or("API_PORT", DEFAULT_PORT)?,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 20)?,
                min_connections: parse_or("DATABASE_MIN_CONNECTIONS", 2)?,
            },
            jwt: JwtConfig {
                secret: required("JWT_SECRET")?,
                access_token_expiry: parse_or("JWT_ACCESS_TOKEN_EXPIRY", 900)?,
                refresh_token_expiry: parse_or("JWT_REFRESH_TOKEN_EXPIRY", 604_800)?,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: parse_or("RATE_LIMIT_REQUESTS_PER_SECOND", 10)?,
                burst: parse_or("RATE_LIMIT_BURST", 50)?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .map(|s| split_list(&s))
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig {
                worker_id: parse_or("WORKER_ID", 0)?,
            },
            import: ImportConfig {
                timeout_secs: parse_or("IMPORT_TIMEOUT_SECS", import_defaults.timeout_secs)?,
                max_body_bytes: parse_or("IMPORT_MAX_BODY_BYTES", import_defaults.max_body_bytes)?,
                max_items: parse_or("IMPORT_MAX_ITEMS", import_defaults.max_items)?,
                user_agent: env::var("IMPORT_USER_AGENT").unwrap_or(import_defaults.user_agent),
            },
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

fn parse_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        _ => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
