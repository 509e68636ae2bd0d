use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Environment variables that must be present and non-empty before a run is scheduled
pub const REQUIRED_ENV_VARS: [&str; 3] = ["FINNHUB_API_KEY", "TARGET_STOCKS", "TARGET_TABLE"];

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("No ticker symbols configured in TARGET_STOCKS")]
    NoSymbols,
}

/// Complete job configuration, built once by the entry point
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: QuoteApiConfig,
    pub symbols: Vec<String>,
    pub database: DatabaseConfig,
    pub target_table: String,
    /// Maximum in-flight quote requests (1 = sequential)
    pub fetch_concurrency: usize,
}

/// Quote endpoint configuration
#[derive(Clone)]
pub struct QuoteApiConfig {
    pub base_url: String,
    pub token: String,
    pub timeout_secs: u64,
}

/// PostgreSQL connection parameters
#[derive(Clone)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the individual parameters
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub pool_size: u32,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = get("FINNHUB_API_KEY").ok_or(ConfigError::Missing("FINNHUB_API_KEY"))?;
        let symbols =
            parse_symbols(&get("TARGET_STOCKS").ok_or(ConfigError::Missing("TARGET_STOCKS"))?);
        let target_table = get("TARGET_TABLE").unwrap_or_else(default_table);

        let config = Self {
            api: QuoteApiConfig {
                base_url: get("QUOTE_API_URL").unwrap_or_else(default_api_url),
                token,
                timeout_secs: parse_or(
                    "QUOTE_REQUEST_TIMEOUT_SECS",
                    get("QUOTE_REQUEST_TIMEOUT_SECS"),
                    default_timeout_secs(),
                )?,
            },
            symbols,
            database: DatabaseConfig {
                url: get("DATABASE_URL"),
                host: get("DB_HOST").unwrap_or_else(|| "postgres".to_string()),
                port: parse_or("DB_PORT", get("DB_PORT"), 5432)?,
                name: get("DB_NAME").unwrap_or_else(|| "airflow".to_string()),
                user: get("DB_USER").unwrap_or_else(|| "airflow".to_string()),
                password: get("DB_PASSWORD").unwrap_or_else(|| "airflow".to_string()),
                pool_size: parse_or(
                    "DB_POOL_MAX_SIZE",
                    get("DB_POOL_MAX_SIZE"),
                    default_pool_size(),
                )?,
            },
            target_table,
            fetch_concurrency: parse_or(
                "QUOTE_FETCH_CONCURRENCY",
                get("QUOTE_FETCH_CONCURRENCY"),
                default_concurrency(),
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the invariants a run depends on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.token.trim().is_empty() {
            return Err(ConfigError::Missing("FINNHUB_API_KEY"));
        }
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        if !is_valid_table_name(&self.target_table) {
            return Err(ConfigError::Invalid {
                key: "TARGET_TABLE",
                reason: format!("'{}' is not a valid SQL identifier", self.target_table),
            });
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "QUOTE_REQUEST_TIMEOUT_SECS",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.fetch_concurrency == 0 {
            return Err(ConfigError::Invalid {
                key: "QUOTE_FETCH_CONCURRENCY",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.database.pool_size == 0 {
            return Err(ConfigError::Invalid {
                key: "DB_POOL_MAX_SIZE",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl QuoteApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for QuoteApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl fmt::Debug for QuoteApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuoteApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl DatabaseConfig {
    /// Connection string handed to libpq
    ///
    /// Uses the keyword/value form so passwords need no URL encoding.
    pub fn connection_string(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }

        format!(
            "host={} port={} dbname={} user={} password={}",
            quote_conninfo(&self.host),
            self.port,
            quote_conninfo(&self.name),
            quote_conninfo(&self.user),
            quote_conninfo(&self.password),
        )
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "postgres".to_string(),
            port: 5432,
            name: "airflow".to_string(),
            user: "airflow".to_string(),
            password: "airflow".to_string(),
            pool_size: default_pool_size(),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("pool_size", &self.pool_size)
            .finish()
    }
}

/// Names of required variables that are unset or blank
pub fn missing_required_vars<F>(lookup: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    REQUIRED_ENV_VARS
        .iter()
        .copied()
        .filter(|key| lookup(key).map_or(true, |v| v.trim().is_empty()))
        .collect()
}

/// Split a comma-separated ticker list
///
/// Entries are trimmed and upper-cased, blanks dropped. Duplicates are kept.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .collect()
}

/// `name` or `schema.name`, each part a plain SQL identifier
pub fn is_valid_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() <= 2 && parts.iter().all(|part| is_identifier(part))
}

fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    part.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote_conninfo(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            reason: format!("cannot parse '{}'", raw),
        }),
        None => Ok(default),
    }
}

// Default value functions
fn default_api_url() -> String {
    "https://finnhub.io/api/v1/quote".to_string()
}

fn default_table() -> String {
    "stock_quotes".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_pool_size() -> u32 {
    2
}

fn default_concurrency() -> usize {
    4
}
