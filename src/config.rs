use std::{env, time::Duration};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub sale: SaleConfig,
    pub seed_defaults: bool,
}

/// Policy knobs for the sale recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaleConfig {
    /// Drop structurally invalid lines instead of rejecting the whole sale.
    pub skip_invalid_lines: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://pos.db".to_string());
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);
        Ok(Self {
            port,
            database_url,
            host,
            db_max_connections,
            sale: SaleConfig {
                skip_invalid_lines: env_flag("POS_SKIP_INVALID_LINES", false),
            },
            seed_defaults: env_flag("POS_SEED_DEFAULTS", true),
        })
    }
}

/// Settings for a register session talking to the sale recorder over HTTP.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    /// Total attempts per request, including the first one.
    pub max_attempts: u32,
    pub retry_backoff: Duration,
    pub require_customer_name: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            request_timeout: Duration::from_secs(10),
            max_attempts: 3,
            retry_backoff: Duration::from_millis(200),
            require_customer_name: false,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let base_url = env::var("POS_API_URL").unwrap_or(defaults.base_url);
        let request_timeout = env::var("POS_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);
        let max_attempts = env::var("POS_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.max_attempts);
        Self {
            base_url,
            request_timeout,
            max_attempts,
            retry_backoff: defaults.retry_backoff,
            require_customer_name: env_flag("POS_REQUIRE_CUSTOMER_NAME", false),
        }
    }
}

fn env_flag(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}
