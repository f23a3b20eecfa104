use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::scheduling::slots::MAX_INTERVAL_MINUTES;
use crate::scheduling::RetryPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: Option<RedisConfig>,
    pub booking: BookingConfig,
    pub app: AppConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

/// Notification queue location. Without it events are only logged.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub queue: String,
}

impl RedisConfig {
    /// `None` when `REDIS_URL` is unset.
    pub fn from_env() -> Option<Self> {
        let url = env::var("REDIS_URL").ok()?;
        let queue = env::var("NOTIFICATIONS_QUEUE").unwrap_or_else(|_| "notifications".to_string());
        Some(Self { url, queue })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    pub max_attempts: u32,
    pub retry_backoff_ms: u64,
    pub slot_interval_minutes: i64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff_ms: 30,
            slot_interval_minutes: 15,
        }
    }
}

impl BookingConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff_step: Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub environment: Environment,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Reads `key`, falling back to `default` when unset.
fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(val) => val
            .parse()
            .with_context(|| format!("Failed to parse {key}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Server configuration
        let host = env::var("SERVER_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string())
            .parse::<IpAddr>()
            .context("Failed to parse SERVER_HOST")?;
        let port = parse_or("SERVER_PORT", 8000_u16)?;

        // Database configuration
        let db_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let db_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 10_u32)?;
        let db_min_connections = parse_or("DATABASE_MIN_CONNECTIONS", 1_u32)?;

        // Notification queue (optional)
        let redis = RedisConfig::from_env();

        // Booking behaviour
        let defaults = BookingConfig::default();
        let booking = BookingConfig {
            max_attempts: parse_or("BOOKING_MAX_ATTEMPTS", defaults.max_attempts)?,
            retry_backoff_ms: parse_or("BOOKING_RETRY_BACKOFF_MS", defaults.retry_backoff_ms)?,
            slot_interval_minutes: parse_or("SLOT_INTERVAL_MINUTES", defaults.slot_interval_minutes)?,
        };
        if booking.max_attempts == 0 {
            anyhow::bail!("BOOKING_MAX_ATTEMPTS must be at least 1");
        }
        if !(1..=MAX_INTERVAL_MINUTES).contains(&booking.slot_interval_minutes) {
            anyhow::bail!("SLOT_INTERVAL_MINUTES must be between 1 and {MAX_INTERVAL_MINUTES}");
        }

        // App configuration
        let environment = env::var("APP_ENVIRONMENT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();
        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "Scheduling API".to_string());

        Ok(Config {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: db_url,
                max_connections: Some(db_max_connections),
                min_connections: Some(db_min_connections),
            },
            redis,
            booking,
            app: AppConfig {
                name: app_name,
                environment,
            },
        })
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Environment::Production),
            "staging" => Ok(Environment::Staging),
            "development" => Ok(Environment::Development),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}
