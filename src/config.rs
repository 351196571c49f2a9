use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use axum::http::HeaderValue;

pub const DEFAULT_ANALYZER_URL: &str = "http://localhost:8000/predict";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` wires the in-memory user store.
    pub database: Option<DatabaseConfig>,
    /// `None` disables cache invalidation.
    pub redis_url: Option<String>,
    pub analyzer: AnalyzerConfig,
    pub cors_allowed_origin: HeaderValue,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let port = match var("APP_PORT") {
            Some(v) => v.parse::<u16>().with_context(|| format!("APP_PORT={}", v))?,
            None => 8080,
        };

        let database = non_empty("DATABASE_URL").map(|url| DatabaseConfig {
            url,
            max_connections: var("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
        });

        let analyzer = AnalyzerConfig {
            url: non_empty("ANALYZER_URL").unwrap_or_else(|| DEFAULT_ANALYZER_URL.into()),
            timeout: Duration::from_secs(
                var("ANALYZER_TIMEOUT_SECS")
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(30),
            ),
        };

        let origin = var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.into());
        let cors_allowed_origin = HeaderValue::from_str(&origin)
            .with_context(|| format!("CORS_ALLOWED_ORIGIN={}", origin))?;

        Ok(Self {
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            database,
            redis_url: non_empty("REDIS_URL"),
            analyzer,
            cors_allowed_origin,
        })
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
