//! Runtime settings read from the environment (after `.env` is loaded by the binary).

use crate::error::ConfigError;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// `TraceLayer` emits its request spans and events at DEBUG.
pub const DEFAULT_LOG_FILTER: &str = "shop_api=info,tower_http=debug";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Clone, Debug)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub bind_addr: SocketAddr,
    pub cors_origins: Vec<String>,
    pub run_migrations: bool,
    pub log_filter: String,
}

#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    /// Full URL; takes precedence over the individual parts below.
    pub url: Option<String>,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub name: String,
    /// CA bundle for TLS verification. Ignored when the file does not exist.
    pub ssl_ca: Option<PathBuf>,
    pub max_connections: u32,
    pub max_lifetime: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = parse_or("DB_PORT", get("DB_PORT"), 5432u16)?;
        let max_connections = parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 10u32)?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_CONNECTIONS",
                reason: "must be at least 1".into(),
            });
        }
        let lifetime_secs = parse_or("DB_MAX_LIFETIME_SECS", get("DB_MAX_LIFETIME_SECS"), 1800u64)?;

        let database = DatabaseSettings {
            url: get("DATABASE_URL"),
            user: get("DB_USER").unwrap_or_default(),
            password: get("DB_PASSWORD").unwrap_or_default(),
            host: get("DB_HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port,
            name: get("DB_NAME").unwrap_or_else(|| "goodsun".into()),
            ssl_ca: get("SSL_CA").map(PathBuf::from),
            max_connections,
            max_lifetime: Duration::from_secs(lifetime_secs),
        };

        let bind_addr = parse_or("BIND_ADDR", get("BIND_ADDR"), SocketAddr::from(([0, 0, 0, 0], 8000)))?;
        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let run_migrations = match get("RUN_MIGRATIONS") {
            None => true,
            Some(v) => parse_bool("RUN_MIGRATIONS", &v)?,
        };

        Ok(Settings {
            database,
            bind_addr,
            cors_origins,
            run_migrations,
            log_filter: get("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
        })
    }
}

impl DatabaseSettings {
    /// Connection options from the URL, or from the individual parts when no URL is set.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        let opts = match &self.url {
            Some(url) => PgConnectOptions::from_str(url).map_err(|e| ConfigError::Invalid {
                var: "DATABASE_URL",
                reason: e.to_string(),
            })?,
            None => {
                let mut o = PgConnectOptions::new_without_pgpass()
                    .host(&self.host)
                    .port(self.port)
                    .database(&self.name);
                if !self.user.is_empty() {
                    o = o.username(&self.user);
                }
                if !self.password.is_empty() {
                    o = o.password(&self.password);
                }
                o.ssl_mode(PgSslMode::Prefer)
            }
        };
        Ok(match self.ca_file() {
            Some(ca) => opts.ssl_mode(PgSslMode::VerifyFull).ssl_root_cert(ca),
            None => opts,
        })
    }

    /// The CA file actually used, if configured and present on disk.
    pub fn ca_file(&self) -> Option<&PathBuf> {
        self.ssl_ca.as_ref().filter(|p| p.is_file())
    }

    /// Human-readable target with the password masked, for diagnostics.
    pub fn redacted_target(&self) -> String {
        match &self.url {
            Some(url) => redact_url(url),
            None => format!(
                "postgres://{}:***@{}:{}/{}",
                self.user, self.host, self.port, self.name
            ),
        }
    }
}

fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://").map(|i| i + 3) else {
        return url.to_string();
    };
    let rest = &url[scheme_end..];
    let authority_end = rest.find('/').unwrap_or(rest.len());
    let Some(at) = rest[..authority_end].rfind('@') else {
        return url.to_string();
    };
    let userinfo = &rest[..at];
    let user = userinfo.split(':').next().unwrap_or("");
    format!("{}{}:***{}", &url[..scheme_end], user, &rest[at..])
}

fn parse_or<T>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(v) => v.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: format!("'{}': {}", v, e),
        }),
    }
}

fn parse_bool(var: &'static str, v: &str) -> Result<bool, ConfigError> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            reason: format!("'{}' is not a boolean", v),
        }),
    }
}
