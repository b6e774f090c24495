use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::storage::DEFAULT_SESSION_TTL;

pub const DEFAULT_STYLE_PATH: &str = "config_excel.json";

/// Start-up settings, read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub style_config_path: PathBuf,
    pub log_level: tracing::Level,
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
    /// Idle time after which an upload session is dropped.
    pub session_ttl: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            style_config_path: PathBuf::from(DEFAULT_STYLE_PATH),
            log_level: tracing::Level::INFO,
            request_timeout: Duration::from_secs(60),
            max_upload_bytes: 50 * 1024 * 1024,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unset or blank variables keep their defaults; set but unreadable ones are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Ok(Self {
            host: value("HOST").unwrap_or(defaults.host),
            port: parsed(value("PORT"), "PORT")?.unwrap_or(defaults.port),
            style_config_path: value("STYLE_CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.style_config_path),
            log_level: parsed(value("LOG_LEVEL"), "LOG_LEVEL")?.unwrap_or(defaults.log_level),
            request_timeout: parsed::<u64>(value("REQUEST_TIMEOUT_SECS"), "REQUEST_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            max_upload_bytes: parsed::<usize>(value("MAX_UPLOAD_MB"), "MAX_UPLOAD_MB")?
                .map(|mb| mb * 1024 * 1024)
                .unwrap_or(defaults.max_upload_bytes),
            session_ttl: parsed::<u64>(value("SESSION_TTL_MINS"), "SESSION_TTL_MINS")?
                .map(|mins| Duration::from_secs(mins * 60))
                .unwrap_or(defaults.session_ttl),
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parsed<T>(raw: Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.map(|v| v.trim().parse::<T>())
        .transpose()
        .with_context(|| format!("{key} inválido"))
}
