use std::time::Duration;

use shared::DEFAULT_PAGE_SIZE;

use crate::error::{Error, Result};

/// Runtime configuration, loaded from environment variables with defaults:
/// `BIND_ADDR` (0.0.0.0:3000), `DB_PATH` (data/tasks.db), `PAGE_SIZE` (10),
/// `QUERY_TIMEOUT_SECS` (10).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub db_path: String,
    pub page_size: u64,
    pub query_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let db_path = std::env::var("DB_PATH").unwrap_or_else(|_| "data/tasks.db".to_string());
        let page_size = parse_positive("PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let timeout_secs = parse_positive("QUERY_TIMEOUT_SECS", 10)?;

        Ok(Self {
            bind_addr,
            db_path,
            page_size,
            query_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_positive(name: &str, default: u64) -> Result<u64> {
    let raw = match std::env::var(name) {
        Ok(raw) => raw,
        Err(_) => return Ok(default),
    };
    let value: u64 = raw
        .parse()
        .map_err(|_| Error::InvalidArgument(format!("{name} must be an integer: {raw:?}")))?;
    if value < 1 {
        return Err(Error::InvalidArgument(format!(
            "{name} must be greater than 0"
        )));
    }
    Ok(value)
}
