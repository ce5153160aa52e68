use std::{net::SocketAddr, str::FromStr};

use anyhow::Context;

pub struct Config {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("missing DATABASE_URL")?;

        Ok(Self {
            database_url,
            listen_addr: load_or("LISTEN_ADDR", "0.0.0.0:8000")?,
            max_connections: load_or("DATABASE_MAX_CONNECTIONS", "20")?,
        })
    }
}

fn load_or<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = std::env::var(key).unwrap_or_else(|_| {
        tracing::info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse()
        .with_context(|| format!("invalid {key} value: {raw:?}"))
}
