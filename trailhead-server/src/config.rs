//! Configurazione del processo, letta dalle variabili d'ambiente.
//!
//! - `DATABASE_URL`: file SQLite o URL `sqlite://` (default `trailhead.db`)
//! - `BIND_ADDR`: indirizzo di ascolto (default `127.0.0.1:5555`)
//!
//! Il filtro dei log (`RUST_LOG`) è gestito da [`crate::logging`].

use anyhow::Context;
use std::net::SocketAddr;

use crate::build_sqlite_url;

pub const DEFAULT_DATABASE_URL: &str = "trailhead.db";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5555";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// URL SQLite già normalizzato da [`build_sqlite_url`].
    pub database_url: String,
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(
            std::env::var("DATABASE_URL").ok().as_deref(),
            std::env::var("BIND_ADDR").ok().as_deref(),
        )
    }

    fn from_vars(database_url: Option<&str>, bind_addr: Option<&str>) -> anyhow::Result<Self> {
        let raw_db = database_url.unwrap_or(DEFAULT_DATABASE_URL);
        let database_url = build_sqlite_url(raw_db).context("build sqlite DATABASE_URL")?;
        // converte la stringa bind in un SocketAddr
        let bind = bind_addr.unwrap_or(DEFAULT_BIND_ADDR);
        let bind_addr = bind
            .parse()
            .with_context(|| format!("parse BIND_ADDR {:?}", bind))?;
        Ok(Self { database_url, bind_addr })
    }
}
