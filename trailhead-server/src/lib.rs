use anyhow::Context;
use axum::http::StatusCode;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}

// Dato un percorso di file, restituisce un URL SQLite valido. Crea le directory genitrici se non esistono.
pub fn sqlite_url_for_path(p: &Path) -> anyhow::Result<String> {
    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };
    if let Some(parent) = abs.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent dirs for {:?}", parent))?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&abs)
        .with_context(|| format!("create/open sqlite file {:?}", abs))?;
    let s = abs.to_string_lossy().replace('\\', "/");
    Ok(format!("sqlite://{}", s))
}

/// Normalizza un DATABASE_URL grezzo: percorso di file o URL `sqlite://`.
/// `sqlite::memory:` passa invariato.
pub fn build_sqlite_url(raw: &str) -> anyhow::Result<String> {
    if raw == "sqlite::memory:" {
        return Ok(raw.to_string());
    }
    // Rimuovi il prefisso "sqlite://" se presente, per ottenere il percorso del file.
    let path_part = if raw.starts_with("sqlite:") {
        raw.trim_start_matches("sqlite:")
            .trim_start_matches("//")
            .to_string()
    } else {
        raw.to_string()
    };
    sqlite_url_for_path(&PathBuf::from(path_part))
}

// Connect to the database and return a connection pool.
pub async fn connect_pool(db_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(db_url)
        .with_context(|| format!("parse sqlite url {}", db_url))?
        .create_if_missing(true)
        // le FK valgono per connessione, non per database
        .foreign_keys(true);
    // ogni connessione a :memory: è un database diverso
    let max_connections = if db_url.contains(":memory:") { 1 } else { 5 };
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("connect to sqlite via {}", db_url))?;
    Ok(pool)
}

// Esegue le migrazioni del database. Crea le tabelle se non esistono.
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    let stmts = [
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            username   TEXT NOT NULL UNIQUE,
            password   TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT
        );"#,
        r#"
        CREATE TABLE IF NOT EXISTS national_parks (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            name       TEXT NOT NULL,
            state      TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT
        );"#,
        r#"
        CREATE TABLE IF NOT EXISTS user_visited_park (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            date_of_visit TEXT,
            user_id       INTEGER,
            park_id       INTEGER,
            FOREIGN KEY(user_id) REFERENCES users(id),
            FOREIGN KEY(park_id) REFERENCES national_parks(id)
        );"#,
    ];
    // applica ogni statement di migrazione
    for s in &stmts {
        sqlx::query(s)
            .execute(pool)
            .await
            .with_context(|| format!("apply migration: {}", s.trim().lines().next().unwrap_or_default()))?;
    }
    Ok(())
}

pub mod config;
pub mod controllers;
pub mod error;
pub mod logging;
pub mod routes;
pub mod store;

/// Controlla lo stato di salute del database tentando di acquisire una connessione dal pool.
pub async fn health_with_pool(pool: &SqlitePool) -> StatusCode {
    match pool.acquire().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
