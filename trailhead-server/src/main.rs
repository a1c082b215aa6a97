use std::sync::Arc;
use anyhow::Context;

// ri-utilizziamo le funzioni e strutture definite in lib.rs
use trailhead_server::{config::ServerConfig, connect_pool, logging, routes, run_migrations, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();
    // DATABASE_URL e BIND_ADDR dall'ambiente, con i default
    let config = ServerConfig::from_env().context("load configuration")?;
    tracing::info!(database_url = %config.database_url, "using database");
    // Connetti al database
    let pool = connect_pool(&config.database_url).await.context("connect to sqlite")?;
    // Esegui le migrazioni del database
    run_migrations(&pool).await.context("run migrations")?;
    // Crea lo stato dell'applicazione condiviso
    let state = Arc::new(AppState { pool });
    let app = routes::router(state);
    // Crea il listener TCP e lo lega all'indirizzo configurato
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .context("bind tcp listener")?;
    tracing::info!("listening on http://{}", config.bind_addr);
    // Avvia il server Axum
    axum::serve(listener, app.into_make_service())
        .await
        .context("server shutdown")?;

    Ok(())
}
