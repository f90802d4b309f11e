use std::net::SocketAddr;

use petstore_db::{DbManager, run_migrations};
use petstore_server::config::ServerConfig;
use petstore_server::{AppState, app, logging};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let mut config = ServerConfig::from_env()?;
    config.resolve_keys()?;
    config.validate()?;

    logging::init(&config.logging);

    let manager = DbManager::connect(&config.database).await?;
    let db = manager.client().clone();
    run_migrations(&db).await?;

    let seed = config.auth.seed_default_users;
    let state = AppState::new(db, config.auth);
    if seed {
        state.auth.seed_default_users().await?;
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Pet store listening");

    axum::serve(listener, app(state)).await?;
    Ok(())
}
