use std::net::SocketAddr;

use tracing::{Level, info};

use recipe_server::config::AppConfig;
use recipe_server::database::init_db;
use recipe_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;
    let db = init_db(&config.database).await?;
    tokio::fs::create_dir_all(&config.media.root).await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState { db, config };
    let app = recipe_server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
