use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::Parser;
use shadewalk_core::{RoutingEngine, ShadowCache, build_walk_graph, parse_wkt_geometries};
use shadewalk_server::{
    AppState, Config, ServerError, build_router, logging::init_tracing, postgis::PostGis,
};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(version, about = "Shade-aware pedestrian routing server")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "shadewalk.toml")]
    config: PathBuf,

    /// Port to listen on, overrides the configuration and `SERVPORT`
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    let mut config = Config::load(&cli.config)?;
    config.apply_env();
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let db = Arc::new(PostGis::connect(&config.database).await?);

    let rows = db.walkpath_wkt().await?;
    let graph_config = config.graph;
    let graph = tokio::task::spawn_blocking(move || {
        build_walk_graph(parse_wkt_geometries(&rows), &graph_config)
    })
    .await
    .map_err(|e| ServerError::Config(format!("graph build task failed: {e}")))??;

    let cache = ShadowCache::new(db.clone(), config.shade.cache_config());
    let engine = RoutingEngine::new(graph, cache, config.shade.policy()?)?;
    let state = AppState::new(engine, db);
    let app = build_router(state, &config.server);

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, frontend = %config.server.frontend_dir.display(), "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
