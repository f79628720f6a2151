use std::sync::Arc;

use movie_discovery_api::{
    config::Config,
    db::{create_pool, run_migrations, PgMovieStore},
    routes::{create_router, AppState},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movie_discovery_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    if config.run_migrations {
        run_migrations(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let state = AppState::new(Arc::new(PgMovieStore::new(pool)))
        .with_scoring(config.scoring())
        .with_page_defaults(config.page_defaults());

    let app = create_router(Arc::new(state));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
