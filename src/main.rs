use tower_http::trace::TraceLayer;

use filmgraph::{
    api::{create_router, AppState},
    config::Config,
    db,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,filmgraph=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Config::from_env()?;

    let state = match config.storage_backend.as_str() {
        "memory" => AppState::in_memory(),
        "postgres" => {
            let pool = db::connect_and_migrate(&config.database_url).await?;
            AppState::postgres(pool)
        }
        other => anyhow::bail!("unknown storage backend '{}', expected 'memory' or 'postgres'", other),
    };
    tracing::info!(backend = %config.storage_backend, "storage backend selected");

    let app = create_router(state).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
