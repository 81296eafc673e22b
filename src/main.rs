//! HTTP server binary. Reads `.env`, migrates the schema and serves the API.

use shop_api::{
    app, apply_migrations, connect, ensure_database_exists, init_tracing, schema, AppState, Catalog, Settings,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;
    init_tracing(&settings.log_filter)?;

    schema::validate(&Catalog::standard())?;

    tracing::info!(target = %settings.database.redacted_target(), "connecting to database");
    if settings.run_migrations {
        ensure_database_exists(&settings.database.connect_options()?).await?;
    }
    let pool = connect(&settings.database).await?;

    if settings.run_migrations {
        let applied = apply_migrations(&pool).await?;
        tracing::info!(?applied, "migrations up to date");
    }

    let router = app(AppState::new(pool.clone()), &settings.cors_origins);
    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
