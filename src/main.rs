//! Blog widgets server

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blog_widgets::{
    api::{self, AppState},
    cache::create_cache,
    config::Config,
    db::{
        self,
        repositories::{
            SqlxCategoryRepository, SqlxCommentRepository, SqlxPostRepository,
            SqlxTagRepository,
        },
    },
    theme::ThemeEngine,
    widgets::WidgetController,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_widgets=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting blog widgets...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    let applied = db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed ({} applied)", applied);

    let cache = create_cache(&config.cache);

    let theme = ThemeEngine::new(&config.theme.path, &config.theme.active)?;
    tracing::info!(
        "Theme engine initialized: {} ({} overrides)",
        theme.current_theme(),
        theme.overrides().len()
    );

    let controller = WidgetController::new(
        SqlxCategoryRepository::boxed(pool.clone()),
        SqlxTagRepository::boxed(pool.clone()),
        SqlxPostRepository::boxed(pool.clone()),
        SqlxCommentRepository::boxed(pool.clone()),
        Arc::new(theme),
        config.widgets.clone(),
        config.site.clone(),
    );

    let state = AppState::new(pool.clone(), Arc::new(controller), cache);
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
