use std::sync::Arc;

use bookmatch_api::api::{create_router, AppState};
use bookmatch_api::config::Config;
use bookmatch_api::db;
use bookmatch_api::services::providers::{
    gemini::GeminiClient, google_books::GoogleBooksProvider, open_library::OpenLibraryProvider,
    CatalogProvider, TextGenerator,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    // Signal persistence
    let pool = db::create_pool(&config.database_url).await?;
    let store = Arc::new(db::PostgresStore::new(pool));

    // Catalog lookups go through the Redis-backed cache
    let redis_client = db::create_redis_client(&config.redis_url)?;
    let (cache, _cache_writer) = db::Cache::new(redis_client).await;
    let catalog: Arc<dyn CatalogProvider> = match config.catalog_provider.as_str() {
        "open_library" => Arc::new(OpenLibraryProvider::new(
            cache,
            config.open_library_api_url.clone(),
        )),
        _ => Arc::new(GoogleBooksProvider::new(cache, config.catalog_api_url.clone())),
    };
    tracing::info!(provider = %catalog.name(), "Catalog provider selected");

    // No credential is a first-class state: the engine falls back to
    // deterministic synthesis for every request
    let generator: Option<Arc<dyn TextGenerator>> = match &config.gemini_api_key {
        Some(key) => Some(Arc::new(GeminiClient::new(
            key.clone(),
            config.gemini_api_url.clone(),
        ))),
        None => {
            tracing::warn!("GEMINI_API_KEY not set; recommendations use deterministic synthesis");
            None
        }
    };

    let state = AppState::new(store, catalog, generator);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
