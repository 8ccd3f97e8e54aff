mod auth;
mod config;
mod db;
mod errors;
mod interview;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::interview::pipeline::InterviewPipeline;
use crate::interview::session::SessionRegistry;
use crate::llm_client::GeminiClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MemoryRecordStore, PgRecordStore, RecordStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the document store
    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            ensure_schema(&pool).await?;
            Arc::new(PgRecordStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; interviews are kept in memory and lost on restart");
            Arc::new(MemoryRecordStore::new())
        }
    };

    // Initialize generation client. A missing key is reported per save, not here.
    let llm = GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())
        .with_base_url(config.gemini_api_base.clone());
    if llm.is_configured() {
        info!("Generation client initialized (model: {})", llm.model());
    } else {
        warn!("GEMINI_API_KEY not set; every save will fail with a configuration error");
    }

    let state = AppState {
        store: store.clone(),
        pipeline: Arc::new(InterviewPipeline::new(Arc::new(llm), store)),
        sessions: Arc::new(SessionRegistry::new()),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the frontend origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
