use fund_query_router::{
    api::{start_server, ApiOptions},
    config::RouterConfig,
    dispatcher::Dispatcher,
    knowledge::KnowledgeContext,
    responses::OpenAiResponsesClient,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = RouterConfig::from_env()?;
    let api_key = config.require_api_key()?.to_string();

    info!("Fund Query Router - API Server");
    info!("Address: {}", config.bind_address());
    info!("Model: {}", config.model);
    info!("Routing mode: {}", config.routing_mode);

    // Knowledge is loaded once and never reloaded
    let knowledge = KnowledgeContext::load(
        &config.returns_path,
        &config.metadata_path,
        config.vector_store_id.clone(),
    )
    .await;

    if !knowledge.is_fully_configured() {
        warn!("Vector store or returns data not configured; affected questions will be rejected");
    }

    let backend = Arc::new(OpenAiResponsesClient::new(api_key, &config.openai_base_url)?);

    let dispatcher = Arc::new(
        Dispatcher::new(backend, Arc::new(knowledge), config.strategy_settings())
            .with_mode(config.routing_mode),
    );

    info!("Dispatcher initialized");

    let options = ApiOptions {
        request_timeout: config.request_timeout,
        cors_allowed_origins: config.cors_allowed_origins.clone(),
    };

    start_server(dispatcher, options, &config.bind_address()).await?;

    Ok(())
}
