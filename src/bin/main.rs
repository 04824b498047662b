use fund_query_router::{
    config::RouterConfig,
    dispatcher::Dispatcher,
    knowledge::KnowledgeContext,
    models::Question,
    responses::{MockBackend, OpenAiResponsesClient, ResponsesBackend},
    QuestionClassifier,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: router [--dry-run] <question...>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let mut dry_run = false;
    let mut words = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--dry-run" | "-n" => dry_run = true,
            "--help" | "-h" => {
                println!("{}", USAGE);
                return Ok(());
            }
            _ => words.push(arg),
        }
    }

    if words.is_empty() {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    let question = Question::new(words.join(" "))?;
    let config = RouterConfig::from_env()?;

    let knowledge = KnowledgeContext::load(
        &config.returns_path,
        &config.metadata_path,
        config.vector_store_id.clone(),
    )
    .await;

    // Without credentials the CLI can still show how a question would be routed
    let live = !dry_run && config.openai_api_key.is_some();
    let backend: Arc<dyn ResponsesBackend> = match config.openai_api_key.clone() {
        Some(key) if live => Arc::new(OpenAiResponsesClient::new(key, &config.openai_base_url)?),
        _ => Arc::new(MockBackend::new()),
    };

    let dispatcher = Dispatcher::new(backend, Arc::new(knowledge), config.strategy_settings())
        .with_mode(config.routing_mode);

    let intent = QuestionClassifier::classify(&question);
    println!("\n=== ROUTING ===");
    println!("Question: {}", question.preview());
    println!("Intent:   {}", intent);

    match dispatcher.plan(intent, &question) {
        Ok(spec) => {
            println!("Strategy: {}", spec.strategy);
            println!("Model:    {}", spec.model);
            println!("Tools:    {}", spec.tool_names().join(", "));
            println!("Max tool calls: {}", spec.max_tool_calls);
            println!("Instructions:   {} characters", spec.instructions.len());
        }
        Err(e) => {
            eprintln!("Cannot route: {}", e);
            return Err(Box::new(e) as Box<dyn std::error::Error>);
        }
    }

    if !live {
        println!("\n(dry run: set OPENAI_API_KEY and omit --dry-run to call the service)");
        return Ok(());
    }

    info!("Calling external service");
    let routed = dispatcher.answer(&question).await?;

    println!("\n=== ANSWER ({}) ===", routed.strategy);
    println!("{}", routed.answer.text);
    println!("\nImages: {}", routed.answer.images.len());

    Ok(())
}
