//! RAG Server binary
//!
//! Run with: cargo run -p indicator-rag --bin indicator-rag-server

use indicator_rag::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "indicator_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RagConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - LLM model: {}", config.llm.generate_model);
    tracing::info!("  - Data file: {}", config.ingest.data_path.display());

    let server = RagServer::new(config)?;
    let service = server.state().service();
    let llm = &service.config().llm;

    tracing::info!("Checking Ollama at {}...", llm.base_url);
    if service.llm_available().await {
        tracing::info!("Ollama is running");
    } else {
        tracing::warn!("Ollama not available at {}", llm.base_url);
        tracing::warn!(
            "  Start it with `ollama serve` and pull {} and {}",
            llm.embed_model,
            llm.generate_model
        );
    }

    if service.config().ingest.load_on_startup {
        match service.load_default().await {
            Ok(stored) => tracing::info!("Startup load stored {} units", stored),
            Err(e) => tracing::error!("Startup load failed, serving without data: {}", e),
        }
    } else {
        tracing::info!("Startup load disabled; POST /api/rag/load-data to ingest");
    }

    println!("\nServer starting...");
    println!("  API: http://{}/api/rag", server.address());
    println!("  Health: http://{}/api/rag/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/rag/load-data      - Load the indicator CSV");
    println!("  POST /api/rag/search         - Similarity search");
    println!("  POST /api/rag/search-by-year - Search within one year");
    println!("  POST /api/rag/ask            - Ask the local model");
    println!("  POST /api/rag/ask-external   - Ask an external LLM");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
