mod config;
mod errors;
mod knowledge;
mod llm_client;
mod models;
mod report;
mod routes;
mod screening;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::knowledge::loader::load_document;
use crate::knowledge::splitter::MarkdownSplitter;
use crate::knowledge::KnowledgeBase;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::screening::classifier::{
    ClassifierBackend, EmotionClassifier, LexiconEmotionClassifier, LlmEmotionClassifier,
};
use crate::screening::corpus::load_emotion_corpus;
use crate::screening::store::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
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

    info!("Starting Screening API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(config.upstage_api_key.clone(), &config.upstage_base_url)?;
    info!(
        "LLM client initialized (chat: {}, embeddings: {} / {})",
        llm_client::CHAT_MODEL,
        llm_client::EMBEDDING_PASSAGE_MODEL,
        llm_client::EMBEDDING_QUERY_MODEL
    );

    // Optional labelled corpus, used as few-shot examples for the LLM classifier
    let corpus = match &config.emotion_corpus_path {
        Some(path) => {
            let corpus = load_emotion_corpus(path)?;
            if corpus.is_empty() {
                warn!(
                    "Emotion corpus {} has no usable sentences; classifying without examples",
                    path.display()
                );
            }
            Some(corpus)
        }
        None => None,
    };

    // Initialize emotion classifier (LLM by default; swap via CLASSIFIER_BACKEND)
    let classifier: Arc<dyn EmotionClassifier> = match config.classifier_backend {
        ClassifierBackend::Llm => Arc::new(LlmEmotionClassifier::new(llm.clone(), corpus.as_ref())),
        ClassifierBackend::Lexicon => Arc::new(LexiconEmotionClassifier),
    };
    info!("Emotion classifier backend: {}", classifier.backend());

    // Build the knowledge base from the reference document
    let knowledge = KnowledgeBase::new(
        Arc::new(llm.clone()),
        MarkdownSplitter::new(config.chunk_size, config.chunk_overlap),
        config.retrieval_top_k,
    );
    let document = load_document(&config.knowledge_path).with_context(|| {
        format!(
            "Failed to load knowledge document {}",
            config.knowledge_path.display()
        )
    })?;
    let chunks = knowledge
        .ingest(&document)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to index knowledge document: {e}"))?;
    info!("Knowledge base ready ({chunks} chunks)");

    let sessions = SessionStore::new(chrono::Duration::minutes(config.session_ttl_minutes));

    // Build app state
    let state = AppState {
        llm,
        config: config.clone(),
        classifier,
        knowledge,
        sessions,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client's host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
