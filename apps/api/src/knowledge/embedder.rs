use async_trait::async_trait;

use crate::llm_client::{EmbeddingKind, LlmClient, LlmError};

/// Turns text into vectors for similarity search.
/// Implemented by `LlmClient`; tests substitute a local embedder.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        self.embed_documents(&[text.to_string()])
            .await?
            .pop()
            .ok_or(LlmError::EmptyContent)
    }
}

/// Chunks go through the passage model, questions through the query model.
#[async_trait]
impl Embedder for LlmClient {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        self.embed(texts, EmbeddingKind::Passage).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        self.embed(&[text.to_string()], EmbeddingKind::Query)
            .await?
            .pop()
            .ok_or(LlmError::EmptyContent)
    }
}
