// Knowledge base: static reference documents used to ground report
// synthesis and question answering.
// Implements: document loading, markdown splitting, embedding, cosine retrieval.

pub mod embedder;
pub mod handlers;
pub mod loader;
pub mod prompts;
pub mod qa;
pub mod splitter;
pub mod store;

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::errors::AppError;
use embedder::Embedder;
use loader::Document;
use splitter::MarkdownSplitter;
use store::{RetrievedChunk, StoredChunk, VectorStore};

/// Splits, embeds and stores documents; answers similarity queries.
#[derive(Clone)]
pub struct KnowledgeBase {
    embedder: Arc<dyn Embedder>,
    splitter: MarkdownSplitter,
    store: Arc<RwLock<VectorStore>>,
    top_k: usize,
}

impl KnowledgeBase {
    pub fn new(embedder: Arc<dyn Embedder>, splitter: MarkdownSplitter, top_k: usize) -> Self {
        Self {
            embedder,
            splitter,
            store: Arc::new(RwLock::new(VectorStore::new())),
            top_k,
        }
    }

    /// Splits the document, embeds every chunk in one batch and stores them.
    /// Returns the number of chunks added.
    pub async fn ingest(&self, document: &Document) -> Result<usize, AppError> {
        let texts = self.splitter.split(&document.text);
        if texts.is_empty() {
            return Err(AppError::Validation(format!(
                "Document '{}' produced no text chunks",
                document.source
            )));
        }

        let embeddings = self
            .embedder
            .embed_documents(&texts)
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to embed '{}': {e}", document.source)))?;

        let count = texts.len();
        let chunks = texts
            .into_iter()
            .zip(embeddings)
            .map(|(text, embedding)| StoredChunk {
                source: document.source.clone(),
                text,
                embedding,
            });
        self.store.write().await.add(chunks);

        info!("Ingested {count} chunks from '{}'", document.source);
        Ok(count)
    }

    /// The configured number of chunks most similar to `query`.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedChunk>, AppError> {
        self.retrieve_k(query, self.top_k).await
    }

    pub async fn retrieve_k(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>, AppError> {
        if self.is_empty().await {
            return Ok(Vec::new());
        }
        let vector = self
            .embedder
            .embed_query(query)
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to embed query: {e}")))?;
        Ok(self.store.read().await.search(&vector, k))
    }

    pub async fn chunk_count(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

/// Joins retrieved chunks into a prompt context block.
pub fn format_context(chunks: &[RetrievedChunk]) -> String {
    if chunks.is_empty() {
        return "(no reference material available)".to_string();
    }
    chunks
        .iter()
        .enumerate()
        .map(|(i, c)| format!("[{}] ({})\n{}", i + 1, c.source, c.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::knowledge::embedder::test_support::VocabularyEmbedder;

    pub const VOCABULARY: &[&str] = &["sleep", "insomnia", "mood", "sad", "therapy", "exercise"];

    pub fn knowledge_base() -> KnowledgeBase {
        KnowledgeBase::new(
            Arc::new(VocabularyEmbedder::new(VOCABULARY)),
            MarkdownSplitter::new(80, 0),
            2,
        )
    }

    pub fn document() -> Document {
        Document {
            source: "depression.md".to_string(),
            text: "# Sleep\nInsomnia and poor sleep are common.\n\
                   # Mood\nA sad or empty mood most of the day.\n\
                   # Treatment\nTherapy and regular exercise help."
                .to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_ingest_then_retrieve_relevant_chunk() {
        let kb = knowledge_base();
        let added = kb.ingest(&document()).await.unwrap();
        assert_eq!(added, 3);
        assert_eq!(kb.chunk_count().await, 3);

        let hits = kb.retrieve("I have insomnia and cannot sleep").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].text.starts_with("# Sleep"), "{hits:?}");
    }

    #[tokio::test]
    async fn test_retrieve_from_empty_base_is_empty() {
        let kb = knowledge_base();
        assert!(kb.retrieve("sleep").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ingest_rejects_blank_document() {
        let kb = knowledge_base();
        let doc = Document {
            source: "blank.md".to_string(),
            text: "   ".to_string(),
        };
        assert!(matches!(
            kb.ingest(&doc).await.unwrap_err(),
            AppError::Validation(_)
        ));
    }

    struct UnavailableEmbedder;

    #[async_trait::async_trait]
    impl Embedder for UnavailableEmbedder {
        async fn embed_documents(
            &self,
            _texts: &[String],
        ) -> Result<Vec<Vec<f32>>, crate::llm_client::LlmError> {
            Err(crate::llm_client::LlmError::RateLimited { retries: 3 })
        }
    }

    #[tokio::test]
    async fn test_embedding_failure_is_a_knowledge_error() {
        let kb = KnowledgeBase::new(
            Arc::new(UnavailableEmbedder),
            MarkdownSplitter::new(80, 0),
            2,
        );
        let err = kb.ingest(&document()).await.unwrap_err();
        assert!(matches!(err, AppError::Knowledge(_)), "{err:?}");
        assert_eq!(kb.chunk_count().await, 0);
    }

    #[test]
    fn test_format_context_numbers_chunks() {
        let chunks = vec![RetrievedChunk {
            source: "depression.md".to_string(),
            text: "Therapy helps.".to_string(),
            score: 0.9,
        }];
        assert_eq!(format_context(&chunks), "[1] (depression.md)\nTherapy helps.");
        assert_eq!(format_context(&[]), "(no reference material available)");
    }
}
