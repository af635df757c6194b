use serde::Serialize;

/// A stored chunk with its embedding.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    pub source: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// A retrieval hit, as returned to callers and API clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedChunk {
    pub source: String,
    pub text: String,
    pub score: f32,
}

/// Flat in-memory vector store with exhaustive cosine search.
#[derive(Debug, Default)]
pub struct VectorStore {
    chunks: Vec<StoredChunk>,
}

impl VectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, chunks: impl IntoIterator<Item = StoredChunk>) {
        self.chunks.extend(chunks);
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Top `k` chunks by cosine similarity, best first. Equal scores keep
    /// insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<RetrievedChunk> {
        let mut scored: Vec<(usize, f32)> = self
            .chunks
            .iter()
            .enumerate()
            .map(|(i, c)| (i, cosine_similarity(query, &c.embedding)))
            .collect();

        // stable sort keeps insertion order for ties
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        scored
            .into_iter()
            .take(k)
            .map(|(i, score)| {
                let chunk = &self.chunks[i];
                RetrievedChunk {
                    source: chunk.source.clone(),
                    text: chunk.text.clone(),
                    score,
                }
            })
            .collect()
    }
}

/// Cosine similarity; 0.0 when either vector is all zeros or lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
