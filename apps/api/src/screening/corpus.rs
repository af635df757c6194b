//! Emotional-dialogue corpus loader.
//!
//! The corpus is a JSON array of dialogue records, each tagged with a major
//! emotion category. Both human sentences of a record become few-shot
//! examples for the emotion classifier. The counsellor ("system") replies
//! carry no emotion label of their own and are ignored.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::screening::emotion::Emotion;

#[derive(Debug, Clone, Deserialize)]
pub struct CorpusRecord {
    #[serde(rename = "emotion", alias = "감정_대분류")]
    pub emotion_label: String,
    #[serde(default, rename = "human_1", alias = "사람문장1")]
    pub human_1: Option<String>,
    #[serde(default, rename = "human_2", alias = "사람문장2")]
    pub human_2: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelledSentence {
    pub emotion: Emotion,
    pub text: String,
}

/// Records whose label maps onto a known emotion.
#[derive(Debug, Clone, Default)]
pub struct EmotionCorpus {
    sentences: Vec<LabelledSentence>,
}

impl EmotionCorpus {
    pub fn from_records(records: Vec<CorpusRecord>) -> Self {
        let mut skipped = 0usize;
        let mut sentences = Vec::new();
        for record in records {
            let Some(emotion) = Emotion::from_label(&record.emotion_label) else {
                skipped += 1;
                continue;
            };
            for text in [record.human_1, record.human_2].into_iter().flatten() {
                let text = text.trim();
                if !text.is_empty() {
                    sentences.push(LabelledSentence {
                        emotion,
                        text: text.to_string(),
                    });
                }
            }
        }
        if skipped > 0 {
            warn!("Skipped {skipped} corpus records with unknown emotion labels");
        }
        Self { sentences }
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Up to `per_emotion` sentences for each emotion, in `Emotion::ALL` order.
    pub fn few_shot_examples(&self, per_emotion: usize) -> Vec<LabelledSentence> {
        Emotion::ALL
            .iter()
            .flat_map(|emotion| {
                self.sentences
                    .iter()
                    .filter(move |s| s.emotion == *emotion)
                    .take(per_emotion)
                    .cloned()
            })
            .collect()
    }
}

pub fn load_emotion_corpus(path: &Path) -> Result<EmotionCorpus> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("No emotion corpus file at {}", path.display()))?;
    let records: Vec<CorpusRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("Emotion corpus at {} is not a JSON record array", path.display()))?;
    let corpus = EmotionCorpus::from_records(records);
    info!(
        "Loaded {} labelled sentences from {}",
        corpus.len(),
        path.display()
    );
    Ok(corpus)
}
