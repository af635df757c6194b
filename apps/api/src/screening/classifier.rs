//! Emotion classification: pluggable, trait-based classifier for screening answers.
//!
//! Default: `LlmEmotionClassifier` (single-label call to the classifier model).
//! Offline: `LexiconEmotionClassifier` (pure-Rust keyword matching, deterministic).
//!
//! `AppState` holds an `Arc<dyn EmotionClassifier>`, chosen at startup via config.

use std::str::FromStr;

use async_trait::async_trait;
use tracing::warn;

use crate::llm_client::{LlmClient, CLASSIFIER_MODEL};
use crate::screening::corpus::EmotionCorpus;
use crate::screening::emotion::Emotion;
use crate::screening::prompts::EMOTION_CLASSIFY_SYSTEM;

const FEW_SHOT_PER_EMOTION: usize = 2;
const CLASSIFY_MAX_TOKENS: u32 = 10;

/// Never fails: classification problems degrade to `Emotion::FALLBACK`
/// so a screening is never interrupted by the classifier.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Emotion;

    /// Backend name, for transparency in logs and responses.
    fn backend(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierBackend {
    Llm,
    Lexicon,
}

impl FromStr for ClassifierBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "llm" => Ok(ClassifierBackend::Llm),
            "lexicon" => Ok(ClassifierBackend::Lexicon),
            other => Err(format!("expected 'llm' or 'lexicon', got '{other}'")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LLM backend
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmEmotionClassifier {
    llm: LlmClient,
    system_prompt: String,
}

impl LlmEmotionClassifier {
    pub fn new(llm: LlmClient, corpus: Option<&EmotionCorpus>) -> Self {
        Self {
            llm,
            system_prompt: build_system_prompt(corpus),
        }
    }
}

fn build_system_prompt(corpus: Option<&EmotionCorpus>) -> String {
    let categories = Emotion::ALL
        .iter()
        .map(Emotion::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    let examples = corpus
        .map(|c| c.few_shot_examples(FEW_SHOT_PER_EMOTION))
        .filter(|e| !e.is_empty())
        .map(|examples| {
            let lines = examples
                .iter()
                .map(|e| format!("\"{}\" -> {}", e.text, e.emotion))
                .collect::<Vec<_>>()
                .join("\n");
            format!("\n\nExamples:\n{lines}")
        })
        .unwrap_or_default();

    EMOTION_CLASSIFY_SYSTEM
        .replace("{categories}", &categories)
        .replace("{examples}", &examples)
}

#[async_trait]
impl EmotionClassifier for LlmEmotionClassifier {
    async fn classify(&self, text: &str) -> Emotion {
        let reply = self
            .llm
            .complete(
                CLASSIFIER_MODEL,
                &self.system_prompt,
                text,
                0.0,
                Some(CLASSIFY_MAX_TOKENS),
            )
            .await;

        match reply {
            Ok(label) => Emotion::from_label(&label).unwrap_or_else(|| {
                warn!("Classifier returned unknown label {label:?}, using fallback");
                Emotion::FALLBACK
            }),
            Err(e) => {
                warn!("Emotion classification call failed: {e}");
                Emotion::FALLBACK
            }
        }
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lexicon backend
// ────────────────────────────────────────────────────────────────────────────

const LEXICON: [(Emotion, &[&str]); 6] = [
    (
        Emotion::Anxiety,
        &[
            "anxious", "worried", "worry", "nervous", "afraid", "scared", "panic", "restless",
            "uneasy", "tense", "불안", "걱정", "초조",
        ],
    ),
    (
        Emotion::Anger,
        &[
            "angry", "furious", "irritated", "annoyed", "mad", "frustrated", "rage", "hate",
            "화가", "짜증", "분노",
        ],
    ),
    (
        Emotion::Sadness,
        &[
            "sad", "depressed", "hopeless", "empty", "lonely", "cry", "crying", "miserable",
            "worthless", "tired", "exhausted", "슬프", "우울", "외로",
        ],
    ),
    (
        Emotion::Hurt,
        &[
            "hurt", "betrayed", "rejected", "ignored", "let down", "disappointed", "상처",
            "서운",
        ],
    ),
    (
        Emotion::Embarrassment,
        &[
            "embarrassed", "ashamed", "awkward", "confused", "shocked", "humiliated", "당황",
            "부끄",
        ],
    ),
    (
        Emotion::Joy,
        &[
            "happy", "glad", "great", "good", "fine", "excited", "enjoy", "grateful", "relaxed",
            "기쁘", "행복", "좋아",
        ],
    ),
];

/// Counts keyword hits per emotion; most hits wins, ties go to the earlier
/// emotion in `LEXICON`, and no hits at all yields `Emotion::FALLBACK`.
pub struct LexiconEmotionClassifier;

impl LexiconEmotionClassifier {
    pub fn classify_text(text: &str) -> Emotion {
        let lowered = text.to_lowercase();
        let mut best: Option<(Emotion, usize)> = None;

        for (emotion, keywords) in LEXICON {
            let hits = keywords
                .iter()
                .map(|k| lowered.matches(k).count())
                .sum::<usize>();
            if hits > 0 && best.map_or(true, |(_, top)| hits > top) {
                best = Some((emotion, hits));
            }
        }

        best.map(|(e, _)| e).unwrap_or(Emotion::FALLBACK)
    }
}

#[async_trait]
impl EmotionClassifier for LexiconEmotionClassifier {
    async fn classify(&self, text: &str) -> Emotion {
        Self::classify_text(text)
    }

    fn backend(&self) -> &'static str {
        "lexicon"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
