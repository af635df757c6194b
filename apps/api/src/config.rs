use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::screening::classifier::ClassifierBackend;

const DEFAULT_BASE_URL: &str = "https://api.upstage.ai/v1";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub upstage_api_key: String,
    pub upstage_base_url: String,
    pub port: u16,
    pub rust_log: String,
    pub knowledge_path: PathBuf,
    pub emotion_corpus_path: Option<PathBuf>,
    pub classifier_backend: ClassifierBackend,
    pub questions_per_session: usize,
    pub session_ttl_minutes: i64,
    pub retrieval_top_k: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            upstage_api_key: require_env("UPSTAGE_API_KEY")?,
            upstage_base_url: std::env::var("UPSTAGE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            knowledge_path: std::env::var("KNOWLEDGE_PATH")
                .unwrap_or_else(|_| "data/depression.md".to_string())
                .into(),
            emotion_corpus_path: std::env::var("EMOTION_CORPUS_PATH").ok().map(PathBuf::from),
            classifier_backend: parse_env("CLASSIFIER_BACKEND", ClassifierBackend::Llm)?,
            questions_per_session: parse_env("QUESTIONS_PER_SESSION", 5)?,
            session_ttl_minutes: parse_env("SESSION_TTL_MINUTES", 60)?,
            retrieval_top_k: parse_env("RETRIEVAL_TOP_K", 4)?,
            chunk_size: parse_env("CHUNK_SIZE", 500)?,
            chunk_overlap: parse_env("CHUNK_OVERLAP", 50)?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let bank = crate::screening::questions::QUESTION_BANK.len();
        if self.questions_per_session == 0 || self.questions_per_session > bank {
            bail!("QUESTIONS_PER_SESSION must be between 1 and {bank}");
        }
        if self.chunk_size == 0 {
            bail!("CHUNK_SIZE must be greater than zero");
        }
        if self.chunk_overlap >= self.chunk_size {
            bail!("CHUNK_OVERLAP must be smaller than CHUNK_SIZE");
        }
        if self.retrieval_top_k == 0 {
            bail!("RETRIEVAL_TOP_K must be greater than zero");
        }
        if self.session_ttl_minutes <= 0 {
            bail!("SESSION_TTL_MINUTES must be positive");
        }
        Ok(())
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        upstage_api_key: "test-key".to_string(),
        upstage_base_url: "http://127.0.0.1:1".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
        knowledge_path: PathBuf::from("data/depression.md"),
        emotion_corpus_path: None,
        classifier_backend: ClassifierBackend::Lexicon,
        questions_per_session: 5,
        session_ttl_minutes: 60,
        retrieval_top_k: 2,
        chunk_size: 500,
        chunk_overlap: 50,
    }
}
