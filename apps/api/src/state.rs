use std::sync::Arc;

use crate::config::Config;
use crate::knowledge::KnowledgeBase;
use crate::llm_client::LlmClient;
use crate::screening::classifier::EmotionClassifier;
use crate::screening::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub config: Config,
    /// Pluggable emotion classifier. Default: LlmEmotionClassifier. Swap via CLASSIFIER_BACKEND.
    pub classifier: Arc<dyn EmotionClassifier>,
    pub knowledge: KnowledgeBase,
    pub sessions: SessionStore,
}
