//! History-aware question answering over the knowledge base.
//!
//! Flow: (rewrite follow-up into a standalone question) → retrieve → answer.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::knowledge::prompts::{CONTEXTUALIZE_QUESTION_SYSTEM, QA_SYSTEM};
use crate::knowledge::store::RetrievedChunk;
use crate::knowledge::{format_context, KnowledgeBase};
use crate::llm_client::{LlmClient, CHAT_MODEL};
use crate::models::session::ChatMessage;

const QA_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub answer: String,
    /// The question actually used for retrieval.
    pub standalone_question: String,
    pub context: Vec<RetrievedChunk>,
}

pub async fn answer_question(
    llm: &LlmClient,
    knowledge: &KnowledgeBase,
    request: &AskRequest,
) -> Result<AskResponse, AppError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(AppError::Validation("question cannot be empty".to_string()));
    }
    if knowledge.is_empty().await {
        return Err(AppError::Validation(
            "No knowledge documents are loaded. Upload a document first.".to_string(),
        ));
    }

    let standalone_question = if request.chat_history.is_empty() {
        question.to_string()
    } else {
        llm.complete_with_history(
            CHAT_MODEL,
            CONTEXTUALIZE_QUESTION_SYSTEM,
            &request.chat_history,
            question,
            0.0,
            None,
        )
        .await
        .map_err(|e| AppError::Llm(format!("Failed to contextualize question: {e}")))?
    };
    debug!("Standalone question: {standalone_question}");

    let context = knowledge.retrieve(&standalone_question).await?;
    let system = QA_SYSTEM.replace("{context}", &format_context(&context));

    let answer = llm
        .complete_with_history(
            CHAT_MODEL,
            &system,
            &request.chat_history,
            question,
            QA_TEMPERATURE,
            None,
        )
        .await
        .map_err(|e| AppError::Llm(format!("Failed to answer question: {e}")))?;

    Ok(AskResponse {
        answer,
        standalone_question,
        context,
    })
}
