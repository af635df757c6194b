//! Final analysis: the report shown at the end of a screening.
//!
//! Flow: build retrieval query from symptoms/history/narrative → retrieve
//!       reference chunks → LLM writes the markdown body → deterministic header.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::knowledge::{format_context, KnowledgeBase};
use crate::llm_client::prompts::{fill_template, NON_DIAGNOSTIC_INSTRUCTION};
use crate::llm_client::{LlmClient, CHAT_MODEL};
use crate::report::prompts::{FINAL_ANALYSIS_PROMPT, FINAL_ANALYSIS_SYSTEM};
use crate::report::severity::Severity;
use crate::screening::session::Session;

const REPORT_TEMPERATURE: f32 = 0.5;

#[derive(Debug, Clone, Serialize)]
pub struct FinalReport {
    pub header: String,
    pub body: String,
    pub severity: Severity,
    pub total_score: u32,
    /// Sources of the reference chunks the body was grounded on, deduplicated.
    pub sources: Vec<String>,
}

impl FinalReport {
    pub fn full_text(&self) -> String {
        format!("{}\n\n{}", self.header, self.body)
    }
}

/// Everything the models see about the user, as JSON.
pub fn user_data_json(session: &Session) -> Value {
    let profile = session.profile.as_ref();
    let answers: Vec<Value> = session
        .questions
        .iter()
        .zip(&session.answers)
        .map(|(question, a)| {
            json!({
                "question": question,
                "emotion": a.emotion,
                "level": a.level,
                "points": a.points,
            })
        })
        .collect();

    json!({
        "name": profile.map(|p| p.display_name()),
        "gender": profile.map(|p| p.gender),
        "age": profile.and_then(|p| p.age),
        "main_symptoms": profile.map(|p| p.symptoms.as_str()),
        "past_history": profile.map(|p| p.history.as_str()).filter(|h| !h.trim().is_empty()),
        "screening_answers": answers,
        "question_score": session.question_score,
        "narrative": session.narrative,
        "narrative_points": session.narrative_score.as_ref().map(|n| n.points),
        "narrative_reason": session.narrative_score.as_ref().map(|n| n.reason.as_str()),
        "total_score": session.score,
    })
}

/// Retrieval query built from what the user said in their own words.
pub fn build_retrieval_query(session: &Session) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(profile) = &session.profile {
        parts.push(profile.symptoms.trim());
        parts.push(profile.history.trim());
    }
    if let Some(narrative) = &session.narrative {
        parts.push(narrative.trim());
    }
    let query = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if query.is_empty() {
        "depression symptoms, self-care and when to seek help".to_string()
    } else {
        query
    }
}

pub fn render_header(name: &str, total_score: u32, severity: Severity) -> String {
    format!(
        "## Screening result for {name}\n\n**Total score: {total_score}**\n\n**{}**: {}",
        severity.title(),
        severity.guidance()
    )
}

pub async fn generate_final_analysis(
    llm: &LlmClient,
    knowledge: &KnowledgeBase,
    session: &Session,
) -> Result<FinalReport, AppError> {
    let severity = Severity::from_score(session.score);

    let chunks = knowledge.retrieve(&build_retrieval_query(session)).await?;
    info!(
        "Session {}: retrieved {} reference chunks for final analysis",
        session.id,
        chunks.len()
    );

    let user_json = serde_json::to_string_pretty(&user_data_json(session))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize user data: {e}")))?;

    let total_score = session.score.to_string();
    let context = format_context(&chunks);
    let prompt = fill_template(
        FINAL_ANALYSIS_PROMPT,
        &[
            ("non_diagnostic", NON_DIAGNOSTIC_INSTRUCTION),
            ("user_json", &user_json),
            ("severity_title", severity.title()),
            ("total_score", &total_score),
            ("context", &context),
        ],
    );

    let body = llm
        .complete(
            CHAT_MODEL,
            FINAL_ANALYSIS_SYSTEM,
            &prompt,
            REPORT_TEMPERATURE,
            None,
        )
        .await
        .map_err(|e| AppError::Llm(format!("Final analysis failed: {e}")))?;

    let name = session
        .profile
        .as_ref()
        .map(|p| p.display_name())
        .unwrap_or("user");

    let mut sources: Vec<String> = Vec::new();
    for chunk in &chunks {
        if !sources.contains(&chunk.source) {
            sources.push(chunk.source.clone());
        }
    }

    Ok(FinalReport {
        header: render_header(name, session.score, severity),
        body,
        severity,
        total_score: session.score,
        sources,
    })
}
