//! Axum route handlers for the Screening API.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, AppJson, AppPath};
use crate::models::session::{ChatMessage, Phase, UserProfile};
use crate::report::severity::Severity;
use crate::screening::dialogue::generate_empathetic_response_and_ask_question;
use crate::screening::narrative::{score_narrative_answer, NarrativeScore};
use crate::screening::questions::NARRATIVE_PROMPT;
use crate::screening::session::{AnswerAnalysis, Session};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub phase: Phase,
    pub profile: Option<UserProfile>,
    pub score: u32,
    pub progress: Progress,
    pub messages: Vec<ChatMessage>,
    pub severity: Option<Severity>,
    pub created_at: DateTime<Utc>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id,
            phase: session.phase,
            profile: session.profile.clone(),
            score: session.score,
            progress: Progress {
                answered: session.answered_count(),
                total: session.questions.len(),
            },
            messages: session.messages.clone(),
            severity: session.report.as_ref().map(|r| r.severity),
            created_at: session.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub phase: Phase,
    pub question_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub phase: Phase,
    pub question: String,
    pub progress: Progress,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub analysis: AnswerAnalysis,
    pub reply: String,
    pub phase: Phase,
    pub progress: Progress,
    pub classifier_backend: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct NarrativeRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct NarrativeResponse {
    pub narrative_score: NarrativeScore,
    pub question_score: u32,
    pub total_score: u32,
    pub summary: String,
    pub phase: Phase,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), AppError> {
    let session = Session::new(&mut rand::thread_rng(), state.config.questions_per_session);
    let response = CreateSessionResponse {
        session_id: session.id,
        phase: session.phase,
        question_count: session.questions.len(),
    };
    state.sessions.insert(session).await;
    info!(
        "Created screening session {} ({} active)",
        response.session_id,
        state.sessions.len().await
    );

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let handle = state.sessions.get(id).await?;
    let session = handle.lock().await;
    Ok(Json(SessionView::from(&*session)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    info!("Deleted screening session {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/profile
///
/// The intake form. Opens the chat with the first screening question.
pub async fn handle_submit_profile(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(profile): AppJson<UserProfile>,
) -> Result<Json<ProfileResponse>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    let question = session.submit_profile(profile)?;
    info!("Session {id}: profile received, screening started");

    Ok(Json(ProfileResponse {
        phase: session.phase,
        question,
        progress: Progress {
            answered: 0,
            total: session.questions.len(),
        },
    }))
}

/// POST /api/v1/sessions/:id/answers
///
/// Scores the answer to the current question, then either leads into the next
/// question or, after the last one, asks for the narrative.
pub async fn handle_answer(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.check_answer(&request.answer)?;

    let emotion = state.classifier.classify(request.answer.trim()).await;
    let analysis = session.record_answer(&request.answer, emotion)?;
    info!(
        "Session {id}: answer {}/{} scored {} ({})",
        session.answered_count(),
        session.questions.len(),
        analysis.points,
        analysis.emotion
    );

    let reply = match session.current_question().map(str::to_string) {
        Some(next_question) => {
            let reply = generate_empathetic_response_and_ask_question(
                &state.llm,
                request.answer.trim(),
                &next_question,
            )
            .await;
            session.push_assistant(reply.clone());
            reply
        }
        // record_answer already appended the narrative prompt
        None => NARRATIVE_PROMPT.to_string(),
    };

    Ok(Json(AnswerResponse {
        analysis,
        reply,
        phase: session.phase,
        progress: Progress {
            answered: session.answered_count(),
            total: session.questions.len(),
        },
        classifier_backend: state.classifier.backend(),
    }))
}

/// POST /api/v1/sessions/:id/narrative
pub async fn handle_narrative(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<NarrativeRequest>,
) -> Result<Json<NarrativeResponse>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.check_narrative(&request.text)?;

    let scored = score_narrative_answer(&state.llm, &request.text).await;
    session.record_narrative(&request.text, scored.clone())?;

    let question_score = session.question_score.unwrap_or_default();
    let summary = format!(
        "Analysis: {} (+{} points, total: {})",
        scored.reason, scored.points, session.score
    );
    info!("Session {id}: narrative scored, moving to final analysis");

    Ok(Json(NarrativeResponse {
        narrative_score: scored,
        question_score,
        total_score: session.score,
        summary,
        phase: session.phase,
    }))
}
