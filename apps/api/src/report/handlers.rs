//! Axum route handlers for the Report API.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, AppPath};
use crate::models::session::Phase;
use crate::report::analysis::{generate_final_analysis, FinalReport};
use crate::report::pdf::create_report_pdf;
use crate::report::summary::summarize_for_report;
use crate::state::AppState;

/// POST /api/v1/sessions/:id/report
///
/// Generates the final analysis once; afterwards returns the stored report.
pub async fn handle_generate_report(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<FinalReport>, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;

    if session.phase == Phase::Finished {
        if let Some(report) = &session.report {
            return Ok(Json(report.clone()));
        }
    }
    session.require_phase(Phase::FinalAnalysis, "generate_report")?;

    let report = generate_final_analysis(&state.llm, &state.knowledge, &session).await?;
    session.finish(report.clone())?;
    info!(
        "Session {id} finished: score={} severity={:?}",
        report.total_score, report.severity
    );

    Ok(Json(report))
}

/// GET /api/v1/sessions/:id/report.pdf
pub async fn handle_report_pdf(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.require_phase(Phase::Finished, "download_pdf")?;

    let data = match &session.report_data {
        Some(data) => data.clone(),
        None => {
            let data = summarize_for_report(&state.llm, &session).await?;
            session.report_data = Some(data.clone());
            data
        }
    };
    drop(session);

    let file_name = pdf_file_name(&data.name);
    let bytes = tokio::task::spawn_blocking(move || create_report_pdf(&data))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF rendering task failed: {e}")))??;

    info!("Rendered {} byte PDF report for session {id}", bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        Bytes::from(bytes),
    )
        .into_response())
}

/// `<name>_depression_screening_report.pdf`, restricted to header-safe characters.
pub fn pdf_file_name(name: &str) -> String {
    let safe: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = safe.trim_matches('_');
    let safe = if safe.is_empty() { "user" } else { safe };
    format!("{safe}_depression_screening_report.pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_file_name() {
        assert_eq!(
            pdf_file_name("Alex"),
            "Alex_depression_screening_report.pdf"
        );
        assert_eq!(
            pdf_file_name("Jo Ann"),
            "Jo_Ann_depression_screening_report.pdf"
        );
        assert_eq!(pdf_file_name("김철수"), "user_depression_screening_report.pdf");
        assert_eq!(pdf_file_name(""), "user_depression_screening_report.pdf");
    }
}
