//! Printable report data: deterministic session facts plus a model-written summary.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, JSON_ONLY_SYSTEM, NON_DIAGNOSTIC_INSTRUCTION};
use crate::llm_client::LlmClient;
use crate::models::session::Gender;
use crate::report::analysis::user_data_json;
use crate::report::prompts::{REPORT_SUMMARY_PROMPT, REPORT_SUMMARY_SYSTEM};
use crate::report::severity::Severity;
use crate::screening::session::Session;

/// The model-written part of the printable report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportNarrative {
    pub summary: String,
    #[serde(default)]
    pub key_findings: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub name: String,
    pub gender: Option<Gender>,
    pub age: Option<u8>,
    pub main_symptoms: String,
    pub past_history: String,
    pub question_score: u32,
    pub narrative_points: u8,
    pub total_score: u32,
    pub severity: Severity,
    pub date: NaiveDate,
    pub narrative: ReportNarrative,
}

pub async fn summarize_for_report(
    llm: &LlmClient,
    session: &Session,
) -> Result<ReportData, AppError> {
    let user_json = serde_json::to_string_pretty(&user_data_json(session))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize user data: {e}")))?;
    let report_body = session
        .report
        .as_ref()
        .map(|r| r.body.as_str())
        .unwrap_or_default();

    let prompt = fill_template(
        REPORT_SUMMARY_PROMPT,
        &[
            ("json_only", JSON_ONLY_SYSTEM),
            ("non_diagnostic", NON_DIAGNOSTIC_INSTRUCTION),
            ("user_json", &user_json),
            ("report_body", report_body),
        ],
    );

    let narrative: ReportNarrative = llm
        .call_json(REPORT_SUMMARY_SYSTEM, &prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Report summary failed: {e}")))?;

    Ok(build_report_data(session, narrative))
}

pub fn build_report_data(session: &Session, narrative: ReportNarrative) -> ReportData {
    let profile = session.profile.as_ref();
    ReportData {
        name: profile.map(|p| p.display_name()).unwrap_or("user").to_string(),
        gender: profile.map(|p| p.gender),
        age: profile.and_then(|p| p.age),
        main_symptoms: profile.map(|p| p.symptoms.trim().to_string()).unwrap_or_default(),
        past_history: profile.map(|p| p.history.trim().to_string()).unwrap_or_default(),
        question_score: session.question_score.unwrap_or(session.score),
        narrative_points: session
            .narrative_score
            .as_ref()
            .map(|n| n.points)
            .unwrap_or(0),
        total_score: session.score,
        severity: Severity::from_score(session.score),
        date: Utc::now().date_naive(),
        narrative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::test_support::chat_body;
    use crate::screening::emotion::Emotion;
    use crate::screening::narrative::NarrativeScore;
    use crate::screening::session::test_support::answered;

    fn narrated() -> Session {
        let mut s = answered(Emotion::Hurt);
        s.record_narrative(
            "Work has been stressful.",
            NarrativeScore {
                points: 1,
                reason: "Mild stress".to_string(),
            },
        )
        .unwrap();
        s
    }

    #[test]
    fn test_build_report_data_copies_scores() {
        let data = build_report_data(
            &narrated(),
            ReportNarrative {
                summary: "Mild stress.".to_string(),
                key_findings: vec![],
                recommendations: vec![],
            },
        );
        assert_eq!(data.name, "Alex");
        assert_eq!(data.question_score, 5);
        assert_eq!(data.narrative_points, 1);
        assert_eq!(data.total_score, 6);
        assert_eq!(data.severity, Severity::Moderate);
    }

    #[tokio::test]
    async fn test_summarize_parses_model_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(chat_body(
                r#"{"summary": "Some low mood.", "key_findings": ["Stress at work"], "recommendations": ["Talk to someone you trust"]}"#,
            ))
            .create_async()
            .await;

        let llm = LlmClient::new("k".to_string(), &server.url()).unwrap();
        let data = summarize_for_report(&llm, &narrated()).await.unwrap();
        assert_eq!(data.narrative.summary, "Some low mood.");
        assert_eq!(data.narrative.key_findings, vec!["Stress at work".to_string()]);
        assert_eq!(data.narrative.recommendations.len(), 1);
    }

    #[tokio::test]
    async fn test_summarize_rejects_non_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(chat_body("Here is your summary: all good"))
            .create_async()
            .await;

        let llm = LlmClient::new("k".to_string(), &server.url()).unwrap();
        let err = summarize_for_report(&llm, &narrated()).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
