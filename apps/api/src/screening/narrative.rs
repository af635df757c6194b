//! Narrative ("diary") answer scoring.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm_client::prompts::{fill_template, JSON_ONLY_SYSTEM};
use crate::llm_client::LlmClient;
use crate::screening::prompts::{NARRATIVE_SCORE_PROMPT, NARRATIVE_SCORE_SYSTEM};

pub const MAX_NARRATIVE_POINTS: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeScore {
    pub points: u8,
    pub reason: String,
}

/// Raw model output; points arrive as any JSON number and are clamped.
#[derive(Debug, Deserialize)]
struct RawNarrativeScore {
    #[serde(default)]
    points: f64,
    #[serde(default)]
    reason: String,
}

impl From<RawNarrativeScore> for NarrativeScore {
    fn from(raw: RawNarrativeScore) -> Self {
        let points = if raw.points.is_finite() {
            raw.points.round().clamp(0.0, f64::from(MAX_NARRATIVE_POINTS)) as u8
        } else {
            0
        };
        Self {
            points,
            reason: raw.reason.trim().to_string(),
        }
    }
}

/// Rates the narrative on a 0..=5 scale. A failed or unparsable model call
/// scores 0 points so the session can still reach its report.
pub async fn score_narrative_answer(llm: &LlmClient, narrative: &str) -> NarrativeScore {
    let prompt = fill_template(
        NARRATIVE_SCORE_PROMPT,
        &[("json_only", JSON_ONLY_SYSTEM), ("narrative", narrative.trim())],
    );

    match llm
        .call_json::<RawNarrativeScore>(NARRATIVE_SCORE_SYSTEM, &prompt)
        .await
    {
        Ok(raw) => {
            let score = NarrativeScore::from(raw);
            info!("Narrative scored {} points", score.points);
            score
        }
        Err(e) => {
            warn!("Narrative scoring failed, scoring 0 points: {e}");
            NarrativeScore {
                points: 0,
                reason: "The reflection could not be analysed automatically.".to_string(),
            }
        }
    }
}
