use serde::{Deserialize, Serialize};

const AT_RISK_THRESHOLD: u32 = 10;
const MODERATE_THRESHOLD: u32 = 5;

/// Severity band of a total screening score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    AtRisk,
    Moderate,
    Normal,
}

impl Severity {
    pub fn from_score(total_score: u32) -> Self {
        if total_score >= AT_RISK_THRESHOLD {
            Severity::AtRisk
        } else if total_score >= MODERATE_THRESHOLD {
            Severity::Moderate
        } else {
            Severity::Normal
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Severity::AtRisk => "At risk of depression",
            Severity::Moderate => "Moderate",
            Severity::Normal => "Normal",
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            Severity::AtRisk => {
                "A high level of depressed mood is suspected. Professional help may be needed."
            }
            Severity::Moderate => {
                "You seem to be going through everyday stress or a mildly low mood."
            }
            Severity::Normal => "No notable signs of depressed mood were found.",
        }
    }
}
