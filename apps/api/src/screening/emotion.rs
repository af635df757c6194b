//! Emotion categories and the risk level / points each one contributes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Anxiety,
    Anger,
    Sadness,
    Hurt,
    Embarrassment,
    Joy,
}

impl Emotion {
    /// Listing order used in prompts and for lexicon tie-breaking.
    pub const ALL: [Emotion; 6] = [
        Emotion::Anxiety,
        Emotion::Anger,
        Emotion::Sadness,
        Emotion::Hurt,
        Emotion::Embarrassment,
        Emotion::Joy,
    ];

    /// Used whenever a classification is missing or unusable.
    pub const FALLBACK: Emotion = Emotion::Hurt;

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Anxiety => "anxiety",
            Emotion::Anger => "anger",
            Emotion::Sadness => "sadness",
            Emotion::Hurt => "hurt",
            Emotion::Embarrassment => "embarrassment",
            Emotion::Joy => "joy",
        }
    }

    /// Label used by the Korean emotional-dialogue corpus.
    pub fn corpus_label(&self) -> &'static str {
        match self {
            Emotion::Anxiety => "불안",
            Emotion::Anger => "분노",
            Emotion::Sadness => "슬픔",
            Emotion::Hurt => "상처",
            Emotion::Embarrassment => "당황",
            Emotion::Joy => "기쁨",
        }
    }

    pub fn level(&self) -> RiskLevel {
        match self {
            Emotion::Anxiety | Emotion::Anger | Emotion::Sadness => RiskLevel::Danger,
            Emotion::Hurt | Emotion::Embarrassment => RiskLevel::Moderate,
            Emotion::Joy => RiskLevel::Normal,
        }
    }

    /// Parses a model reply or corpus label. Accepts English names in any case
    /// and the corpus labels; surrounding whitespace and trailing punctuation
    /// are ignored.
    pub fn from_label(label: &str) -> Option<Emotion> {
        let cleaned = label
            .trim()
            .trim_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
            .to_lowercase();
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str() == cleaned || e.corpus_label() == cleaned)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::from_label(s).ok_or_else(|| format!("unknown emotion label '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Danger,
    Moderate,
    Normal,
}

impl RiskLevel {
    pub fn points(&self) -> u32 {
        match self {
            RiskLevel::Danger => 3,
            RiskLevel::Moderate => 1,
            RiskLevel::Normal => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Danger => "danger",
            RiskLevel::Moderate => "moderate",
            RiskLevel::Normal => "normal",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_and_points() {
        assert_eq!(Emotion::Sadness.level().points(), 3);
        assert_eq!(Emotion::Anger.level(), RiskLevel::Danger);
        assert_eq!(Emotion::Embarrassment.level().points(), 1);
        assert_eq!(Emotion::Hurt.level(), RiskLevel::Moderate);
        assert_eq!(Emotion::Joy.level().points(), 0);
    }

    #[test]
    fn test_from_label_accepts_model_noise() {
        assert_eq!(Emotion::from_label(" Sadness.\n"), Some(Emotion::Sadness));
        assert_eq!(Emotion::from_label("ANXIETY"), Some(Emotion::Anxiety));
        assert_eq!(Emotion::from_label("\"joy\""), Some(Emotion::Joy));
    }

    #[test]
    fn test_from_label_accepts_corpus_labels() {
        assert_eq!(Emotion::from_label("불안"), Some(Emotion::Anxiety));
        assert_eq!(Emotion::from_label("당황"), Some(Emotion::Embarrassment));
    }

    #[test]
    fn test_from_label_rejects_sentences() {
        assert_eq!(Emotion::from_label("I think it is sadness"), None);
        assert!("boredom".parse::<Emotion>().is_err());
    }
}
