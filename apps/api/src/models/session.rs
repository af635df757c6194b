use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a screening session is in its progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    UserInfoGathering,
    ScreeningQuestions,
    NarrativeInput,
    FinalAnalysis,
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::UserInfoGathering => "user_info_gathering",
            Phase::ScreeningQuestions => "screening_questions",
            Phase::NarrativeInput => "narrative_input",
            Phase::FinalAnalysis => "final_analysis",
            Phase::Finished => "finished",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of a conversation. Serializes to the chat-completions message shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Demographics collected by the intake form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub gender: Gender,
    #[serde(default)]
    pub age: Option<u8>,
    /// Main symptoms in the user's own words.
    #[serde(default)]
    pub symptoms: String,
    /// Related medical history; empty when there is none.
    #[serde(default)]
    pub history: String,
}

impl UserProfile {
    /// Name used in file names and headers; falls back to "user".
    pub fn display_name(&self) -> &str {
        let name = self.name.trim();
        if name.is_empty() {
            "user"
        } else {
            name
        }
    }
}
