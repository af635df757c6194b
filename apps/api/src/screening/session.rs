//! Screening session: the phase progression and score accumulation for one user.
//!
//! Flow: user_info_gathering → screening_questions → narrative_input →
//!       final_analysis → finished.
//!
//! Every transition is checked here; handlers only orchestrate model calls
//! around these methods.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::{ChatMessage, Phase, UserProfile};
use crate::report::summary::ReportData;
use crate::report::FinalReport;
use crate::screening::emotion::{Emotion, RiskLevel};
use crate::screening::narrative::NarrativeScore;
use crate::screening::questions::{sample_questions, NARRATIVE_PROMPT};

const MAX_AGE: u8 = 120;

/// Result of scoring a single screening answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerAnalysis {
    pub emotion: Emotion,
    pub level: RiskLevel,
    pub points: u32,
    pub total_score: u32,
    /// Human-readable one-liner, e.g. "Emotion: sadness (danger), +3 points (total: 6)".
    pub summary: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub phase: Phase,
    pub profile: Option<UserProfile>,
    pub questions: Vec<String>,
    pub question_index: usize,
    pub score: u32,
    /// Score from the screening questions alone, frozen when the narrative arrives.
    pub question_score: Option<u32>,
    pub narrative: Option<String>,
    pub narrative_score: Option<NarrativeScore>,
    pub answers: Vec<AnswerAnalysis>,
    pub messages: Vec<ChatMessage>,
    pub report: Option<FinalReport>,
    pub report_data: Option<ReportData>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, question_count: usize) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            phase: Phase::UserInfoGathering,
            profile: None,
            questions: sample_questions(rng, question_count),
            question_index: 0,
            score: 0,
            question_score: None,
            narrative: None,
            narrative_score: None,
            answers: Vec::new(),
            messages: Vec::new(),
            report: None,
            report_data: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn require_phase(&self, expected: Phase, operation: &'static str) -> Result<(), AppError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(AppError::InvalidPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Records the intake form and opens the chat with the first question.
    /// Returns the first question.
    pub fn submit_profile(&mut self, profile: UserProfile) -> Result<String, AppError> {
        self.require_phase(Phase::UserInfoGathering, "submit_profile")?;
        validate_profile(&profile)?;

        let first = self
            .questions
            .first()
            .cloned()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("session has no questions")))?;

        self.profile = Some(profile);
        self.phase = Phase::ScreeningQuestions;
        self.messages.push(ChatMessage::assistant(first.clone()));
        self.touch();
        Ok(first)
    }

    /// The question currently awaiting an answer, if any remain.
    pub fn current_question(&self) -> Option<&str> {
        self.questions.get(self.question_index).map(String::as_str)
    }

    pub fn is_test_finished(&self) -> bool {
        self.question_index >= self.questions.len()
    }

    pub fn answered_count(&self) -> usize {
        self.question_index.min(self.questions.len())
    }

    /// Validates an answer before any model call is spent on it.
    pub fn check_answer(&self, answer: &str) -> Result<(), AppError> {
        self.require_phase(Phase::ScreeningQuestions, "answer_question")?;
        if answer.trim().is_empty() {
            return Err(AppError::Validation("answer cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Scores a classified answer and advances to the next question.
    /// When the last question is answered the session moves to narrative input.
    pub fn record_answer(
        &mut self,
        answer: &str,
        emotion: Emotion,
    ) -> Result<AnswerAnalysis, AppError> {
        self.check_answer(answer)?;

        let level = emotion.level();
        let points = level.points();
        self.score += points;
        self.question_index += 1;
        self.messages.push(ChatMessage::user(answer.trim()));

        let analysis = AnswerAnalysis {
            emotion,
            level,
            points,
            total_score: self.score,
            summary: format!(
                "Emotion: {emotion} ({level}), +{points} points (total: {})",
                self.score
            ),
        };
        self.answers.push(analysis.clone());

        if self.is_test_finished() {
            self.phase = Phase::NarrativeInput;
            self.messages.push(ChatMessage::assistant(NARRATIVE_PROMPT));
        }
        self.touch();
        Ok(analysis)
    }

    /// Appends the assistant's reply that leads into the next question.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
        self.touch();
    }

    pub fn check_narrative(&self, text: &str) -> Result<(), AppError> {
        self.require_phase(Phase::NarrativeInput, "submit_narrative")?;
        if text.trim().is_empty() {
            return Err(AppError::Validation("narrative cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Adds the narrative points to the running score and moves to final analysis.
    pub fn record_narrative(&mut self, text: &str, scored: NarrativeScore) -> Result<(), AppError> {
        self.check_narrative(text)?;

        self.question_score = Some(self.score);
        self.score += u32::from(scored.points);
        self.narrative = Some(text.trim().to_string());
        self.narrative_score = Some(scored);
        self.messages.push(ChatMessage::user(text.trim()));
        self.phase = Phase::FinalAnalysis;
        self.touch();
        Ok(())
    }

    /// Stores the final report, adds it to the transcript and finishes the session.
    pub fn finish(&mut self, report: FinalReport) -> Result<(), AppError> {
        self.require_phase(Phase::FinalAnalysis, "generate_report")?;
        self.messages.push(ChatMessage::assistant(report.full_text()));
        self.report = Some(report);
        self.phase = Phase::Finished;
        self.touch();
        Ok(())
    }
}

fn validate_profile(profile: &UserProfile) -> Result<(), AppError> {
    if profile.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if let Some(age) = profile.age {
        if age == 0 || age > MAX_AGE {
            return Err(AppError::Validation(format!(
                "age must be between 1 and {MAX_AGE}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::models::session::Gender;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    pub fn profile() -> UserProfile {
        UserProfile {
            name: "Alex".to_string(),
            gender: Gender::Female,
            age: Some(29),
            symptoms: "Trouble sleeping and low energy".to_string(),
            history: String::new(),
        }
    }

    pub fn session() -> Session {
        Session::new(&mut StdRng::seed_from_u64(3), 5)
    }

    /// A session that has answered every question with `emotion`.
    pub fn answered(emotion: Emotion) -> Session {
        let mut s = session();
        s.submit_profile(profile()).unwrap();
        while !s.is_test_finished() {
            s.record_answer("answer", emotion).unwrap();
        }
        s
    }
}
