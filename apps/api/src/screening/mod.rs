// Screening conversation: PHQ-9 questions, per-answer emotion scoring,
// narrative scoring and the session state machine.
// All LLM calls go through llm_client.

pub mod classifier;
pub mod corpus;
pub mod dialogue;
pub mod emotion;
pub mod handlers;
pub mod narrative;
pub mod prompts;
pub mod questions;
pub mod session;
pub mod store;
