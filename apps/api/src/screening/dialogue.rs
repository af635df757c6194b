//! Empathetic bridge between one screening answer and the next question.

use tracing::warn;

use crate::llm_client::{LlmClient, CHAT_MODEL};
use crate::screening::prompts::EMPATHY_SYSTEM;

const EMPATHY_TEMPERATURE: f32 = 0.7;

/// Briefly empathises with `answer` and asks `next_question`, as one paragraph.
/// Falls back to the bare question when the model call fails.
pub async fn generate_empathetic_response_and_ask_question(
    llm: &LlmClient,
    answer: &str,
    next_question: &str,
) -> String {
    let system = EMPATHY_SYSTEM.replace("{next_question}", next_question);

    match llm
        .complete(CHAT_MODEL, &system, answer, EMPATHY_TEMPERATURE, None)
        .await
    {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Empathetic response failed, asking the question directly: {e}");
            next_question.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::test_support::chat_body;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_next_question_is_embedded_in_system_prompt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::Regex("Have you been feeling tired".to_string()))
            .with_status(200)
            .with_body(chat_body(
                "That sounds exhausting. Have you been feeling tired lately?",
            ))
            .create_async()
            .await;

        let llm = LlmClient::new("k".to_string(), &server.url()).unwrap();
        let reply = generate_empathetic_response_and_ask_question(
            &llm,
            "I barely sleep",
            "Have you been feeling tired or having little energy?",
        )
        .await;

        assert_eq!(
            reply,
            "That sounds exhausting. Have you been feeling tired lately?"
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_question() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(403)
            .create_async()
            .await;

        let llm = LlmClient::new("k".to_string(), &server.url()).unwrap();
        let reply =
            generate_empathetic_response_and_ask_question(&llm, "meh", "Next question?").await;
        assert_eq!(reply, "Next question?");
    }
}
