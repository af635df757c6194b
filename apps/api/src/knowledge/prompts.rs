// Knowledge base LLM prompt templates.

/// Rewrites a follow-up question into a standalone one.
pub const CONTEXTUALIZE_QUESTION_SYSTEM: &str = "Given the conversation so far and the latest \
user question, which may refer to earlier turns, rewrite it as a standalone question that can be \
understood without the conversation. Do NOT answer the question. Return only the rewritten \
question, or the question unchanged if it is already standalone.";

/// Answers from retrieved context. Replace: {context}
pub const QA_SYSTEM: &str = r#"You are a helpful assistant answering questions about depression and mental health.
Use the retrieved context below to answer the question. If the answer is not in the context, say that you don't know.
Keep the answer to three sentences at most.

# Context
{context}"#;
