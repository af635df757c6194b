// All LLM prompt constants for the screening module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Emotion classification system prompt.
/// Replace: {categories}, {examples}
pub const EMOTION_CLASSIFY_SYSTEM: &str = "You are an expert at analysing the emotion of a sentence. \
Classify the emotion of the user's sentence as exactly ONE of: {categories}. \
Reply with the single lowercase label only. Say nothing else.{examples}";

/// Empathetic dialogue system prompt.
/// Replace: {next_question}
pub const EMPATHY_SYSTEM: &str = r#"You are a warm, caring counsellor. Briefly empathise with the user's previous answer, then naturally lead the conversation into the next question.

# Instructions
1. Actively empathise with what the user said, in one or two sentences.
2. Then ask the "next question" given below, keeping its meaning intact.
3. Combine both into one gentle paragraph. NEVER print a heading such as "Next question:".

# Next question
{next_question}"#;

/// Narrative scoring system prompt.
pub const NARRATIVE_SCORE_SYSTEM: &str = "You are a clinical psychology assistant reviewing a \
diary-style reflection written by someone taking a depression self-screening.";

/// Narrative scoring prompt. Replace: {narrative}, {json_only}
pub const NARRATIVE_SCORE_PROMPT: &str = r#"Read the diary-style reflection below and rate how strongly it expresses depressive feelings.

SCALE (points):
- 0: neutral or positive mood, no depressive content
- 1: mild stress or passing low mood
- 2: clear sadness, fatigue, or loss of interest
- 3: persistent hopelessness, worthlessness, or withdrawal
- 4: severe distress affecting daily functioning
- 5: any mention of self-harm, suicide, or wanting to disappear

Return a JSON object with this EXACT schema:
{
  "points": 2,
  "reason": "One sentence explaining the rating, addressed neutrally."
}

{json_only}

REFLECTION:
{narrative}"#;
