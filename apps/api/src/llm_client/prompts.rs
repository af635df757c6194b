// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt that produces text shown to the user about their results.
pub const NON_DIAGNOSTIC_INSTRUCTION: &str = "\
    IMPORTANT: This is a self-screening aid, not a medical diagnosis. \
    Never state that the user has or does not have a disorder. \
    Use supportive, non-judgemental language. \
    If the user mentions self-harm or suicidal thoughts, gently encourage them to \
    contact a mental health professional or a local crisis line right away.";

/// Fills `{key}` placeholders in one pass. Substituted values are never
/// scanned again, so user text containing `{context}` stays literal.
/// Unknown placeholders are left as written.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let matched = vars
            .iter()
            .find(|(key, _)| tail.starts_with(key) && tail[key.len()..].starts_with('}'));
        match matched {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}
