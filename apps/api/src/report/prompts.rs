// All LLM prompt constants for the report module.
// Reuses cross-cutting fragments from llm_client::prompts.

pub const FINAL_ANALYSIS_SYSTEM: &str = "You are a supportive mental health counsellor writing \
the closing summary of a depression self-screening conversation. Write in clear, warm markdown.";

/// Final analysis prompt.
/// Replace: {non_diagnostic}, {user_json}, {severity_title}, {total_score}, {context}
pub const FINAL_ANALYSIS_PROMPT: &str = r#"{non_diagnostic}

USER INFORMATION AND SCREENING RESULTS:
{user_json}

SEVERITY BAND: {severity_title} (total score {total_score})

REFERENCE MATERIAL (use it to ground explanations and suggestions; do not quote it verbatim):
{context}

Write the body of the report in markdown with these sections:
### What we noticed
Two to four sentences reflecting the user's main symptoms, answers and diary entry back to them.
### Understanding your results
Explain what the severity band means, using the reference material.
### Suggestions
Three to five concrete, gentle self-care or help-seeking suggestions tailored to the user.
If the severity band is "At risk of depression", the FIRST suggestion must be to consult a mental health professional.

Do NOT repeat the user's name or score in a heading; a header is added separately."#;

pub const REPORT_SUMMARY_SYSTEM: &str =
    "You are a clinical documentation assistant preparing a printable screening summary.";

/// Report summary prompt. Replace: {json_only}, {non_diagnostic}, {user_json}, {report_body}
pub const REPORT_SUMMARY_PROMPT: &str = r#"Summarise this self-screening for a printable one-page document.

{non_diagnostic}

USER INFORMATION AND SCREENING RESULTS:
{user_json}

FULL REPORT SHOWN TO THE USER:
{report_body}

Return a JSON object with this EXACT schema:
{
  "summary": "Three to four sentence overall assessment.",
  "key_findings": ["Short finding", "Short finding"],
  "recommendations": ["Short recommendation", "Short recommendation"]
}

{json_only}"#;
