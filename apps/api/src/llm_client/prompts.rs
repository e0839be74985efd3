// Shared prompt fragments.
// Each task's full prompt lives in extraction::prompts; only cross-cutting pieces are here.

/// Closing instruction appended to every extraction system prompt.
pub const JSON_ONLY_INSTRUCTION: &str = "\
Return ONLY valid JSON. \
Do NOT use markdown code fences. \
Do NOT include any text, explanations or apologies outside the JSON object.";

/// How missing information must be represented.
pub const NULL_WHEN_MISSING: &str = "\
If a piece of information is not stated in the text, use null for that field. \
Do NOT guess or invent values.";
