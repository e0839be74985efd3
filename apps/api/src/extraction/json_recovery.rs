//! Response sanitizing and JSON recovery.
//!
//! Models are asked for bare JSON but often wrap it in a ```json fence or add a
//! sentence before or after. Recovery is deliberately shallow: isolate a
//! candidate payload, parse it strictly, and if that fails retry once on the
//! outermost `{ ... }` span. Broken JSON syntax is never repaired.

use serde_json::Value;

use crate::extraction::error::ExtractionError;

const FENCE: &str = "```";

/// Isolates and parses the JSON payload carried by a raw model response.
///
/// The sanitized candidate is parsed strictly first; only when that fails is
/// the outermost `{ ... }` span tried. A candidate with no brace pair at all is
/// `NoJsonFound`, even if it parses as a scalar. Anything else that parses is
/// returned as-is and left for the normalizer to accept or reject.
pub fn extract_json(raw: &str) -> Result<Value, ExtractionError> {
    let candidate = sanitize(raw);
    let span = outermost_braces(candidate);

    match serde_json::from_str::<Value>(candidate) {
        Ok(value) if span.is_some() => Ok(value),
        Ok(_) => Err(ExtractionError::NoJsonFound {
            raw: raw.to_string(),
        }),
        Err(_) => {
            let Some(span) = span else {
                return Err(ExtractionError::NoJsonFound {
                    raw: raw.to_string(),
                });
            };
            serde_json::from_str::<Value>(span).map_err(|e| ExtractionError::MalformedJson {
                reason: e.to_string(),
                raw: raw.to_string(),
            })
        }
    }
}

/// Strips wrapper artifacts: the interior of the first ```json fence, else the
/// interior of the first fence of any kind, else the trimmed text itself.
pub fn sanitize(raw: &str) -> &str {
    let text = raw.trim();
    json_fence_body(text)
        .or_else(|| any_fence_body(text))
        .unwrap_or(text)
}

fn json_fence_body(text: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find(FENCE) {
        let open = search_from + offset;
        let after = &text[open + FENCE.len()..];
        if after
            .get(..4)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("json"))
            && !after[4..].starts_with(|c: char| c.is_ascii_alphanumeric())
        {
            return Some(fence_interior(&after[4..]));
        }
        // Skip past this fence's closing marker so a later json fence is found
        // without mistaking a closing fence for an opening one.
        let close = after.find(FENCE)?;
        search_from = open + FENCE.len() + close + FENCE.len();
    }
    None
}

fn any_fence_body(text: &str) -> Option<&str> {
    let open = text.find(FENCE)?;
    let after = &text[open + FENCE.len()..];
    Some(fence_interior(strip_info_string(after)))
}

/// Everything up to the closing fence, or to the end when the model was cut off.
fn fence_interior(after_open: &str) -> &str {
    let body = match after_open.find(FENCE) {
        Some(close) => &after_open[..close],
        None => after_open,
    };
    body.trim()
}

/// Drops a language tag such as `javascript` that sits alone on the opening line.
fn strip_info_string(after_open: &str) -> &str {
    let (first_line, rest) = match after_open.find('\n') {
        Some(nl) => (&after_open[..nl], &after_open[nl + 1..]),
        None => return after_open,
    };
    let is_tag = first_line
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '.'));
    if is_tag {
        rest
    } else {
        after_open
    }
}

/// The substring from the first `{` to the last `}`, if both exist in that order.
fn outermost_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
