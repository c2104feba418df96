//! Strip incidental formatting from a model reply.

const FENCE: &str = "```";

/// Remove a surrounding fenced code block (optionally tagged `json`) and
/// surrounding whitespace. Anything else is returned untouched.
///
/// Sanitizing already-clean text is a no-op.
pub fn sanitize_response(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        text = strip_json_tag(rest);
    }
    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest;
    }

    text.trim()
}

/// Drop a `json` language tag directly after an opening fence.
fn strip_json_tag(after_fence: &str) -> &str {
    let tagged = after_fence
        .get(..4)
        .is_some_and(|tag| tag.eq_ignore_ascii_case("json"));
    if !tagged {
        return after_fence;
    }
    let rest = &after_fence[4..];
    // `jsonl`, `json5`, ...: not our tag.
    match rest.chars().next() {
        None => rest,
        Some(c) if c.is_whitespace() => rest,
        Some(_) => after_fence,
    }
}
