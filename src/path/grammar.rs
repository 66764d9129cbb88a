use serde_json::Value;

/// The reserved array-relative token. Substituted with the index of the last
/// element of the root `chat` array before any other parsing happens.
pub const LAST_TOKEN: &str = "[last]";

/// One traversal step of a parsed context path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Plain identifier segment (`mes` in `chat[0].mes`).
    Key(String),
    /// Bracket index segment (`0` in `chat[0].mes`).
    Index(usize),
}

/// Substitute every `[last]` occurrence with the final index of the root
/// `chat` array, yielding the canonical path string.
///
/// Returns `None` when the path uses `[last]` but the context has no
/// non-empty `chat` array to index into; no substitution is attempted.
pub fn expand_last(path: &str, ctx: &Value) -> Option<String> {
    if !path.contains(LAST_TOKEN) {
        return Some(path.to_string());
    }
    let chat = ctx.get("chat")?.as_array()?;
    if chat.is_empty() {
        return None;
    }
    Some(path.replace(LAST_TOKEN, &format!("[{}]", chat.len() - 1)))
}

/// Tokenize a canonical path (no `[last]` remaining) into traversal steps.
///
/// The path is split on `.`; each segment may carry trailing `[N]` groups,
/// so `chat[0][2]` becomes `Key(chat), Index(0), Index(2)`. A segment whose
/// bracket groups are not plain non-negative integers is kept as one literal
/// key and will simply match nothing at traversal time.
pub fn parse_steps(path: &str) -> Vec<Step> {
    path.split('.').flat_map(segment_steps).collect()
}

fn segment_steps(segment: &str) -> Vec<Step> {
    match split_brackets(segment) {
        Some((base, indices)) => {
            let mut steps = Vec::with_capacity(indices.len() + 1);
            if !base.is_empty() {
                steps.push(Step::Key(base.to_string()));
            }
            steps.extend(indices.into_iter().map(Step::Index));
            steps
        }
        None => vec![Step::Key(segment.to_string())],
    }
}

/// Split `name[1][2]` into (`name`, `[1, 2]`). `None` when the segment does
/// not have that exact shape.
fn split_brackets(segment: &str) -> Option<(&str, Vec<usize>)> {
    let open = segment.find('[')?;
    let (base, mut rest) = segment.split_at(open);
    let mut indices = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        let digits = &inner[..close];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        indices.push(digits.parse().ok()?);
        rest = &inner[close + 1..];
    }
    Some((base, indices))
}
