//! Context path expressions: `chat[last].mes`, `characters[0].name`, ...
//!
//! Resolution is a two-stage pipeline: a reserved-token substitution pass
//! that produces a canonical path string, then a tokenizer parse into
//! key/index steps walked against the live context. Every failure mode maps
//! to `None`; callers never see an error.

mod grammar;

pub use grammar::{LAST_TOKEN, Step, expand_last, parse_steps};

use serde_json::Value;
use tracing::trace;

/// Resolve `path` against `ctx`, returning the raw value at the terminal
/// step.
///
/// `None` covers every not-found condition: missing keys, null or absent
/// intermediates, out-of-range indices, indexing into scalars, and `[last]`
/// when the root `chat` array is missing or empty. Nothing here panics or
/// propagates an error.
pub fn resolve<'a>(ctx: &'a Value, path: &str) -> Option<&'a Value> {
    let canonical = match expand_last(path, ctx) {
        Some(canonical) => canonical,
        None => {
            trace!(path, "cannot expand [last]: no usable chat array");
            return None;
        }
    };
    let mut current = ctx;
    for step in parse_steps(&canonical) {
        match apply_step(current, &step) {
            Some(next) => current = next,
            None => {
                trace!(path, ?step, "path step matched nothing");
                return None;
            }
        }
    }
    Some(current)
}

/// Index one level down. Bracket indices address array positions but fall
/// back to decimal string keys on objects; dot keys address object fields
/// but are accepted as positions on arrays.
fn apply_step<'a>(value: &'a Value, step: &Step) -> Option<&'a Value> {
    match (value, step) {
        (Value::Object(map), Step::Key(k)) => map.get(k),
        (Value::Object(map), Step::Index(i)) => map.get(&i.to_string()),
        (Value::Array(items), Step::Index(i)) => items.get(*i),
        (Value::Array(items), Step::Key(k)) => items.get(k.parse::<usize>().ok()?),
        _ => None,
    }
}
