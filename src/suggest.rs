//! Path-continuation suggestions driven by a context skeleton.

use crate::skeleton::{Skeleton, ValueKind};

/// Valid next path segments for `partial`.
///
/// An empty `partial` lists the skeleton's top-level keys in enumeration
/// order. Otherwise the cumulative dotted prefix is looked up literally at
/// each level (no fuzzy matching on a half-typed final segment) and the
/// first miss or non-object hit yields no suggestions. On success the child
/// keys of the terminal object node are returned.
pub fn suggest(skeleton: &Skeleton, partial: &str) -> Vec<String> {
    if partial.is_empty() {
        return skeleton.keys().cloned().collect();
    }
    let parts: Vec<&str> = partial.split('.').collect();
    let mut current = skeleton;
    for i in 0..parts.len() {
        let cumulative = parts[..=i].join(".");
        match current.get(&cumulative) {
            Some(node) if node.kind == ValueKind::Object => current = &node.children,
            _ => return Vec::new(),
        }
    }
    current.keys().cloned().collect()
}
