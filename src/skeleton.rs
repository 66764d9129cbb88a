//! Structural skeletons: a flattened, ordered map describing each reachable
//! field of a context object.
//!
//! Skeletons drive path suggestion; they are built fresh on demand and must
//! not be cached across context mutations.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Mapping from declared path to descriptor, in the context's own field
/// order.
pub type Skeleton = IndexMap<String, SkeletonNode>;

/// What a context field looks like, for suggestion purposes. Arrays are
/// opaque leaves; their elements are never expanded into per-index entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Primitive,
    Object,
    Array,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkeletonNode {
    pub kind: ValueKind,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub children: Skeleton,
}

impl SkeletonNode {
    fn leaf(kind: ValueKind) -> Self {
        Self { kind, children: Skeleton::new() }
    }
}

/// Build the structural map of `value`.
///
/// Object fields recurse with the prefix reset, so nested levels carry
/// unqualified child names. A non-object root has no enumerable fields and
/// yields an empty skeleton.
pub fn build_skeleton(value: &Value) -> Skeleton {
    build_prefixed(value, "")
}

fn build_prefixed(value: &Value, prefix: &str) -> Skeleton {
    let mut skeleton = Skeleton::new();
    let Value::Object(fields) = value else {
        return skeleton;
    };
    for (key, field) in fields {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        let node = match field {
            Value::Array(_) => SkeletonNode::leaf(ValueKind::Array),
            Value::Object(_) => SkeletonNode {
                kind: ValueKind::Object,
                children: build_prefixed(field, ""),
            },
            _ => SkeletonNode::leaf(ValueKind::Primitive),
        };
        skeleton.insert(path, node);
    }
    skeleton
}
