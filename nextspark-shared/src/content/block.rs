/// Block shape and tree traversal
///
/// A block is a typed content unit:
///
/// ```json
/// {"id": "b1", "blockSlug": "hero", "props": {"heading": "Hello"}}
/// ```
///
/// Children nest inside `props` as arrays of block objects, so a page's
/// `content` column is a tree: a top-level JSON array of blocks whose props
/// may contain further block arrays at any depth.
///
/// A pattern reference is a block with `blockSlug == "pattern"` whose props
/// carry the referenced pattern's UUID under `patternId`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;
use uuid::Uuid;

/// Block slug marking a pattern reference
pub const PATTERN_BLOCK_SLUG: &str = "pattern";

/// A single typed content block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Unique id within the tree
    pub id: String,

    /// Registered block type
    #[serde(rename = "blockSlug")]
    pub block_slug: String,

    /// Block-specific properties (may contain nested block arrays)
    #[serde(default)]
    pub props: JsonValue,
}

impl Block {
    /// For pattern blocks, the referenced pattern id
    pub fn pattern_id(&self) -> Option<Uuid> {
        if self.block_slug != PATTERN_BLOCK_SLUG {
            return None;
        }

        self.props
            .get("patternId")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
    }
}

/// Whether a JSON value has the block object shape
///
/// A block object is a JSON object with string `id` and `blockSlug` fields.
pub fn is_block_object(value: &JsonValue) -> bool {
    match value.as_object() {
        Some(obj) => {
            obj.get("id").map(|v| v.is_string()).unwrap_or(false)
                && obj.get("blockSlug").map(|v| v.is_string()).unwrap_or(false)
        }
        None => false,
    }
}

/// Visits every block object in a content tree, depth first
///
/// The visitor receives the raw JSON object so callers can inspect fields the
/// typed [`Block`] shape doesn't model.
pub fn walk_blocks<F>(content: &JsonValue, visit: &mut F)
where
    F: FnMut(&Map<String, JsonValue>),
{
    match content {
        JsonValue::Array(items) => {
            for item in items {
                walk_blocks(item, visit);
            }
        }
        JsonValue::Object(obj) => {
            if is_block_object(content) {
                visit(obj);
            }
            // Nested blocks live inside props (or arbitrary object values)
            for value in obj.values() {
                walk_blocks(value, visit);
            }
        }
        _ => {}
    }
}

/// Collects the set of pattern ids referenced anywhere in a content tree
///
/// Duplicate references collapse into one entry; malformed `patternId`
/// values are ignored.
pub fn collect_pattern_ids(content: &JsonValue) -> HashSet<Uuid> {
    let mut ids = HashSet::new();

    walk_blocks(content, &mut |obj| {
        let is_pattern = obj
            .get("blockSlug")
            .and_then(|v| v.as_str())
            .map(|s| s == PATTERN_BLOCK_SLUG)
            .unwrap_or(false);

        if is_pattern {
            if let Some(id) = obj
                .get("props")
                .and_then(|p| p.get("patternId"))
                .and_then(|v| v.as_str())
                .and_then(|s| Uuid::parse_str(s).ok())
            {
                ids.insert(id);
            }
        }
    });

    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_serde_shape() {
        let block: Block = serde_json::from_value(json!({
            "id": "b1",
            "blockSlug": "hero",
            "props": {"heading": "Hello"}
        }))
        .unwrap();

        assert_eq!(block.id, "b1");
        assert_eq!(block.block_slug, "hero");

        let round = serde_json::to_value(&block).unwrap();
        assert_eq!(round["blockSlug"], "hero");
    }

    #[test]
    fn test_block_props_default() {
        let block: Block =
            serde_json::from_value(json!({"id": "b1", "blockSlug": "text"})).unwrap();
        assert!(block.props.is_null());
    }

    #[test]
    fn test_pattern_id_extraction() {
        let pattern_id = Uuid::new_v4();
        let block: Block = serde_json::from_value(json!({
            "id": "b1",
            "blockSlug": "pattern",
            "props": {"patternId": pattern_id.to_string()}
        }))
        .unwrap();

        assert_eq!(block.pattern_id(), Some(pattern_id));

        let not_pattern: Block = serde_json::from_value(json!({
            "id": "b2",
            "blockSlug": "hero",
            "props": {"patternId": pattern_id.to_string()}
        }))
        .unwrap();
        assert_eq!(not_pattern.pattern_id(), None);
    }

    #[test]
    fn test_collect_pattern_ids_nested_and_deduped() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();

        let content = json!([
            {"id": "b1", "blockSlug": "pattern", "props": {"patternId": p1.to_string()}},
            {"id": "b2", "blockSlug": "columns", "props": {
                "children": [
                    {"id": "b3", "blockSlug": "pattern", "props": {"patternId": p2.to_string()}},
                    // Duplicate reference collapses
                    {"id": "b4", "blockSlug": "pattern", "props": {"patternId": p1.to_string()}},
                ]
            }},
            {"id": "b5", "blockSlug": "text", "props": {"text": "hi"}}
        ]);

        let ids = collect_pattern_ids(&content);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&p1));
        assert!(ids.contains(&p2));
    }

    #[test]
    fn test_collect_ignores_malformed_ids() {
        let content = json!([
            {"id": "b1", "blockSlug": "pattern", "props": {"patternId": "not-a-uuid"}},
            {"id": "b2", "blockSlug": "pattern", "props": {}}
        ]);

        assert!(collect_pattern_ids(&content).is_empty());
    }

    #[test]
    fn test_walk_blocks_visits_all() {
        let content = json!([
            {"id": "a", "blockSlug": "columns", "props": {
                "left": [{"id": "b", "blockSlug": "text", "props": {}}],
                "right": [{"id": "c", "blockSlug": "text", "props": {}}]
            }}
        ]);

        let mut seen = Vec::new();
        walk_blocks(&content, &mut |obj| {
            seen.push(obj["id"].as_str().unwrap().to_string());
        });

        assert_eq!(seen.len(), 3);
        assert!(seen.contains(&"a".to_string()));
        assert!(seen.contains(&"b".to_string()));
        assert!(seen.contains(&"c".to_string()));
    }
}
