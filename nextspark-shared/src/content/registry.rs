/// Block schema registry and save-time validation
///
/// Every block saved into page or pattern content must use a registered
/// block type, carry a unique non-empty id, and satisfy its type's prop
/// rules. Validation collects all violations rather than stopping at the
/// first, mirroring field-level request validation.
///
/// # Rules
///
/// - Content is a JSON array of block objects.
/// - `blockSlug` matches `^[a-z][a-z0-9]*(?:-[a-z0-9]+)*$` and is registered.
/// - `id` is a non-empty string, unique across the whole tree.
/// - `props`, when present, is an object.
/// - Required props per block type are present.
/// - `product-card` rejects negative `price` values.
/// - `pattern` requires `patternId` to be a UUID string.

use regex::Regex;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::sync::OnceLock;

use super::block::{is_block_object, PATTERN_BLOCK_SLUG};

/// Block slug pattern: lowercase kebab-case starting with a letter
fn block_slug_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9]*(?:-[a-z0-9]+)*$").expect("valid regex"))
}

/// Entity slug pattern (pages, patterns, teams): lowercase kebab-case
fn entity_slug_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid regex"))
}

/// Validates an entity slug (page, pattern, team)
pub fn is_valid_slug(slug: &str) -> bool {
    entity_slug_re().is_match(slug)
}

/// Schema for one registered block type
#[derive(Debug, Clone, Copy)]
pub struct BlockSpec {
    /// Registered block slug
    pub slug: &'static str,

    /// Props that must be present
    pub required_props: &'static [&'static str],
}

/// The built-in block registry
///
/// The theme layer renders exactly these types; anything else is rejected at
/// save time.
pub const BLOCK_REGISTRY: &[BlockSpec] = &[
    BlockSpec {
        slug: "hero",
        required_props: &["heading"],
    },
    BlockSpec {
        slug: "heading",
        required_props: &["text"],
    },
    BlockSpec {
        slug: "text",
        required_props: &["text"],
    },
    BlockSpec {
        slug: "image",
        required_props: &["src"],
    },
    BlockSpec {
        slug: "cta",
        required_props: &["label", "href"],
    },
    BlockSpec {
        slug: "columns",
        required_props: &[],
    },
    BlockSpec {
        slug: "product-card",
        required_props: &["title", "price"],
    },
    BlockSpec {
        slug: PATTERN_BLOCK_SLUG,
        required_props: &["patternId"],
    },
];

/// Looks up a block spec by slug
pub fn find_spec(slug: &str) -> Option<&'static BlockSpec> {
    BLOCK_REGISTRY.iter().find(|spec| spec.slug == slug)
}

/// A single validation violation with its tree path
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ContentViolation {
    /// JSON-pointer-ish path to the offending block
    pub path: String,

    /// What went wrong
    pub message: String,
}

/// Content validation error
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Content column is not a JSON array
    #[error("Content must be a JSON array of blocks")]
    NotAnArray,

    /// One or more blocks violated the schema
    #[error("Content validation failed: {} violations", .0.len())]
    Invalid(Vec<ContentViolation>),
}

/// Validates a full content tree against the registry
///
/// Collects every violation in the tree. Nested blocks inside props arrays
/// are validated with the same rules as top-level blocks; non-block values
/// inside props are left alone.
pub fn validate_tree(content: &JsonValue) -> Result<(), ContentError> {
    let items = match content.as_array() {
        Some(items) => items,
        None => return Err(ContentError::NotAnArray),
    };

    let mut violations = Vec::new();
    let mut seen_ids = HashSet::new();

    for (index, item) in items.iter().enumerate() {
        validate_value(item, &format!("/{}", index), &mut seen_ids, &mut violations);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ContentError::Invalid(violations))
    }
}

/// Recursively validates one JSON value
fn validate_value(
    value: &JsonValue,
    path: &str,
    seen_ids: &mut HashSet<String>,
    violations: &mut Vec<ContentViolation>,
) {
    match value {
        JsonValue::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                validate_value(item, &format!("{}/{}", path, index), seen_ids, violations);
            }
        }
        JsonValue::Object(obj) => {
            if is_block_object(value) {
                validate_block(obj, path, seen_ids, violations);
            }
            for (key, nested) in obj {
                validate_value(nested, &format!("{}/{}", path, key), seen_ids, violations);
            }
        }
        _ => {}
    }
}

/// Validates a single block object
fn validate_block(
    obj: &serde_json::Map<String, JsonValue>,
    path: &str,
    seen_ids: &mut HashSet<String>,
    violations: &mut Vec<ContentViolation>,
) {
    let mut push = |message: String| {
        violations.push(ContentViolation {
            path: path.to_string(),
            message,
        });
    };

    // id: non-empty, unique across the tree
    let id = obj.get("id").and_then(|v| v.as_str()).unwrap_or("");
    if id.is_empty() {
        push("Block id must be a non-empty string".to_string());
    } else if !seen_ids.insert(id.to_string()) {
        push(format!("Duplicate block id: {}", id));
    }

    // blockSlug: shape + registry membership
    let slug = obj.get("blockSlug").and_then(|v| v.as_str()).unwrap_or("");
    if !block_slug_re().is_match(slug) {
        push(format!("Invalid block slug: {:?}", slug));
        return;
    }

    let spec = match find_spec(slug) {
        Some(spec) => spec,
        None => {
            push(format!("Unknown block type: {}", slug));
            return;
        }
    };

    // props: object when present
    let props = match obj.get("props") {
        Some(JsonValue::Object(props)) => Some(props),
        Some(JsonValue::Null) | None => None,
        Some(_) => {
            push("Block props must be an object".to_string());
            None
        }
    };

    for required in spec.required_props {
        let present = props.map(|p| p.contains_key(*required)).unwrap_or(false);
        if !present {
            push(format!("Block {} is missing required prop {}", slug, required));
        }
    }

    if let Some(props) = props {
        // Type-specific value rules
        if slug == "product-card" {
            if let Some(price) = props.get("price") {
                match price.as_f64() {
                    Some(value) if value < 0.0 => {
                        push(format!("Product price must not be negative (got {})", value))
                    }
                    Some(_) => {}
                    None => push("Product price must be a number".to_string()),
                }
            }
        }

        if slug == PATTERN_BLOCK_SLUG {
            if let Some(pattern_id) = props.get("patternId") {
                let valid = pattern_id
                    .as_str()
                    .map(|s| uuid::Uuid::parse_str(s).is_ok())
                    .unwrap_or(false);
                if !valid {
                    push("patternId must be a UUID string".to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn violations(content: &JsonValue) -> Vec<ContentViolation> {
        match validate_tree(content) {
            Ok(()) => vec![],
            Err(ContentError::Invalid(v)) => v,
            Err(ContentError::NotAnArray) => panic!("expected array content"),
        }
    }

    #[test]
    fn test_valid_tree_passes() {
        let content = json!([
            {"id": "b1", "blockSlug": "hero", "props": {"heading": "Hello"}},
            {"id": "b2", "blockSlug": "columns", "props": {
                "children": [
                    {"id": "b3", "blockSlug": "text", "props": {"text": "Body"}}
                ]
            }}
        ]);

        assert!(validate_tree(&content).is_ok());
    }

    #[test]
    fn test_non_array_rejected() {
        assert!(matches!(
            validate_tree(&json!({"id": "b1"})),
            Err(ContentError::NotAnArray)
        ));
    }

    #[test]
    fn test_unknown_block_rejected() {
        let content = json!([{"id": "b1", "blockSlug": "marquee", "props": {}}]);
        let v = violations(&content);
        assert_eq!(v.len(), 1);
        assert!(v[0].message.contains("Unknown block type"));
    }

    #[test]
    fn test_bad_slug_shape_rejected() {
        let content = json!([{"id": "b1", "blockSlug": "Hero Block", "props": {}}]);
        let v = violations(&content);
        assert!(v[0].message.contains("Invalid block slug"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let content = json!([
            {"id": "b1", "blockSlug": "text", "props": {"text": "a"}},
            {"id": "b1", "blockSlug": "text", "props": {"text": "b"}}
        ]);
        let v = violations(&content);
        assert_eq!(v.len(), 1);
        assert!(v[0].message.contains("Duplicate block id"));
    }

    #[test]
    fn test_missing_required_prop() {
        let content = json!([{"id": "b1", "blockSlug": "cta", "props": {"label": "Go"}}]);
        let v = violations(&content);
        assert!(v[0].message.contains("missing required prop href"));
    }

    #[test]
    fn test_negative_price_rejected() {
        let content = json!([
            {"id": "b1", "blockSlug": "product-card", "props": {"title": "Widget", "price": -5}}
        ]);
        let v = violations(&content);
        assert!(v[0].message.contains("must not be negative"));

        let zero = json!([
            {"id": "b1", "blockSlug": "product-card", "props": {"title": "Widget", "price": 0}}
        ]);
        assert!(validate_tree(&zero).is_ok());
    }

    #[test]
    fn test_pattern_block_requires_uuid() {
        let content = json!([
            {"id": "b1", "blockSlug": "pattern", "props": {"patternId": "nope"}}
        ]);
        let v = violations(&content);
        assert!(v[0].message.contains("UUID"));
    }

    #[test]
    fn test_nested_blocks_validated() {
        let content = json!([
            {"id": "b1", "blockSlug": "columns", "props": {
                "children": [
                    {"id": "b2", "blockSlug": "marquee", "props": {}}
                ]
            }}
        ]);
        let v = violations(&content);
        assert_eq!(v.len(), 1);
        assert!(v[0].path.starts_with("/0/props/children/0"));
    }

    #[test]
    fn test_entity_slug_rules() {
        assert!(is_valid_slug("about"));
        assert!(is_valid_slug("about-us-2024"));
        assert!(!is_valid_slug("About"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("trailing-"));
        assert!(!is_valid_slug("double--dash"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("spaced slug"));
    }
}
