/// Block/pattern content model
///
/// Pages and patterns store a JSON tree of typed blocks. This module owns
/// that shape end to end:
///
/// - `block`: the `{id, blockSlug, props}` block shape and tree traversal
/// - `registry`: block schema registry and save-time validation
/// - `usage`: pattern-usage diffing and best-effort persistence

pub mod block;
pub mod registry;
pub mod usage;

pub use block::{collect_pattern_ids, Block, PATTERN_BLOCK_SLUG};
pub use registry::{is_valid_slug, validate_tree, ContentError, ContentViolation};
pub use usage::{diff_usages, sync_entity_usages, UsageDiff};
