/// Pattern-usage tracking
///
/// On every page save, the set of pattern ids referenced by the new block
/// tree is diffed against the previously recorded usage rows. Added ids are
/// inserted and removed ids deleted, each with a single bulk statement.
///
/// Tracking is best-effort: any failure is logged and swallowed so the
/// primary entity save never fails or blocks on it.

use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::collections::HashSet;
use tracing::warn;
use uuid::Uuid;

use super::block::collect_pattern_ids;
use crate::models::pattern_usage::PatternUsage;

/// Result of diffing current references against recorded ones
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageDiff {
    /// Pattern ids referenced now but not recorded yet
    pub added: Vec<Uuid>,

    /// Pattern ids recorded but no longer referenced
    pub removed: Vec<Uuid>,
}

impl UsageDiff {
    /// Whether there is nothing to persist
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Computes the set difference between current and previously recorded ids
pub fn diff_usages(current: &HashSet<Uuid>, previous: &HashSet<Uuid>) -> UsageDiff {
    let added: Vec<Uuid> = current.difference(previous).copied().collect();
    let removed: Vec<Uuid> = previous.difference(current).copied().collect();

    UsageDiff { added, removed }
}

/// Synchronizes usage rows for an entity after a content save
///
/// Best-effort and non-blocking for the caller: errors are logged via
/// `tracing::warn!` and never returned.
pub async fn sync_entity_usages(
    pool: &PgPool,
    team_id: Uuid,
    entity_type: &str,
    entity_id: Uuid,
    content: &JsonValue,
) {
    if let Err(e) = sync_inner(pool, team_id, entity_type, entity_id, content).await {
        warn!(
            entity_type,
            entity_id = %entity_id,
            error = %e,
            "Pattern usage tracking failed; entity save unaffected"
        );
    }
}

/// Removes all usage rows for a deleted entity, best-effort
pub async fn clear_entity_usages(pool: &PgPool, entity_type: &str, entity_id: Uuid) {
    if let Err(e) = PatternUsage::delete_for_entity(pool, entity_type, entity_id).await {
        warn!(
            entity_type,
            entity_id = %entity_id,
            error = %e,
            "Pattern usage cleanup failed"
        );
    }
}

async fn sync_inner(
    pool: &PgPool,
    team_id: Uuid,
    entity_type: &str,
    entity_id: Uuid,
    content: &JsonValue,
) -> Result<(), sqlx::Error> {
    let current = collect_pattern_ids(content);
    let previous: HashSet<Uuid> = PatternUsage::pattern_ids_for_entity(pool, entity_type, entity_id)
        .await?
        .into_iter()
        .collect();

    let diff = diff_usages(&current, &previous);
    if diff.is_empty() {
        return Ok(());
    }

    PatternUsage::insert_many(pool, team_id, entity_type, entity_id, &diff.added).await?;
    PatternUsage::delete_many(pool, entity_type, entity_id, &diff.removed).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[Uuid]) -> HashSet<Uuid> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_diff_added_and_removed() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        let diff = diff_usages(&set(&[a, b]), &set(&[b, c]));

        assert_eq!(diff.added, vec![a]);
        assert_eq!(diff.removed, vec![c]);
        assert!(!diff.is_empty());
    }

    #[test]
    fn test_diff_identical_sets_is_empty() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let diff = diff_usages(&set(&[a, b]), &set(&[a, b]));
        assert!(diff.is_empty());
    }

    #[test]
    fn test_diff_from_empty() {
        let a = Uuid::new_v4();

        let diff = diff_usages(&set(&[a]), &set(&[]));
        assert_eq!(diff.added, vec![a]);
        assert!(diff.removed.is_empty());

        let diff = diff_usages(&set(&[]), &set(&[a]));
        assert!(diff.added.is_empty());
        assert_eq!(diff.removed, vec![a]);
    }
}
