/// Page handler node
///
/// Supported verbs: `create`, `list`, `publish`.

use anyhow::{anyhow, Context as _};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use nextspark_shared::content::usage::sync_entity_usages;
use nextspark_shared::models::page::{CreatePage, Page};

use crate::intent::Intent;

use super::{ConversationContext, HandlerOutcome};

/// Handles a page intent, converting any failure into a uniform outcome
pub async fn handle(pool: &PgPool, ctx: &ConversationContext, intent: &Intent) -> HandlerOutcome {
    HandlerOutcome::from_result(run(pool, ctx, intent).await, "page")
}

async fn run(
    pool: &PgPool,
    ctx: &ConversationContext,
    intent: &Intent,
) -> anyhow::Result<HandlerOutcome> {
    match intent.verb() {
        "create" => create(pool, ctx, intent).await,
        "list" => list(pool, ctx, intent).await,
        "publish" => publish(pool, ctx, intent).await,
        verb => Ok(HandlerOutcome::failure(
            format!("I don't know how to {} a page.", verb),
            format!("unsupported page verb: {}", verb),
        )),
    }
}

async fn create(
    pool: &PgPool,
    ctx: &ConversationContext,
    intent: &Intent,
) -> anyhow::Result<HandlerOutcome> {
    let title = match intent.param_str("title") {
        Some(title) if !title.trim().is_empty() => title.trim().to_string(),
        _ => {
            return Ok(HandlerOutcome::failure(
                "I need a title to create a page.",
                "missing parameter: title",
            ))
        }
    };

    let slug = intent
        .param_str("slug")
        .map(str::to_string)
        .unwrap_or_else(|| slugify(&title));

    let content = intent
        .parameters
        .get("content")
        .cloned()
        .unwrap_or_else(|| json!([]));

    let page = Page::create(
        pool,
        CreatePage {
            team_id: ctx.team_id,
            author_id: ctx.user_id,
            title: title.clone(),
            slug: slug.clone(),
            content,
        },
    )
    .await
    .context("creating page")?;

    // Best-effort pattern reference tracking, same as the REST route
    sync_entity_usages(pool, ctx.team_id, "page", page.id, &page.content).await;

    Ok(HandlerOutcome::ok(
        format!("Created draft page \"{}\" at /{}.", title, slug),
        Some(json!({"page": page})),
    ))
}

async fn list(
    pool: &PgPool,
    ctx: &ConversationContext,
    intent: &Intent,
) -> anyhow::Result<HandlerOutcome> {
    let limit = intent
        .parameters
        .get("limit")
        .and_then(|v| v.as_i64())
        .unwrap_or(20)
        .clamp(1, 100);

    let pages = Page::list_by_team(pool, ctx.team_id, limit, 0)
        .await
        .context("listing pages")?;

    let message = if pages.is_empty() {
        "No pages found.".to_string()
    } else {
        format!("Found {} page(s).", pages.len())
    };

    Ok(HandlerOutcome::ok(message, Some(json!({"pages": pages}))))
}

async fn publish(
    pool: &PgPool,
    ctx: &ConversationContext,
    intent: &Intent,
) -> anyhow::Result<HandlerOutcome> {
    // Accept either a page id or a slug
    let page = if let Some(raw_id) = intent.param_str("page_id").or_else(|| intent.param_str("id"))
    {
        let page_id = Uuid::parse_str(raw_id)
            .map_err(|_| anyhow!("page_id is not a valid UUID: {}", raw_id))?;
        Page::find_by_id_and_team(pool, page_id, ctx.team_id)
            .await
            .context("looking up page")?
    } else if let Some(slug) = intent.param_str("slug") {
        Page::find_by_slug(pool, ctx.team_id, slug)
            .await
            .context("looking up page by slug")?
    } else {
        return Ok(HandlerOutcome::failure(
            "Tell me which page to publish (by id or slug).",
            "missing parameter: page_id or slug",
        ));
    };

    let page = match page {
        Some(page) => page,
        None => {
            return Ok(HandlerOutcome::failure(
                "I couldn't find that page.",
                "page not found in team",
            ))
        }
    };

    let published = Page::publish(pool, page.id, ctx.team_id)
        .await
        .context("publishing page")?;

    match published {
        Some(page) => Ok(HandlerOutcome::ok(
            format!("Published \"{}\".", page.title),
            Some(json!({"page": page})),
        )),
        None => Ok(HandlerOutcome::failure(
            "I couldn't find that page.",
            "page disappeared before publish",
        )),
    }
}

/// Derives a URL-safe slug from a title
fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true; // suppress leading dash

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        slug.push_str("page");
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Landing Page"), "landing-page");
        assert_eq!(slugify("  Hello,   World!  "), "hello-world");
        assert_eq!(slugify("Already-Slugged"), "already-slugged");
        assert_eq!(slugify("2024 Q3 Report"), "2024-q3-report");
        assert_eq!(slugify("!!!"), "page");
    }

    #[test]
    fn test_slugify_matches_entity_slug_rules() {
        use nextspark_shared::content::is_valid_slug;

        for title in ["Landing Page", "Hello, World!", "A--B", "2024"] {
            assert!(is_valid_slug(&slugify(title)), "slug for {:?}", title);
        }
    }
}
