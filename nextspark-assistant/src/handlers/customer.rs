/// Customer handler node
///
/// Supported verbs: `create`, `list`, `update`.

use anyhow::{anyhow, Context as _};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use nextspark_shared::models::customer::{CreateCustomer, Customer, UpdateCustomer};

use crate::intent::{normalize_customer_status, Intent};

use super::{ConversationContext, HandlerOutcome};

/// Handles a customer intent, converting any failure into a uniform outcome
pub async fn handle(pool: &PgPool, ctx: &ConversationContext, intent: &Intent) -> HandlerOutcome {
    HandlerOutcome::from_result(run(pool, ctx, intent).await, "customer")
}

async fn run(
    pool: &PgPool,
    ctx: &ConversationContext,
    intent: &Intent,
) -> anyhow::Result<HandlerOutcome> {
    match intent.verb() {
        "create" => create(pool, ctx, intent).await,
        "list" => list(pool, ctx, intent).await,
        "update" => update(pool, ctx, intent).await,
        verb => Ok(HandlerOutcome::failure(
            format!("I don't know how to {} a customer.", verb),
            format!("unsupported customer verb: {}", verb),
        )),
    }
}

async fn create(
    pool: &PgPool,
    ctx: &ConversationContext,
    intent: &Intent,
) -> anyhow::Result<HandlerOutcome> {
    let name = match intent.param_str("name") {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => {
            return Ok(HandlerOutcome::failure(
                "I need a name to create a customer.",
                "missing parameter: name",
            ))
        }
    };

    let status = intent
        .param_str("status")
        .and_then(normalize_customer_status);

    let customer = Customer::create(
        pool,
        CreateCustomer {
            team_id: ctx.team_id,
            created_by: ctx.user_id,
            name: name.clone(),
            email: intent.param_str("email").map(str::to_string),
            phone: intent.param_str("phone").map(str::to_string),
            company: intent.param_str("company").map(str::to_string),
            status,
            notes: intent.param_str("notes").map(str::to_string),
        },
    )
    .await
    .context("creating customer")?;

    Ok(HandlerOutcome::ok(
        format!("Added {} as a {}.", name, customer.status),
        Some(json!({"customer": customer})),
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

    let customers = Customer::list_by_team(pool, ctx.team_id, limit, 0)
        .await
        .context("listing customers")?;

    let message = if customers.is_empty() {
        "No customers found.".to_string()
    } else {
        format!("Found {} customer(s).", customers.len())
    };

    Ok(HandlerOutcome::ok(
        message,
        Some(json!({"customers": customers})),
    ))
}

async fn update(
    pool: &PgPool,
    ctx: &ConversationContext,
    intent: &Intent,
) -> anyhow::Result<HandlerOutcome> {
    let raw_id = intent
        .param_str("customer_id")
        .or_else(|| intent.param_str("id"))
        .ok_or_else(|| anyhow!("missing parameter: customer_id"))?;
    let customer_id =
        Uuid::parse_str(raw_id).map_err(|_| anyhow!("customer_id is not a valid UUID: {}", raw_id))?;

    let update = UpdateCustomer {
        name: intent.param_str("name").map(str::to_string),
        email: intent.param_str("email").map(str::to_string),
        phone: intent.param_str("phone").map(str::to_string),
        company: intent.param_str("company").map(str::to_string),
        status: intent
            .param_str("status")
            .and_then(normalize_customer_status),
        notes: intent.param_str("notes").map(str::to_string),
    };

    match Customer::update(pool, customer_id, ctx.team_id, update)
        .await
        .context("updating customer")?
    {
        Some(customer) => Ok(HandlerOutcome::ok(
            format!("Updated customer \"{}\".", customer.name),
            Some(json!({"customer": customer})),
        )),
        None => Ok(HandlerOutcome::failure(
            "I couldn't find that customer.",
            format!("customer {} not found in team", customer_id),
        )),
    }
}
