/// Customer CRUD endpoints (team-scoped)
///
/// # Endpoints
///
/// - `GET /api/v1/customers` - List customers
/// - `POST /api/v1/customers` - Create customer
/// - `GET /api/v1/customers/:id` - Get customer
/// - `PATCH /api/v1/customers/:id` - Update customer
/// - `DELETE /api/v1/customers/:id` - Delete customer

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::team_context::TeamContext,
    response::{ApiResponse, Meta},
    routes::Pagination,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use nextspark_shared::{
    auth::{authorization::require_scope, middleware::AuthContext},
    billing::entitlement::Entitlements,
    models::customer::{CreateCustomer, Customer, CustomerStatus, UpdateCustomer},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Create customer request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    /// Contact name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Contact email
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// Contact phone
    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,

    /// Company name
    #[validate(length(max = 255, message = "Company must be at most 255 characters"))]
    pub company: Option<String>,

    /// Lifecycle status ("lead", "active", "churned")
    pub status: Option<String>,

    /// Free-form notes
    pub notes: Option<String>,
}

/// Update customer request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    /// New name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    /// New email
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New phone
    #[validate(length(max = 50, message = "Phone must be at most 50 characters"))]
    pub phone: Option<String>,

    /// New company
    #[validate(length(max = 255, message = "Company must be at most 255 characters"))]
    pub company: Option<String>,

    /// New status
    pub status: Option<String>,

    /// New notes
    pub notes: Option<String>,
}

fn parse_status(raw: &str) -> ApiResult<CustomerStatus> {
    CustomerStatus::parse(raw)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown customer status: {}", raw)))
}

/// List customers in the team
pub async fn list_customers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<ApiResponse<Vec<Customer>>>> {
    require_scope(&auth, "customers:read")?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "customers.list")
        .await?;

    let limit = page.limit();
    let offset = page.offset();

    let customers = Customer::list_by_team(&state.db, team.team_id, limit, offset).await?;
    let total = Customer::count_by_team(&state.db, team.team_id).await?;

    Ok(Json(ApiResponse::with_meta(
        customers,
        Meta {
            total,
            limit,
            offset,
        },
    )))
}

/// Create a customer
pub async fn create_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Json(request): Json<CreateCustomerRequest>,
) -> ApiResult<Json<ApiResponse<Customer>>> {
    request.validate()?;
    require_scope(&auth, "customers:write")?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "customers.create")
        .await?;

    let status = request.status.as_deref().map(parse_status).transpose()?;

    let customer = Customer::create(
        &state.db,
        CreateCustomer {
            team_id: team.team_id,
            created_by: team.user_id,
            name: request.name,
            email: request.email,
            phone: request.phone,
            company: request.company,
            status,
            notes: request.notes,
        },
    )
    .await?;

    state.dispatch_webhook("customer", "created", customer.id, team.team_id, json!(customer));

    Ok(Json(ApiResponse::new(customer)))
}

/// Get a customer
pub async fn get_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Path(customer_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Customer>>> {
    require_scope(&auth, "customers:read")?;

    let customer = Customer::find_by_id_and_team(&state.db, customer_id, team.team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer not found".to_string()))?;

    Ok(Json(ApiResponse::new(customer)))
}

/// Update a customer
pub async fn update_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Path(customer_id): Path<Uuid>,
    Json(request): Json<UpdateCustomerRequest>,
) -> ApiResult<Json<ApiResponse<Customer>>> {
    request.validate()?;
    require_scope(&auth, "customers:write")?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "customers.update")
        .await?;

    let status = request.status.as_deref().map(parse_status).transpose()?;

    let customer = Customer::update(
        &state.db,
        customer_id,
        team.team_id,
        UpdateCustomer {
            name: request.name,
            email: request.email,
            phone: request.phone,
            company: request.company,
            status,
            notes: request.notes,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Customer not found".to_string()))?;

    state.dispatch_webhook("customer", "updated", customer.id, team.team_id, json!(customer));

    Ok(Json(ApiResponse::new(customer)))
}

/// Delete a customer
pub async fn delete_customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Extension(team): Extension<TeamContext>,
    Path(customer_id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<bool>>> {
    require_scope(&auth, "customers:write")?;
    Entitlements::new(state.db.clone())
        .enforce(team.team_id, team.role, "customers.delete")
        .await?;

    let deleted = Customer::delete(&state.db, customer_id, team.team_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Customer not found".to_string()));
    }

    state.dispatch_webhook(
        "customer",
        "deleted",
        customer_id,
        team.team_id,
        json!({"id": customer_id}),
    );

    Ok(Json(ApiResponse::new(true)))
}
