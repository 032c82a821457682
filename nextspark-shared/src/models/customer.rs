/// Customer model and database operations
///
/// Team-scoped CRM entity. Follows the same access pattern as tasks: every
/// accessor filters by `team_id`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE customers (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     team_id UUID NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     name VARCHAR(255) NOT NULL,
///     email CITEXT,
///     phone VARCHAR(50),
///     company VARCHAR(255),
///     status VARCHAR(50) NOT NULL DEFAULT 'lead',
///     notes TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Customer lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    /// Prospect, not yet converted
    Lead,

    /// Paying/active customer
    Active,

    /// Former customer
    Churned,
}

impl CustomerStatus {
    /// Converts status to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Lead => "lead",
            CustomerStatus::Active => "active",
            CustomerStatus::Churned => "churned",
        }
    }

    /// Parses status from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "lead" => Some(CustomerStatus::Lead),
            "active" => Some(CustomerStatus::Active),
            "churned" => Some(CustomerStatus::Churned),
            _ => None,
        }
    }
}

/// Customer model representing a CRM contact within a team
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    /// Unique customer ID
    pub id: Uuid,

    /// Team this customer belongs to
    pub team_id: Uuid,

    /// User who created the record (nullable if user deleted)
    pub created_by: Option<Uuid>,

    /// Contact name
    pub name: String,

    /// Contact email
    pub email: Option<String>,

    /// Contact phone number
    pub phone: Option<String>,

    /// Company name
    pub company: Option<String>,

    /// Lifecycle status ("lead", "active", "churned")
    pub status: String,

    /// Free-form notes
    pub notes: Option<String>,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Gets the parsed status enum
    pub fn get_status(&self) -> Option<CustomerStatus> {
        CustomerStatus::parse(&self.status)
    }
}

/// Input for creating a new customer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomer {
    /// Team ID
    pub team_id: Uuid,

    /// User who created the record
    pub created_by: Option<Uuid>,

    /// Contact name
    pub name: String,

    /// Contact email
    pub email: Option<String>,

    /// Contact phone number
    pub phone: Option<String>,

    /// Company name
    pub company: Option<String>,

    /// Lifecycle status (defaults to Lead)
    pub status: Option<CustomerStatus>,

    /// Free-form notes
    pub notes: Option<String>,
}

/// Input for updating a customer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCustomer {
    /// New name
    pub name: Option<String>,

    /// New email
    pub email: Option<String>,

    /// New phone number
    pub phone: Option<String>,

    /// New company
    pub company: Option<String>,

    /// New status
    pub status: Option<CustomerStatus>,

    /// New notes
    pub notes: Option<String>,
}

impl Customer {
    /// Creates a new customer
    pub async fn create(pool: &PgPool, data: CreateCustomer) -> Result<Self, sqlx::Error> {
        let status = data.status.unwrap_or(CustomerStatus::Lead);

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (team_id, created_by, name, email, phone, company, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, team_id, created_by, name, email, phone, company, status,
                      notes, created_at, updated_at
            "#,
        )
        .bind(data.team_id)
        .bind(data.created_by)
        .bind(data.name)
        .bind(data.email)
        .bind(data.phone)
        .bind(data.company)
        .bind(status.as_str())
        .bind(data.notes)
        .fetch_one(pool)
        .await?;

        Ok(customer)
    }

    /// Finds a customer by ID with team isolation
    pub async fn find_by_id_and_team(
        pool: &PgPool,
        id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, team_id, created_by, name, email, phone, company, status,
                   notes, created_at, updated_at
            FROM customers
            WHERE id = $1 AND team_id = $2
            "#,
        )
        .bind(id)
        .bind(team_id)
        .fetch_optional(pool)
        .await?;

        Ok(customer)
    }

    /// Updates a customer with team isolation
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        team_id: Uuid,
        data: UpdateCustomer,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE customers SET updated_at = NOW()");
        let mut bind_count = 2;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.phone.is_some() {
            bind_count += 1;
            query.push_str(&format!(", phone = ${}", bind_count));
        }
        if data.company.is_some() {
            bind_count += 1;
            query.push_str(&format!(", company = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.notes.is_some() {
            bind_count += 1;
            query.push_str(&format!(", notes = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 AND team_id = $2 RETURNING id, team_id, created_by, name, email, \
             phone, company, status, notes, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Customer>(&query).bind(id).bind(team_id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(phone) = data.phone {
            q = q.bind(phone);
        }
        if let Some(company) = data.company {
            q = q.bind(company);
        }
        if let Some(status) = data.status {
            q = q.bind(status.as_str());
        }
        if let Some(notes) = data.notes {
            q = q.bind(notes);
        }

        let customer = q.fetch_optional(pool).await?;

        Ok(customer)
    }

    /// Deletes a customer with team isolation
    pub async fn delete(pool: &PgPool, id: Uuid, team_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1 AND team_id = $2")
            .bind(id)
            .bind(team_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists customers for a team with pagination
    pub async fn list_by_team(
        pool: &PgPool,
        team_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, team_id, created_by, name, email, phone, company, status,
                   notes, created_at, updated_at
            FROM customers
            WHERE team_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(team_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(customers)
    }

    /// Counts customers for a team
    pub async fn count_by_team(pool: &PgPool, team_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM customers WHERE team_id = $1")
                .bind(team_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_status_round_trip() {
        for status in [
            CustomerStatus::Lead,
            CustomerStatus::Active,
            CustomerStatus::Churned,
        ] {
            assert_eq!(CustomerStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(CustomerStatus::parse("vip"), None);
    }
}
