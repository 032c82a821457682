/// Common test utilities for integration tests
///
/// Provides shared infrastructure:
/// - Test database setup (skips suites when no test database is configured)
/// - Test user/team creation with owner membership
/// - JWT token generation
/// - Router request helpers

use axum::body::Body;
use axum::http::{Request, StatusCode};
use nextspark_api::app::{build_router, AppState};
use nextspark_api::config::{
    ApiConfig, Config, DatabaseConfig, DatabaseScheme, JwtConfig, LlmConfig, WebhookConfig,
};
use nextspark_shared::auth::jwt::{create_token, Claims, TokenType};
use nextspark_shared::db::migrations::run_migrations;
use nextspark_shared::models::team::{CreateTeam, Team};
use nextspark_shared::models::team_member::{CreateTeamMember, TeamMember, TeamRole};
use nextspark_shared::models::user::{CreateUser, User};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// JWT secret used across test tokens
pub const TEST_JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes!";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub state: AppState,
    pub team: Team,
    pub user: User,
    pub jwt_token: String,
}

impl TestContext {
    /// Creates a new test context against the configured test database
    ///
    /// Returns None (test should skip) when neither `TEST_DATABASE_URL` nor
    /// `DATABASE_URL` is set.
    pub async fn new() -> Option<Self> {
        let url = std::env::var("TEST_DATABASE_URL")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .ok()?;

        let db = PgPool::connect(&url)
            .await
            .expect("failed to connect to test database");
        run_migrations(&db).await.expect("migrations failed");

        let config = test_config(url);
        let state = AppState::new(db.clone(), config);
        let app = build_router(state.clone());

        let (user, team, jwt_token) = seed_owner(&db).await;

        Some(Self {
            db,
            app,
            state,
            team,
            user,
            jwt_token,
        })
    }

    /// Rebuilds the router from a customized state (e.g. mock assistant)
    pub fn rebuild(&mut self, state: AppState) {
        self.state = state.clone();
        self.app = build_router(state);
    }

    /// Authorization header value for the seeded owner
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Sends a request and returns (status, parsed JSON body)
    pub async fn request(
        &mut self,
        method: &str,
        uri: &str,
        team_header: bool,
        body: Option<JsonValue>,
    ) -> (StatusCode, JsonValue) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", self.auth_header());

        if team_header {
            builder = builder.header("x-team-id", self.team.id.to_string());
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: JsonValue = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
        };

        (status, json)
    }

    /// Adds another user to the seeded team at the given role
    pub async fn add_member(&self, role: TeamRole) -> (User, String) {
        let user = create_user(&self.db).await;

        TeamMember::create(
            &self.db,
            CreateTeamMember {
                team_id: self.team.id,
                user_id: user.id,
                role,
            },
        )
        .await
        .expect("failed to add member");

        let token = token_for(user.id);
        (user, token)
    }

    /// Deletes everything the context created
    ///
    /// Extra users created via `add_member` carry unique emails and are
    /// harmless to leave behind in the test database.
    pub async fn cleanup(&self) {
        Team::delete(&self.db, self.team.id).await.ok();
        User::delete(&self.db, self.user.id).await.ok();
    }
}

/// Builds a config pointing at the test database
fn test_config(url: String) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url,
            scheme: DatabaseScheme::Postgres,
            max_connections: 5,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
        },
        webhooks: WebhookConfig {
            routes: String::new(),
            signing_secret: None,
            timeout_seconds: 2,
        },
        llm: LlmConfig {
            endpoint: None,
            api_key: None,
            timeout_seconds: 5,
        },
    }
}

/// Creates a unique test user
async fn create_user(db: &PgPool) -> User {
    let marker = Uuid::new_v4().simple().to_string();

    User::create(
        db,
        CreateUser {
            email: format!("it-{}@test.nextspark.dev", &marker[..12]),
            // Argon2id hash of "integration-password" (precomputed; tests
            // that exercise login go through /auth/register instead)
            password_hash: "$argon2id$v=19$m=65536,t=3,p=4$c29tZXNhbHRzb21lc2FsdA$\
                            5Ks6jZz1yU4b9K1cW0n4m9mZbLhVrPzjc8yQ4QYt1uM"
                .to_string(),
            name: Some("Integration Tester".to_string()),
            avatar_url: None,
        },
    )
    .await
    .expect("failed to create test user")
}

/// Seeds a user owning a fresh team and returns an access token
async fn seed_owner(db: &PgPool) -> (User, Team, String) {
    let user = create_user(db).await;

    let marker = Uuid::new_v4().simple().to_string();
    let team = Team::create(
        db,
        CreateTeam {
            name: "Integration Team".to_string(),
            slug: format!("it-team-{}", &marker[..12]),
        },
    )
    .await
    .expect("failed to create test team");

    TeamMember::create(
        db,
        CreateTeamMember {
            team_id: team.id,
            user_id: user.id,
            role: TeamRole::Owner,
        },
    )
    .await
    .expect("failed to create owner membership");

    let token = token_for(user.id);

    (user, team, token)
}

/// Creates an access token for a user
pub fn token_for(user_id: Uuid) -> String {
    create_token(&Claims::new(user_id, TokenType::Access), TEST_JWT_SECRET)
        .expect("failed to create test token")
}
