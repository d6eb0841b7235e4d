/// Application state and router builder
///
/// This module defines the shared application state, the bearer-token
/// extractor, and the function that builds the Axum router with all routes
/// and middleware.
///
/// # Example
///
/// ```no_run
/// use mentordesk_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = mentordesk_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use crate::error::ApiError;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{delete, get, patch, post, put},
    Router,
};
use chrono::Duration;
use mentordesk_shared::auth::token::TokenService;
use mentordesk_shared::lifecycle::LifecycleEngine;
use mentordesk_shared::store::postgres::PgStore;
use mentordesk_shared::store::{CredentialStore, ProfileStore, TaskStore};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// User identity storage
    pub creds: Arc<dyn CredentialStore>,

    /// Profile aggregate storage
    pub profiles: Arc<dyn ProfileStore>,

    /// Token issue/verify service
    pub tokens: TokenService,

    /// Task lifecycle engine
    pub engine: LifecycleEngine,

    /// Application configuration
    pub config: Arc<Config>,

    /// Connection pool, present when running against Postgres
    pub db: Option<PgPool>,
}

impl AppState {
    /// Creates application state backed by Postgres
    pub fn new(db: PgPool, config: Config) -> Self {
        let store = Arc::new(PgStore::new(db.clone()));
        Self::from_parts(
            store.clone(),
            store.clone(),
            store,
            Some(db),
            config,
        )
    }

    /// Creates application state from explicit store implementations
    ///
    /// Tests use this with the in-memory store.
    pub fn from_parts(
        creds: Arc<dyn CredentialStore>,
        profiles: Arc<dyn ProfileStore>,
        tasks: Arc<dyn TaskStore>,
        db: Option<PgPool>,
        config: Config,
    ) -> Self {
        let tokens = TokenService::new(
            config.jwt.secret.clone(),
            Duration::hours(config.jwt.ttl_hours),
            creds.clone(),
        );
        let engine = LifecycleEngine::with_timeout(
            tasks,
            tokens.clone(),
            StdDuration::from_millis(config.api.store_timeout_ms),
        );

        Self {
            creds,
            profiles,
            tokens,
            engine,
            config: Arc::new(config),
            db,
        }
    }
}

/// Raw bearer token pulled from the Authorization header
///
/// Extraction only strips the scheme; verification happens inside the
/// lifecycle engine or the handler, so the authorization verdict is decided
/// in one place per operation.
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".to_string()))?;

        Ok(BearerToken(token.to_string()))
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /v1/
///     ├── /users/
///     │   ├── POST /                   # Sign up
///     │   ├── DELETE /                 # Delete own account
///     │   ├── POST /login              # Log in, get a token
///     │   └── PATCH /password          # Change password
///     ├── /profiles/
///     │   ├── POST /                   # Create profile
///     │   ├── GET  /me                 # Own profile
///     │   ├── POST /social-links       # Attach a link
///     │   └── DELETE /social-links/:id # Detach a link
///     └── /tasks/
///         ├── POST   /                 # Create task
///         ├── GET    /                 # List tasks
///         ├── PATCH  /:id              # Edit fields / change status
///         ├── DELETE /:id              # Close (soft) or delete (?hard=true)
///         └── PUT    /:id/reopen       # Reopen a completed task
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let user_routes = Router::new()
        .route("/", post(routes::auth::signup))
        .route("/", delete(routes::auth::delete_account))
        .route("/login", post(routes::auth::login))
        .route("/password", patch(routes::auth::change_password));

    let profile_routes = Router::new()
        .route("/", post(routes::profiles::create_profile))
        .route("/me", get(routes::profiles::get_own_profile))
        .route("/social-links", post(routes::profiles::add_social_link))
        .route(
            "/social-links/:id",
            delete(routes::profiles::remove_social_link),
        );

    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task))
        .route("/", get(routes::tasks::list_tasks))
        .route("/:id", patch(routes::tasks::update_task))
        .route("/:id", delete(routes::tasks::delete_task))
        .route("/:id/reopen", put(routes::tasks::reopen_task));

    let v1_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/profiles", profile_routes)
        .nest("/tasks", task_routes);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
