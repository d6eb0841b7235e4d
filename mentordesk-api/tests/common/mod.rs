/// Shared helpers for API integration tests
///
/// Tests run the real router against the in-memory store, so the whole
/// HTTP surface is exercised without a database.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::json;
use tower::Service as _;

use mentordesk_api::app::{build_router, AppState};
use mentordesk_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use mentordesk_shared::store::memory::MemoryStore;
use mentordesk_shared::store::{CredentialStore, ProfileStore, TaskStore};

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

pub struct TestContext {
    pub app: Router,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_pool(None)
    }

    /// Context with a pool aimed at a closed port; acquiring a connection
    /// fails, so database-dependent paths see an unreachable backend.
    pub fn with_unreachable_db() -> Self {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_millis(500))
            .connect_lazy("postgres://nobody@127.0.0.1:1/absent")
            .unwrap();
        Self::with_pool(Some(pool))
    }

    fn with_pool(pool: Option<sqlx::PgPool>) -> Self {
        let store = Arc::new(MemoryStore::new());

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                store_timeout_ms: 5000,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: TEST_SECRET.to_string(),
                ttl_hours: 1,
            },
        };

        let state = AppState::from_parts(
            store.clone() as Arc<dyn CredentialStore>,
            store.clone() as Arc<dyn ProfileStore>,
            store.clone() as Arc<dyn TaskStore>,
            pool,
            config,
        );

        Self {
            app: build_router(state),
        }
    }

    /// Sends a JSON request and returns the raw response
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let request = builder.body(body).unwrap();

        self.app.clone().call(request).await.unwrap()
    }

    /// Signs up a user and returns their bearer token
    pub async fn signup(&self, email: &str, username: &str) -> String {
        let response = self
            .request(
                "POST",
                "/v1/users",
                None,
                Some(json!({
                    "email": email,
                    "username": username,
                    "password": "sturdy-pass1",
                    "first_name": "Test",
                    "last_name": "User"
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        body["token"].as_str().unwrap().to_string()
    }
}

/// Collects a response body into a JSON value
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
