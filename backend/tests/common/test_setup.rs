use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::Client as S3Client;
use axum::{body::Body, http::Request, response::Response, Router};
use backend::{
    attachment_storage::AttachmentStorage, jwt::JwtVerifier, server, todos::TodoService,
    types::Environment,
};
use todo_storage::todo::{
    InMemoryTodoStore, TodoItem, TodoStorageResult, TodoStore, TodoUpdate,
};
use tower::ServiceExt;

use super::utils::TEST_JWT_SECRET;

/// Bucket the offline signer presigns against
pub const TEST_BUCKET: &str = "test-bucket";

/// Setup test environment variables with all the required configuration
pub fn setup_test_env() {
    // Load test environment variables
    dotenvy::from_path(".env.example").ok();

    // Initialize tracing for tests
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// S3 client that signs locally with static credentials and never sends requests
fn offline_s3_client() -> S3Client {
    let config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("test", "test", None, None, "test"))
        .build();

    S3Client::from_conf(config)
}

/// In-memory store whose writes take `put_delay` to complete
struct SlowWriteStore {
    inner: InMemoryTodoStore,
    put_delay: Duration,
}

#[async_trait]
impl TodoStore for SlowWriteStore {
    async fn query_by_user(&self, user_id: &str) -> TodoStorageResult<Vec<TodoItem>> {
        self.inner.query_by_user(user_id).await
    }

    async fn put(&self, todo: &TodoItem) -> TodoStorageResult<()> {
        tokio::time::sleep(self.put_delay).await;
        self.inner.put(todo).await
    }

    async fn update_fields(
        &self,
        user_id: &str,
        todo_id: &str,
        update: &TodoUpdate,
    ) -> TodoStorageResult<()> {
        self.inner.update_fields(user_id, todo_id, update).await
    }

    async fn update_attachment_url(
        &self,
        user_id: &str,
        todo_id: &str,
        attachment_url: &str,
    ) -> TodoStorageResult<()> {
        self.inner
            .update_attachment_url(user_id, todo_id, attachment_url)
            .await
    }

    async fn delete(&self, user_id: &str, todo_id: &str) -> TodoStorageResult<()> {
        self.inner.delete(user_id, todo_id).await
    }
}

/// Router wired to an in-memory store and an offline S3 signer
pub struct TestSetup {
    pub router: Router,
    pub store: InMemoryTodoStore,
}

impl TestSetup {
    /// Setup that verifies HS256 tokens signed with `TEST_JWT_SECRET`
    pub fn new() -> Self {
        Self::with_environment(Environment::Development {
            disable_auth: false,
        })
    }

    /// Setup where the bearer token itself is taken as the user id
    pub fn with_auth_disabled() -> Self {
        Self::with_environment(Environment::Development { disable_auth: true })
    }

    /// Setup whose store takes `put_delay` for every write
    pub fn with_write_delay(put_delay: Duration) -> Self {
        let store = InMemoryTodoStore::new();
        let slow_store = Arc::new(SlowWriteStore {
            inner: store.clone(),
            put_delay,
        });

        Self::build(
            Environment::Development {
                disable_auth: false,
            },
            store,
            slow_store,
        )
    }

    fn with_environment(environment: Environment) -> Self {
        let store = InMemoryTodoStore::new();
        let todo_store = Arc::new(store.clone());

        Self::build(environment, store, todo_store)
    }

    fn build(
        environment: Environment,
        store: InMemoryTodoStore,
        todo_store: Arc<dyn TodoStore>,
    ) -> Self {
        setup_test_env();

        let attachment_storage = Arc::new(AttachmentStorage::new(
            Arc::new(offline_s3_client()),
            TEST_BUCKET.to_string(),
            300,
        ));
        let todo_service = Arc::new(TodoService::new(todo_store, attachment_storage));
        let jwt_verifier = Arc::new(JwtVerifier::from_secret(TEST_JWT_SECRET));

        let router = server::router(environment, todo_service, jwt_verifier);

        Self { router, store }
    }

    pub async fn send_request(
        &self,
        method: &str,
        route: &str,
        token: Option<&str>,
        payload: Option<serde_json::Value>,
    ) -> Response {
        let mut builder = Request::builder()
            .uri(route)
            .method(method)
            .header("Origin", "https://app.example.com");

        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }

        let body = match payload {
            Some(payload) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(payload.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn get(&self, route: &str, token: Option<&str>) -> Response {
        self.send_request("GET", route, token, None).await
    }

    pub async fn post(
        &self,
        route: &str,
        token: Option<&str>,
        payload: serde_json::Value,
    ) -> Response {
        self.send_request("POST", route, token, Some(payload)).await
    }

    pub async fn patch(
        &self,
        route: &str,
        token: Option<&str>,
        payload: serde_json::Value,
    ) -> Response {
        self.send_request("PATCH", route, token, Some(payload)).await
    }

    pub async fn delete(&self, route: &str, token: Option<&str>) -> Response {
        self.send_request("DELETE", route, token, None).await
    }
}
