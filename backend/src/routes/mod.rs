/// Liveness endpoint
pub mod health;
/// Todo endpoints
pub mod todos;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::middleware::auth_middleware;

/// Creates the router with all handler routes
pub fn handler() -> Router {
    let public_routes = Router::new().route("/health", get(health::handler));

    let protected_routes = Router::new()
        .route("/todos", get(todos::list_todos).post(todos::create_todo))
        .route(
            "/todos/{todo_id}",
            patch(todos::update_todo).delete(todos::delete_todo),
        )
        .route(
            "/todos/{todo_id}/attachment",
            post(todos::generate_upload_url),
        )
        .layer(middleware::from_fn(auth_middleware));

    public_routes.merge(protected_routes)
}
