use std::sync::Arc;

use axum::{Extension, Router};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::routes;
use crate::{jwt::JwtVerifier, todos::TodoService, types::Environment};

/// Builds the application router with all shared dependencies attached
///
/// No request timeout is layered on top; store calls are bounded by the AWS SDK operation
/// timeout and a started request always runs to completion.
pub fn router(
    environment: Environment,
    todo_service: Arc<TodoService>,
    jwt_verifier: Arc<JwtVerifier>,
) -> Router {
    routes::handler()
        .layer(Extension(environment))
        .layer(Extension(todo_service))
        .layer(Extension(jwt_verifier))
        .layer(TraceLayer::new_for_http())
        // Outermost so preflight requests never reach the auth middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Starts the server with the given environment and dependencies
///
/// Inside AWS Lambda the router is driven by the Lambda runtime, anywhere else it
/// listens on `PORT` (default 8001).
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    environment: Environment,
    todo_service: Arc<TodoService>,
    jwt_verifier: Arc<JwtVerifier>,
) -> anyhow::Result<()> {
    let router = router(environment, todo_service, jwt_verifier);

    if std::env::var("AWS_LAMBDA_RUNTIME_API").is_ok() {
        tracing::info!("🔄 Todo Backend started on the Lambda runtime");
        return lambda_http::run(router)
            .await
            .map_err(|err| anyhow::anyhow!(err));
    }

    let addr = std::net::SocketAddr::from((
        [0, 0, 0, 0],
        std::env::var("PORT").map_or(Ok(8001), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Todo Backend started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
