use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;

use backend::{
    attachment_storage::AttachmentStorage, jwt::JwtVerifier, server, todos::TodoService,
    types::Environment,
};
use todo_storage::todo::TodoStorage;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // JSON for staging/production log ingestion, plain text for local development
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        fmt().with_env_filter(EnvFilter::from_default_env()).init();
    }

    let dynamodb_client = Arc::new(DynamoDbClient::new(&environment.aws_config().await));
    let todo_storage = Arc::new(TodoStorage::new(
        dynamodb_client,
        environment.todos_table(),
        environment.todos_created_at_index(),
    ));

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let attachment_storage = Arc::new(AttachmentStorage::new(
        s3_client,
        environment.attachment_bucket(),
        environment.signed_url_expiration_secs(),
    ));

    let todo_service = Arc::new(TodoService::new(todo_storage, attachment_storage));
    let jwt_verifier = Arc::new(JwtVerifier::from_environment(&environment)?);

    server::start(environment, todo_service, jwt_verifier).await
}
