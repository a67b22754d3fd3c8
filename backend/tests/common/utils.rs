use axum::response::Response;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

/// Secret the test verifier accepts
pub const TEST_JWT_SECRET: &str = "test-secret";

/// Issue an HS256 token for `user_id` valid for one hour
pub fn issue_token(user_id: &str) -> String {
    issue_token_with(TEST_JWT_SECRET, user_id, 3600)
}

/// Issue an HS256 token with an explicit secret and expiry offset
pub fn issue_token_with(secret: &str, user_id: &str, exp_offset_secs: i64) -> String {
    let claims = json!({
        "sub": user_id,
        "exp": chrono::Utc::now().timestamp() + exp_offset_secs,
    });

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
