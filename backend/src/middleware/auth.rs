use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    middleware::Next,
    response::Response,
    Extension,
};

use crate::{
    jwt::{Claims, JwtVerifier},
    types::{AppError, Environment},
};

/// Authenticated user information extracted from the bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Subject of the token, owner of every todo touched by the request
    pub user_id: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self { user_id: claims.sub }
    }
}

/// Axum extractor for authenticated user
///
/// Use this in handlers behind `auth_middleware`:
/// ```ignore
/// async fn protected_handler(
///     user: AuthenticatedUser,
///     // ... other extractors
/// ) -> Result<impl IntoResponse, AppError> {
///     // Access user.user_id
///     Ok("Protected content")
/// }
/// ```
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            AppError::new(
                StatusCode::UNAUTHORIZED,
                "missing_auth",
                "Authentication required but user not found in request extensions",
                false,
            )
        })
    }
}

/// JWT Authentication middleware
///
/// This middleware:
/// 1. Extracts Bearer token from Authorization header
/// 2. Validates the token with `JwtVerifier`
/// 3. Adds `AuthenticatedUser` to request extensions
/// 4. Returns 401 for invalid/missing tokens
///
/// In development, set `DISABLE_AUTH` to skip verification.
///
/// # Errors
///
/// - `AppError` - Invalid/missing token with 401 status code
pub async fn auth_middleware(
    Extension(jwt_verifier): Extension<Arc<JwtVerifier>>,
    Extension(environment): Extension<Environment>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let stripped_auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty());

    // With auth disabled the raw token is taken as the user id
    if environment.disable_auth() {
        if let Some(token) = stripped_auth_header {
            let authenticated_user = AuthenticatedUser {
                user_id: token.to_string(),
            };
            request.extensions_mut().insert(authenticated_user);
        }

        return Ok(next.run(request).await);
    }

    let token = stripped_auth_header.ok_or_else(|| {
        AppError::new(
            StatusCode::UNAUTHORIZED,
            "missing_token",
            "Authorization header must contain a valid Bearer token",
            false,
        )
    })?;

    let claims = jwt_verifier.validate(token).map_err(|err| {
        tracing::debug!("Rejected bearer token: {err}");
        AppError::new(
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "Invalid or expired token",
            false,
        )
    })?;

    let user = AuthenticatedUser::from(claims);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
