//! Bearer token verification
//!
//! Tokens are issued by an external identity provider and signed with RS256. The verifier
//! checks the signature, expiry and, when configured, the audience, then exposes the `sub`
//! claim as the caller's user id.
//! Development deployments may verify HS256 tokens against a shared secret instead.

pub mod error;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::types::Environment;

pub use error::JwtError;

/// Claims the service relies on
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Subject, used verbatim as the user id
    pub sub: String,
    /// Expiry as a Unix timestamp
    pub exp: u64,
}

/// Verifies bearer tokens against a single key
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Creates a verifier for RS256 tokens from a PEM encoded public key
    ///
    /// # Errors
    /// Returns `JwtError::KeyLoadError` if the PEM cannot be parsed
    pub fn from_rsa_pem(pem: &str) -> Result<Self, JwtError> {
        let decoding_key =
            DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(JwtError::KeyLoadError)?;

        Ok(Self {
            decoding_key,
            validation: Self::validation(Algorithm::RS256),
        })
    }

    /// Creates a verifier for HS256 tokens signed with `secret`
    #[must_use]
    pub fn from_secret(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Self::validation(Algorithm::HS256),
        }
    }

    /// Requires the `aud` claim to be present and contain `audience`
    #[must_use]
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self.validation.required_spec_claims.insert("aud".to_string());
        self
    }

    // The audience is ignored until `with_audience` pins it
    fn validation(algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.validate_aud = false;
        validation
    }

    /// Picks the verification key for the current environment
    ///
    /// A configured public key always wins. The shared secret is only considered in development.
    ///
    /// # Errors
    /// Returns `JwtError::KeyLoadError` if the public key is malformed
    /// Returns `JwtError::MissingKey` if no key is available
    pub fn from_environment(environment: &Environment) -> Result<Self, JwtError> {
        let verifier = if let Some(pem) = environment.jwt_public_key() {
            tracing::info!("JWT verifier initialized with RS256 public key");
            Self::from_rsa_pem(&pem)?
        } else {
            let secret = environment.jwt_secret().ok_or(JwtError::MissingKey)?;
            tracing::warn!("JWT verifier initialized with HS256 development secret");
            Self::from_secret(&secret)
        };

        Ok(match environment.jwt_audience() {
            Some(audience) => verifier.with_audience(&audience),
            None => verifier,
        })
    }

    /// Validates the signature and expiry of `token` and returns its claims
    ///
    /// # Errors
    /// Returns `JwtError::ValidationError` for malformed, forged or expired tokens
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    const SECRET: &str = "test-secret";

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        exp: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        aud: Option<&'a str>,
    }

    fn token(secret: &str, sub: &str, exp_offset_secs: i64) -> String {
        token_with_audience(secret, sub, exp_offset_secs, None)
    }

    fn token_with_audience(
        secret: &str,
        sub: &str,
        exp_offset_secs: i64,
        aud: Option<&str>,
    ) -> String {
        let claims = TestClaims {
            sub,
            exp: chrono::Utc::now().timestamp() + exp_offset_secs,
            aud,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_yields_subject() {
        let verifier = JwtVerifier::from_secret(SECRET);

        let claims = verifier.validate(&token(SECRET, "user-123", 3600)).unwrap();

        assert_eq!(claims.sub, "user-123");
    }

    #[test]
    fn test_accepts_token_with_audience_when_none_configured() {
        let verifier = JwtVerifier::from_secret(SECRET);
        let token = token_with_audience(SECRET, "auth0|u1", 3600, Some("https://todo-api"));

        let claims = verifier.validate(&token).unwrap();

        assert_eq!(claims.sub, "auth0|u1");
    }

    #[test]
    fn test_configured_audience_must_match() {
        let verifier = JwtVerifier::from_secret(SECRET).with_audience("https://todo-api");

        let matching = token_with_audience(SECRET, "auth0|u1", 3600, Some("https://todo-api"));
        assert_eq!(verifier.validate(&matching).unwrap().sub, "auth0|u1");

        let other = token_with_audience(SECRET, "auth0|u1", 3600, Some("https://other-api"));
        assert!(matches!(
            verifier.validate(&other),
            Err(JwtError::ValidationError(_))
        ));

        let missing = token(SECRET, "auth0|u1", 3600);
        assert!(verifier.validate(&missing).is_err());
    }

    #[test]
    fn test_rejects_wrong_secret() {
        let verifier = JwtVerifier::from_secret(SECRET);

        let result = verifier.validate(&token("other-secret", "user-123", 3600));

        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_expired_token() {
        let verifier = JwtVerifier::from_secret(SECRET);

        let result = verifier.validate(&token(SECRET, "user-123", -3600));

        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        let verifier = JwtVerifier::from_secret(SECRET);

        for malformed in ["", "abc", "a.b", "a.b.c", "..."] {
            assert!(
                verifier.validate(malformed).is_err(),
                "Should reject malformed token: {malformed:?}"
            );
        }
    }

    #[test]
    fn test_rs256_verifier_rejects_hs256_token() {
        // Any syntactically valid RSA key works, the token header is checked first
        let verifier = JwtVerifier {
            decoding_key: DecodingKey::from_rsa_components("AQAB", "AQAB").unwrap(),
            validation: JwtVerifier::validation(Algorithm::RS256),
        };

        let result = verifier.validate(&token(SECRET, "user-123", 3600));

        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_pem_is_rejected() {
        let result = JwtVerifier::from_rsa_pem("not a pem");

        assert!(matches!(result, Err(JwtError::KeyLoadError(_))));
    }
}
