//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};

/// Default lifetime of presigned upload URLs (5 minutes)
const DEFAULT_SIGNED_URL_EXPIRATION_SECS: u64 = 5 * 60;

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development {
        /// Skip JWT verification and use the bearer token as the user id
        disable_auth: bool,
    },
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => {
                let disable_auth = env::var("DISABLE_AUTH")
                    .map(|val| matches!(val.trim().to_lowercase().as_str(), "1" | "true"))
                    .unwrap_or(false);

                Self::Development { disable_auth }
            }
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Returns the `DynamoDB` table holding todos
    ///
    /// # Panics
    ///
    /// Panics if `TODOS_TABLE` is not set outside development
    #[must_use]
    pub fn todos_table(&self) -> String {
        self.required_var("TODOS_TABLE", "todos")
    }

    /// Returns the GSI keyed by `(userId, createdAt)`
    ///
    /// # Panics
    ///
    /// Panics if `TODOS_CREATED_AT_INDEX` is not set outside development
    #[must_use]
    pub fn todos_created_at_index(&self) -> String {
        self.required_var("TODOS_CREATED_AT_INDEX", "created-at-index")
    }

    /// Returns the S3 bucket for todo attachments
    ///
    /// # Panics
    ///
    /// Panics if `ATTACHMENT_S3_BUCKET` is not set outside development
    #[must_use]
    pub fn attachment_bucket(&self) -> String {
        self.required_var("ATTACHMENT_S3_BUCKET", "todo-attachments")
    }

    /// Presigned upload URL lifetime in seconds
    ///
    /// Read from `SIGNED_URL_EXPIRATION`, falls back to 5 minutes when unset or invalid.
    #[must_use]
    pub fn signed_url_expiration_secs(&self) -> u64 {
        env::var("SIGNED_URL_EXPIRATION")
            .ok()
            .and_then(|val| val.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_SIGNED_URL_EXPIRATION_SECS)
    }

    /// Whether bearer tokens are trusted without verification
    #[must_use]
    pub const fn disable_auth(&self) -> bool {
        matches!(self, Self::Development { disable_auth: true })
    }

    /// PEM encoded RS256 public key used to verify bearer tokens
    #[must_use]
    pub fn jwt_public_key(&self) -> Option<String> {
        env::var("AUTH_JWT_PUBLIC_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Expected `aud` claim of bearer tokens, unchecked when unset
    #[must_use]
    pub fn jwt_audience(&self) -> Option<String> {
        env::var("AUTH_JWT_AUDIENCE")
            .ok()
            .filter(|aud| !aud.trim().is_empty())
    }

    /// HS256 secret used to verify bearer tokens, only honoured in development
    #[must_use]
    pub fn jwt_secret(&self) -> Option<String> {
        match self {
            Self::Production | Self::Staging => None,
            Self::Development { .. } => Some(
                env::var("AUTH_JWT_SECRET").unwrap_or_else(|_| "development-secret".to_string()),
            ),
        }
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            Self::Production | Self::Staging => None,
            Self::Development { .. } => Some("http://localhost:4566"),
        }
    }

    /// AWS configuration with retries disabled and a per-operation timeout
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        // Store failures surface to the caller on the first attempt
        let retry_config = RetryConfig::disabled();

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // LocalStack only serves path style requests
        if matches!(self, Self::Development { .. }) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    fn required_var(&self, name: &str, development_default: &str) -> String {
        match self {
            Self::Production | Self::Staging => {
                env::var(name).unwrap_or_else(|_| panic!("{name} environment variable is not set"))
            }
            Self::Development { .. } => {
                env::var(name).unwrap_or_else(|_| development_default.to_string())
            }
        }
    }
}
