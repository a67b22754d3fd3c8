//! Todo Backend service
//!
//! Per-user todo lists stored in DynamoDB, with attachments uploaded straight to S3
//! through presigned URLs.

#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// S3 attachment uploads
pub mod attachment_storage;

/// Bearer token verification
pub mod jwt;

/// Request middleware
pub mod middleware;

/// HTTP routes
pub mod routes;

/// Server bootstrap
pub mod server;

/// Todo operations
pub mod todos;

/// Shared types: environment, errors, extractors
pub mod types;
