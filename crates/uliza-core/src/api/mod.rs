//! REST API client module for the Uliza Q&A service.
//!
//! This module provides the [`QaService`] trait describing the four remote
//! operations (token verification, login, registration, question answering)
//! and [`ApiClient`], the reqwest implementation used by the application.
//!
//! The service uses JWT bearer token authentication obtained through the
//! form-encoded `/token` endpoint.

pub mod client;
pub mod error;

pub use client::{ApiClient, LoginResponse, RegisterRequest};
pub use error::ApiError;

use async_trait::async_trait;

use crate::models::Identity;

/// The remote service boundary.
///
/// Flow logic depends on this trait rather than on [`ApiClient`] directly so
/// it can be exercised against stubs without a running server.
#[async_trait]
pub trait QaService: Send + Sync {
    /// POST `/token/verify` with a bearer token; resolves the identity it
    /// belongs to.
    async fn verify_token(&self, token: &str) -> Result<Identity, ApiError>;

    /// POST `/token` with form-encoded credentials.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// POST `/register` with a JSON payload. Any non-error response counts
    /// as success; obtaining a session is the follow-up login's job.
    async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError>;

    /// POST `/ask` with a bearer token; returns the answer text.
    async fn ask(&self, token: &str, question: &str) -> Result<String, ApiError>;
}
