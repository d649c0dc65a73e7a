use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{debug, info};

use crate::api::{QaService, RegisterRequest};
use crate::flight::FlightGuard;
use crate::models::{AuthRequest, ValidationError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("A submission is already in progress")]
    InFlight,

    /// The token endpoint answered success without a token.
    #[error("Authentication failed: no token received")]
    MissingToken,

    /// Login or registration rejected by the service.
    #[error("{0}")]
    Rejected(String),

    /// Registration succeeded but the follow-up sign-in did not.
    #[error("Account created, but signing in failed: {0}")]
    PostRegisterLogin(String),
}

/// Drives login and registration submissions.
///
/// Validates locally, normalizes the request shape per mode, and returns the
/// fresh bearer token for the session manager to adopt. One submission per
/// flow instance may be in flight at a time.
#[derive(Debug, Default)]
pub struct AuthFlow {
    in_flight: AtomicBool,
}

impl AuthFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submit a login or registration form. Registration chains an implicit
    /// login with the same credentials, since registering does not itself
    /// yield a session.
    pub async fn submit<S: QaService + ?Sized>(
        &self,
        service: &S,
        request: &AuthRequest,
    ) -> Result<String, AuthError> {
        request.validate()?;

        let _guard = FlightGuard::acquire(&self.in_flight).ok_or(AuthError::InFlight)?;

        match request {
            AuthRequest::Login { username, password } => {
                debug!(username, "Submitting login");
                Self::login(service, username, password).await
            }
            AuthRequest::Register {
                username,
                password,
                email,
                full_name,
            } => {
                debug!(username, "Submitting registration");
                let payload = RegisterRequest {
                    username: username.clone(),
                    password: password.clone(),
                    email: email.clone(),
                    full_name: full_name.clone(),
                };
                service
                    .register(&payload)
                    .await
                    .map_err(|e| AuthError::Rejected(e.to_string()))?;

                info!(username, "Registered; performing sign-in");
                Self::login(service, username, password)
                    .await
                    .map_err(|e| AuthError::PostRegisterLogin(e.to_string()))
            }
        }
    }

    async fn login<S: QaService + ?Sized>(
        service: &S,
        username: &str,
        password: &str,
    ) -> Result<String, AuthError> {
        let response = service
            .login(username, password)
            .await
            .map_err(|e| AuthError::Rejected(e.to_string()))?;

        response.access_token.ok_or(AuthError::MissingToken)
    }
}
