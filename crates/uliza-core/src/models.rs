//! Domain types shared across the session and auth flows.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum password length accepted before a request is sent.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Resolved user identity for the active session.
/// `None`-ness lives one level up: an anonymous session has no `Identity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
}

impl Identity {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// A login or registration form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRequest {
    Login {
        username: String,
        password: String,
    },
    Register {
        username: String,
        password: String,
        email: String,
        full_name: String,
    },
}

impl AuthRequest {
    pub fn username(&self) -> &str {
        match self {
            AuthRequest::Login { username, .. } | AuthRequest::Register { username, .. } => {
                username
            }
        }
    }

    /// Client-side validation. Invalid forms are never sent to the service.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let (username, password) = match self {
            AuthRequest::Login { username, password } => (username, password),
            AuthRequest::Register {
                username,
                password,
                email,
                full_name,
            } => {
                if email.trim().is_empty() {
                    return Err(ValidationError::MissingEmail);
                }
                if full_name.trim().is_empty() {
                    return Err(ValidationError::MissingFullName);
                }
                (username, password)
            }
        };

        if username.trim().is_empty() {
            return Err(ValidationError::MissingUsername);
        }
        if password.is_empty() {
            return Err(ValidationError::MissingPassword);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Username is required")]
    MissingUsername,

    #[error("Password is required")]
    MissingPassword,

    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,

    #[error("Email is required")]
    MissingEmail,

    #[error("Full name is required")]
    MissingFullName,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(username: &str, password: &str) -> AuthRequest {
        AuthRequest::Login {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_login_validation() {
        assert!(login("alice", "hunter22").validate().is_ok());
        assert_eq!(
            login("", "hunter22").validate(),
            Err(ValidationError::MissingUsername)
        );
        assert_eq!(
            login("   ", "hunter22").validate(),
            Err(ValidationError::MissingUsername)
        );
        assert_eq!(
            login("alice", "").validate(),
            Err(ValidationError::MissingPassword)
        );
        assert_eq!(
            login("alice", "short").validate(),
            Err(ValidationError::PasswordTooShort)
        );
        // Exactly at the minimum is accepted
        assert!(login("alice", "123456").validate().is_ok());
    }

    #[test]
    fn test_register_validation() {
        let mut request = AuthRequest::Register {
            username: "alice".to_string(),
            password: "hunter22".to_string(),
            email: "alice@example.com".to_string(),
            full_name: "Alice Example".to_string(),
        };
        assert!(request.validate().is_ok());

        if let AuthRequest::Register { email, .. } = &mut request {
            *email = String::new();
        }
        assert_eq!(request.validate(), Err(ValidationError::MissingEmail));
    }

    #[test]
    fn test_register_requires_full_name() {
        let request = AuthRequest::Register {
            username: "alice".to_string(),
            password: "hunter22".to_string(),
            email: "alice@example.com".to_string(),
            full_name: "  ".to_string(),
        };
        assert_eq!(request.validate(), Err(ValidationError::MissingFullName));
    }
}
