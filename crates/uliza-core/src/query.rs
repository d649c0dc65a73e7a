//! Question submission against the answer endpoint.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ApiError, QaService};
use crate::auth::SessionManager;
use crate::flight::FlightGuard;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Please enter a question")]
    EmptyQuestion,

    #[error("Please log in to ask questions")]
    Unauthenticated,

    #[error("A question is already in flight")]
    InFlight,

    /// The token was rejected mid-use; the whole session is invalid.
    #[error("Session expired. Please log in again.")]
    SessionExpired,

    #[error("{0}")]
    Service(String),
}

/// Submits questions: local validation, exactly one request per call, no
/// retry. One question may be in flight at a time; the guard is released on
/// every exit path.
#[derive(Debug, Default)]
pub struct QuerySubmitter {
    in_flight: AtomicBool,
}

impl QuerySubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submit a question with the given credential. Does not touch session
    /// state; a rejected token surfaces as [`QueryError::SessionExpired`]
    /// for the caller to act on.
    pub async fn submit<S: QaService + ?Sized>(
        &self,
        service: &S,
        token: Option<&str>,
        question: &str,
    ) -> Result<String, QueryError> {
        if question.trim().is_empty() {
            return Err(QueryError::EmptyQuestion);
        }
        let token = token.ok_or(QueryError::Unauthenticated)?;

        let _guard = FlightGuard::acquire(&self.in_flight).ok_or(QueryError::InFlight)?;

        debug!("Submitting question");
        match service.ask(token, question).await {
            Ok(answer) => Ok(answer),
            Err(ApiError::Unauthorized(_)) => Err(QueryError::SessionExpired),
            Err(e) => Err(QueryError::Service(e.to_string())),
        }
    }

    /// Submit a question under the active session. A 401-equivalent ends the
    /// session through the manager (identity and persisted credential are
    /// gone by the time the error is returned); the caller still owns the
    /// wider state reset and the ledger append on success.
    pub async fn ask<S: QaService + ?Sized>(
        &self,
        service: &S,
        session: &mut SessionManager,
        question: &str,
    ) -> Result<String, QueryError> {
        let token = session.token().map(str::to_owned);
        let result = self.submit(service, token.as_deref(), question).await;

        if matches!(result, Err(QueryError::SessionExpired)) {
            if let Err(e) = session.end() {
                warn!(error = %e, "Failed to clear credential after rejected token");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use reqwest::StatusCode;

    use crate::api::{LoginResponse, RegisterRequest};
    use crate::auth::CredentialStore;
    use crate::models::Identity;

    use super::*;

    enum AskBehavior {
        Answer(&'static str),
        Unauthorized,
        Fail(&'static str),
    }

    struct StubAnswers {
        behavior: AskBehavior,
        calls: AtomicUsize,
    }

    impl StubAnswers {
        fn new(behavior: AskBehavior) -> Self {
            Self {
                behavior,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QaService for StubAnswers {
        async fn verify_token(&self, _: &str) -> Result<Identity, ApiError> {
            panic!("unexpected verify call");
        }

        async fn login(&self, _: &str, _: &str) -> Result<LoginResponse, ApiError> {
            panic!("unexpected login call");
        }

        async fn register(&self, _: &RegisterRequest) -> Result<(), ApiError> {
            panic!("unexpected register call");
        }

        async fn ask(&self, _: &str, _: &str) -> Result<String, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                AskBehavior::Answer(answer) => Ok(answer.to_string()),
                AskBehavior::Unauthorized => Err(ApiError::from_status(
                    StatusCode::UNAUTHORIZED,
                    r#"{"detail": "Could not validate credentials"}"#,
                )),
                AskBehavior::Fail(detail) => Err(ApiError::from_status(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    detail,
                )),
            }
        }
    }

    #[tokio::test]
    async fn test_blank_questions_are_rejected_locally() {
        let submitter = QuerySubmitter::new();
        let stub = StubAnswers::new(AskBehavior::Answer("4"));

        for question in ["", "   ", "\n\t "] {
            let result = submitter.submit(&stub, Some("tok"), question).await;
            assert!(matches!(result, Err(QueryError::EmptyQuestion)));
        }
        assert_eq!(stub.call_count(), 0);
        assert!(!submitter.is_in_flight());
    }

    #[tokio::test]
    async fn test_missing_credential_is_rejected_locally() {
        let submitter = QuerySubmitter::new();
        let stub = StubAnswers::new(AskBehavior::Answer("4"));

        let result = submitter.submit(&stub, None, "What is 2+2?").await;
        assert!(matches!(result, Err(QueryError::Unauthenticated)));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_successful_ask_returns_answer_once() {
        let submitter = QuerySubmitter::new();
        let stub = StubAnswers::new(AskBehavior::Answer("4"));

        let answer = submitter
            .submit(&stub, Some("tok"), "What is 2+2?")
            .await
            .expect("ask should succeed");
        assert_eq!(answer, "4");
        assert_eq!(stub.call_count(), 1);
        assert!(!submitter.is_in_flight());
    }

    #[tokio::test]
    async fn test_service_failure_surfaces_detail() {
        let submitter = QuerySubmitter::new();
        let stub = StubAnswers::new(AskBehavior::Fail(r#"{"detail": "model overloaded"}"#));

        let result = submitter.submit(&stub, Some("tok"), "question").await;
        match result {
            Err(QueryError::Service(message)) => assert_eq!(message, "model overloaded"),
            other => panic!("expected Service error, got {:?}", other.map(|_| ())),
        }
        assert!(!submitter.is_in_flight());
    }

    #[tokio::test]
    async fn test_rejected_token_ends_the_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CredentialStore::new(dir.path().to_path_buf());
        let mut session = SessionManager::new(store);
        session.establish("stale-token", "alice").expect("establish");

        let submitter = QuerySubmitter::new();
        let stub = StubAnswers::new(AskBehavior::Unauthorized);

        let result = submitter.ask(&stub, &mut session, "What is 2+2?").await;
        assert!(matches!(result, Err(QueryError::SessionExpired)));

        // Identity and the persisted slot are both gone
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
        assert_eq!(
            CredentialStore::new(dir.path().to_path_buf()).load(),
            None
        );
    }

    #[tokio::test]
    async fn test_ask_without_session_makes_no_call() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut session = SessionManager::new(CredentialStore::new(dir.path().to_path_buf()));

        let submitter = QuerySubmitter::new();
        let stub = StubAnswers::new(AskBehavior::Answer("4"));

        let result = submitter.ask(&stub, &mut session, "What is 2+2?").await;
        assert!(matches!(result, Err(QueryError::Unauthenticated)));
        assert_eq!(stub.call_count(), 0);
    }
}
