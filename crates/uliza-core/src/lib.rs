//! Core library for the Uliza Q&A client.
//!
//! Everything here is UI-agnostic: the session lifecycle (credential
//! persistence, identity resolution, login/registration flows), question
//! submission, and the in-session history ledger. A front end composes
//! these pieces and owns when flows run; this crate owns what they do.
//!
//! - [`api`]: the remote service boundary ([`api::QaService`]) and its
//!   reqwest implementation
//! - [`auth`]: credential slot, session manager, and auth flow controller
//! - [`query`]: question submission with local validation and the
//!   session-expiry policy
//! - [`history`]: the append-only question/answer ledger
//! - [`config`]: persisted settings and app directories

pub mod api;
pub mod auth;
pub mod config;
pub mod history;
pub mod models;
pub mod query;

mod flight;

pub use api::{ApiClient, ApiError, QaService};
pub use auth::{AuthError, AuthFlow, CredentialStore, SessionManager};
pub use config::Config;
pub use history::{Ledger, QueryRecord};
pub use models::{AuthRequest, Identity, ValidationError};
pub use query::{QueryError, QuerySubmitter};
