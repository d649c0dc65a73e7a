use anyhow::Result;
use tracing::{debug, info, warn};

use crate::api::QaService;
use crate::models::Identity;

use super::CredentialStore;

/// Owner of the active session: the persisted credential slot and the
/// in-memory identity. All other components read through the accessors and
/// request establishment/termination here; nothing else writes either.
#[derive(Debug)]
pub struct SessionManager {
    store: CredentialStore,
    token: Option<String>,
    identity: Option<Identity>,
}

impl SessionManager {
    pub fn new(store: CredentialStore) -> Self {
        Self {
            store,
            token: None,
            identity: None,
        }
    }

    /// Validate any persisted credential against the identity service.
    ///
    /// With no stored token this returns immediately without a network call.
    /// A stored token is verified remotely; on success the identity is
    /// adopted, on any failure the slot is cleared and the session stays
    /// anonymous. Failures are absorbed, never propagated.
    pub async fn restore<S: QaService + ?Sized>(&mut self, verifier: &S) {
        let Some(token) = self.store.load() else {
            debug!("No stored credential; staying anonymous");
            return;
        };

        match verifier.verify_token(&token).await {
            Ok(identity) => {
                info!(username = %identity.username, "Session restored");
                self.token = Some(token);
                self.identity = Some(identity);
            }
            Err(e) => {
                debug!(error = %e, "Stored credential rejected; clearing");
                if let Err(e) = self.store.clear() {
                    warn!(error = %e, "Failed to clear rejected credential");
                }
                self.token = None;
                self.identity = None;
            }
        }
    }

    /// Adopt a freshly issued token. The username is the one the user just
    /// authenticated with; the token-issuing endpoint does not echo it back.
    pub fn establish(&mut self, token: &str, username: &str) -> Result<()> {
        self.store.store(token)?;
        self.token = Some(token.to_string());
        self.identity = Some(Identity::new(username));
        info!(username, "Session established");
        Ok(())
    }

    /// Drop the session: identity and persisted credential are cleared
    /// synchronously. The in-memory state is reset even if removing the
    /// persisted slot fails.
    pub fn end(&mut self) -> Result<()> {
        self.token = None;
        self.identity = None;
        self.store.clear()?;
        info!("Session ended");
        Ok(())
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}
