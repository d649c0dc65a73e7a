use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Token file name in the credential directory
const TOKEN_FILE: &str = "token.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCredential {
    token: String,
}

/// The single persisted bearer-token slot.
///
/// One token file under a fixed name; absence means anonymous. Reads absorb
/// IO and parse failures (a corrupt slot is treated as absent), writes and
/// removals are synchronous and report their errors.
#[derive(Debug)]
pub struct CredentialStore {
    dir: PathBuf,
}

impl CredentialStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Read the persisted token, if any.
    pub fn load(&self) -> Option<String> {
        let path = self.token_path();
        if !path.exists() {
            return None;
        }

        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!(error = %e, "Failed to read credential file");
                return None;
            }
        };

        match serde_json::from_str::<StoredCredential>(&contents) {
            Ok(stored) => Some(stored.token),
            Err(e) => {
                warn!(error = %e, "Failed to parse credential file");
                None
            }
        }
    }

    /// Persist the token, replacing any previous one.
    pub fn store(&self, token: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("Failed to create credential directory")?;

        let stored = StoredCredential {
            token: token.to_string(),
        };
        let contents = serde_json::to_string_pretty(&stored)?;
        std::fs::write(self.token_path(), contents).context("Failed to write credential file")?;
        Ok(())
    }

    /// Remove the persisted token.
    pub fn clear(&self) -> Result<()> {
        let path = self.token_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove credential file")?;
        }
        Ok(())
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }
}
