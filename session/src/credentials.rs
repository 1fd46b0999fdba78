//! Credential persistence for session resume.
//!
//! The session store delegates local persistence here: the live credential
//! is written as schema-versioned JSON under the user data directory so the
//! next launch can resume authenticated. Anything unreadable (missing file,
//! old schema, corrupt JSON) resumes unauthenticated instead of failing
//! startup.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use smelter_types::{AuthToken, Credential, UserIdentity};

const FILENAME: &str = "credentials.json";

/// On-disk schema for the persisted credential.
///
/// `version` gates forward compatibility: a file written by a newer schema
/// is ignored rather than misread.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCredential {
    version: u32,
    token: AuthToken,
    id: u64,
    username: String,
}

impl StoredCredential {
    const CURRENT_VERSION: u32 = 1;

    fn from_credential(credential: &Credential) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            token: credential.token().clone(),
            id: credential.user().id,
            username: credential.user().username.clone(),
        }
    }

    fn into_credential(self) -> Option<Credential> {
        if self.version != Self::CURRENT_VERSION {
            tracing::warn!(
                version = self.version,
                "Ignoring persisted credential with unknown schema version"
            );
            return None;
        }
        Some(Credential::new(
            self.token,
            UserIdentity {
                id: self.id,
                username: self.username,
            },
        ))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialStoreError {
    #[error("failed to write credential file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode credential: {0}")]
    Json(#[from] serde_json::Error),
}

/// File-backed credential storage.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(FILENAME),
        }
    }

    /// `<data dir>/smelter/credentials.json`, if a data dir exists on this
    /// platform.
    #[must_use]
    pub fn default_location() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join("smelter")))
    }

    /// Read the persisted credential, if one is usable.
    #[must_use]
    pub fn load(&self) -> Option<Credential> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read credential file: {e}");
                return None;
            }
        };
        match serde_json::from_str::<StoredCredential>(&text) {
            Ok(stored) => stored.into_credential(),
            Err(e) => {
                tracing::warn!("Ignoring malformed credential file: {e}");
                None
            }
        }
    }

    pub fn save(&self, credential: &Credential) -> Result<(), CredentialStoreError> {
        if let Some(parent) = self.path.parent() {
            ensure_private_dir(parent)?;
        }
        let stored = StoredCredential::from_credential(credential);
        let text = serde_json::to_string_pretty(&stored)?;
        fs::write(&self.path, text)?;
        Ok(())
    }

    /// Remove the persisted credential. Removing a file that is already gone
    /// is a success.
    pub fn clear(&self) -> Result<(), CredentialStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Create the directory if needed, owner-only on Unix.
fn ensure_private_dir(dir: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true).mode(0o700);
        builder.create(dir)
    }
    #[cfg(not(unix))]
    {
        fs::create_dir_all(dir)
    }
}

#[cfg(test)]
mod tests {
    use smelter_types::{AuthToken, Credential, UserIdentity};

    use super::{CredentialStore, StoredCredential};

    fn credential() -> Credential {
        Credential::new(
            AuthToken::new("jwt-abc").unwrap(),
            UserIdentity {
                id: 42,
                username: "ada".to_string(),
            },
        )
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());

        store.save(&credential()).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, credential());
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        assert!(store.load().is_none());
    }

    #[test]
    fn load_ignores_unknown_schema_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        store.save(&credential()).unwrap();

        let path = dir.path().join("credentials.json");
        let text = std::fs::read_to_string(&path).unwrap();
        let bumped = text.replace(
            &format!("\"version\": {}", StoredCredential::CURRENT_VERSION),
            "\"version\": 99",
        );
        std::fs::write(&path, bumped).unwrap();

        assert!(store.load().is_none());
    }

    #[test]
    fn load_ignores_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());
        std::fs::write(dir.path().join("credentials.json"), "{not json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path());

        store.save(&credential()).unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn save_creates_owner_only_dir() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        let store = CredentialStore::new(&nested);
        store.save(&credential()).unwrap();

        let mode = std::fs::metadata(&nested).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
