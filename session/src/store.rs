//! Session store: owner of the single live credential.
//!
//! Login and signup go through the gateway and either install a whole
//! [`Credential`] or leave the store untouched; logout clears it
//! unconditionally with no network effect. The credential is swapped as one
//! `Option` assignment, so readers never observe a token without its user.

use smelter_gateway::Gateway;
use smelter_types::{AuthResponse, AuthToken, Credential};

use crate::credentials::CredentialStore;
use crate::errors::AuthError;

#[derive(Debug, Default)]
pub struct SessionStore {
    credential: Option<Credential>,
    persistence: Option<CredentialStore>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that persists the credential through the given collaborator.
    #[must_use]
    pub fn with_persistence(persistence: CredentialStore) -> Self {
        Self {
            credential: None,
            persistence: Some(persistence),
        }
    }

    /// Resume the previous session from persistence, if one is stored.
    pub fn resume(&mut self) -> bool {
        let Some(persistence) = &self.persistence else {
            return false;
        };
        match persistence.load() {
            Some(credential) => {
                tracing::info!(username = credential.username(), "Resumed session");
                self.credential = Some(credential);
                true
            }
            None => false,
        }
    }

    pub async fn login(
        &mut self,
        gateway: &Gateway,
        username: &str,
        password: &str,
    ) -> Result<&Credential, AuthError> {
        let response = gateway.login(username, password).await?;
        let credential = Self::accept(response)?;
        Ok(self.install(credential))
    }

    /// A successful signup also establishes the session; no second login.
    pub async fn signup(
        &mut self,
        gateway: &Gateway,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<&Credential, AuthError> {
        let response = gateway.signup(username, email, password).await?;
        let credential = Self::accept(response)?;
        Ok(self.install(credential))
    }

    /// Map an auth payload to a credential without touching any state.
    ///
    /// Spawned auth tasks use this so the store itself is only ever written
    /// from the event loop, via [`SessionStore::install`].
    pub fn accept(response: AuthResponse) -> Result<Credential, AuthError> {
        Ok(Credential::try_from(response)?)
    }

    /// Install a credential as the live session.
    pub fn install(&mut self, credential: Credential) -> &Credential {
        if let Some(persistence) = &self.persistence
            && let Err(e) = persistence.save(&credential)
        {
            tracing::warn!("Failed to persist credential: {e}");
        }
        self.credential.insert(credential)
    }

    /// Clear the session. Idempotent; no network effect - token
    /// invalidation, if any, is the backend's concern.
    pub fn logout(&mut self) {
        if self.credential.take().is_some() {
            tracing::info!("Logged out");
        }
        if let Some(persistence) = &self.persistence
            && let Err(e) = persistence.clear()
        {
            tracing::warn!("Failed to clear persisted credential: {e}");
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    #[must_use]
    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    #[must_use]
    pub fn token(&self) -> Option<&AuthToken> {
        self.credential.as_ref().map(Credential::token)
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.credential.as_ref().map(Credential::username)
    }
}
