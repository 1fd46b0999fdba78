//! Core domain types for smelter.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies: the credential held for an authenticated session, the decoded
//! wire shapes of the analysis backend, and the outcome lifecycle of a single
//! analysis attempt. Everything here can be used from any layer of the
//! application.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Auth token & credential
// ============================================================================

/// An opaque bearer token issued by the backend.
///
/// The token is a secret: `Debug` redacts it and nothing formats it
/// implicitly. Use [`AuthToken::expose_secret`] at the single point where the
/// value goes into an `Authorization` header.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthToken(String);

#[derive(Debug, Error)]
#[error("auth token must not be empty")]
pub struct EmptyTokenError;

impl AuthToken {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyTokenError> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(EmptyTokenError)
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AuthToken {
    type Error = EmptyTokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AuthToken> for String {
    fn from(value: AuthToken) -> Self {
        value.0
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

/// The identity the backend associated with a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: u64,
    pub username: String,
}

/// A live authenticated session: bearer token plus the user it belongs to.
///
/// Constructed whole from a successful auth payload and swapped in or out as
/// a unit, so no reader ever observes a token without its user (or vice
/// versa). Exactly one credential is live at a time; the session store owns
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    token: AuthToken,
    user: UserIdentity,
}

/// The backend answered, but declined to issue a credential.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AuthRejected {
    pub message: String,
}

impl Credential {
    #[must_use]
    pub fn new(token: AuthToken, user: UserIdentity) -> Self {
        Self { token, user }
    }

    #[must_use]
    pub fn token(&self) -> &AuthToken {
        &self.token
    }

    #[must_use]
    pub fn user(&self) -> &UserIdentity {
        &self.user
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.user.username
    }
}

impl TryFrom<AuthResponse> for Credential {
    type Error = AuthRejected;

    /// A payload without a usable token is a rejection; the backend's own
    /// message is carried through when present.
    fn try_from(response: AuthResponse) -> Result<Self, Self::Error> {
        let rejected = |message: Option<String>| AuthRejected {
            message: message.unwrap_or_else(|| "authentication failed".to_string()),
        };

        let Some(raw_token) = response.token else {
            return Err(rejected(response.message));
        };
        let Ok(token) = AuthToken::new(raw_token) else {
            return Err(rejected(response.message));
        };
        let Some(username) = response.username else {
            return Err(rejected(response.message));
        };

        Ok(Self::new(
            token,
            UserIdentity {
                id: response.id,
                username,
            },
        ))
    }
}

// ============================================================================
// Wire shapes
// ============================================================================

/// Decoded body of the auth operations (`/auth/signup`, `/auth/login`).
///
/// The backend signals failure in-band: a null token plus a message. The
/// reference backend omits a user id, so `id` defaults to 0.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    pub token: Option<String>,
    pub username: Option<String>,
    #[serde(default)]
    pub id: u64,
    pub message: Option<String>,
}

/// One detected code-quality issue, in backend detection order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Smell {
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub description: String,
}

/// Decoded body of the analyze/refactor operation.
///
/// All fields are optional on the wire; `error: true` marks a logical failure
/// with the reason in `message`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactorResponse {
    #[serde(default)]
    pub detected_smells: Vec<Smell>,
    pub refactored_code: Option<String>,
    #[serde(default)]
    pub saved: bool,
    #[serde(default)]
    pub error: bool,
    pub message: Option<String>,
}

/// An immutable snapshot of a past analysis, owned by the backend.
///
/// `created_at` is a Java `LocalDateTime` on the wire: ISO-8601 with no
/// offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: u64,
    pub created_at: NaiveDateTime,
    pub original_code: String,
    pub refactored_code: Option<String>,
    pub diff: Option<String>,
    #[serde(default)]
    pub smells_count: u32,
    #[serde(default)]
    pub smell_types: String,
}

impl HistoryRecord {
    /// Human-readable creation time, e.g. "Aug  7, 2026 14:05".
    #[must_use]
    pub fn created_label(&self) -> String {
        self.created_at.format("%b %e, %Y %H:%M").to_string()
    }

    /// First line of the original code, capped for one-line previews.
    #[must_use]
    pub fn code_preview(&self, max_chars: usize) -> String {
        let line = self.original_code.lines().next().unwrap_or_default();
        let mut preview: String = line.chars().take(max_chars).collect();
        if line.chars().count() > max_chars || self.original_code.lines().nth(1).is_some() {
            preview.push('…');
        }
        preview
    }
}

/// Decoded body of the history operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryResponse {
    pub success: bool,
    #[serde(default)]
    pub history: Vec<HistoryRecord>,
}

// ============================================================================
// Analysis outcome
// ============================================================================

/// The payload of a completed analysis, shared between live results and
/// restored history records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    /// Detection order from the backend, preserved verbatim.
    pub smells: Vec<Smell>,
    pub refactored_code: Option<String>,
    pub saved_to_history: bool,
}

impl From<RefactorResponse> for AnalysisResult {
    fn from(response: RefactorResponse) -> Self {
        Self {
            smells: response.detected_smells,
            refactored_code: response.refactored_code,
            saved_to_history: response.saved,
        }
    }
}

impl AnalysisResult {
    /// Rehydrate a display result from a history record. History does not
    /// retain per-smell detail, so the smell list is empty and the record is
    /// by definition already saved.
    #[must_use]
    pub fn from_history(record: &HistoryRecord) -> Self {
        Self {
            smells: Vec::new(),
            refactored_code: record.refactored_code.clone(),
            saved_to_history: true,
        }
    }
}

/// Lifecycle of the single active (or most recent) analysis attempt.
///
/// Exactly one variant is live at a time. `Running` carries the generation
/// of the in-flight call so completions from superseded calls can be
/// recognized and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnalysisOutcome {
    #[default]
    Empty,
    Running {
        generation: u64,
    },
    Error {
        message: String,
    },
    Completed(AnalysisResult),
}

impl AnalysisOutcome {
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    #[must_use]
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Completed(result) => Some(result),
            _ => None,
        }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            _ => None,
        }
    }
}
