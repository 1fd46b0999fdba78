//! Error taxonomy and user-facing failure messages.
//!
//! Three failure kinds reach the user: the backend was unreachable (or
//! answered garbage), the backend answered and said no, or a local
//! collaborator failed. Connectivity failures get actionable guidance;
//! logical failures surface the backend's own message verbatim.

use smelter_gateway::GatewayError;
use smelter_types::AuthRejected;

/// Why an auth operation did not produce a credential.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Transport or decode failure before any backend verdict.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The backend answered but declined (bad password, taken username, ...).
    #[error("{message}")]
    Rejected { message: String },
}

impl From<AuthRejected> for AuthError {
    fn from(rejected: AuthRejected) -> Self {
        Self::Rejected {
            message: rejected.message,
        }
    }
}

/// Guidance shown when the backend cannot be reached.
///
/// A malformed body gets the same treatment as a dead connection: from the
/// user's chair both mean "the backend is not serving this client", and the
/// actionable fix is the same.
#[must_use]
pub fn connectivity_message(base_url: &str, err: &GatewayError) -> String {
    let detail = match err {
        GatewayError::Network(source) => source.to_string(),
        GatewayError::Decode { source, .. } => format!("unexpected response ({source})"),
    };
    format!(
        "Cannot reach the analysis backend at {base_url}: {detail}. \
         Check that the backend is running and the base URL is correct, then retry."
    )
}

/// User-facing message for a failed analyze call.
#[must_use]
pub fn analyze_failure_message(base_url: &str, err: &GatewayError) -> String {
    connectivity_message(base_url, err)
}

/// User-facing message for a failed login/signup.
#[must_use]
pub fn auth_failure_message(base_url: &str, err: &AuthError) -> String {
    match err {
        AuthError::Gateway(gateway) => connectivity_message(base_url, gateway),
        AuthError::Rejected { message } => message.clone(),
    }
}
