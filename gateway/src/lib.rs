//! Typed HTTP gateway to the code-analysis backend.
//!
//! # Architecture
//!
//! [`Gateway`] is a thin, stateless request/response layer over the four
//! remote operations:
//!
//! | Operation | Method | Path           | Body        | Auth |
//! |-----------|--------|----------------|-------------|------|
//! | signup    | POST   | `/auth/signup` | JSON        | none |
//! | login     | POST   | `/auth/login`  | JSON        | none |
//! | refactor  | POST   | `/refactor`    | raw text    | bearer if supplied |
//! | history   | GET    | `/history`     | none        | bearer |
//!
//! The refactor operation posts the source code as a raw `text/plain` body
//! while the auth operations post JSON; the backend depends on that
//! asymmetry, so it is fixed here rather than configurable.
//!
//! # Error handling
//!
//! The gateway surfaces transport failures ([`GatewayError::Network`]) and
//! malformed bodies ([`GatewayError::Decode`]) and nothing else. HTTP status
//! codes are deliberately not interpreted: the backend reports logical
//! failures inside the JSON payload (`error: true`, `success: false`), and
//! conflating those with transport problems would hide the backend's own
//! messages. Callers inspect the decoded payload.
//!
//! The gateway never caches or guesses a token; the caller supplies one per
//! request.

use std::time::Duration;

use serde::de::DeserializeOwned;

use smelter_types::{AuthResponse, AuthToken, HistoryResponse, RefactorResponse};

/// Default base endpoint of the analysis backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const TCP_KEEPALIVE_SECS: u64 = 60;

/// Cap on the body excerpt embedded in decode errors.
const MAX_BODY_SNIPPET_CHARS: usize = 160;

/// Failure modes the gateway distinguishes.
///
/// A payload that decodes cleanly but encodes a backend-side failure is not
/// an error here - the caller inspects it.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The backend could not be reached or the connection failed mid-flight.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with something that is not the expected JSON.
    #[error("malformed response body: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        /// Leading excerpt of the offending body, for logs.
        snippet: String,
    },
}

/// Request/response functions for the analysis backend.
///
/// Cloning is cheap: the underlying `reqwest::Client` is reference-counted
/// and its connection pool is shared across clones.
#[derive(Debug, Clone)]
pub struct Gateway {
    base_url: String,
    client: reqwest::Client,
}

impl Gateway {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, default_client())
    }

    #[must_use]
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url, client }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Register a new account. A successful signup also establishes a
    /// session: the response carries a token, no second login required.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, GatewayError> {
        let response = self
            .client
            .post(self.endpoint("/auth/signup"))
            .json(&serde_json::json!({
                "username": username,
                "email": email,
                "password": password,
            }))
            .send()
            .await?;
        decode_json(response).await
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthResponse, GatewayError> {
        let response = self
            .client
            .post(self.endpoint("/auth/login"))
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await?;
        decode_json(response).await
    }

    /// Submit source code for analysis and refactoring.
    ///
    /// The body is the raw source text. The bearer header is attached only
    /// when the caller supplies a token.
    pub async fn refactor(
        &self,
        code: &str,
        token: Option<&AuthToken>,
    ) -> Result<RefactorResponse, GatewayError> {
        let mut request = self
            .client
            .post(self.endpoint("/refactor"))
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(code.to_owned());
        if let Some(token) = token {
            request = request.bearer_auth(token.expose_secret());
        }
        decode_json(request.send().await?).await
    }

    /// Fetch the ordered list of past analyses for the authenticated user.
    pub async fn history(&self, token: &AuthToken) -> Result<HistoryResponse, GatewayError> {
        let response = self
            .client
            .get(self.endpoint("/history"))
            .bearer_auth(token.expose_secret())
            .send()
            .await?;
        decode_json(response).await
    }
}

fn default_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap_or_else(|e| {
            tracing::error!("Failed to build tuned HTTP client: {e}. Falling back to defaults.");
            reqwest::Client::new()
        })
}

/// Read the full body, then decode it as JSON.
///
/// Reading and decoding are separate so a connection dropped mid-body stays
/// a [`GatewayError::Network`] while a complete-but-bogus body becomes a
/// [`GatewayError::Decode`].
async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| GatewayError::Decode {
        source,
        snippet: body_snippet(&body),
    })
}

fn body_snippet(body: &str) -> String {
    if body.chars().count() <= MAX_BODY_SNIPPET_CHARS {
        body.to_string()
    } else {
        let mut snippet: String = body.chars().take(MAX_BODY_SNIPPET_CHARS).collect();
        snippet.push_str("...(truncated)");
        snippet
    }
}

#[cfg(test)]
mod tests {
    use super::{Gateway, body_snippet};

    #[test]
    fn base_url_trailing_slashes_are_stripped() {
        let gateway = Gateway::new("http://localhost:8080/api///");
        assert_eq!(gateway.base_url(), "http://localhost:8080/api");
        assert_eq!(
            gateway.endpoint("/history"),
            "http://localhost:8080/api/history"
        );
    }

    #[test]
    fn body_snippet_caps_long_bodies() {
        let long = "x".repeat(500);
        let snippet = body_snippet(&long);
        assert!(snippet.ends_with("...(truncated)"));
        assert!(snippet.len() < long.len());

        assert_eq!(body_snippet("short"), "short");
    }
}
