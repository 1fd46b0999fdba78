//! Session orchestration for smelter.
//!
//! This crate is the client core: it decides what is fetched, when, in what
//! order, and how results and errors reach the display. It holds no
//! rendering code - the TUI reads the structs here and calls their methods.
//!
//! - [`store::SessionStore`] owns the live credential (login, signup,
//!   logout, resume-from-disk).
//! - [`controller::AnalysisController`] owns the editor buffer and the
//!   analysis outcome lifecycle.
//! - [`history::HistoryBrowser`] fetches and serves past analyses; a
//!   selected record is spliced back into the controller's display without
//!   another analyzer call.
//! - [`app::App`] composes the three over one completion-event channel and
//!   applies every transition on the event-loop thread.

pub mod app;
pub mod config;
pub mod controller;
pub mod credentials;
pub mod errors;
pub mod events;
pub mod history;
pub mod store;

pub use app::{App, AuthField, AuthForm, Screen};
pub use config::{Config, ConfigError};
pub use controller::{AnalysisController, SAMPLE_SOURCE};
pub use credentials::CredentialStore;
pub use errors::AuthError;
pub use events::{AuthIntent, SessionEvent, SessionReceiver, SessionSender};
pub use history::{HistoryBrowser, HistoryView};
pub use store::SessionStore;

pub use smelter_gateway::{DEFAULT_BASE_URL, Gateway, GatewayError};
pub use smelter_types::{
    AnalysisOutcome, AnalysisResult, AuthToken, Credential, HistoryRecord, Smell, UserIdentity,
};
