//! Completion events delivered from spawned gateway tasks.
//!
//! Every network call is spawned onto the runtime and reports back through a
//! single unbounded channel. The event loop drains the receiver each tick and
//! applies transitions on its own thread, so state mutation never races the
//! tasks that produced the data.

use tokio::sync::mpsc;

use smelter_gateway::GatewayError;
use smelter_types::{Credential, HistoryResponse, RefactorResponse};

use crate::errors::AuthError;

/// Which auth operation a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthIntent {
    Login,
    Signup,
}

/// A finished background operation, ready to be applied to session state.
#[derive(Debug)]
pub enum SessionEvent {
    /// The analyze call tagged with `generation` resolved.
    AnalyzeDone {
        generation: u64,
        result: Result<RefactorResponse, GatewayError>,
    },
    /// The history fetch resolved.
    HistoryLoaded {
        result: Result<HistoryResponse, GatewayError>,
    },
    /// A login or signup call resolved.
    AuthDone {
        intent: AuthIntent,
        result: Result<Credential, AuthError>,
    },
}

pub type SessionSender = mpsc::UnboundedSender<SessionEvent>;
pub type SessionReceiver = mpsc::UnboundedReceiver<SessionEvent>;

#[must_use]
pub fn channel() -> (SessionSender, SessionReceiver) {
    mpsc::unbounded_channel()
}
