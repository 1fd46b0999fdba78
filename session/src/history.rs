//! History browser: on-demand fetch and selection of past analyses.
//!
//! Opening always re-fetches; closing discards the cached list, so there is
//! no staleness to manage at the cost of one round trip per open. A failed
//! fetch degrades to the empty-state and is only logged - history is an
//! enhancement, never a blocker for the rest of the session.

use smelter_gateway::{Gateway, GatewayError};
use smelter_types::{AuthToken, HistoryRecord, HistoryResponse};

use crate::events::{SessionEvent, SessionSender};

/// Visible state of the history view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HistoryView {
    #[default]
    Closed,
    /// Fetch outstanding; render a loading indicator.
    Loading,
    /// Fetch resolved. An empty list renders an explicit empty-state.
    Loaded(Vec<HistoryRecord>),
}

#[derive(Debug, Default)]
pub struct HistoryBrowser {
    view: HistoryView,
    selected: usize,
}

impl HistoryBrowser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn view(&self) -> &HistoryView {
        &self.view
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        !matches!(self.view, HistoryView::Closed)
    }

    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Open the view and start a fetch, gated on the caller's token.
    pub fn open(&mut self, gateway: &Gateway, token: Option<AuthToken>, events: &SessionSender) {
        let Some(token) = token else {
            tracing::warn!("History requested without a credential");
            self.view = HistoryView::Loaded(Vec::new());
            self.selected = 0;
            return;
        };

        self.view = HistoryView::Loading;
        self.selected = 0;

        let gateway = gateway.clone();
        let events = events.clone();
        tokio::spawn(async move {
            let result = gateway.history(&token).await;
            let _ = events.send(SessionEvent::HistoryLoaded { result });
        });
    }

    /// Apply a finished fetch. Ignored unless the view is still loading
    /// (the user may have closed it while the call was outstanding).
    pub fn on_loaded(&mut self, result: Result<HistoryResponse, GatewayError>) {
        if self.view != HistoryView::Loading {
            return;
        }
        self.view = match result {
            Ok(response) if response.success => HistoryView::Loaded(response.history),
            Ok(_) => {
                tracing::warn!("Backend declined the history fetch");
                HistoryView::Loaded(Vec::new())
            }
            Err(e) => {
                tracing::warn!("Failed to load history: {e}");
                HistoryView::Loaded(Vec::new())
            }
        };
    }

    pub fn select_next(&mut self) {
        if let HistoryView::Loaded(records) = &self.view
            && self.selected + 1 < records.len()
        {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Take the highlighted record and close the view.
    ///
    /// The returned record is the one-shot selection the analysis controller
    /// consumes to rehydrate its display.
    pub fn select(&mut self) -> Option<HistoryRecord> {
        let HistoryView::Loaded(records) = &self.view else {
            return None;
        };
        let record = records.get(self.selected).cloned()?;
        self.close();
        Some(record)
    }

    /// Discard the cached list; the next open re-fetches.
    pub fn close(&mut self) {
        self.view = HistoryView::Closed;
        self.selected = 0;
    }
}
