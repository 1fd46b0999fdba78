//! Analysis session controller: source text and outcome lifecycle.
//!
//! The controller owns the editor buffer and the [`AnalysisOutcome`] and is
//! the only writer of either. An analyze call spawns one gateway task tagged
//! with a generation number; the completion comes back through the session
//! channel and is applied here, where it is dropped if anything superseded
//! it in the meantime (a restore, a sample load, a newer analyze).
//!
//! Outcome transitions:
//!
//! ```text
//!  Empty ──analyze──> Running ──success──> Completed
//!                        │
//!                        └────failure──> Error ──analyze──> Running
//!
//!  load_sample:          any state -> Empty
//!  restore_from_history: any state -> Completed
//! ```
//!
//! Editing the buffer never changes the outcome; results only move aside on
//! an explicit analyze, sample load, or restore.

use smelter_gateway::{Gateway, GatewayError};
use smelter_types::{
    AnalysisOutcome, AnalysisResult, AuthToken, HistoryRecord, RefactorResponse,
};

use crate::errors;
use crate::events::{SessionEvent, SessionSender};

/// The nested-conditional starter snippet shown on first launch.
pub const SAMPLE_SOURCE: &str = r#"public class Example {
    public void method() {
        int x = 100;
        int y = 200;

        if (x > 50) {
            if (y > 100) {
                if (x + y > 250) {
                    System.out.println("Result");
                }
            }
        }
    }
}"#;

#[derive(Debug)]
pub struct AnalysisController {
    source: String,
    /// Byte offset of the editing cursor; always on a char boundary.
    cursor: usize,
    outcome: AnalysisOutcome,
    generation: u64,
}

impl Default for AnalysisController {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: SAMPLE_SOURCE.to_string(),
            cursor: SAMPLE_SOURCE.len(),
            outcome: AnalysisOutcome::Empty,
            generation: 0,
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn outcome(&self) -> &AnalysisOutcome {
        &self.outcome
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.outcome.is_running()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Start an analysis of the current buffer.
    ///
    /// At most one call is in flight: while `Running`, further calls return
    /// `false` with no side effect. Retrying from `Error` is always allowed.
    pub fn analyze(
        &mut self,
        gateway: &Gateway,
        token: Option<AuthToken>,
        events: &SessionSender,
    ) -> bool {
        if self.outcome.is_running() {
            return false;
        }

        self.generation += 1;
        let generation = self.generation;
        self.outcome = AnalysisOutcome::Running { generation };

        let gateway = gateway.clone();
        let code = self.source.clone();
        let events = events.clone();
        tokio::spawn(async move {
            let result = gateway.refactor(&code, token.as_ref()).await;
            // Send failure means the session is shutting down; nothing to do.
            let _ = events.send(SessionEvent::AnalyzeDone { generation, result });
        });
        true
    }

    /// Apply a finished analyze call.
    ///
    /// Completions are dropped unless the outcome is still `Running` with a
    /// matching generation: a restore or sample load has already moved the
    /// display on, and last-write-wins belongs to whatever did.
    pub fn on_analyze_done(
        &mut self,
        base_url: &str,
        generation: u64,
        result: Result<RefactorResponse, GatewayError>,
    ) {
        match self.outcome {
            AnalysisOutcome::Running {
                generation: current,
            } if current == generation => {}
            _ => {
                tracing::debug!(generation, "Dropping stale analyze completion");
                return;
            }
        }

        self.outcome = match result {
            Ok(response) if response.error => AnalysisOutcome::Error {
                message: response
                    .message
                    .unwrap_or_else(|| "analysis failed".to_string()),
            },
            Ok(response) => AnalysisOutcome::Completed(AnalysisResult::from(response)),
            Err(err) => AnalysisOutcome::Error {
                message: errors::analyze_failure_message(base_url, &err),
            },
        };
    }

    /// Replace the buffer with the starter snippet and clear any outcome, so
    /// stale results are never shown against the fresh text.
    pub fn load_sample(&mut self) {
        self.source = SAMPLE_SOURCE.to_string();
        self.cursor = self.source.len();
        self.outcome = AnalysisOutcome::Empty;
    }

    /// Rehydrate the session from a past record, bypassing the backend.
    ///
    /// Valid from any state, including over a `Running` analyze - the
    /// in-flight response loses and will be dropped on arrival.
    pub fn restore_from_history(&mut self, record: &HistoryRecord) {
        self.source = record.original_code.clone();
        self.cursor = self.source.len();
        self.outcome = AnalysisOutcome::Completed(AnalysisResult::from_history(record));
    }

    // ------------------------------------------------------------------
    // Buffer editing
    // ------------------------------------------------------------------

    /// Replace the whole buffer, e.g. from a paste. Like keystroke edits,
    /// this does not touch the outcome.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
        self.cursor = self.source.len();
    }

    pub fn insert_char(&mut self, ch: char) {
        self.source.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.source.remove(prev);
            self.cursor = prev;
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(ch) = self.source[self.cursor..].chars().next() {
            self.cursor += ch.len_utf8();
        }
    }

    pub fn move_up(&mut self) {
        let (line, col) = self.cursor_position();
        if line > 0 {
            self.cursor = self.offset_at(line - 1, col);
        }
    }

    pub fn move_down(&mut self) {
        let (line, col) = self.cursor_position();
        if line + 1 < self.source.split('\n').count() {
            self.cursor = self.offset_at(line + 1, col);
        }
    }

    pub fn move_line_start(&mut self) {
        let (line, _) = self.cursor_position();
        self.cursor = self.offset_at(line, 0);
    }

    pub fn move_line_end(&mut self) {
        let (line, _) = self.cursor_position();
        self.cursor = self.offset_at(line, usize::MAX);
    }

    /// Zero-based (line, column) of the cursor, columns in chars.
    #[must_use]
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.source[..self.cursor];
        let line = before.matches('\n').count();
        let col = before
            .rsplit_once('\n')
            .map_or(before, |(_, rest)| rest)
            .chars()
            .count();
        (line, col)
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.source[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(idx, _)| idx)
    }

    /// Byte offset of (line, col), clamping col to the line length.
    fn offset_at(&self, line: usize, col: usize) -> usize {
        let mut offset = 0;
        for (idx, text) in self.source.split('\n').enumerate() {
            if idx == line {
                let clamped: usize = text
                    .char_indices()
                    .nth(col)
                    .map_or(text.len(), |(byte, _)| byte);
                return offset + clamped;
            }
            offset += text.len() + 1;
        }
        self.source.len()
    }
}
