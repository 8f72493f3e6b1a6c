use std::fmt;

use tracing::{debug, info, warn};

use crate::clock::{Clock, MonotonicClock};
use crate::error::{Result, SessionError};
use crate::metrics::{EndReason, Metrics, SessionSummary, DEFAULT_BUDGET_SECS};
use crate::passages::TextProvider;

/// Judgment of a single reference-text position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharState {
    Pending,
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Ended(EndReason),
}

/// What a renderer needs to draw one position of the reference text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharView {
    pub ch: char,
    pub state: CharState,
    pub is_cursor: bool,
}

/// A timed typing test over one reference text.
///
/// Input is block-on-error: a wrong character is recorded as a mistake at the
/// cursor but the cursor only advances on a match. Every mutator is a silent
/// no-op outside `Running`, so late events from the front-end are harmless.
pub struct TypingSession<C: Clock = MonotonicClock> {
    provider: Box<dyn TextProvider>,
    clock: C,
    budget_secs: u64,
    state: SessionState,
    text: Vec<char>,
    marks: Vec<CharState>,
    cursor: usize,
    mistakes: u32,
    started_at_ms: Option<u64>,
    metrics: Metrics,
}

impl<C: Clock> TypingSession<C> {
    pub fn new(provider: impl TextProvider + 'static, clock: C) -> Self {
        Self {
            provider: Box::new(provider),
            clock,
            budget_secs: DEFAULT_BUDGET_SECS,
            state: SessionState::Idle,
            text: Vec::new(),
            marks: Vec::new(),
            cursor: 0,
            mistakes: 0,
            started_at_ms: None,
            metrics: Metrics::idle(DEFAULT_BUDGET_SECS),
        }
    }

    /// Set the time budget. Takes effect immediately for an idle session and
    /// from the next `start()` otherwise.
    pub fn with_budget_secs(mut self, budget_secs: u64) -> Self {
        self.budget_secs = budget_secs;
        if self.state == SessionState::Idle {
            self.metrics = Metrics::idle(budget_secs);
        }
        self
    }

    pub fn start(&mut self) -> Result<()> {
        let text = self.provider.next_text();
        if text.is_empty() {
            warn!("refusing to start: {}", SessionError::EmptyText);
            self.reset();
            return Err(SessionError::EmptyText);
        }

        self.text = text.chars().collect();
        self.marks = vec![CharState::Pending; self.text.len()];
        self.cursor = 0;
        self.mistakes = 0;
        self.started_at_ms = Some(self.clock.now_ms());
        self.metrics = Metrics::idle(self.budget_secs);
        self.state = SessionState::Running;

        info!(
            chars = self.text.len(),
            budget_secs = self.budget_secs,
            "session started"
        );
        Ok(())
    }

    pub fn submit_char(&mut self, ch: char) {
        if !self.is_running() {
            return;
        }
        let Some(&expected) = self.text.get(self.cursor) else {
            return;
        };

        let correct = ch == expected;
        if correct {
            self.marks[self.cursor] = CharState::Correct;
            self.cursor += 1;
        } else {
            self.marks[self.cursor] = CharState::Incorrect;
            self.mistakes += 1;
        }
        debug!(%ch, %expected, correct, cursor = self.cursor, "keystroke");

        let now = self.clock.now_ms();
        self.refresh_metrics(now);

        if self.cursor == self.text.len() {
            self.finish(EndReason::Completed, now);
        }
    }

    /// Erase the last keystroke. A wrong character is still sitting at the
    /// cursor, so erasing it only clears the mark; otherwise the cursor steps
    /// back over the previous match. The mistake count is never reduced.
    pub fn submit_backspace(&mut self) {
        if !self.is_running() {
            return;
        }

        if self.marks.get(self.cursor) == Some(&CharState::Incorrect) {
            self.marks[self.cursor] = CharState::Pending;
        } else if self.cursor > 0 {
            self.cursor -= 1;
            self.marks[self.cursor] = CharState::Pending;
        } else {
            return;
        }

        debug!(cursor = self.cursor, "backspace");
        let now = self.clock.now_ms();
        self.refresh_metrics(now);
    }

    /// Advance the countdown. Ends the session once the budget is used up.
    pub fn tick(&mut self) {
        if !self.is_running() {
            return;
        }

        let now = self.clock.now_ms();
        let remaining = self.remaining_at(now);
        if remaining <= 0 {
            self.finish(EndReason::TimeUp, now);
        } else {
            self.metrics.remaining_secs = remaining as u64;
        }
    }

    pub fn reset(&mut self) {
        if self.state != SessionState::Idle {
            info!("session reset");
        }
        self.state = SessionState::Idle;
        self.text.clear();
        self.marks.clear();
        self.cursor = 0;
        self.mistakes = 0;
        self.started_at_ms = None;
        self.metrics = Metrics::idle(self.budget_secs);
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        match self.state {
            SessionState::Ended(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        self.end_reason()
            .map(|reason| SessionSummary::new(reason, &self.metrics))
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    pub fn budget_secs(&self) -> u64 {
        self.budget_secs
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn char_state(&self, idx: usize) -> Option<CharState> {
        self.marks.get(idx).copied()
    }

    /// Per-position view of the reference text. The cursor is only flagged
    /// while the session is running.
    pub fn char_states(&self) -> impl Iterator<Item = CharView> + '_ {
        let cursor = self.is_running().then_some(self.cursor);
        self.text
            .iter()
            .zip(self.marks.iter())
            .enumerate()
            .map(move |(idx, (&ch, &state))| CharView {
                ch,
                state,
                is_cursor: cursor == Some(idx),
            })
    }

    fn remaining_at(&self, now_ms: u64) -> i64 {
        let started = self.started_at_ms.unwrap_or(now_ms);
        let whole_secs = now_ms.saturating_sub(started) / 1000;
        let budget = i64::try_from(self.budget_secs).unwrap_or(i64::MAX);
        budget - i64::try_from(whole_secs).unwrap_or(i64::MAX)
    }

    fn refresh_metrics(&mut self, now_ms: u64) {
        let started = self.started_at_ms.unwrap_or(now_ms);
        let remaining = self.remaining_at(now_ms).max(0) as u64;
        self.metrics = Metrics::compute(self.cursor, self.mistakes, started, now_ms, remaining);
    }

    fn finish(&mut self, reason: EndReason, now_ms: u64) {
        self.refresh_metrics(now_ms);
        if reason == EndReason::TimeUp {
            self.metrics.remaining_secs = 0;
        }
        self.state = SessionState::Ended(reason);

        info!(
            reason = %reason,
            wpm = self.metrics.wpm,
            accuracy = self.metrics.accuracy,
            mistakes = self.metrics.mistakes,
            "session ended"
        );
    }
}

impl<C: Clock + fmt::Debug> fmt::Debug for TypingSession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypingSession")
            .field("clock", &self.clock)
            .field("budget_secs", &self.budget_secs)
            .field("state", &self.state)
            .field("text", &self.text())
            .field("cursor", &self.cursor)
            .field("mistakes", &self.mistakes)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}
