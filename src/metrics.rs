use std::fmt;

use strum_macros::Display;

pub const CHARS_PER_WORD: f64 = 5.0;
pub const DEFAULT_BUDGET_SECS: u64 = 60;

/// Why a session stopped accepting input
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum EndReason {
    #[strum(to_string = "Completed!")]
    Completed,
    #[strum(to_string = "Time up!")]
    TimeUp,
}

/// Elapsed seconds between two clock readings, floored at one second so the
/// first keystroke cannot divide by a vanishing interval.
pub fn elapsed_secs(start_ms: u64, now_ms: u64) -> f64 {
    (now_ms.saturating_sub(start_ms) as f64 / 1000.0).max(1.0)
}

/// Gross words per minute, rounded to the nearest whole word.
pub fn gross_wpm(typed: usize, elapsed_secs: f64) -> u32 {
    if elapsed_secs <= 0.0 {
        return 0;
    }
    ((typed as f64 / CHARS_PER_WORD) / (elapsed_secs / 60.0)).round() as u32
}

/// Accuracy as a whole percentage of judged characters, charged with every
/// mistake made along the way.
pub fn accuracy(typed: usize, mistakes: u32) -> u32 {
    let correct = (typed as i64 - mistakes as i64).max(0) as f64;
    let judged = typed.max(1) as f64;
    ((correct / judged) * 100.0).round().max(0.0) as u32
}

/// Point-in-time view of a session's numbers
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    pub elapsed_secs: f64,
    pub typed: usize,
    pub mistakes: u32,
    pub wpm: u32,
    pub accuracy: u32,
    pub remaining_secs: u64,
}

impl Metrics {
    /// Values shown before anything has been measured
    pub fn idle(budget_secs: u64) -> Self {
        Self {
            elapsed_secs: 0.0,
            typed: 0,
            mistakes: 0,
            wpm: 0,
            accuracy: 100,
            remaining_secs: budget_secs,
        }
    }

    pub fn compute(
        typed: usize,
        mistakes: u32,
        start_ms: u64,
        now_ms: u64,
        remaining_secs: u64,
    ) -> Self {
        let elapsed = elapsed_secs(start_ms, now_ms);
        Self {
            elapsed_secs: elapsed,
            typed,
            mistakes,
            wpm: gross_wpm(typed, elapsed),
            accuracy: accuracy(typed, mistakes),
            remaining_secs,
        }
    }

    pub fn accuracy_label(&self) -> String {
        format!("{}%", self.accuracy)
    }

    pub fn remaining_label(&self) -> String {
        format!("{}s", self.remaining_secs)
    }
}

/// Final result line handed to the presentation layer once a session ends
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionSummary {
    pub reason: EndReason,
    pub wpm: u32,
    pub accuracy: u32,
    pub mistakes: u32,
}

impl SessionSummary {
    pub fn new(reason: EndReason, metrics: &Metrics) -> Self {
        Self {
            reason,
            wpm: metrics.wpm,
            accuracy: metrics.accuracy,
            mistakes: metrics.mistakes,
        }
    }
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} • WPM: {} • Accuracy: {}% • Mistakes: {}",
            self.reason, self.wpm, self.accuracy, self.mistakes
        )
    }
}
