// Library surface for the terminal front-end and headless/integration tests.
// The session core has no terminal dependency; only runtime/keymap see crossterm.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod error;
pub mod keymap;
pub mod logging;
pub mod metrics;
pub mod passages;
pub mod runtime;
pub mod session;

pub use error::{Result, SessionError};
pub use metrics::{EndReason, Metrics, SessionSummary};
pub use session::{CharState, CharView, SessionState, TypingSession};
