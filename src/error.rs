use thiserror::Error;

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("text provider returned an empty reference text")]
    EmptyText,

    #[error("unknown passage set: {0}")]
    UnknownPassageSet(String),

    #[error("passage set {0} has no passages")]
    EmptyPassageSet(String),

    #[error("malformed passage set: {0}")]
    Passages(#[from] serde_json::Error),
}
