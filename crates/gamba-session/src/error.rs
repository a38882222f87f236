//! Error types for the session layer.

/// Errors from starting or ending a wager session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Only one session may exist at a time.
    #[error("a session with {0} is already active")]
    AlreadyActive(String),

    /// `:endsession` with nothing to end.
    #[error("no active session")]
    NoActiveSession,

    /// The wager was empty, zero, or not a number.
    #[error("invalid wager: {0}")]
    InvalidWager(String),
}
