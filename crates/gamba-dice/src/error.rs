use gamba_protocol::DiceId;

/// Errors from dice operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiceError {
    /// Roll or close was asked for the unset identifier.
    #[error("no dice id")]
    NoIdentifier,

    /// A result arrived for a dice the registry is not tracking.
    #[error("dice {0} is not tracked")]
    UnknownDice(DiceId),

    /// A flow asked for a position past the end of the registry.
    #[error("no dice at position {index} (tracking {len})")]
    NoSuchPosition { index: usize, len: usize },
}
