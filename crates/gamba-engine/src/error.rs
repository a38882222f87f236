//! Error types for the engine.

use gamba_dice::DiceError;

use crate::GameState;

/// Why a flow, command or trade decision did not go through.
///
/// None of these are fatal: every path that produces one returns the
/// engine to `Idle` (or leaves it where it was) and logs it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    /// Another flow is running.
    #[error("already busy ({0})")]
    Busy(GameState),

    /// Fewer dice are tracked than the flow needs.
    #[error("not enough dice: have {have}, need {need}")]
    InsufficientDice { have: usize, need: usize },

    /// A roll or close targeted the unset dice id.
    #[error("no dice id")]
    NoIdentifier,

    /// Results did not arrive in time.
    #[error("timed out waiting for {missing} dice result(s)")]
    JoinTimeout { missing: usize },

    /// The inventory listing never settled, so a payout cannot be checked.
    #[error("inventory not ready")]
    InventoryNotReady,

    /// A 21/13 flow kept hitting without reaching its threshold.
    #[error("gave up after {0} hits")]
    HitLimit(u32),
}

impl From<DiceError> for FlowError {
    fn from(e: DiceError) -> Self {
        match e {
            DiceError::NoIdentifier | DiceError::UnknownDice(_) => Self::NoIdentifier,
            DiceError::NoSuchPosition { index, len } => Self::InsufficientDice {
                have: len,
                need: index + 1,
            },
        }
    }
}
