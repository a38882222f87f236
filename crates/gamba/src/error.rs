//! Unified error type for the Gamba extension.

use gamba_dice::DiceError;
use gamba_engine::FlowError;
use gamba_protocol::ProtocolError;
use gamba_session::SessionError;
use gamba_transport::TransportError;

use crate::settings::SettingsError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GambaError {
    /// A transport-level error (bind, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A bridge frame or packet payload had the wrong shape.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Dice(#[from] DiceError),

    /// A game flow could not run to completion.
    #[error(transparent)]
    Flow(#[from] FlowError),

    /// The template file could not be read or written.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The host did not open the link with a valid hello.
    #[error("handshake failed: {0}")]
    Handshake(String),
}
