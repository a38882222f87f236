//! Error types for the protocol layer.
//!
//! Each crate in Gamba defines its own error enum. A `ProtocolError` always
//! means a payload or frame had the wrong shape; it never reflects game
//! state.

use crate::Header;

/// Errors that can occur while decoding packets or bridge frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing a bridge frame failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// A bridge frame was not valid JSON or did not match any frame type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A packet payload did not have the shape its header promises.
    ///
    /// The adapter logs these and drops the packet; they never reach the
    /// event loop.
    #[error("malformed {header:?} payload: {reason}")]
    Malformed { header: Header, reason: String },
}

impl ProtocolError {
    pub(crate) fn malformed(header: Header, reason: impl Into<String>) -> Self {
        Self::Malformed {
            header,
            reason: reason.into(),
        }
    }
}
