//! Byte transport between the Gamba extension and its packet-intercepting
//! host.
//!
//! The host (a proxy sitting between the game client and the game server)
//! dials the extension and streams intercepted packets to it. This crate
//! only knows about framed bytes; what those frames mean is the business of
//! `gamba-protocol`.
//!
//! # Feature Flags
//!
//! - `websocket` (default): host link over WebSocket via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;

/// Opaque identifier for one host link.
///
/// Variant detection happens once per link, so this id shows up in every
/// log line that concerns a particular host session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host-{}", self.0)
    }
}

/// Accepts incoming host links.
pub trait Transport: Send + Sync + 'static {
    /// The link type produced by this transport.
    type Connection: Connection;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next host link.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;
}

/// One host link that can send and receive framed bytes.
///
/// Sending and receiving must not block each other: the extension reads
/// intercepted packets on one task while game flows inject packets from
/// others.
pub trait Connection: Send + Sync + 'static {
    /// The error type for link operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one frame to the host.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next frame from the host.
    ///
    /// Returns `Ok(None)` when the host closed the link cleanly.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the link.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this link.
    fn id(&self) -> ConnectionId;
}
