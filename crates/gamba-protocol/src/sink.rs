//! Outbound side of the host link.

use tokio::sync::mpsc;

use crate::RawPacket;

/// Where the engine sends packets and window requests.
///
/// Sending never blocks and never fails from the caller's point of view:
/// a sink whose host link is gone drops what it is given.
pub trait PacketSink: Send + Sync + 'static {
    /// Injects a packet; its header decides the direction.
    fn send(&self, packet: RawPacket);

    /// Brings the extension window to the front.
    fn show_window(&self);
}

/// One item queued for the host link's writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkItem {
    Packet(RawPacket),
    ShowWindow,
}

/// A [`PacketSink`] backed by an unbounded channel.
///
/// The receiving end is drained by whatever owns the host connection.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkItem>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SinkItem>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl PacketSink for ChannelSink {
    fn send(&self, packet: RawPacket) {
        if self.tx.send(SinkItem::Packet(packet)).is_err() {
            tracing::debug!("host link gone, packet dropped");
        }
    }

    fn show_window(&self) {
        if self.tx.send(SinkItem::ShowWindow).is_err() {
            tracing::debug!("host link gone, window request dropped");
        }
    }
}
