//! Wire protocol for Gamba.
//!
//! The game client comes in two variants that encode the same packets very
//! differently. This crate is the only place that knows about either:
//!
//! - **Types** ([`Variant`], [`Header`], [`RawPacket`], [`HostFrame`]):
//!   what travels between the host and the extension.
//! - **Adapter** ([`Adapter`]): raw packets in, variant-free
//!   [`GameEvent`]s out; [`Outbound`] intents back to packets.
//! - **Commands** ([`Command`]): the colon-prefixed chat surface.
//! - **Gate** ([`VariantGate`]): one-shot variant detection decoders wait on.
//! - **Sink** ([`PacketSink`]): where the engine sends packets.
//! - **Codec** ([`Codec`], [`JsonCodec`]): how bridge frames become bytes.
//!
//! ```text
//! Transport (bytes) → Protocol (GameEvent) → Engine (flows, trades)
//! ```

mod adapter;
mod codec;
mod command;
mod error;
mod event;
mod gate;
mod sink;
mod types;

pub use adapter::{Adapter, WINDOW_KEYWORD};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use command::Command;
pub use error::ProtocolError;
pub use event::{GameEvent, Outbound};
pub use gate::VariantGate;
pub use sink::{ChannelSink, PacketSink, SinkItem};
pub use types::{DiceId, Direction, Header, HostFrame, RawPacket, Variant};
