//! Variant-free game events and outbound intents.
//!
//! Downstream crates never look at payload bytes. They consume
//! [`GameEvent`]s produced by the [`Adapter`](crate::Adapter) and express
//! what they want sent as [`Outbound`] intents, which the adapter encodes
//! for the connected variant.

use crate::DiceId;

/// One decoded packet, stripped of its wire encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// The player threw a dice (client → server).
    DiceThrown { id: DiceId },
    /// The player switched a dice off (client → server).
    DiceClosed { id: DiceId },
    /// The server reported a settled face value; `0` means closed.
    DiceResult { id: DiceId, value: u8 },
    /// The player typed a `:`-prefixed line; `line` is everything after the colon.
    ChatCommand { line: String },
    /// The player typed the window keyword.
    WindowRequested,
    /// A trade window opened. `text` is the lossy payload text.
    TradeOpened { text: String },
    /// The trade tray was (re)rendered.
    TradeItems { text: String },
    /// Our own side put an item into the trade.
    TradeItemOffered,
    /// A trade participant changed their acceptance.
    TradeAccepted { accepted: bool },
    /// The final confirmation dialog is showing.
    TradeConfirmed,
    /// Items changed hands.
    TradeCompleted,
    /// The trade window closed without completing.
    TradeClosed,
    /// The server muted us for `seconds`.
    MuteStarted { seconds: u32 },
    /// We tried to talk while muted; `seconds` remain.
    MuteRemaining { seconds: u32 },
    /// One inventory listing packet. Listings may span several packets.
    InventoryUpdated { text: String },
}

/// Something the engine wants sent through the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Throw the given dice.
    Roll(DiceId),
    /// Switch the given dice off.
    Close(DiceId),
    /// Say something in room chat.
    Shout(String),
    /// Show a system broadcast to our own client only.
    Broadcast(String),
    /// Accept the open trade.
    AcceptTrade,
    /// Confirm the open trade.
    ConfirmTrade,
    /// Ask the server for our inventory listing.
    RequestInventory,
}
