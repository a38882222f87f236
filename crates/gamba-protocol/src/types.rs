//! Core wire types: client variants, headers, raw packets and bridge frames.
//!
//! Everything the host hands us is a [`RawPacket`]: a header plus an opaque
//! payload. What the payload means depends on which [`Variant`] of the game
//! client is connected, so the variant is part of every decode decision.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Variant
// ---------------------------------------------------------------------------

/// The two wire encodings of the same game client.
///
/// Detected once per host link from the client identifier and never
/// changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Legacy client: big-endian binary fields, three dice per booth.
    Binary,
    /// Text client: whitespace-separated ASCII fields, five dice per booth.
    Text,
}

impl Variant {
    /// Picks the variant from the host's client identifier.
    ///
    /// Any identifier mentioning `FLASH` (case-insensitive) is the binary
    /// client; everything else speaks the text encoding.
    pub fn from_client_identifier(identifier: &str) -> Self {
        if identifier.to_ascii_uppercase().contains("FLASH") {
            Self::Binary
        } else {
            Self::Text
        }
    }

    /// How many dice a booth holds for this client.
    pub fn dice_capacity(self) -> usize {
        match self {
            Self::Binary => 3,
            Self::Text => 5,
        }
    }

    /// Registry positions rolled for a Tri hand.
    ///
    /// Five-dice booths roll the triangle corners; three-dice booths roll
    /// everything in order.
    pub fn tri_indices(self) -> [usize; 3] {
        match self {
            Self::Binary => [0, 1, 2],
            Self::Text => [0, 2, 4],
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::Text => write!(f, "text"),
        }
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Which way a packet travels.
///
/// For injected packets this is the destination: `ToServer` packets are
/// sent as if the client had sent them, `ToClient` packets are shown to the
/// player as if the server had sent them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    ToServer,
    ToClient,
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Every packet kind the extension reads or writes.
///
/// The host identifies packets by per-variant header *names*; this enum is
/// the variant-free identity, and [`Header::name`] / [`Header::lookup`]
/// translate between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Header {
    // -- client → server --
    Chat,
    Shout,
    Whisper,
    ThrowDice,
    DiceOff,
    TradeAddItem,
    TradeAcceptOut,
    TradeConfirmOut,
    InventoryRequest,

    // -- server → client --
    DiceValue,
    TradeOpen,
    TradeItems,
    TradeAccept,
    TradeConfirm,
    TradeCompleted,
    TradeClose,
    InventoryList,
    MuteStarted,
    MuteRemaining,
    Broadcast,
}

impl Header {
    /// All headers, in registration order.
    pub const ALL: [Header; 20] = [
        Header::Chat,
        Header::Shout,
        Header::Whisper,
        Header::ThrowDice,
        Header::DiceOff,
        Header::TradeAddItem,
        Header::TradeAcceptOut,
        Header::TradeConfirmOut,
        Header::InventoryRequest,
        Header::DiceValue,
        Header::TradeOpen,
        Header::TradeItems,
        Header::TradeAccept,
        Header::TradeConfirm,
        Header::TradeCompleted,
        Header::TradeClose,
        Header::InventoryList,
        Header::MuteStarted,
        Header::MuteRemaining,
        Header::Broadcast,
    ];

    /// The direction this header travels in.
    pub fn direction(self) -> Direction {
        match self {
            Self::Chat
            | Self::Shout
            | Self::Whisper
            | Self::ThrowDice
            | Self::DiceOff
            | Self::TradeAddItem
            | Self::TradeAcceptOut
            | Self::TradeConfirmOut
            | Self::InventoryRequest => Direction::ToServer,
            _ => Direction::ToClient,
        }
    }

    /// The host's name for this header under the given variant.
    pub fn name(self, variant: Variant) -> &'static str {
        match variant {
            Variant::Binary => match self {
                Self::Chat => "Chat",
                Self::Shout => "Shout",
                Self::Whisper => "Whisper",
                Self::ThrowDice => "ThrowDice",
                Self::DiceOff => "DiceOff",
                Self::TradeAddItem => "AddItemToTrade",
                Self::TradeAcceptOut => "AcceptTrading",
                Self::TradeConfirmOut => "ConfirmAcceptTrading",
                Self::InventoryRequest => "RequestFurniInventory",
                Self::DiceValue => "DiceValue",
                Self::TradeOpen => "TradingOpen",
                Self::TradeItems => "TradingItemList",
                Self::TradeAccept => "TradingAccept",
                Self::TradeConfirm => "TradingConfirmation",
                Self::TradeCompleted => "TradingCompleted",
                Self::TradeClose => "TradingClose",
                Self::InventoryList => "FurniList",
                Self::MuteStarted => "FloodControl",
                Self::MuteRemaining => "RemainingMutePeriod",
                Self::Broadcast => "HabboBroadcast",
            },
            Variant::Text => match self {
                Self::Chat => "CHAT",
                Self::Shout => "SHOUT",
                Self::Whisper => "WHISPER",
                Self::ThrowDice => "THROW_DICE",
                Self::DiceOff => "DICE_OFF",
                Self::TradeAddItem => "TRADE_ADDITEM",
                Self::TradeAcceptOut => "TRADE_ACCEPT",
                Self::TradeConfirmOut => "TRADE_CONFIRM_ACCEPT",
                Self::InventoryRequest => "GETSTRIP",
                Self::DiceValue => "DICE_VALUE",
                Self::TradeOpen => "TRADE_ITEMS_OPEN",
                Self::TradeItems => "TRADE_ITEMS",
                Self::TradeAccept => "TRADE_ACCEPT",
                Self::TradeConfirm => "TRADE_CONFIRM",
                Self::TradeCompleted => "TRADE_COMPLETED",
                Self::TradeClose => "TRADE_CLOSE",
                Self::InventoryList => "STRIPINFO_2",
                // The text client has no names for the mute notices; the
                // host forwards them by numeric id.
                Self::MuteStarted => "4069",
                Self::MuteRemaining => "3285",
                Self::Broadcast => "SYSTEM_BROADCAST",
            },
        }
    }

    /// Resolves a host header name back to a [`Header`].
    ///
    /// Names are only unique per direction (the text client uses
    /// `TRADE_ACCEPT` both ways), so the direction is part of the key.
    pub fn lookup(variant: Variant, direction: Direction, name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|h| h.direction() == direction && h.name(variant) == name)
    }
}

// ---------------------------------------------------------------------------
// Dice identity
// ---------------------------------------------------------------------------

/// Protocol-assigned dice identifier.
///
/// Zero is the "no identifier" value; rolling or closing it is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiceId(pub u32);

impl DiceId {
    /// Returns `true` for the unset identifier.
    pub fn is_unset(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for DiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RawPacket
// ---------------------------------------------------------------------------

/// A packet as the host sees it: header plus opaque payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    pub header: Header,
    pub payload: Vec<u8>,
}

impl RawPacket {
    pub fn new(header: Header, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            header,
            payload: payload.into(),
        }
    }

    /// Where this packet goes when injected.
    pub fn direction(&self) -> Direction {
        self.header.direction()
    }
}

// ---------------------------------------------------------------------------
// HostFrame: what travels over the host bridge
// ---------------------------------------------------------------------------

/// Frames exchanged with the host bridge.
///
/// `#[serde(tag = "type")]` gives the internally tagged form
/// `{ "type": "Verdict", "id": 3, "block": true }`, which is what the host
/// side expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostFrame {
    /// Host → extension, first frame on every link.
    Hello {
        client: String,
        #[serde(default)]
        version: String,
    },

    /// Host → extension: one intercepted packet awaiting a verdict.
    Intercept {
        id: u64,
        direction: Direction,
        header: String,
        payload: Vec<u8>,
    },

    /// Extension → host: whether the intercepted packet must be dropped.
    Verdict { id: u64, block: bool },

    /// Extension → host: send a packet on our behalf.
    Inject {
        direction: Direction,
        header: String,
        payload: Vec<u8>,
    },

    /// Extension → host: bring the extension window to the front.
    ShowWindow,
}
