//! The wager session record.
//!
//! A session ties one player to one wager: which item class they put up
//! and how many. It is created by `:session` or by a verified trade, and
//! lives until `:endsession`.

use std::fmt;

/// One active wagering round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub player: String,
    /// Item class the player wagered, lowercase.
    pub item: String,
    pub count: u32,
    /// Running balance in units of `item`. Nothing settles games into it
    /// yet; it starts at zero.
    pub balance: i64,

    // UI-facing flags.
    pub awaiting_game_choice: bool,
    pub in_game: bool,
    pub can_risk: bool,
    pub can_cash_out: bool,
}

impl Session {
    pub(crate) fn new(player: String, item: String, count: u32) -> Self {
        Self {
            player,
            item,
            count,
            balance: 0,
            awaiting_game_choice: true,
            in_game: false,
            can_risk: false,
            can_cash_out: false,
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} x {})", self.player, self.count, self.item)
    }
}
