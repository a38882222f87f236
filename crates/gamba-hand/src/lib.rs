//! Hand evaluation for Gamba.
//!
//! Pure functions over dice face values; nothing here does I/O or knows
//! which client variant produced the values.
//!
//! - [`evaluate_poker`] ranks five faces into a [`PokerHand`].
//! - [`compare_hands`] settles player against dealer.
//! - [`sum_hand`] scores the summing games (21, 13, Tri).

mod poker;
mod templates;

pub use poker::{compare_hands, evaluate_poker, round_message, HandRank, Outcome, PokerHand};
pub use templates::{HandTemplates, PLACEHOLDER};

/// Sum of all face values.
pub fn sum_hand(values: &[u8]) -> u32 {
    values.iter().map(|&v| u32::from(v)).sum()
}
