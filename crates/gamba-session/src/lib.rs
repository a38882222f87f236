//! Wager sessions and the trade bookkeeping that starts them.
//!
//! This crate holds the state side of trading:
//!
//! 1. **Trade capture**: what the current trade seems to be about
//!    ([`TradeCapture`], [`scan_trade_items`])
//! 2. **Inventory**: what we own, so a wager is only taken when it can be
//!    paid out ([`InventoryCache`])
//! 3. **Sessions**: the one active wager ([`SessionManager`])
//!
//! Nothing here does I/O or sleeps. The engine owns all three inside its
//! shared table and drives them from trade events.
//!
//! ```text
//! Engine (above)  ← decides when to accept, confirm, start a session
//!     ↕
//! Session layer (this crate)  ← capture, inventory, session records
//! ```

mod error;
mod inventory;
mod manager;
mod session;
mod trade;

pub use error::SessionError;
pub use inventory::InventoryCache;
pub use manager::SessionManager;
pub use session::Session;
pub use trade::{extract_partner_name, scan_trade_items, ItemScan, TradeCapture};
