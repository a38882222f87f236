//! The dice automation engine for Gamba.
//!
//! One [`Engine`] per game client connection. It owns the shared table
//! (dice registry, game state, trade capture, inventory, session) and
//! turns decoded [`GameEvent`](gamba_protocol::GameEvent)s into paced
//! outbound packets.
//!
//! # Key types
//!
//! - [`Engine`]: the event entry point; returns a [`Verdict`] per packet
//! - [`GameState`]: which flow, if any, is running
//! - [`EngineConfig`]: pacing, command matching, inventory timing
//! - [`Journal`]: the user-facing log ring
//! - [`TemplateSource`]: where poker descriptions come from

mod config;
mod engine;
mod error;
mod flows;
mod gateway;
mod journal;
mod table;
mod trade;

pub use config::{EngineConfig, GameState};
pub use engine::{Engine, HELP_TEXT, TableSnapshot, TemplateSource, Verdict};
pub use error::FlowError;
pub use journal::{Journal, LOG_CAPACITY};
