//! # Gamba
//!
//! Dice-game automation for a packet-intercepting game client host.
//!
//! The host bridge dials the extension over WebSocket, says which client it
//! is attached to, and streams intercepted packets. The extension answers
//! every packet with a verdict, runs the dice games behind the `:` chat
//! commands, and injects rolls, closes, chat lines and trade echoes back
//! through the host.
//!
//! ```text
//! host ──Hello/Intercept──▶ GambaServer ─▶ handler ─▶ Engine
//!      ◀──Verdict/Inject──             ◀── sink ◀──┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gamba::prelude::*;
//!
//! # async fn run() -> Result<(), GambaError> {
//! let server = GambaServer::builder()
//!     .bind("127.0.0.1:9092")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;
pub mod settings;

pub use error::GambaError;
pub use server::{GambaServer, GambaServerBuilder};
pub use settings::{ExtensionConfig, SettingsError, TemplateStore};

pub mod prelude {
    pub use crate::{ExtensionConfig, GambaError, GambaServer, GambaServerBuilder, TemplateStore};
    pub use gamba_engine::{EngineConfig, TemplateSource};
    pub use gamba_hand::HandTemplates;
    pub use gamba_protocol::{Direction, HostFrame, JsonCodec, Variant};
}
