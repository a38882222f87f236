//! Engine configuration and the game state machine.

use std::fmt;
use std::time::Duration;

use gamba_pace::PacingConfig;

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Settings for one engine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Delays between rolls, chat lines and hits.
    pub pacing: PacingConfig,

    /// Match chat commands as exact tokens instead of by suffix.
    pub strict_commands: bool,

    /// How long an inventory refresh may take before it counts as not ready.
    pub inventory_refresh_bound: Duration,

    /// How long the inventory listing must stay silent to count as complete.
    pub inventory_quiet: Duration,

    /// How often a refresh checks whether the listing has settled.
    pub inventory_poll: Duration,

    /// Whether results are announced in chat at start-up (`:chaton`).
    pub announce: bool,

    /// Hits allowed per 21/13 flow before it gives up.
    pub hit_cap: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pacing: PacingConfig::default(),
            strict_commands: false,
            inventory_refresh_bound: Duration::from_secs(3),
            inventory_quiet: Duration::from_millis(300),
            inventory_poll: Duration::from_millis(100),
            announce: true,
            hit_cap: 32,
        }
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// What the engine is doing right now.
///
/// Exactly one value at a time; every flow starts from and returns to
/// `Idle`:
///
/// ```text
///        ┌──→ PokerRolling ────────────────────────┐
///        ├──→ TriRolling ──────────────────────────┤
/// Idle ──┼──→ BlackjackRolling ──→ BlackjackHitting ┼──→ Idle
///        ├──→ ThirteenRolling ──→ ThirteenHitting ──┤
///        └──→ Closing ─────────────────────────────┘
/// ```
///
/// Chat commands are rejected in every state but `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GameState {
    #[default]
    Idle,
    PokerRolling,
    TriRolling,
    BlackjackRolling,
    BlackjackHitting,
    ThirteenRolling,
    ThirteenHitting,
    Closing,
}

impl GameState {
    pub fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether settled dice results count toward a pending join.
    ///
    /// Closing is purely observational and never waits on results.
    pub fn awaits_results(self) -> bool {
        !matches!(self, Self::Idle | Self::Closing)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::PokerRolling => "PokerRolling",
            Self::TriRolling => "TriRolling",
            Self::BlackjackRolling => "BlackjackRolling",
            Self::BlackjackHitting => "BlackjackHitting",
            Self::ThirteenRolling => "ThirteenRolling",
            Self::ThirteenHitting => "ThirteenHitting",
            Self::Closing => "Closing",
        };
        f.write_str(name)
    }
}
