//! Pacing for Gamba's dice flows.
//!
//! Everything the extension sends on the player's behalf is spaced out so
//! it reads like a person at the keyboard: rolls a little over half a
//! second apart, chat after a short hesitation, hits after a pause. The
//! [`Pacer`] owns those delays; the [`MuteClock`] tracks how long the
//! server has muted us.
//!
//! All sleeps go through `tokio::time`, so tests run them under a paused
//! clock:
//!
//! ```ignore
//! #[tokio::test(start_paused = true)]
//! async fn test_something_paced() {
//!     let pacer = Pacer::new(PacingConfig::default());
//!     pacer.roll_gap().await; // returns immediately, clock advanced
//! }
//! ```

mod mute;

pub use mute::MuteClock;

use std::time::Duration;

use rand::Rng;
use tracing::{trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Every delay the flows use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacingConfig {
    /// Base gap between consecutive rolls (and closes).
    pub roll_gap: Duration,
    /// Random extra added to each roll gap, `0..roll_jitter`.
    pub roll_jitter: Duration,
    /// Random extra added to each close gap, `0..close_jitter`.
    pub close_jitter: Duration,
    /// Pause after the last roll before waiting on results.
    pub settle_delay: Duration,
    /// Hesitation before a chat line, `chat_delay_min..chat_delay_max`.
    pub chat_delay_min: Duration,
    pub chat_delay_max: Duration,
    /// Pause before each hit, `hit_pause_min..hit_pause_max`.
    pub hit_pause_min: Duration,
    pub hit_pause_max: Duration,
    /// Pause between the player's and the dealer's hand in a dealer round.
    pub dealer_pause: Duration,
    /// How long a flow waits for its roll results before giving up.
    pub join_timeout: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            roll_gap: Duration::from_millis(550),
            roll_jitter: Duration::from_millis(100),
            close_jitter: Duration::from_millis(50),
            settle_delay: Duration::from_millis(1000),
            chat_delay_min: Duration::from_millis(250),
            chat_delay_max: Duration::from_millis(500),
            hit_pause_min: Duration::from_millis(500),
            hit_pause_max: Duration::from_millis(1500),
            dealer_pause: Duration::from_secs(3),
            join_timeout: Duration::from_secs(10),
        }
    }
}

impl PacingConfig {
    /// Shortest join timeout accepted; anything less would race the settle delay.
    pub const MIN_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

    /// Fixes inverted ranges and an unusable join timeout.
    ///
    /// Called automatically by [`Pacer::new`]. Rules:
    /// - each `*_max` is raised to its `*_min` if below it
    /// - `join_timeout` is at least [`Self::MIN_JOIN_TIMEOUT`]
    pub fn validated(mut self) -> Self {
        if self.chat_delay_max < self.chat_delay_min {
            warn!(min = ?self.chat_delay_min, max = ?self.chat_delay_max, "chat delay range inverted, collapsing");
            self.chat_delay_max = self.chat_delay_min;
        }
        if self.hit_pause_max < self.hit_pause_min {
            warn!(min = ?self.hit_pause_min, max = ?self.hit_pause_max, "hit pause range inverted, collapsing");
            self.hit_pause_max = self.hit_pause_min;
        }
        if self.join_timeout < Self::MIN_JOIN_TIMEOUT {
            warn!(timeout = ?self.join_timeout, "join timeout too short, raising");
            self.join_timeout = Self::MIN_JOIN_TIMEOUT;
        }
        self
    }

    /// All delays zero except the join timeout. For tests that only care
    /// about ordering.
    pub fn immediate() -> Self {
        Self {
            roll_gap: Duration::ZERO,
            roll_jitter: Duration::ZERO,
            close_jitter: Duration::ZERO,
            settle_delay: Duration::ZERO,
            chat_delay_min: Duration::ZERO,
            chat_delay_max: Duration::ZERO,
            hit_pause_min: Duration::ZERO,
            hit_pause_max: Duration::ZERO,
            dealer_pause: Duration::ZERO,
            join_timeout: Self::MIN_JOIN_TIMEOUT,
        }
    }
}

// ---------------------------------------------------------------------------
// Pacer
// ---------------------------------------------------------------------------

/// Produces and sleeps the jittered delays of a [`PacingConfig`].
#[derive(Debug, Clone)]
pub struct Pacer {
    config: PacingConfig,
}

impl Pacer {
    pub fn new(config: PacingConfig) -> Self {
        Self {
            config: config.validated(),
        }
    }

    pub fn join_timeout(&self) -> Duration {
        self.config.join_timeout
    }

    /// Next roll gap: base plus `0..roll_jitter`.
    pub fn roll_gap_duration(&self) -> Duration {
        self.config.roll_gap + below(self.config.roll_jitter)
    }

    /// Next close gap: roll base plus `0..close_jitter`.
    pub fn close_gap_duration(&self) -> Duration {
        self.config.roll_gap + below(self.config.close_jitter)
    }

    pub fn chat_delay_duration(&self) -> Duration {
        between(self.config.chat_delay_min, self.config.chat_delay_max)
    }

    pub fn hit_pause_duration(&self) -> Duration {
        between(self.config.hit_pause_min, self.config.hit_pause_max)
    }

    pub async fn roll_gap(&self) {
        sleep("roll gap", self.roll_gap_duration()).await;
    }

    pub async fn close_gap(&self) {
        sleep("close gap", self.close_gap_duration()).await;
    }

    pub async fn settle(&self) {
        sleep("settle", self.config.settle_delay).await;
    }

    pub async fn chat_delay(&self) {
        sleep("chat delay", self.chat_delay_duration()).await;
    }

    pub async fn hit_pause(&self) {
        sleep("hit pause", self.hit_pause_duration()).await;
    }

    pub async fn dealer_pause(&self) {
        sleep("dealer pause", self.config.dealer_pause).await;
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(PacingConfig::default())
    }
}

async fn sleep(what: &'static str, duration: Duration) {
    trace!(what, ms = duration.as_millis() as u64, "pacing");
    tokio::time::sleep(duration).await;
}

/// Uniform in `0..spread` at millisecond resolution; zero spread is zero.
fn below(spread: Duration) -> Duration {
    let ms = millis(spread);
    if ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..ms))
}

/// Uniform in `min..max`; an empty range yields `min`.
fn between(min: Duration, max: Duration) -> Duration {
    min + below(max.saturating_sub(min))
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
