use std::time::Duration;

use tokio::time::Instant;

/// How long the server has muted us.
///
/// The countdown is derived from the deadline rather than ticked down, so
/// the clock needs no task of its own. [`MuteClock::expired`] reports the
/// moment the mute has run out exactly once, for the "mute finished" log.
#[derive(Debug, Clone, Default)]
pub struct MuteClock {
    until: Option<Instant>,
}

impl MuteClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) a mute of `seconds`.
    pub fn start(&mut self, seconds: u32) {
        self.until = Some(Instant::now() + Duration::from_secs(u64::from(seconds)));
        tracing::info!(seconds, "muted");
    }

    /// Arms the countdown from a "still muted" notice, unless one is
    /// already running. Returns `true` if it armed.
    pub fn arm_if_unaware(&mut self, seconds: u32) -> bool {
        if self.is_muted() {
            return false;
        }
        self.start(seconds);
        true
    }

    pub fn is_muted(&self) -> bool {
        self.until.is_some_and(|until| Instant::now() < until)
    }

    /// Time left on the mute; zero when not muted.
    pub fn remaining(&self) -> Duration {
        self.until
            .map(|until| until.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::ZERO)
    }

    /// Returns `true` once, the first time it is called after the mute
    /// ran out, and forgets the deadline.
    pub fn expired(&mut self) -> bool {
        match self.until {
            Some(until) if Instant::now() >= until => {
                self.until = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_start_mutes_until_deadline() {
        let mut clock = MuteClock::new();
        assert!(!clock.is_muted());

        clock.start(5);
        assert!(clock.is_muted());
        assert_eq!(clock.remaining(), Duration::from_secs(5));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(!clock.is_muted());
        assert_eq!(clock.remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_reports_once() {
        let mut clock = MuteClock::new();
        clock.start(1);
        assert!(!clock.expired());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(clock.expired());
        assert!(!clock.expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_arm_if_unaware_keeps_running_countdown() {
        let mut clock = MuteClock::new();
        clock.start(30);
        assert!(!clock.arm_if_unaware(5));
        assert_eq!(clock.remaining(), Duration::from_secs(30));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(clock.arm_if_unaware(5));
        assert_eq!(clock.remaining(), Duration::from_secs(5));
    }
}
