//! Inventory cache: what we are known to own, by item class.
//!
//! The server sends the inventory as a burst of listing packets and never
//! says when the burst is over. A listing is treated as complete once no
//! packet has arrived for a quiet period; [`InventoryCache::is_settled`]
//! answers that question.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use crate::trade::{item_runs, tokens};

/// Item-class counts from the latest inventory listing.
#[derive(Debug, Clone)]
pub struct InventoryCache {
    counts: HashMap<String, u32>,
    ready: bool,
    last_update: Option<Instant>,
    /// Set by a refresh request; the next listing packet starts a new burst.
    refresh_pending: bool,
    quiet: Duration,
}

impl InventoryCache {
    /// `quiet` is how long the listing must go silent to count as complete.
    pub fn new(quiet: Duration) -> Self {
        Self {
            counts: HashMap::new(),
            ready: false,
            last_update: None,
            refresh_pending: false,
            quiet,
        }
    }

    /// Marks the cache untrusted until a fresh listing arrives and settles.
    pub fn begin_refresh(&mut self) {
        self.ready = false;
        self.refresh_pending = true;
    }

    /// Folds one listing packet into the cache.
    ///
    /// A packet arriving after a refresh request, or after the quiet period
    /// has passed, starts a new listing and replaces the old counts.
    pub fn apply_listing(&mut self, text: &str) {
        let now = Instant::now();
        let new_burst = self.refresh_pending
            || self
                .last_update
                .is_none_or(|last| now.duration_since(last) >= self.quiet);
        if new_burst {
            self.counts.clear();
            self.refresh_pending = false;
        }

        for token in tokens(text) {
            for item in item_runs(token) {
                *self.counts.entry(item).or_default() += 1;
            }
        }
        self.ready = true;
        self.last_update = Some(now);
        tracing::trace!(classes = self.counts.len(), new_burst, "inventory listing applied");
    }

    /// Ready and silent for the quiet period.
    pub fn is_settled(&self) -> bool {
        self.ready
            && self
                .last_update
                .is_some_and(|last| last.elapsed() >= self.quiet)
    }

    /// Known count for `item` (case-insensitive); 0 when unknown.
    pub fn have(&self, item: &str) -> u32 {
        self.counts
            .get(&item.to_lowercase())
            .copied()
            .unwrap_or(0)
    }

    /// Whether we can cover a win: twice the wager on hand.
    pub fn covers(&self, item: &str, wagered: u32) -> bool {
        u64::from(self.have(item)) >= 2 * u64::from(wagered)
    }
}
