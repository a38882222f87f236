//! The user-facing log ring.
//!
//! Separate from tracing: these are the lines a player reads in the
//! extension window (roll headers, results, trade decisions). Observers
//! get the whole ring on every change through a watch channel.

use std::sync::Arc;

use tokio::sync::watch;

/// Entries kept before the oldest is dropped.
pub const LOG_CAPACITY: usize = 100;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Bounded, timestamped, observable log.
#[derive(Debug, Clone)]
pub struct Journal {
    tx: Arc<watch::Sender<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self { tx: Arc::new(tx) }
    }

    /// Appends `[YYYY-MM-DD HH:MM:SS] message`, evicting the oldest entry
    /// past [`LOG_CAPACITY`].
    pub fn push(&self, message: impl AsRef<str>) {
        let message = message.as_ref().trim_end();
        tracing::info!(target: "gamba::journal", "{message}");

        let stamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        let line = format!("[{stamp}] {message}");
        self.tx.send_modify(|entries| {
            entries.push(line);
            if entries.len() > LOG_CAPACITY {
                let excess = entries.len() - LOG_CAPACITY;
                entries.drain(..excess);
            }
        });
    }

    /// Current entries, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.tx.borrow().clone()
    }

    /// A receiver that sees every future change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<String>> {
        self.tx.subscribe()
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}
