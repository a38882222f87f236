//! Outbound chat: paced announcements, the chat toggle and mute suppression.

use gamba_protocol::Outbound;
use tracing::{debug, info};

use crate::engine::Inner;

impl Inner {
    /// Logs a result and, unless chat is off or we are muted, says it.
    ///
    /// Both the log line and the chat line are delayed by a chat pause.
    /// Muted lines are dropped, not queued.
    pub(crate) async fn announce(&self, log_line: impl Into<String>, chat_line: impl Into<String>) {
        self.pacer.chat_delay().await;
        self.journal.push(log_line.into());

        let (announce, muted) = {
            let table = self.table.lock().await;
            (table.announce, table.mute.is_muted())
        };
        if !announce {
            return;
        }
        let chat_line = chat_line.into();
        if muted {
            info!(line = %chat_line, "muted, announcement dropped");
            return;
        }

        self.pacer.chat_delay().await;
        self.shout_now(&chat_line);
    }

    /// Says `text` right away, ignoring the chat toggle.
    pub(crate) fn shout_now(&self, text: &str) {
        debug!(text, "shout");
        self.sink.send(self.adapter.encode(&Outbound::Shout(text.to_string())));
    }
}
