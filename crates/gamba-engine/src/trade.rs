//! Trade handling: wager capture, auto-accept and session start.
//!
//! Trade packets are observed passively. Anything that needs a fresh
//! inventory listing runs in its own task and checks the trade epoch
//! before acting, so a decision about a trade that has since changed or
//! closed is dropped.

use std::sync::Arc;

use gamba_protocol::Outbound;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::engine::Inner;
use crate::FlowError;

impl Inner {
    pub(crate) async fn on_trade_opened(&self, text: &str) {
        let partner = {
            let mut table = self.table.lock().await;
            table.trade.open(text);
            table.trade_epoch += 1;
            table.trade.partner_name().to_string()
        };
        self.journal.push(format!("Trade opened with {partner}"));
    }

    /// Re-estimates the wager and re-checks eligibility in the background.
    pub(crate) async fn on_trade_items(self: &Arc<Self>, text: &str) {
        let (wager, epoch) = {
            let mut table = self.table.lock().await;
            (table.trade.observe_items(text), table.trade_epoch)
        };
        let Some((item, count)) = wager else {
            debug!("no wager in trade tray");
            return;
        };

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let ready = inner.refresh_inventory().await;
            let mut table = inner.table.lock().await;
            if table.trade_epoch != epoch {
                debug!("trade changed during eligibility check");
                return;
            }
            let eligible = ready.is_ok() && table.inventory.covers(&item, count);
            table.trade.eligible = eligible;
            info!(%item, count, have = table.inventory.have(&item), eligible, "trade eligibility");
        });
    }

    pub(crate) async fn on_own_offer(&self) {
        self.table.lock().await.trade.record_own_offer();
    }

    /// Echoes the counterpart's acceptance once, if the wager is covered.
    pub(crate) async fn on_trade_accepted(&self, accepted: bool) {
        if !accepted {
            return;
        }
        {
            let mut table = self.table.lock().await;
            if !table.trade.eligible || table.trade.accept_sent {
                return;
            }
            table.trade.accept_sent = true;
        }
        info!("auto-accepting trade");
        self.sink.send(self.adapter.encode(&Outbound::AcceptTrade));
    }

    /// Confirms once, if the wager is covered.
    pub(crate) async fn on_trade_confirmed(&self) {
        {
            let mut table = self.table.lock().await;
            if !table.trade.eligible || table.trade.confirm_sent {
                return;
            }
            table.trade.confirm_sent = true;
        }
        info!("auto-confirming trade");
        self.sink.send(self.adapter.encode(&Outbound::ConfirmTrade));
    }

    /// Turns a finished trade into a session, after checking we can pay out.
    pub(crate) async fn on_trade_completed(self: &Arc<Self>) {
        let capture = {
            let mut table = self.table.lock().await;
            let capture = std::mem::take(&mut table.trade);
            table.trade_epoch += 1;
            if let Some(session) = table.sessions.active() {
                debug!(player = %session.player, "trade completed during a session, ignored");
                return;
            }
            capture
        };

        let inner = Arc::clone(self);
        tokio::spawn(async move {
            let partner = capture.partner_name().to_string();
            let Some((item, count)) = capture.wager() else {
                inner.deny(&partner, "could not tell what was traded").await;
                return;
            };

            if let Err(e) = inner.refresh_inventory().await {
                warn!(error = %e, "payout check without inventory");
                inner.deny(&partner, &e.to_string()).await;
                return;
            }

            let started = {
                let mut table = inner.table.lock().await;
                let have = table.inventory.have(&item);
                if !table.inventory.covers(&item, count) {
                    Err(format!("have {have} {item}, need {}", 2 * u64::from(count)))
                } else {
                    let started = table.sessions.start(partner.as_str(), item.as_str(), count);
                    started.map(|s| s.to_string()).map_err(|e| e.to_string())
                }
            };
            match started {
                Ok(session) => inner.journal.push(format!("Session started: {session}")),
                Err(reason) => inner.deny(&partner, &reason).await,
            }
        });
    }

    pub(crate) async fn on_trade_closed(&self) {
        let mut table = self.table.lock().await;
        table.trade.reset();
        table.trade_epoch += 1;
    }

    /// Logs a refused bet and tells the player.
    async fn deny(&self, partner: &str, reason: &str) {
        warn!(partner, reason, "bet denied");
        self.announce(
            format!("Bet from {partner} denied: {reason}"),
            format!("Sorry {partner}, I can't take that bet"),
        )
        .await;
    }

    /// Asks for a fresh inventory listing and waits for it to go quiet.
    pub(crate) async fn refresh_inventory(&self) -> Result<(), FlowError> {
        self.table.lock().await.inventory.begin_refresh();
        self.sink
            .send(self.adapter.encode(&Outbound::RequestInventory));

        let deadline = Instant::now() + self.config.inventory_refresh_bound;
        loop {
            if self.table.lock().await.inventory.is_settled() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(FlowError::InventoryNotReady);
            }
            tokio::time::sleep(self.config.inventory_poll).await;
        }
    }
}
