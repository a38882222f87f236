//! The engine handle and the inbound event loop.
//!
//! [`Engine::handle`] is called once per intercepted packet, in order, by
//! one task. It only touches the table briefly and returns a [`Verdict`];
//! anything paced (flows, chat lines, trade checks) is spawned.

use std::sync::Arc;
use std::time::Duration;

use gamba_dice::Dice;
use gamba_hand::HandTemplates;
use gamba_pace::Pacer;
use gamba_protocol::{Adapter, Command, DiceId, GameEvent, Outbound, PacketSink, Variant};
use gamba_session::{Session, TradeCapture};
use tokio::sync::{Mutex, Notify};
use tracing::{debug, info, warn};

use crate::flows::Flow;
use crate::table::Table;
use crate::{EngineConfig, GameState, Journal};

/// Help broadcast for `:commands`.
pub const HELP_TEXT: &str = "\
Gamba commands:\n\
:roll / :pkr - roll all dice for poker\n\
:dealer - poker round against a dealer hand\n\
:tri - roll the triangle and sum it\n\
:21 - blackjack to 15 or more\n\
:13 - thirteen to 7 or more\n\
:close - switch every dice off\n\
:reset - forget all dice\n\
:@<amount> - say @<amount>\n\
:verify - say the last sum\n\
:chaton / :chatoff - announce results in chat\n\
:session <player> <item> <count> - start a session\n\
:endsession - end the session\n\
#gsuite - open this window";

/// Whether the host should forward or drop the intercepted packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Block,
}

impl Verdict {
    pub fn is_block(self) -> bool {
        matches!(self, Self::Block)
    }
}

/// Supplies the poker description templates, read at each evaluation.
pub trait TemplateSource: Send + Sync + 'static {
    fn templates(&self) -> HandTemplates;
}

impl TemplateSource for HandTemplates {
    fn templates(&self) -> HandTemplates {
        self.clone()
    }
}

/// A copy of the table for display and tests.
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    pub state: GameState,
    pub dice: Vec<Dice>,
    pub pending: usize,
    pub sum: u32,
    pub announce: bool,
    pub muted: bool,
    /// Time left on the mute; zero when not muted.
    pub mute_remaining: Duration,
    pub trade: TradeCapture,
    pub session: Option<Session>,
}

pub(crate) struct Inner {
    pub(crate) config: EngineConfig,
    pub(crate) adapter: Adapter,
    pub(crate) pacer: Pacer,
    pub(crate) sink: Arc<dyn PacketSink>,
    pub(crate) templates: Arc<dyn TemplateSource>,
    pub(crate) journal: Journal,
    pub(crate) table: Mutex<Table>,
    /// Woken when the last pending dice result arrives.
    pub(crate) completions: Notify,
}

/// The dice automation for one game client connection.
///
/// Cheap to clone; clones share the same table.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Inner>,
}

impl Engine {
    pub fn new(
        variant: Variant,
        config: EngineConfig,
        sink: Arc<dyn PacketSink>,
        templates: Arc<dyn TemplateSource>,
    ) -> Self {
        let table = Table::new(variant, &config);
        let pacer = Pacer::new(config.pacing.clone());
        info!(%variant, strict = config.strict_commands, "engine created");
        Self {
            inner: Arc::new(Inner {
                config,
                adapter: Adapter::new(variant),
                pacer,
                sink,
                templates,
                journal: Journal::new(),
                table: Mutex::new(table),
                completions: Notify::new(),
            }),
        }
    }

    pub fn variant(&self) -> Variant {
        self.inner.adapter.variant()
    }

    /// The user-facing log ring.
    pub fn journal(&self) -> &Journal {
        &self.inner.journal
    }

    pub async fn snapshot(&self) -> TableSnapshot {
        let table = self.inner.table.lock().await;
        TableSnapshot {
            state: table.state(),
            dice: table.registry.iter().cloned().collect(),
            pending: table.pending(),
            sum: table.sum,
            announce: table.announce,
            muted: table.mute.is_muted(),
            mute_remaining: table.mute.remaining(),
            trade: table.trade.clone(),
            session: table.sessions.active().cloned(),
        }
    }

    /// Reacts to one decoded event and says whether to block its packet.
    pub async fn handle(&self, event: GameEvent) -> Verdict {
        let inner = &self.inner;
        match event {
            GameEvent::ChatCommand { line } => return inner.dispatch(&line).await,
            GameEvent::WindowRequested => {
                debug!("window requested");
                inner.sink.show_window();
                return Verdict::Block;
            }
            GameEvent::DiceThrown { id } => inner.on_dice_seen(id, true, false).await,
            GameEvent::DiceClosed { id } => inner.on_dice_seen(id, false, true).await,
            GameEvent::DiceResult { id, value } => inner.on_dice_result(id, value).await,
            GameEvent::MuteStarted { seconds } => inner.on_mute(seconds, true).await,
            GameEvent::MuteRemaining { seconds } => inner.on_mute(seconds, false).await,
            GameEvent::TradeOpened { text } => inner.on_trade_opened(&text).await,
            GameEvent::TradeItems { text } => inner.on_trade_items(&text).await,
            GameEvent::TradeItemOffered => inner.on_own_offer().await,
            GameEvent::TradeAccepted { accepted } => inner.on_trade_accepted(accepted).await,
            GameEvent::TradeConfirmed => inner.on_trade_confirmed().await,
            GameEvent::TradeCompleted => inner.on_trade_completed().await,
            GameEvent::TradeClosed => inner.on_trade_closed().await,
            GameEvent::InventoryUpdated { text } => {
                inner.table.lock().await.inventory.apply_listing(&text);
            }
        }
        Verdict::Pass
    }
}

impl Inner {
    /// Runs a `:` chat line. Unknown lines pass; everything else is blocked.
    async fn dispatch(self: &Arc<Self>, line: &str) -> Verdict {
        let mut table = self.table.lock().await;
        if !table.state().is_idle() {
            let state = table.state();
            drop(table);
            warn!(%state, line, "command rejected, flow in progress");
            self.journal.push("Already rolling or closing...");
            return Verdict::Block;
        }

        let Some(command) = Command::parse(line, self.config.strict_commands) else {
            debug!(line, "not a command");
            return Verdict::Pass;
        };
        debug!(%command, "command");

        if let Some(flow) = Flow::for_command(&command) {
            if let Err(e) = table.enter(flow.state()) {
                warn!(%flow, error = %e, "flow not started");
                return Verdict::Block;
            }
            drop(table);
            if let Some(header) = flow.header() {
                self.journal.push(header);
            }
            info!(%flow, "flow started");
            tokio::spawn(Arc::clone(self).run(flow));
            return Verdict::Block;
        }

        match command {
            Command::Reset => {
                drop(table);
                tokio::spawn(Arc::clone(self).reset());
            }
            Command::Amount(amount) => {
                drop(table);
                let line = format!("@{amount}");
                self.shout_now(&line);
                self.journal.push(line);
            }
            Command::Verify => {
                let sum = table.sum;
                drop(table);
                self.shout_now(&sum.to_string());
            }
            Command::Help => {
                drop(table);
                let inner = Arc::clone(self);
                tokio::spawn(async move { inner.broadcast_help().await });
            }
            Command::ChatOn | Command::ChatOff => {
                table.announce = command == Command::ChatOn;
                let announce = table.announce;
                drop(table);
                info!(announce, "chat announcements toggled");
            }
            Command::StartSession {
                player,
                item,
                count,
            } => {
                let message = match table.sessions.start_manual(&player, &item, &count) {
                    Ok(session) => format!("Session started: {session}"),
                    Err(e) => format!("Session not started: {e}"),
                };
                drop(table);
                self.journal.push(message);
            }
            Command::EndSession => {
                let message = match table.sessions.end() {
                    Ok(session) => format!("Session ended: {session}"),
                    Err(e) => format!("Session not ended: {e}"),
                };
                drop(table);
                self.journal.push(message);
            }
            // Flow commands were handled above.
            _ => {}
        }
        Verdict::Block
    }

    async fn on_dice_seen(&self, id: DiceId, rolling: bool, closed: bool) {
        let filled = self.table.lock().await.observe_dice(id, rolling, closed);
        if filled {
            self.journal.push("Dice setup successful! Run :roll to confirm");
        }
    }

    async fn on_dice_result(&self, id: DiceId, value: u8) {
        let outcome = self.table.lock().await.record_result(id, value);
        if outcome.during_flow {
            self.journal.push(format!("Dice {id} rolled: {value}"));
        }
        if outcome.joined {
            self.completions.notify_waiters();
        }
    }

    async fn on_mute(self: &Arc<Self>, seconds: u32, started: bool) {
        let armed = {
            let mut table = self.table.lock().await;
            if started {
                table.mute.start(seconds);
                true
            } else {
                table.mute.arm_if_unaware(seconds)
            }
        };
        if started {
            self.journal.push(format!("You are muted for {seconds} seconds."));
        } else {
            self.journal.push(format!("Mute remaining: {seconds} seconds."));
        }
        if armed {
            tokio::spawn(Arc::clone(self).mute_countdown(seconds));
        }
    }

    /// Logs the end of a mute once its deadline passes.
    async fn mute_countdown(self: Arc<Self>, seconds: u32) {
        tokio::time::sleep(Duration::from_secs(u64::from(seconds))).await;
        // A later mute pushes the deadline out; its own countdown reports.
        if self.table.lock().await.mute.expired() {
            self.journal.push("Mute finished");
        }
    }

    async fn broadcast_help(&self) {
        self.pacer.chat_delay().await;
        let packet = self.adapter.encode(&Outbound::Broadcast(HELP_TEXT.to_string()));
        self.sink.send(packet);
    }
}
