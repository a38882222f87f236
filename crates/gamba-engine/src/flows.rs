//! The dice flows: poker, dealer round, tri, 21, 13 and closing.
//!
//! Each flow runs as its own task, entered from `Idle` by the dispatcher
//! and returned to `Idle` by [`Inner::run`] however it ends. The shape is
//! always the same: roll with gaps, settle, wait for the results, evaluate,
//! announce.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use gamba_hand::{evaluate_poker, round_message, sum_hand, PokerHand};
use gamba_protocol::Command;
use tracing::{debug, info, warn};

use crate::engine::Inner;
use crate::{FlowError, GameState};

/// Faces in a poker hand.
const POKER_HAND: usize = 5;

/// Pause before the binary variant re-rolls for its 4th and 5th face.
const REROLL_PAUSE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Poker,
    Dealer,
    Tri,
    Blackjack,
    Thirteen,
    Close,
}

impl Flow {
    pub(crate) fn for_command(command: &Command) -> Option<Self> {
        match command {
            Command::Poker => Some(Self::Poker),
            Command::Dealer => Some(Self::Dealer),
            Command::Tri => Some(Self::Tri),
            Command::Blackjack => Some(Self::Blackjack),
            Command::Thirteen => Some(Self::Thirteen),
            Command::Close => Some(Self::Close),
            _ => None,
        }
    }

    /// State held while the flow runs.
    pub(crate) fn state(self) -> GameState {
        match self {
            Self::Poker | Self::Dealer => GameState::PokerRolling,
            Self::Tri => GameState::TriRolling,
            Self::Blackjack => GameState::BlackjackRolling,
            Self::Thirteen => GameState::ThirteenRolling,
            Self::Close => GameState::Closing,
        }
    }

    /// Log line written when the flow starts.
    pub(crate) fn header(self) -> Option<&'static str> {
        match self {
            Self::Poker | Self::Dealer => Some("Poker Roll:"),
            Self::Tri => Some("Tri Roll:"),
            Self::Blackjack => Some("21 Roll:"),
            Self::Thirteen => Some("13 Roll:"),
            Self::Close => None,
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Poker => "poker",
            Self::Dealer => "dealer",
            Self::Tri => "tri",
            Self::Blackjack => "21",
            Self::Thirteen => "13",
            Self::Close => "close",
        };
        f.write_str(name)
    }
}

/// Shape of a hit-to-threshold game.
#[derive(Debug)]
struct SumRules {
    name: &'static str,
    /// Positions rolled for the opening draw.
    opening: &'static [usize],
    /// Hitting stops once the sum reaches this.
    threshold: u32,
    /// First position searched for a dice that has not been used yet.
    first_unused: usize,
    /// Where the re-roll rotation starts.
    cursor: usize,
    hitting: GameState,
}

const BLACKJACK: SumRules = SumRules {
    name: "21",
    opening: &[0, 1, 2],
    threshold: 15,
    first_unused: 3,
    cursor: 0,
    hitting: GameState::BlackjackHitting,
};

const THIRTEEN: SumRules = SumRules {
    name: "13",
    opening: &[0, 1],
    threshold: 7,
    first_unused: 2,
    cursor: 2,
    hitting: GameState::ThirteenHitting,
};

impl Inner {
    /// Runs `flow` to the end and puts the table back to `Idle`.
    pub(crate) async fn run(self: Arc<Self>, flow: Flow) {
        let result = match flow {
            Flow::Poker => self.poker().await,
            Flow::Dealer => self.dealer_round().await,
            Flow::Tri => self.tri().await,
            Flow::Blackjack => self.sum_game(&BLACKJACK).await,
            Flow::Thirteen => self.sum_game(&THIRTEEN).await,
            Flow::Close => {
                self.close_dice().await;
                Ok(())
            }
        };

        if let Err(e) = result {
            warn!(%flow, error = %e, "flow aborted");
            let line = match e {
                FlowError::InsufficientDice { .. } => "Not enough dice to roll".to_string(),
                FlowError::JoinTimeout { .. } => "Timed out waiting for dice results".to_string(),
                other => format!("{flow} stopped: {other}"),
            };
            self.journal.push(line);
        }

        self.table.lock().await.leave();
        info!(%flow, "flow finished");
    }

    async fn poker(&self) -> Result<(), FlowError> {
        let hand = self.roll_hand().await?;
        self.announce(format!("Poker Result: {}", hand.description), hand.description)
            .await;
        Ok(())
    }

    /// Player hand, a pause, dealer hand, then the verdict.
    async fn dealer_round(&self) -> Result<(), FlowError> {
        let player = self.roll_hand().await?;
        let line = format!("Player has {} {}", player.description, player.dice_string());
        self.announce(format!("Poker Result: {line}"), line).await;

        self.pacer.dealer_pause().await;

        let dealer = self.roll_hand().await?;
        let line = format!("Dealer has {} {}", dealer.description, dealer.dice_string());
        self.announce(format!("Poker Result: {line}"), line).await;

        let verdict = round_message(&player, &dealer);
        self.announce(format!("Poker Result: {verdict}"), verdict).await;
        Ok(())
    }

    /// Rolls a full poker hand and evaluates it.
    ///
    /// With fewer than five dice in the booth, the first two are rolled a
    /// second time for the missing faces.
    async fn roll_hand(&self) -> Result<PokerHand, FlowError> {
        let capacity = self.table.lock().await.require_full()?;
        let all: Vec<usize> = (0..capacity).collect();

        let mut values = self.roll_and_join(&all).await?;
        if values.len() < POKER_HAND {
            tokio::time::sleep(REROLL_PAUSE).await;
            self.pacer.roll_gap().await;

            let extra: Vec<usize> = (0..POKER_HAND - values.len()).collect();
            values.extend(self.roll_and_join(&extra).await?);
            self.pacer.roll_gap().await;
        }

        debug!(?values, "poker hand rolled");
        Ok(evaluate_poker(&values, &self.templates.templates()))
    }

    async fn tri(&self) -> Result<(), FlowError> {
        self.table.lock().await.require_full()?;
        let corners = self.adapter.variant().tri_indices();

        let sum = sum_hand(&self.roll_and_join(&corners).await?);
        self.table.lock().await.sum = sum;
        self.announce(format!("Tri Result: {sum}"), sum.to_string()).await;
        Ok(())
    }

    /// 21 and 13: opening draw, then hit until the threshold.
    ///
    /// With all dice present, every dice is switched off in the background
    /// first so unused positions read as zero. Hits add the new face to the running sum;
    /// old faces are never taken back off.
    async fn sum_game(self: &Arc<Self>, rules: &SumRules) -> Result<(), FlowError> {
        let capacity = {
            let mut table = self.table.lock().await;
            let capacity = table.require_full()?;
            table.sum = 0;
            table.cursor = rules.cursor;
            capacity
        };

        let closer = Arc::clone(self);
        tokio::spawn(async move { closer.close_dice().await });
        self.pacer.roll_gap().await;

        let mut sum = sum_hand(&self.roll_and_join(rules.opening).await?);
        let mut hits = 0;
        while sum < rules.threshold {
            if hits >= self.config.hit_cap {
                return Err(FlowError::HitLimit(hits));
            }
            self.table.lock().await.advance(rules.hitting);
            sum += u32::from(self.hit(rules, capacity).await?);
            hits += 1;
            debug!(game = rules.name, sum, hits, "hit");
        }

        self.table.lock().await.sum = sum;
        self.announce(format!("{} Result: {sum}", rules.name), sum.to_string())
            .await;
        Ok(())
    }

    /// Rolls one more dice and returns its face.
    ///
    /// Unused positions go first; after that the rotation re-rolls the
    /// dice at the cursor.
    async fn hit(&self, rules: &SumRules, capacity: usize) -> Result<u8, FlowError> {
        let unused = {
            let table = self.table.lock().await;
            (rules.first_unused..capacity).find(|&i| table.registry.value_at(i) == Some(0))
        };
        if let Some(index) = unused {
            self.roll_positions(&[index]).await?;
            self.join().await?;
            return Ok(self.value_at(index).await);
        }

        let (index, id, old) = {
            let mut table = self.table.lock().await;
            let index = table.cursor % capacity;
            table.cursor = (index + 1) % capacity;
            let id = table.registry.id_at(index)?;
            (index, id, table.registry.value_at(index).unwrap_or(0))
        };
        self.pacer.hit_pause().await;
        self.roll_positions(&[index]).await?;
        self.join().await?;

        let new = self.value_at(index).await;
        self.journal.push(format!(
            "Hit: Re-rolled dice {id} = {new} (old value was {old})"
        ));
        Ok(new)
    }

    /// Switches every tracked dice off, one at a time.
    pub(crate) async fn close_dice(&self) {
        let ids = self.table.lock().await.registry.ids();
        for id in ids {
            let packet = self.table.lock().await.registry.close(id);
            match packet {
                Ok(packet) => self.sink.send(packet),
                Err(e) => warn!(dice_id = %id, error = %e, "close skipped"),
            }
            self.pacer.close_gap().await;
        }
    }

    /// Clears the registry once any roll still in flight has settled.
    pub(crate) async fn reset(self: Arc<Self>) {
        if let Err(e) = self.join().await {
            debug!(error = %e, "reset gave up waiting");
        }
        let mut table = self.table.lock().await;
        if !table.state().is_idle() {
            warn!(state = %table.state(), "reset skipped, flow started meanwhile");
            return;
        }
        table.reset();
        info!("dice registry reset");
    }

    /// Rolls `positions`, settles, waits for every result and reads the faces.
    async fn roll_and_join(&self, positions: &[usize]) -> Result<Vec<u8>, FlowError> {
        self.roll_positions(positions).await?;
        self.pacer.settle().await;
        self.join().await?;
        Ok(self.table.lock().await.registry.values_at(positions))
    }

    /// Rolls each position in order with a gap after every roll.
    ///
    /// The completions are expected up front, before the first roll goes
    /// out.
    async fn roll_positions(&self, positions: &[usize]) -> Result<(), FlowError> {
        self.table.lock().await.expect_results(positions.len());
        for &index in positions {
            let packet = self.table.lock().await.registry.roll_at(index)?;
            self.sink.send(packet);
            self.pacer.roll_gap().await;
        }
        Ok(())
    }

    /// Waits until no completions are pending, bounded by the join timeout.
    ///
    /// On timeout the pending count and every rolling flag are cleared.
    pub(crate) async fn join(&self) -> Result<(), FlowError> {
        let settled = async {
            loop {
                let notified = self.completions.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();
                if self.table.lock().await.pending() == 0 {
                    return;
                }
                notified.await;
            }
        };
        if tokio::time::timeout(self.pacer.join_timeout(), settled)
            .await
            .is_ok()
        {
            return Ok(());
        }

        let missing = {
            let mut table = self.table.lock().await;
            let missing = table.pending();
            table.abandon_pending();
            missing
        };
        warn!(missing, "timed out waiting for dice results");
        Err(FlowError::JoinTimeout { missing })
    }

    async fn value_at(&self, index: usize) -> u8 {
        self.table
            .lock()
            .await
            .registry
            .value_at(index)
            .unwrap_or(0)
    }
}
