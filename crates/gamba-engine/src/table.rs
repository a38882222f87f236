//! The shared table: every piece of mutable engine state behind one lock.
//!
//! Critical sections only read and write fields. Anything that sleeps or
//! sends happens after the guard is dropped.

use gamba_dice::DiceRegistry;
use gamba_pace::MuteClock;
use gamba_protocol::{DiceId, Variant};
use gamba_session::{InventoryCache, SessionManager, TradeCapture};

use crate::{EngineConfig, FlowError, GameState};

#[derive(Debug)]
pub(crate) struct Table {
    pub(crate) registry: DiceRegistry,
    state: GameState,
    /// Completions the running flow is still waiting for.
    pending: usize,
    /// Next position a 21/13 hit re-rolls once every dice has been used.
    pub(crate) cursor: usize,
    /// Last sum announced by 21, 13 or Tri.
    pub(crate) sum: u32,
    pub(crate) announce: bool,
    pub(crate) mute: MuteClock,
    pub(crate) trade: TradeCapture,
    /// Bumped whenever the trade on screen changes, so late eligibility
    /// checks for an older trade are discarded.
    pub(crate) trade_epoch: u64,
    pub(crate) inventory: InventoryCache,
    pub(crate) sessions: SessionManager,
}

/// What happened when a dice result came in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResultOutcome {
    /// A flow was running, so the result is worth a log line.
    pub(crate) during_flow: bool,
    /// The last pending completion arrived; waiters should wake.
    pub(crate) joined: bool,
}

impl Table {
    pub(crate) fn new(variant: Variant, config: &EngineConfig) -> Self {
        Self {
            registry: DiceRegistry::new(variant),
            state: GameState::Idle,
            pending: 0,
            cursor: 0,
            sum: 0,
            announce: config.announce,
            mute: MuteClock::new(),
            trade: TradeCapture::default(),
            trade_epoch: 0,
            inventory: InventoryCache::new(config.inventory_quiet),
            sessions: SessionManager::new(),
        }
    }

    pub(crate) fn state(&self) -> GameState {
        self.state
    }

    pub(crate) fn pending(&self) -> usize {
        self.pending
    }

    /// Moves from `Idle` into `state`.
    pub(crate) fn enter(&mut self, state: GameState) -> Result<(), FlowError> {
        if !self.state.is_idle() {
            return Err(FlowError::Busy(self.state));
        }
        self.state = state;
        Ok(())
    }

    /// Switches between the sub-states of a running flow.
    pub(crate) fn advance(&mut self, state: GameState) {
        if !self.state.is_idle() {
            self.state = state;
        }
    }

    /// Back to `Idle`. Any completions still outstanding are forgotten.
    ///
    /// Returns `true` if something was still pending.
    pub(crate) fn leave(&mut self) -> bool {
        self.state = GameState::Idle;
        self.abandon_pending()
    }

    /// Expects `count` more completions.
    pub(crate) fn expect_results(&mut self, count: usize) {
        self.pending += count;
    }

    /// Drops every outstanding completion and clears the rolling flags.
    pub(crate) fn abandon_pending(&mut self) -> bool {
        let had_pending = self.pending > 0;
        self.pending = 0;
        self.registry.clear_rolling();
        had_pending
    }

    /// Fails unless every booth slot is filled.
    pub(crate) fn require_full(&self) -> Result<usize, FlowError> {
        let need = self.registry.capacity();
        let have = self.registry.len();
        if have < need {
            return Err(FlowError::InsufficientDice { have, need });
        }
        Ok(need)
    }

    /// Tracks a dice the player threw or switched off by hand.
    ///
    /// Returns `true` when this filled the last slot.
    pub(crate) fn observe_dice(&mut self, id: DiceId, rolling: bool, closed: bool) -> bool {
        self.registry.add_if_absent(id, rolling, closed) && self.registry.is_full()
    }

    /// Records a settled face and counts the completion if a flow waits on it.
    pub(crate) fn record_result(&mut self, id: DiceId, value: u8) -> ResultOutcome {
        let counting = self.state.awaits_results();
        let completed = match self.registry.record_result(id, value, counting) {
            Ok(completed) => completed,
            Err(e) => {
                tracing::trace!(dice_id = %id, error = %e, "result for untracked dice");
                false
            }
        };

        let mut joined = false;
        if completed && self.pending > 0 {
            self.pending -= 1;
            joined = self.pending == 0;
        }
        ResultOutcome {
            during_flow: counting,
            joined,
        }
    }

    /// Forgets all dice and flow bookkeeping.
    pub(crate) fn reset(&mut self) {
        self.registry.clear();
        self.state = GameState::Idle;
        self.pending = 0;
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_table() -> Table {
        let mut table = Table::new(Variant::Text, &EngineConfig::default());
        for id in 1..=5 {
            table.observe_dice(DiceId(id), false, true);
        }
        table
    }

    #[test]
    fn test_enter_when_busy_returns_busy() {
        let mut table = full_table();
        table.enter(GameState::PokerRolling).expect("idle");
        assert_eq!(
            table.enter(GameState::TriRolling),
            Err(FlowError::Busy(GameState::PokerRolling))
        );
        assert_eq!(table.state(), GameState::PokerRolling);
    }

    #[test]
    fn test_advance_while_idle_stays_idle() {
        let mut table = full_table();
        table.advance(GameState::BlackjackHitting);
        assert_eq!(table.state(), GameState::Idle);
    }

    #[test]
    fn test_observe_dice_reports_last_slot() {
        let mut table = Table::new(Variant::Binary, &EngineConfig::default());
        assert!(!table.observe_dice(DiceId(1), true, false));
        assert!(!table.observe_dice(DiceId(2), true, false));
        assert!(table.observe_dice(DiceId(3), true, false));
        // Already full: nothing added, no second notice.
        assert!(!table.observe_dice(DiceId(4), true, false));
    }

    #[test]
    fn test_require_full_with_missing_dice_fails() {
        let mut table = Table::new(Variant::Text, &EngineConfig::default());
        table.observe_dice(DiceId(1), false, true);
        assert_eq!(
            table.require_full(),
            Err(FlowError::InsufficientDice { have: 1, need: 5 })
        );
        assert_eq!(full_table().require_full(), Ok(5));
    }

    #[test]
    fn test_record_result_counts_only_during_flow() {
        let mut table = full_table();
        table.registry.roll(DiceId(1)).expect("roll");
        let outcome = table.record_result(DiceId(1), 4);
        assert!(!outcome.during_flow);
        assert!(!outcome.joined);

        table.enter(GameState::PokerRolling).expect("idle");
        table.expect_results(2);
        table.registry.roll(DiceId(1)).expect("roll");
        table.registry.roll(DiceId(2)).expect("roll");

        assert!(!table.record_result(DiceId(1), 3).joined);
        assert_eq!(table.pending(), 1);
        // Duplicate result for a dice that already settled counts nothing.
        assert!(!table.record_result(DiceId(1), 3).joined);
        assert!(table.record_result(DiceId(2), 6).joined);
        assert_eq!(table.pending(), 0);
        assert_eq!(table.registry.values_at(&[0, 1]), vec![3, 6]);
    }

    #[test]
    fn test_leave_abandons_pending_and_rolling() {
        let mut table = full_table();
        table.enter(GameState::TriRolling).expect("idle");
        table.expect_results(3);
        table.registry.roll(DiceId(1)).expect("roll");

        assert!(table.leave());
        assert_eq!(table.state(), GameState::Idle);
        assert_eq!(table.pending(), 0);
        assert!(!table.registry.any_rolling());
    }

    #[test]
    fn test_reset_clears_registry() {
        let mut table = full_table();
        table.cursor = 3;
        table.reset();
        assert!(table.registry.is_empty());
        assert_eq!(table.cursor, 0);
        assert!(table.state().is_idle());
    }
}
