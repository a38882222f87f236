//! Dice tracking for Gamba.
//!
//! The [`DiceRegistry`] is the ordered list of dice the player has touched,
//! capped at the variant's booth size. Position matters: flows address dice
//! by index (Tri uses the triangle corners, 21 starts from the front).
//!
//! The registry never sends anything itself. [`DiceRegistry::roll`] and
//! [`DiceRegistry::close`] update local flags and hand back the packet to
//! send, so the caller can release its lock before talking to the host.

mod error;

pub use error::DiceError;

use gamba_protocol::{Adapter, DiceId, Outbound, RawPacket, Variant};

/// One tracked dice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dice {
    pub id: DiceId,
    /// Last settled face; `0` means closed or never rolled.
    pub value: u8,
    pub rolling: bool,
    pub closed: bool,
}

impl Dice {
    pub fn new(id: DiceId, rolling: bool, closed: bool) -> Self {
        Self {
            id,
            value: 0,
            rolling,
            closed,
        }
    }
}

/// Ordered, capacity-bounded collection of [`Dice`].
#[derive(Debug, Clone)]
pub struct DiceRegistry {
    adapter: Adapter,
    dice: Vec<Dice>,
}

impl DiceRegistry {
    pub fn new(variant: Variant) -> Self {
        Self {
            adapter: Adapter::new(variant),
            dice: Vec::with_capacity(variant.dice_capacity()),
        }
    }

    pub fn variant(&self) -> Variant {
        self.adapter.variant()
    }

    pub fn capacity(&self) -> usize {
        self.variant().dice_capacity()
    }

    pub fn len(&self) -> usize {
        self.dice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }

    /// Whether every booth slot is taken.
    pub fn is_full(&self) -> bool {
        self.dice.len() >= self.capacity()
    }

    /// Tracks a dice seen for the first time.
    ///
    /// No-op when the id is already tracked or the registry is full.
    /// Returns `true` if the dice was added.
    pub fn add_if_absent(&mut self, id: DiceId, rolling: bool, closed: bool) -> bool {
        if self.position(id).is_some() || self.is_full() {
            return false;
        }
        self.dice.push(Dice::new(id, rolling, closed));
        tracing::debug!(dice_id = %id, tracked = self.dice.len(), "dice added");
        true
    }

    /// Marks the dice rolling and returns the throw packet.
    ///
    /// Untracked ids still produce a packet; there is just nothing local
    /// to update.
    pub fn roll(&mut self, id: DiceId) -> Result<RawPacket, DiceError> {
        if id.is_unset() {
            return Err(DiceError::NoIdentifier);
        }
        if let Some(dice) = self.get_mut(id) {
            dice.rolling = true;
            dice.closed = false;
        }
        Ok(self.adapter.encode(&Outbound::Roll(id)))
    }

    /// Marks the dice closed and returns the switch-off packet.
    ///
    /// A closed dice is not rolling, so the zero face it reports never
    /// counts as a roll completion. Closing an already-closed dice sends
    /// again and changes nothing else.
    pub fn close(&mut self, id: DiceId) -> Result<RawPacket, DiceError> {
        if id.is_unset() {
            return Err(DiceError::NoIdentifier);
        }
        if let Some(dice) = self.get_mut(id) {
            dice.closed = true;
            dice.rolling = false;
        }
        Ok(self.adapter.encode(&Outbound::Close(id)))
    }

    /// Rolls the dice at `index`.
    pub fn roll_at(&mut self, index: usize) -> Result<RawPacket, DiceError> {
        let id = self.id_at(index)?;
        self.roll(id)
    }

    /// Records a settled face value.
    ///
    /// When `counting` is set (a flow is waiting on results) and the dice
    /// was mid-roll, its rolling flag is cleared and `Ok(true)` tells the
    /// caller to signal one completion.
    pub fn record_result(
        &mut self,
        id: DiceId,
        value: u8,
        counting: bool,
    ) -> Result<bool, DiceError> {
        let dice = self.get_mut(id).ok_or(DiceError::UnknownDice(id))?;
        let completed = counting && dice.rolling;
        if completed {
            dice.rolling = false;
        }
        dice.value = value;
        dice.closed = value == 0;
        Ok(completed)
    }

    /// Forgets every dice.
    pub fn clear(&mut self) {
        self.dice.clear();
    }

    /// Clears every rolling flag; used when a flow gives up waiting.
    pub fn clear_rolling(&mut self) {
        for dice in &mut self.dice {
            dice.rolling = false;
        }
    }

    pub fn any_rolling(&self) -> bool {
        self.dice.iter().any(|d| d.rolling)
    }

    pub fn id_at(&self, index: usize) -> Result<DiceId, DiceError> {
        self.dice
            .get(index)
            .map(|d| d.id)
            .ok_or(DiceError::NoSuchPosition {
                index,
                len: self.dice.len(),
            })
    }

    /// Ids in registry order.
    pub fn ids(&self) -> Vec<DiceId> {
        self.dice.iter().map(|d| d.id).collect()
    }

    /// Face values at the given positions; missing positions read as 0.
    pub fn values_at(&self, indices: &[usize]) -> Vec<u8> {
        indices
            .iter()
            .map(|&i| self.dice.get(i).map_or(0, |d| d.value))
            .collect()
    }

    pub fn value_at(&self, index: usize) -> Option<u8> {
        self.dice.get(index).map(|d| d.value)
    }

    pub fn get(&self, id: DiceId) -> Option<&Dice> {
        self.dice.iter().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dice> {
        self.dice.iter()
    }

    fn position(&self, id: DiceId) -> Option<usize> {
        self.dice.iter().position(|d| d.id == id)
    }

    fn get_mut(&mut self, id: DiceId) -> Option<&mut Dice> {
        self.dice.iter_mut().find(|d| d.id == id)
    }
}
