//! The shared table: cards in slots, player tokens and scores.
//!
//! [`Table`] enforces only structural rules (one card per slot, no duplicate
//! tokens). Game rules such as the three token cap live in the agents.
//! The engine shares one table behind [`SharedTable`], and that lock is the
//! only mutual exclusion domain between the dealer and the players.

use super::{
    display::GameDisplay,
    entities::{Card, PlayerId, Slot},
    errors::{GameError, GameResult},
};
use serde::Serialize;
use std::{collections::HashMap, fmt, sync::Arc};
use tokio::sync::RwLock;

/// The table as shared between the dealer and the players.
pub type SharedTable = Arc<RwLock<Table>>;

pub struct Table {
    slot_to_card: Vec<Option<Card>>,
    card_to_slot: HashMap<Card, Slot>,
    /// Tokens per player, in placement order.
    tokens: Vec<Vec<Slot>>,
    scores: Vec<u32>,
    display: Arc<dyn GameDisplay>,
}

/// Point-in-time copy of the table for observers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableSnapshot {
    pub slots: Vec<Option<Card>>,
    pub tokens: Vec<Vec<Slot>>,
    pub scores: Vec<u32>,
}

impl Table {
    /// Empty table with `table_size` slots and no tokens or points.
    pub fn new(table_size: usize, player_count: usize, display: Arc<dyn GameDisplay>) -> Self {
        Self {
            slot_to_card: vec![None; table_size],
            card_to_slot: HashMap::with_capacity(table_size),
            tokens: vec![Vec::new(); player_count],
            scores: vec![0; player_count],
            display,
        }
    }

    /// Wrap the table for sharing between agents
    pub fn into_shared(self) -> SharedTable {
        Arc::new(RwLock::new(self))
    }

    /// Get number of slots
    pub fn table_size(&self) -> usize {
        self.slot_to_card.len()
    }

    /// Get number of players
    pub fn player_count(&self) -> usize {
        self.tokens.len()
    }

    /// Puts `card` on the empty `slot`.
    pub fn place_card(&mut self, card: Card, slot: Slot) -> GameResult<()> {
        match self.slot_to_card.get(slot) {
            None => return Err(GameError::SlotOutOfRange(slot)),
            Some(Some(existing)) => {
                return Err(GameError::SlotOccupied {
                    slot,
                    card: *existing,
                });
            }
            Some(None) => {}
        }
        if self.card_to_slot.contains_key(&card) {
            return Err(GameError::CardOnTable(card));
        }

        self.slot_to_card[slot] = Some(card);
        self.card_to_slot.insert(card, slot);
        self.display.place_card(card, slot);
        Ok(())
    }

    /// Clears `slot` and returns its card. Tokens on the slot are left alone;
    /// callers retract them in the same critical section.
    pub fn remove_card(&mut self, slot: Slot) -> GameResult<Card> {
        let card = self
            .slot_to_card
            .get_mut(slot)
            .ok_or(GameError::SlotOutOfRange(slot))?
            .take()
            .ok_or(GameError::SlotEmpty(slot))?;

        self.card_to_slot.remove(&card);
        self.display.remove_card(slot);
        Ok(card)
    }

    /// Marks `slot` for `player`. Returns false if the token already existed.
    pub fn place_token(&mut self, player: PlayerId, slot: Slot) -> GameResult<bool> {
        if slot >= self.table_size() {
            return Err(GameError::SlotOutOfRange(slot));
        }
        let tokens = self
            .tokens
            .get_mut(player)
            .ok_or(GameError::UnknownPlayer(player))?;
        if tokens.contains(&slot) {
            return Ok(false);
        }

        tokens.push(slot);
        self.display.place_token(player, slot);
        Ok(true)
    }

    /// Unmarks `slot` for `player`. Returns false if there was no such token.
    pub fn remove_token(&mut self, player: PlayerId, slot: Slot) -> GameResult<bool> {
        let tokens = self
            .tokens
            .get_mut(player)
            .ok_or(GameError::UnknownPlayer(player))?;
        let Some(idx) = tokens.iter().position(|&s| s == slot) else {
            return Ok(false);
        };

        tokens.remove(idx);
        self.display.remove_token(player, slot);
        Ok(true)
    }

    /// Removes every token, of every player, that references one of `slots`.
    pub fn retract_tokens_on(&mut self, slots: &[Slot]) -> Vec<(PlayerId, Slot)> {
        let mut retracted = Vec::new();
        for (player, tokens) in self.tokens.iter_mut().enumerate() {
            tokens.retain(|slot| {
                let hit = slots.contains(slot);
                if hit {
                    retracted.push((player, *slot));
                }
                !hit
            });
        }

        for &(player, slot) in &retracted {
            self.display.remove_token(player, slot);
        }
        retracted
    }

    /// Removes all tokens of all players. Returns how many were removed.
    pub fn clear_all_tokens(&mut self) -> usize {
        let mut count = 0;
        for (player, tokens) in self.tokens.iter_mut().enumerate() {
            for slot in tokens.drain(..) {
                self.display.remove_token(player, slot);
                count += 1;
            }
        }
        count
    }

    /// Slots marked by `player`, in placement order.
    pub fn tokens_of(&self, player: PlayerId) -> &[Slot] {
        self.tokens.get(player).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `player` marks `slot`
    pub fn has_token(&self, player: PlayerId, slot: Slot) -> bool {
        self.tokens_of(player).contains(&slot)
    }

    /// Card on `slot`, if any
    pub fn card_at(&self, slot: Slot) -> Option<Card> {
        self.slot_to_card.get(slot).copied().flatten()
    }

    /// Slot holding `card`, if it is on the table
    pub fn slot_of(&self, card: Card) -> Option<Slot> {
        self.card_to_slot.get(&card).copied()
    }

    /// Get number of cards on the table
    pub fn count_cards(&self) -> usize {
        self.card_to_slot.len()
    }

    /// Cards currently on the table, in slot order.
    pub fn cards(&self) -> Vec<Card> {
        self.slot_to_card.iter().flatten().copied().collect()
    }

    /// Slots without a card, in slot order.
    pub fn empty_slots(&self) -> Vec<Slot> {
        self.slot_to_card
            .iter()
            .enumerate()
            .filter(|(_, card)| card.is_none())
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Slots holding a card, in slot order.
    pub fn occupied_slots(&self) -> Vec<Slot> {
        self.slot_to_card
            .iter()
            .enumerate()
            .filter(|(_, card)| card.is_some())
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Adds a point to `player` and returns the new score.
    pub fn award_point(&mut self, player: PlayerId) -> GameResult<u32> {
        let score = self
            .scores
            .get_mut(player)
            .ok_or(GameError::UnknownPlayer(player))?;
        *score += 1;
        let score = *score;
        self.display.set_score(player, score);
        Ok(score)
    }

    /// Get score of `player`; unknown players have none
    pub fn score_of(&self, player: PlayerId) -> u32 {
        self.scores.get(player).copied().unwrap_or(0)
    }

    /// Get all scores, by player id
    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    /// Copy of the slots, tokens and scores
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            slots: self.slot_to_card.clone(),
            tokens: self.tokens.clone(),
            scores: self.scores.clone(),
        }
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("slots", &self.slot_to_card)
            .field("tokens", &self.tokens)
            .field("scores", &self.scores)
            .finish()
    }
}
