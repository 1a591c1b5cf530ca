//! Display surface consumed by the engine.
//!
//! The engine never renders anything itself; it reports every visible change
//! through [`GameDisplay`]. Calls may arrive from the dealer and from any
//! player concurrently, sometimes while the table lock is held, so
//! implementations must be quick and must not call back into the engine.

use super::entities::{Card, PlayerId, Slot};
use std::{
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

pub trait GameDisplay: Send + Sync {
    fn set_countdown(&self, remaining: Duration, warn: bool);
    fn set_score(&self, player: PlayerId, score: u32);
    fn set_freeze(&self, player: PlayerId, remaining: Duration);
    fn place_card(&self, card: Card, slot: Slot);
    fn remove_card(&self, slot: Slot);
    fn place_token(&self, player: PlayerId, slot: Slot);
    fn remove_token(&self, player: PlayerId, slot: Slot);
    fn announce_winners(&self, winners: &[PlayerId]);
}

/// Renders the game as log lines. Countdown updates are only logged when the
/// displayed second changes.
#[derive(Debug)]
pub struct LogDisplay {
    last_second: AtomicU64,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self {
            last_second: AtomicU64::new(u64::MAX),
        }
    }
}

impl Default for LogDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl GameDisplay for LogDisplay {
    fn set_countdown(&self, remaining: Duration, warn: bool) {
        let second = remaining.as_secs();
        if self.last_second.swap(second, Ordering::Relaxed) == second {
            return;
        }
        if warn {
            log::warn!("{}.{:03}s left in round", second, remaining.subsec_millis());
        } else {
            log::info!("{}s left in round", second);
        }
    }

    fn set_score(&self, player: PlayerId, score: u32) {
        log::info!("Player {} score: {}", player, score);
    }

    fn set_freeze(&self, player: PlayerId, remaining: Duration) {
        if remaining.is_zero() {
            log::debug!("Player {} unfrozen", player);
        } else {
            log::debug!("Player {} frozen for {}ms", player, remaining.as_millis());
        }
    }

    fn place_card(&self, card: Card, slot: Slot) {
        log::debug!("Card {} placed in slot {}", card, slot);
    }

    fn remove_card(&self, slot: Slot) {
        log::debug!("Slot {} cleared", slot);
    }

    fn place_token(&self, player: PlayerId, slot: Slot) {
        log::trace!("Player {} marked slot {}", player, slot);
    }

    fn remove_token(&self, player: PlayerId, slot: Slot) {
        log::trace!("Player {} unmarked slot {}", player, slot);
    }

    fn announce_winners(&self, winners: &[PlayerId]) {
        match winners {
            [] => log::info!("Game over, no players"),
            [winner] => log::info!("Game over, player {} wins", winner),
            _ => log::info!("Game over, it is a tie between players {:?}", winners),
        }
    }
}

/// Everything a [`RecordingDisplay`] was told, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayEvent {
    Countdown { remaining: Duration, warn: bool },
    Score { player: PlayerId, score: u32 },
    Freeze { player: PlayerId, remaining: Duration },
    PlaceCard { card: Card, slot: Slot },
    RemoveCard { slot: Slot },
    PlaceToken { player: PlayerId, slot: Slot },
    RemoveToken { player: PlayerId, slot: Slot },
    Winners(Vec<PlayerId>),
}

/// Keeps every display call so tests and tools can inspect the game afterwards.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    events: Mutex<Vec<DisplayEvent>>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DisplayEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Winners reported at the end of the game, if it ended.
    pub fn winners(&self) -> Option<Vec<PlayerId>> {
        self.events().into_iter().find_map(|event| match event {
            DisplayEvent::Winners(winners) => Some(winners),
            _ => None,
        })
    }

    fn record(&self, event: DisplayEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

impl GameDisplay for RecordingDisplay {
    fn set_countdown(&self, remaining: Duration, warn: bool) {
        self.record(DisplayEvent::Countdown { remaining, warn });
    }

    fn set_score(&self, player: PlayerId, score: u32) {
        self.record(DisplayEvent::Score { player, score });
    }

    fn set_freeze(&self, player: PlayerId, remaining: Duration) {
        self.record(DisplayEvent::Freeze { player, remaining });
    }

    fn place_card(&self, card: Card, slot: Slot) {
        self.record(DisplayEvent::PlaceCard { card, slot });
    }

    fn remove_card(&self, slot: Slot) {
        self.record(DisplayEvent::RemoveCard { slot });
    }

    fn place_token(&self, player: PlayerId, slot: Slot) {
        self.record(DisplayEvent::PlaceToken { player, slot });
    }

    fn remove_token(&self, player: PlayerId, slot: Slot) {
        self.record(DisplayEvent::RemoveToken { player, slot });
    }

    fn announce_winners(&self, winners: &[PlayerId]) {
        self.record(DisplayEvent::Winners(winners.to_vec()));
    }
}
