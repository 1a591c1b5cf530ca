//! Game manager for spawning the dealer and player tasks of one game.

use super::{
    actor::{Dealer, GameOutcome},
    claims,
    config::GameConfig,
};
use crate::{
    game::{
        display::GameDisplay,
        entities::{Deck, PlayerId, Slot},
        errors::{GameError, GameResult},
        oracle::SetOracle,
        shutdown::{self, ShutdownTrigger},
        table::{SharedTable, Table},
    },
    player::agent::{InputHandle, PlayerAgent},
};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Builds a game and starts its agents.
pub struct GameManager {
    config: GameConfig,
    oracle: Arc<dyn SetOracle>,
    display: Arc<dyn GameDisplay>,
    deck: Option<Deck>,
}

impl GameManager {
    pub fn new(
        config: GameConfig,
        oracle: Arc<dyn SetOracle>,
        display: Arc<dyn GameDisplay>,
    ) -> Self {
        Self {
            config,
            oracle,
            display,
            deck: None,
        }
    }

    /// Deals from `deck` instead of a freshly shuffled one.
    pub fn with_deck(mut self, deck: Deck) -> Self {
        self.deck = Some(deck);
        self
    }

    /// Validates the configuration and spawns the dealer plus one task per
    /// player. Must be called from within a Tokio runtime.
    pub fn start(self) -> GameResult<GameHandle> {
        self.config.validate()?;

        let config = Arc::new(self.config);
        let deck = match self.deck {
            Some(deck) => deck,
            None => Deck::new(config.deck_size, config.seed),
        };
        let table = Table::new(config.table_size, config.player_count(), self.display.clone())
            .into_shared();
        let (claim_sender, claim_receiver) = claims::channel(config.player_count());
        let (trigger, shutdown) = shutdown::channel();

        let mut inputs = Vec::with_capacity(config.player_count());
        let mut players = Vec::with_capacity(config.player_count());
        for (id, &kind) in config.players.iter().enumerate() {
            let (agent, input) = PlayerAgent::new(
                id,
                kind,
                config.clone(),
                table.clone(),
                claim_sender.clone(),
                self.display.clone(),
                trigger.subscribe(),
            );
            inputs.push(input);
            players.push(tokio::spawn(agent.run()));
        }

        let dealer = Dealer::new(
            config.clone(),
            table.clone(),
            deck,
            self.oracle,
            self.display,
            claim_receiver,
            shutdown,
        );
        let dealer = tokio::spawn(dealer.run());

        log::info!("Game started with {} players", config.player_count());

        Ok(GameHandle {
            table,
            inputs,
            trigger,
            dealer,
            players,
        })
    }
}

/// Handle to a running game.
pub struct GameHandle {
    table: SharedTable,
    inputs: Vec<InputHandle>,
    trigger: ShutdownTrigger,
    dealer: JoinHandle<GameOutcome>,
    players: Vec<JoinHandle<()>>,
}

impl GameHandle {
    /// Routes a key press to `player`. Returns false for unknown players and
    /// for presses dropped because the player's buffer is full.
    pub fn key_pressed(&self, player: PlayerId, slot: Slot) -> bool {
        match self.inputs.get(player) {
            Some(input) => input.key_pressed(slot),
            None => {
                log::warn!("Key press for unknown player {}", player);
                false
            }
        }
    }

    pub fn input(&self, player: PlayerId) -> Option<InputHandle> {
        self.inputs.get(player).cloned()
    }

    pub fn table(&self) -> SharedTable {
        self.table.clone()
    }

    /// Trigger that ends the game from outside, e.g. a signal handler.
    pub fn shutdown_trigger(&self) -> ShutdownTrigger {
        self.trigger.clone()
    }

    /// Requests termination. The dealer still announces winners.
    pub fn terminate(&self) {
        self.trigger.trigger();
    }

    /// Waits for the dealer to finish, then stops and joins every player.
    pub async fn wait(self) -> GameResult<GameOutcome> {
        let outcome = self.dealer.await;
        self.trigger.trigger();

        let mut failed = None;
        for (id, player) in self.players.into_iter().enumerate() {
            if let Err(e) = player.await {
                log::error!("Player {} task failed: {}", id, e);
                failed.get_or_insert_with(|| format!("player {}: {}", id, e));
            }
        }

        let outcome = outcome.map_err(|e| GameError::AgentFailed(format!("dealer: {}", e)))?;
        match failed {
            Some(reason) => Err(GameError::AgentFailed(reason)),
            None => Ok(outcome),
        }
    }
}
