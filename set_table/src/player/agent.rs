//! Player agent: token toggling, claim submission and freezes.

use super::computer;
use crate::{
    dealer::{
        claims::{Claim, ClaimSender, Verdict},
        config::GameConfig,
    },
    game::{
        display::GameDisplay,
        entities::{MAX_TOKENS, PlayerId, PlayerKind, Slot},
        shutdown::Shutdown,
        table::SharedTable,
    },
};
use serde::Serialize;
use std::{ops::ControlFlow, sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, watch},
    time::{Instant, sleep},
};

/// Unprocessed key presses a player can hold while busy.
pub const INPUT_BUFFER: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PlayerState {
    WaitingForInput,
    Toggling,
    BlockedOnClaim,
    Frozen,
    Terminated,
}

/// Routes key presses to one player agent and reports what it is doing.
#[derive(Clone, Debug)]
pub struct InputHandle {
    player: PlayerId,
    sender: mpsc::Sender<Slot>,
    state: watch::Receiver<PlayerState>,
}

impl InputHandle {
    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Queues a key press without waiting. Returns false if it was dropped
    /// because the buffer is full or the player has stopped.
    pub fn key_pressed(&self, slot: Slot) -> bool {
        match self.sender.try_send(slot) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                log::warn!(
                    "Player {} input buffer full, dropping press on slot {}",
                    self.player,
                    slot
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Queues a key press, waiting for room in the buffer.
    pub async fn press(&self, slot: Slot) -> bool {
        self.sender.send(slot).await.is_ok()
    }

    pub fn state(&self) -> PlayerState {
        *self.state.borrow()
    }

    /// Waits until the player reaches `target`. Returns false if the agent
    /// went away first.
    pub async fn wait_for_state(&mut self, target: PlayerState) -> bool {
        self.state.wait_for(|state| *state == target).await.is_ok()
    }
}

pub struct PlayerAgent {
    id: PlayerId,
    kind: PlayerKind,
    config: Arc<GameConfig>,
    table: SharedTable,
    claims: ClaimSender,
    display: Arc<dyn GameDisplay>,
    inputs: mpsc::Receiver<Slot>,
    handle: InputHandle,
    state: watch::Sender<PlayerState>,
    shutdown: Shutdown,
}

impl PlayerAgent {
    pub fn new(
        id: PlayerId,
        kind: PlayerKind,
        config: Arc<GameConfig>,
        table: SharedTable,
        claims: ClaimSender,
        display: Arc<dyn GameDisplay>,
        shutdown: Shutdown,
    ) -> (Self, InputHandle) {
        let (sender, inputs) = mpsc::channel(INPUT_BUFFER);
        let (state, state_rx) = watch::channel(PlayerState::WaitingForInput);
        let handle = InputHandle {
            player: id,
            sender,
            state: state_rx,
        };

        let agent = Self {
            id,
            kind,
            config,
            table,
            claims,
            display,
            inputs,
            handle: handle.clone(),
            state,
            shutdown,
        };
        (agent, handle)
    }

    /// Processes input until termination, then joins the keypresser if any.
    pub async fn run(mut self) {
        log::info!("Player {} ({}) starting", self.id, self.kind);

        let keypresser = match self.kind {
            PlayerKind::Computer => Some(tokio::spawn(computer::press_keys(
                self.handle.clone(),
                self.config.clone(),
                self.shutdown.clone(),
            ))),
            PlayerKind::Human => None,
        };

        loop {
            self.set_state(PlayerState::WaitingForInput);
            let slot = tokio::select! {
                biased;
                _ = self.shutdown.triggered() => break,
                slot = self.inputs.recv() => match slot {
                    Some(slot) => slot,
                    None => break,
                },
            };

            if self.on_input(slot).await.is_break() {
                break;
            }
        }

        self.inputs.close();
        if let Some(keypresser) = keypresser
            && let Err(e) = keypresser.await
        {
            log::error!("Keypresser of player {} failed: {}", self.id, e);
        }

        self.set_state(PlayerState::Terminated);
        log::info!("Player {} terminated", self.id);
    }

    fn set_state(&self, state: PlayerState) {
        self.state.send_replace(state);
    }

    /// Toggles a token on `slot`; the third token raises a claim.
    async fn on_input(&mut self, slot: Slot) -> ControlFlow<()> {
        self.set_state(PlayerState::Toggling);

        let claimed = {
            let mut table = self.table.write().await;
            if table.card_at(slot).is_none() {
                log::trace!("Player {} pressed empty slot {}", self.id, slot);
                return ControlFlow::Continue(());
            }

            if table.has_token(self.id, slot) {
                if let Err(e) = table.remove_token(self.id, slot) {
                    log::error!("Player {} could not remove token: {}", self.id, e);
                }
                return ControlFlow::Continue(());
            }

            if table.tokens_of(self.id).len() >= MAX_TOKENS {
                log::trace!("Player {} already holds {} tokens", self.id, MAX_TOKENS);
                return ControlFlow::Continue(());
            }

            if let Err(e) = table.place_token(self.id, slot) {
                log::error!("Player {} could not place token: {}", self.id, e);
                return ControlFlow::Continue(());
            }

            match <[Slot; MAX_TOKENS]>::try_from(table.tokens_of(self.id)) {
                Ok(slots) => slots,
                Err(_) => return ControlFlow::Continue(()),
            }
        };

        self.submit_claim(claimed).await
    }

    /// Hands the claim to the dealer and waits for its verdict.
    async fn submit_claim(&mut self, slots: [Slot; MAX_TOKENS]) -> ControlFlow<()> {
        let (claim, verdict) = Claim::new(self.id, slots);
        self.set_state(PlayerState::BlockedOnClaim);
        log::debug!("Player {} claims slots {:?}", self.id, slots);

        let submitted = tokio::select! {
            _ = self.shutdown.triggered() => return ControlFlow::Break(()),
            submitted = self.claims.submit(claim) => submitted,
        };
        if let Err(e) = submitted {
            log::debug!("Player {} claim not submitted: {}", self.id, e);
            return ControlFlow::Break(());
        }

        let verdict = tokio::select! {
            _ = self.shutdown.triggered() => return ControlFlow::Break(()),
            verdict = verdict => verdict,
        };

        match verdict {
            Ok(Verdict::Point { score }) => {
                log::info!("Player {} scored, now at {}", self.id, score);
                self.freeze(self.config.point_freeze).await
            }
            Ok(Verdict::Penalty) => {
                log::info!("Player {} penalized", self.id);
                self.freeze(self.config.penalty_freeze).await
            }
            Ok(Verdict::Withdrawn) => {
                log::debug!("Player {} claim withdrawn", self.id);
                ControlFlow::Continue(())
            }
            Err(_) => {
                log::debug!("Player {} claim discarded without verdict", self.id);
                if self.shutdown.is_triggered() {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            }
        }
    }

    /// Ignores input for `duration`, reporting the time left every freeze tick.
    async fn freeze(&mut self, duration: Duration) -> ControlFlow<()> {
        self.set_state(PlayerState::Frozen);
        let until = Instant::now() + duration;

        loop {
            let remaining = until.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            self.display.set_freeze(self.id, remaining);

            let step = remaining.min(self.config.freeze_tick);
            tokio::select! {
                _ = self.shutdown.triggered() => {
                    self.display.set_freeze(self.id, Duration::ZERO);
                    return ControlFlow::Break(());
                }
                _ = sleep(step) => {}
            }
        }
        self.display.set_freeze(self.id, Duration::ZERO);

        if self.config.discard_input_after_freeze {
            let mut dropped = 0;
            while self.inputs.try_recv().is_ok() {
                dropped += 1;
            }
            if dropped > 0 {
                log::debug!("Player {} dropped {} presses made while frozen", self.id, dropped);
            }
        }
        ControlFlow::Continue(())
    }
}
