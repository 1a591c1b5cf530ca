//! Claim hand-off between players and the dealer.
//!
//! Claims travel through a bounded FIFO sized to the number of players, so a
//! submission never waits in practice and is never dropped. Each claim carries
//! its own single-use verdict channel; the claimant awaits exactly that
//! channel and can't be woken by anyone else's verdict.
//!
//! Submitting also wakes the dealer early. The dealer polls the queue on
//! every tick regardless, so the wake only improves latency.

use crate::game::{
    entities::{MAX_TOKENS, PlayerId, Slot},
    errors::{GameError, GameResult},
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Notify, mpsc, oneshot};

/// Outcome of a claim, delivered to the claimant only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// The triple was a set. Carries the claimant's new score.
    Point { score: u32 },

    /// The triple was not a set.
    Penalty,

    /// Some of the claimed tokens were retracted before the claim was
    /// adjudicated, by an earlier accepted claim or by the end of the round.
    Withdrawn,
}

/// A player's three slots as they were when the third token was placed.
#[derive(Debug)]
pub struct Claim {
    pub player: PlayerId,
    pub slots: [Slot; MAX_TOKENS],
    verdict: oneshot::Sender<Verdict>,
}

impl Claim {
    /// New claim plus the receiver its verdict will arrive on.
    pub fn new(player: PlayerId, slots: [Slot; MAX_TOKENS]) -> (Self, oneshot::Receiver<Verdict>) {
        let (verdict, receiver) = oneshot::channel();
        (
            Self {
                player,
                slots,
                verdict,
            },
            receiver,
        )
    }

    /// Delivers the verdict and consumes the claim.
    pub fn resolve(self, verdict: Verdict) {
        if self.verdict.send(verdict).is_err() {
            log::debug!(
                "Player {} stopped waiting before its claim on {:?} was resolved",
                self.player,
                self.slots
            );
        }
    }
}

/// Player side of the claim queue.
#[derive(Clone, Debug)]
pub struct ClaimSender {
    sender: mpsc::Sender<Claim>,
    wake: Arc<Notify>,
}

/// Dealer side of the claim queue.
#[derive(Debug)]
pub struct ClaimReceiver {
    inbox: mpsc::Receiver<Claim>,
    wake: Arc<Notify>,
}

/// Claim queue holding up to `capacity` claims, at least one.
pub fn channel(capacity: usize) -> (ClaimSender, ClaimReceiver) {
    let (sender, inbox) = mpsc::channel(capacity.max(1));
    let wake = Arc::new(Notify::new());
    (
        ClaimSender {
            sender,
            wake: wake.clone(),
        },
        ClaimReceiver { inbox, wake },
    )
}

impl ClaimSender {
    /// Enqueue a claim and wake the dealer. Fails once the dealer has stopped.
    pub async fn submit(&self, claim: Claim) -> GameResult<()> {
        self.sender
            .send(claim)
            .await
            .map_err(|_| GameError::DealerClosed)?;
        self.wake.notify_one();
        Ok(())
    }
}

impl ClaimReceiver {
    /// Next queued claim in submission order, without waiting.
    pub fn try_next(&mut self) -> Option<Claim> {
        self.inbox.try_recv().ok()
    }

    /// Resolves when a claim was submitted since the last wake.
    pub async fn woken(&self) {
        self.wake.notified().await;
    }

    /// Stops accepting claims. Claims already queued can still be taken.
    pub fn close(&mut self) {
        self.inbox.close();
    }
}
