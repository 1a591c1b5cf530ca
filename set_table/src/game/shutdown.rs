//! Game-wide termination signal.
//!
//! Every suspension point in the dealer and the players selects on
//! [`Shutdown::triggered`], so raising the signal is observed within one
//! wait without interrupting anyone.

use std::sync::Arc;
use tokio::sync::watch;

/// Raises the termination signal. Cheap to clone and safe to call from a
/// signal handler thread.
#[derive(Clone, Debug)]
pub struct ShutdownTrigger {
    sender: Arc<watch::Sender<bool>>,
}

/// Observes the termination signal.
#[derive(Clone, Debug)]
pub struct Shutdown {
    receiver: watch::Receiver<bool>,
}

pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (sender, receiver) = watch::channel(false);
    (
        ShutdownTrigger {
            sender: Arc::new(sender),
        },
        Shutdown { receiver },
    )
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        if !self.sender.send_replace(true) {
            log::info!("Termination requested");
        }
    }

    pub fn subscribe(&self) -> Shutdown {
        Shutdown {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Shutdown {
    /// True once the signal is raised. A dropped trigger counts as raised.
    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow() || self.receiver.has_changed().is_err()
    }

    /// Resolves once the signal is raised. Cancel safe.
    pub async fn triggered(&mut self) {
        let _ = self.receiver.wait_for(|raised| *raised).await;
    }
}
