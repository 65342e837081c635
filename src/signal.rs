//! Change notifications shared by the clock, planner, and wakeup timer.
//!
//! A [`Signal`] is a generation counter on a [`tokio::sync::watch`] channel.
//! Every [`Signal::emit`] bumps the generation; a [`Subscription`] wakes once
//! for each generation it has not yet seen. Bursts of emits between two
//! receives coalesce into one wakeup, which is all a consumer needs when
//! its reaction to any notification is a full re-evaluation.

use tokio::sync::watch;

/// Sending side of a change notification.
#[derive(Debug)]
pub struct Signal {
    tx: watch::Sender<u64>,
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

impl Signal {
    /// Create a signal with no pending notification.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx }
    }

    /// Notify every current subscriber.
    pub fn emit(&self) {
        self.tx.send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    /// Subscribe to future notifications.
    ///
    /// Notifications emitted before this call are not replayed.
    pub fn subscribe(&self) -> Subscription {
        let mut rx = self.tx.subscribe();
        rx.mark_unchanged();
        Subscription { rx }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Receiving side of a change notification.
#[derive(Debug, Clone)]
pub struct Subscription {
    rx: watch::Receiver<u64>,
}

impl Subscription {
    /// Wait for the next notification.
    ///
    /// Returns `false` once the [`Signal`] has been dropped and no
    /// notification is pending.
    pub async fn recv(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Returns `true` if a notification arrived since the last receive.
    pub fn is_pending(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }
}
