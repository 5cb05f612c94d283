// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Background re-broadcast of an already-sent transaction.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{sleep, Instant},
};
use tracing::{debug, trace, warn, Instrument};

use super::SignedTransaction;
use crate::{spans, traits::ChainBackend};

/// What the foreground poll tells the re-broadcast task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    /// No status check scheduled.
    Open,
    /// The next status check is due at this instant. A re-broadcast due at
    /// or after it waits for that check's verdict.
    CheckDue(Instant),
    Stopped,
}

/// Handle to the task re-sending identical bytes every `interval`.
///
/// The stop signal is checked before every broadcast, and a re-broadcast that
/// falls due together with a status check waits until the check has been
/// answered. A terminal status therefore never has a broadcast after it.
/// [`Rebroadcaster::stop`] waits for a broadcast already in flight.
pub(crate) struct Rebroadcaster {
    gate: watch::Sender<Gate>,
    handle: Option<JoinHandle<u32>>,
}

impl Rebroadcaster {
    pub(crate) fn spawn<B>(backend: Arc<B>, tx: SignedTransaction, interval: Duration) -> Self
    where
        B: ChainBackend + ?Sized + 'static,
    {
        let (gate, mut watcher) = watch::channel(Gate::Open);
        let span = spans::rebroadcast(tx.id(), backend.name(), interval);

        let handle = tokio::spawn(
            async move {
                let mut sent = 0u32;
                'rebroadcast: loop {
                    tokio::select! {
                        biased;
                        _ = watcher.wait_for(|gate| *gate == Gate::Stopped) => break,
                        _ = sleep(interval) => {}
                    }

                    loop {
                        let gate = *watcher.borrow_and_update();
                        match gate {
                            Gate::Stopped => break 'rebroadcast,
                            Gate::CheckDue(due) if Instant::now() >= due => {
                                if watcher.changed().await.is_err() {
                                    break 'rebroadcast;
                                }
                            }
                            _ => break,
                        }
                    }

                    sent += 1;
                    match backend.broadcast(&tx).await {
                        Ok(()) => trace!(rebroadcast = sent, event = "rebroadcast_sent"),
                        // identical bytes: a node that already has the tx refuses it
                        Err(e) => debug!(
                            rebroadcast = sent,
                            error = %e,
                            event = "rebroadcast_refused"
                        ),
                    }
                }
                sent
            }
            .instrument(span),
        );

        Self {
            gate,
            handle: Some(handle),
        }
    }

    /// Announces the next status check. Called before each poll sleep.
    pub(crate) fn check_due_at(&self, due: Instant) {
        self.gate.send_replace(Gate::CheckDue(due));
    }

    /// Signals the task and waits until it has exited. Returns how many
    /// re-broadcasts it made.
    pub(crate) async fn stop(mut self) -> u32 {
        self.gate.send_replace(Gate::Stopped);
        let Some(handle) = self.handle.take() else {
            return 0;
        };
        match handle.await {
            Ok(sent) => sent,
            Err(e) => {
                warn!(error = %e, event = "rebroadcast_task_failed");
                0
            }
        }
    }
}

impl Drop for Rebroadcaster {
    // Reached without `stop` only when the submitting future is dropped.
    fn drop(&mut self) {
        self.gate.send_replace(Gate::Stopped);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeChainBackend;
    use crate::submit::TxId;

    fn tx() -> SignedTransaction {
        SignedTransaction::new(vec![1, 2, 3], TxId::new("sig"))
    }

    #[tokio::test(start_paused = true)]
    async fn test_rebroadcasts_on_interval_until_stopped() {
        let backend = Arc::new(FakeChainBackend::new());
        let rebroadcaster =
            Rebroadcaster::spawn(Arc::clone(&backend), tx(), Duration::from_secs(2));

        sleep(Duration::from_millis(6500)).await;
        let sent = rebroadcaster.stop().await;

        assert_eq!(sent, 3);
        assert_eq!(backend.broadcast_count(), 3);

        sleep(Duration::from_secs(10)).await;
        assert_eq!(backend.broadcast_count(), 3, "no broadcast after stop");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_first_interval() {
        let backend = Arc::new(FakeChainBackend::new());
        let rebroadcaster =
            Rebroadcaster::spawn(Arc::clone(&backend), tx(), Duration::from_secs(2));

        assert_eq!(rebroadcaster.stop().await, 0);
        assert_eq!(backend.broadcast_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refused_rebroadcasts_are_ignored() {
        let backend = Arc::new(FakeChainBackend::new());
        backend.refuse_broadcasts("already processed");
        let rebroadcaster =
            Rebroadcaster::spawn(Arc::clone(&backend), tx(), Duration::from_secs(1));

        sleep(Duration::from_millis(2500)).await;
        assert_eq!(rebroadcaster.stop().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rebroadcast_waits_for_due_status_check() {
        let backend = Arc::new(FakeChainBackend::new());
        let rebroadcaster =
            Rebroadcaster::spawn(Arc::clone(&backend), tx(), Duration::from_secs(2));
        rebroadcaster.check_due_at(Instant::now() + Duration::from_secs(2));

        sleep(Duration::from_secs(3)).await;
        assert_eq!(backend.broadcast_count(), 0, "held until the check answers");

        rebroadcaster.check_due_at(Instant::now() + Duration::from_secs(2));
        sleep(Duration::from_millis(1)).await;
        assert_eq!(backend.broadcast_count(), 1);
        rebroadcaster.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_while_waiting_for_check_skips_broadcast() {
        let backend = Arc::new(FakeChainBackend::new());
        let rebroadcaster =
            Rebroadcaster::spawn(Arc::clone(&backend), tx(), Duration::from_secs(2));
        rebroadcaster.check_due_at(Instant::now() + Duration::from_secs(2));

        sleep(Duration::from_secs(2)).await;
        assert_eq!(rebroadcaster.stop().await, 0);
        assert_eq!(backend.broadcast_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_task() {
        let backend = Arc::new(FakeChainBackend::new());
        drop(Rebroadcaster::spawn(
            Arc::clone(&backend),
            tx(),
            Duration::from_secs(1),
        ));

        sleep(Duration::from_secs(5)).await;
        assert_eq!(backend.broadcast_count(), 0);
    }
}
