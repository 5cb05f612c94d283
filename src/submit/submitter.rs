// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, trace, warn, Instrument};

use super::rebroadcast::Rebroadcaster;
use super::{SignedTransaction, SubmissionAttempt, SubmitConfig, TxId, TxStatus};
use crate::error::{RelayError, Result};
use crate::spans;
use crate::traits::ChainBackend;

/// Broadcasts signed transactions and waits for them to land.
///
/// One submitter serves one chain. The chain-specific calls come from the
/// [`ChainBackend`], so the same loop drives Solana, Aptos and EVM chains as
/// well as the fakes in [`crate::testing`].
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use swap_relay_rs::{SignedTransaction, SolanaBackend, SubmitConfig, Submitter};
///
/// # async fn example(raw: Vec<u8>) -> swap_relay_rs::Result<()> {
/// let backend = SolanaBackend::builder()
///     .rpc_url("https://api.mainnet-beta.solana.com")
///     .build();
/// let submitter = Submitter::new(Arc::new(backend), SubmitConfig::default());
///
/// let signature = submitter
///     .submit_and_confirm(SignedTransaction::solana(raw)?)
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Submitter<B: ChainBackend + ?Sized> {
    backend: Arc<B>,
    config: SubmitConfig,
}

impl<B: ChainBackend + ?Sized> Clone for Submitter<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            config: self.config,
        }
    }
}

impl<B: ChainBackend + ?Sized> std::fmt::Debug for Submitter<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .finish()
    }
}

impl<B: ChainBackend + ?Sized + 'static> Submitter<B> {
    pub fn new(backend: Arc<B>, config: SubmitConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &SubmitConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Broadcasts `tx` and polls until it reaches the configured commitment.
    ///
    /// # Errors
    ///
    /// - [`RelayError::RejectedByNetwork`]: the transaction failed on-chain;
    ///   never retried. Slippage failures carry
    ///   [`Rejection::SlippageExceeded`](super::Rejection::SlippageExceeded).
    /// - [`RelayError::Expired`]: the freshness anchor lapsed before the
    ///   transaction landed. Fetch and sign a new transaction.
    /// - [`RelayError::Timeout`]: the budget ran out without a terminal status.
    ///   The transaction may still land; check the chain before resubmitting.
    /// - [`RelayError::InvalidTransaction`]: the node refused the bytes outright.
    pub async fn submit_and_confirm(&self, tx: SignedTransaction) -> Result<TxId> {
        self.config.validate()?;
        let span = spans::submit_and_confirm(tx.id(), self.backend.name(), &self.config);

        async move {
            let attempt = SubmissionAttempt::start(&tx);
            info!(
                anchor = ?attempt.expiry,
                tx_bytes = tx.bytes().len(),
                event = "submission_started"
            );

            match self.backend.broadcast(&tx).await {
                Ok(()) => debug!(event = "initial_broadcast_sent"),
                Err(e @ (RelayError::RejectedByNetwork { .. }
                | RelayError::InvalidTransaction { .. })) => {
                    spans::record_error_with_context(
                        "BroadcastRejected",
                        &e.to_string(),
                        Some("The node refused the transaction before inclusion"),
                    );
                    error!(error = %e, event = "initial_broadcast_rejected");
                    return Err(e);
                }
                Err(e) => warn!(error = %e, event = "initial_broadcast_failed"),
            }

            let rebroadcaster = self.config.rebroadcast_interval.map(|interval| {
                Rebroadcaster::spawn(Arc::clone(&self.backend), tx.clone(), interval)
            });

            let outcome = self.confirm(&tx, &attempt, rebroadcaster.as_ref()).await;

            if let Some(rebroadcaster) = rebroadcaster {
                let sent = rebroadcaster.stop().await;
                debug!(rebroadcasts = sent, event = "rebroadcast_stopped");
            }

            outcome
        }
        .instrument(span)
        .await
    }

    async fn confirm(
        &self,
        tx: &SignedTransaction,
        attempt: &SubmissionAttempt,
        rebroadcaster: Option<&Rebroadcaster>,
    ) -> Result<TxId> {
        let id = &attempt.id;
        let target = self.config.commitment;
        let deadline = self.config.max_duration.map(|d| attempt.broadcast_at + d);
        // cleared once the transaction is seen in a block
        let mut anchor = tx.anchor();
        let mut checks = 0;

        while checks < self.config.max_attempts {
            checks += 1;
            let due = Instant::now() + self.config.poll_interval;
            if let Some(rebroadcaster) = rebroadcaster {
                rebroadcaster.check_due_at(due);
            }
            sleep_until(due).await;

            match self.backend.status(id).await {
                Ok(status) if status.reaches(target) => {
                    info!(
                        status_checks = checks,
                        elapsed_ms = attempt.broadcast_at.elapsed().as_millis() as u64,
                        commitment = %target,
                        event = "transaction_confirmed"
                    );
                    return Ok(id.clone());
                }
                Ok(TxStatus::Failed(reason)) => return Err(self.rejected(id, reason)),
                Ok(status) => {
                    trace!(status = ?status, status_check = checks, event = "transaction_pending");
                    if status.is_landed() {
                        anchor = None;
                    }
                }
                Err(e) => {
                    warn!(error = %e, status_check = checks, event = "status_lookup_failed");
                }
            }

            if let Some(current) = anchor {
                match self.backend.anchor_expired(current).await {
                    Ok(false) => {}
                    Ok(true) => match self.backend.status(id).await {
                        // landed between the last check and the expiry
                        Ok(status) if status.reaches(target) => return Ok(id.clone()),
                        Ok(TxStatus::Failed(reason)) => return Err(self.rejected(id, reason)),
                        Ok(status) if status.is_landed() => anchor = None,
                        _ => {
                            spans::record_error_with_context(
                                "TransactionExpired",
                                "Freshness anchor lapsed before the transaction landed",
                                Some(&format!("After {checks} status checks")),
                            );
                            warn!(anchor = ?current, status_checks = checks, event = "transaction_expired");
                            return Err(RelayError::Expired { id: id.clone() });
                        }
                    },
                    Err(e) => warn!(error = %e, event = "anchor_lookup_failed"),
                }
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                debug!(status_checks = checks, event = "submission_deadline_reached");
                break;
            }
        }

        spans::record_error_with_context(
            "SubmissionTimeout",
            &format!("No terminal status after {checks} status checks"),
            Some("The transaction may still land; check chain state before resubmitting"),
        );
        error!(
            status_checks = checks,
            elapsed_ms = attempt.broadcast_at.elapsed().as_millis() as u64,
            event = "submission_timeout"
        );
        Err(RelayError::Timeout {
            id: id.clone(),
            attempts: checks,
        })
    }

    fn rejected(&self, id: &TxId, reason: super::Rejection) -> RelayError {
        spans::record_error_with_context(
            "RejectedByNetwork",
            &reason.to_string(),
            Some("The transaction failed on-chain and will not be retried"),
        );
        error!(reason = %reason, event = "transaction_rejected");
        RelayError::RejectedByNetwork {
            id: id.clone(),
            reason,
        }
    }
}
