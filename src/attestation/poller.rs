// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn, Instrument};

use super::PollingConfig;
use crate::error::{RelayError, Result};
use crate::protocol::{AttestationRecord, DomainId};
use crate::spans;
use crate::submit::TxId;
use crate::traits::AttestationProvider;

/// Polls an [`AttestationProvider`] until a burn's message is attested.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use swap_relay_rs::{AttestationPoller, Chain, IrisAttestationProvider, PollingConfig, TxId};
///
/// # async fn example() -> swap_relay_rs::Result<()> {
/// let poller = AttestationPoller::new(
///     Arc::new(IrisAttestationProvider::production()),
///     PollingConfig::default(),
/// );
/// let burn = TxId::new("0x912f22a13e9ccb979b621500f6952b2afd6e75be7eadaed93fc2625fe11c52a2");
/// let record = poller
///     .await_attestation(Chain::Ethereum.cctp_domain(), &burn)
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct AttestationPoller<P: AttestationProvider + ?Sized> {
    provider: Arc<P>,
    config: PollingConfig,
}

impl<P: AttestationProvider + ?Sized> Clone for AttestationPoller<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            config: self.config,
        }
    }
}

impl<P: AttestationProvider + ?Sized> AttestationPoller<P> {
    pub fn new(provider: Arc<P>, config: PollingConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &PollingConfig {
        &self.config
    }

    /// Waits for the attestation of the message emitted by `tx_hash` on the
    /// source `domain`.
    ///
    /// 404s and `"PENDING"` attestations count as pending. A 429 sleeps for
    /// the server's hint and uses up an attempt.
    ///
    /// # Errors
    ///
    /// - [`RelayError::AttestationFailed`] when the service marks the message failed
    /// - [`RelayError::AttestationTimeout`] after `max_attempts` lookups
    /// - [`RelayError::InvalidConfig`] when `max_attempts` is zero
    /// - Any non-retryable error from the provider, unchanged
    pub async fn await_attestation(
        &self,
        domain: DomainId,
        tx_hash: &TxId,
    ) -> Result<AttestationRecord> {
        self.config.validate()?;
        let max_attempts = self.config.max_attempts;
        let poll_interval = Duration::from_secs(self.config.poll_interval_secs);
        let span = spans::await_attestation(
            domain,
            tx_hash,
            max_attempts,
            self.config.poll_interval_secs,
        );

        async move {
            info!(
                source_domain = %domain,
                event = "attestation_polling_started"
            );

            for attempt in 1..=max_attempts {
                let mut wait = poll_interval;

                match self.provider.get_messages(domain, tx_hash).await {
                    Ok(response) => {
                        if let Some(record) = response.first_ready() {
                            info!(
                                attempt = attempt,
                                attestation_bytes = record.attestation.len(),
                                event = "attestation_complete"
                            );
                            return Ok(record);
                        }
                        if response.has_failed() {
                            spans::record_error_with_context(
                                "AttestationFailed",
                                "Attestation service reported the message as failed",
                                Some(&format!("Attempt {attempt}/{max_attempts}")),
                            );
                            error!(attempt = attempt, event = "attestation_failed");
                            return Err(RelayError::AttestationFailed {
                                reason: "message marked failed by the attestation service"
                                    .to_string(),
                            });
                        }
                        debug!(
                            attempt = attempt,
                            messages = response.messages.len(),
                            event = "attestation_pending"
                        );
                    }
                    Err(RelayError::AttestationNotFound) => {
                        debug!(attempt = attempt, event = "attestation_not_found");
                    }
                    Err(RelayError::RateLimitExceeded {
                        retry_after_seconds,
                    }) => {
                        debug!(
                            sleep_secs = retry_after_seconds,
                            attempt = attempt,
                            event = "rate_limit_exceeded"
                        );
                        wait = Duration::from_secs(retry_after_seconds);
                    }
                    Err(e @ RelayError::Json(_)) => {
                        warn!(error = %e, attempt = attempt, event = "attestation_decode_failed");
                    }
                    Err(e) if e.is_retryable() => {
                        warn!(error = %e, attempt = attempt, event = "attestation_request_failed");
                    }
                    Err(e) => {
                        spans::record_error_with_context(
                            "HttpRequestFailed",
                            &format!("Failed to fetch attestation: {e}"),
                            Some(&format!("Attempt {attempt}/{max_attempts}")),
                        );
                        error!(error = %e, attempt = attempt, event = "attestation_request_failed");
                        return Err(e);
                    }
                }

                if attempt < max_attempts {
                    sleep(wait).await;
                }
            }

            spans::record_error_with_context(
                "AttestationTimeout",
                "Maximum polling attempts exceeded",
                Some(&format!("{max_attempts} attempts")),
            );
            error!(attempts = max_attempts, event = "attestation_timeout");
            Err(RelayError::AttestationTimeout)
        }
        .instrument(span)
        .await
    }
}
