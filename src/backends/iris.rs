// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Circle Iris API attestation provider implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, trace, Instrument};
use url::Url;

use super::retry_after_secs;
use crate::attestation::{
    DEFAULT_RATE_LIMIT_BACKOFF_SECS, IRIS_API, IRIS_API_SANDBOX, MESSAGES_PATH_V1,
};
use crate::error::{RelayError, Result};
use crate::protocol::{DomainId, MessagesResponse};
use crate::spans;
use crate::submit::TxId;
use crate::traits::AttestationProvider;

/// Production attestation provider using Circle's Iris API.
///
/// # Examples
///
/// ```rust,no_run
/// use swap_relay_rs::{AttestationProvider, DomainId, IrisAttestationProvider, TxId};
///
/// # async fn example() -> swap_relay_rs::Result<()> {
/// let provider = IrisAttestationProvider::production();
/// let burn = TxId::new("0x912f22a13e9ccb979b621500f6952b2afd6e75be7eadaed93fc2625fe11c52a2");
/// let response = provider.get_messages(DomainId::Ethereum, &burn).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IrisAttestationProvider {
    base_url: String,
    client: Client,
}

impl IrisAttestationProvider {
    /// Creates a new Iris attestation provider.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL for the Iris API (e.g., <https://iris-api.circle.com>)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: super::http_client(),
        }
    }

    /// Creates a provider for Circle's production environment.
    pub fn production() -> Self {
        Self::new(IRIS_API)
    }

    /// Creates a provider for Circle's sandbox (testnet) environment.
    pub fn sandbox() -> Self {
        Self::new(IRIS_API_SANDBOX)
    }

    /// Constructs `{base}/v1/messages/{domain}/{txHash}`.
    pub fn messages_url(&self, domain: DomainId, tx_hash: &TxId) -> Result<Url> {
        let base = Url::parse(&format!("{}/", self.base_url.trim_end_matches('/'))).map_err(
            |e| RelayError::InvalidUrl {
                reason: format!("Failed to parse attestation base URL: {e}"),
            },
        )?;
        base.join(&format!(
            "{}{}/{}",
            MESSAGES_PATH_V1.trim_start_matches('/'),
            domain.as_u32(),
            tx_hash.as_str()
        ))
        .map_err(|e| RelayError::InvalidUrl {
            reason: format!("Failed to construct messages URL: {e}"),
        })
    }
}

#[async_trait]
impl AttestationProvider for IrisAttestationProvider {
    async fn get_messages(&self, domain: DomainId, tx_hash: &TxId) -> Result<MessagesResponse> {
        let url = self.messages_url(domain, tx_hash)?;
        let span = spans::get_messages(&url);

        async move {
            trace!(event = "attestation_request_sent");
            let response = self.client.get(url.as_str()).send().await?;

            let status_code = response.status();
            trace!(status_code = %status_code, event = "attestation_response_received");

            if status_code == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = retry_after_secs(&response, DEFAULT_RATE_LIMIT_BACKOFF_SECS);
                debug!(retry_after_seconds = retry_after, event = "rate_limit_exceeded");
                return Err(RelayError::RateLimitExceeded {
                    retry_after_seconds: retry_after,
                });
            }

            // burn not indexed yet
            if status_code == StatusCode::NOT_FOUND {
                debug!(event = "attestation_not_found");
                return Err(RelayError::AttestationNotFound);
            }

            let text = response.error_for_status()?.text().await?;
            let messages: MessagesResponse = serde_json::from_str(&text).inspect_err(|e| {
                debug!(error = %e, response_body = %text, event = "attestation_decode_failed");
            })?;
            Ok(messages)
        }
        .instrument(span)
        .await
    }
}
