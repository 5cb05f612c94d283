// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Aptos over the fullnode REST API.

use async_trait::async_trait;
use bon::Builder;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, trace, Instrument};

use super::retry_after_secs;
use crate::error::{RelayError, Result};
use crate::spans;
use crate::submit::{FreshnessAnchor, Rejection, SignedTransaction, TxId, TxStatus};
use crate::traits::ChainBackend;

const BCS_SIGNED_TRANSACTION: &str = "application/x.aptos.signed_transaction+bcs";

/// Error codes a node returns for bytes it has already seen.
const ALREADY_SUBMITTED: &[&str] = &["sequence_number_too_old", "invalid_transaction_update"];

/// [`ChainBackend`] for Aptos.
///
/// `node_url` is the REST root including the version, for example
/// `https://fullnode.mainnet.aptoslabs.com/v1`. Committed transactions are
/// final, so a successful user transaction reports [`TxStatus::Finalized`].
///
/// # Examples
///
/// ```rust
/// use swap_relay_rs::AptosBackend;
///
/// let backend = AptosBackend::builder()
///     .node_url("https://fullnode.mainnet.aptoslabs.com/v1")
///     .build();
/// ```
#[derive(Debug, Clone, Builder)]
pub struct AptosBackend {
    #[builder(into)]
    node_url: String,

    #[builder(default = super::http_client())]
    client: Client,

    /// Case-insensitive substrings of `vm_status` reported as slippage.
    #[builder(default = vec![
        "E_SLIPPAGE".to_string(),
        "EMIN_OUTPUT".to_string(),
        "E_OUTPUT_LESS_THAN_MINIMUM".to_string(),
    ])]
    slippage_markers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct NodeError {
    message: String,
    #[serde(default)]
    error_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransactionView {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    vm_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LedgerInfo {
    /// Microseconds since the epoch, as a decimal string.
    ledger_timestamp: String,
}

impl AptosBackend {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.node_url.trim_end_matches('/'), path)
    }

    fn rejection(&self, vm_status: &str) -> Rejection {
        let lowered = vm_status.to_lowercase();
        let slippage = self
            .slippage_markers
            .iter()
            .any(|marker| lowered.contains(&marker.to_lowercase()));

        if slippage {
            Rejection::SlippageExceeded {
                detail: vm_status.to_string(),
            }
        } else {
            Rejection::Reverted {
                detail: vm_status.to_string(),
            }
        }
    }
}

#[async_trait]
impl ChainBackend for AptosBackend {
    fn name(&self) -> &str {
        "aptos"
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> Result<()> {
        let response = self
            .client
            .post(self.url("/transactions"))
            .header(CONTENT_TYPE, BCS_SIGNED_TRANSACTION)
            .body(tx.bytes().to_vec())
            .send()
            .instrument(spans::rpc_call("submit_transaction", self.name()))
            .await?;

        let status = response.status();
        if status.is_success() {
            trace!(tx_hash = %tx.id(), event = "transaction_sent");
            return Ok(());
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RelayError::RateLimitExceeded {
                retry_after_seconds: retry_after_secs(&response, 1),
            });
        }

        let body = response.text().await?;
        if status == StatusCode::BAD_REQUEST {
            let error: NodeError = serde_json::from_str(&body)?;
            if error
                .error_code
                .as_deref()
                .is_some_and(|code| ALREADY_SUBMITTED.contains(&code))
            {
                return Err(RelayError::Transient(error.message));
            }
            return Err(RelayError::InvalidTransaction {
                reason: error.message,
            });
        }
        if status.is_server_error() {
            return Err(RelayError::Transient(format!("HTTP {status}: {body}")));
        }
        Err(RelayError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn status(&self, id: &TxId) -> Result<TxStatus> {
        let response = self
            .client
            .get(self.url(&format!("/transactions/by_hash/{id}")))
            .send()
            .instrument(spans::rpc_call("get_transaction_by_hash", self.name()))
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(TxStatus::NotFound);
        }
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(RelayError::RateLimitExceeded {
                retry_after_seconds: retry_after_secs(&response, 1),
            });
        }

        let view: TransactionView = response.error_for_status()?.json().await?;
        match (view.kind.as_str(), view.success) {
            ("pending_transaction", _) => Ok(TxStatus::NotFound),
            (_, Some(true)) => Ok(TxStatus::Finalized),
            (_, Some(false)) => {
                let vm_status = view.vm_status.unwrap_or_default();
                debug!(tx_hash = %id, vm_status = %vm_status, event = "transaction_failed");
                Ok(TxStatus::Failed(self.rejection(&vm_status)))
            }
            (kind, None) => Err(RelayError::Transient(format!(
                "transaction of type {kind} carries no success flag"
            ))),
        }
    }

    async fn anchor_expired(&self, anchor: &FreshnessAnchor) -> Result<bool> {
        let FreshnessAnchor::ExpiresAt { unix_secs } = anchor else {
            return Ok(false);
        };

        let ledger: LedgerInfo = self
            .client
            .get(self.url(""))
            .send()
            .instrument(spans::rpc_call("get_ledger_info", self.name()))
            .await?
            .error_for_status()?
            .json()
            .await?;

        let micros: u64 = ledger.ledger_timestamp.parse().map_err(|_| {
            RelayError::Transient(format!(
                "unparseable ledger timestamp {}",
                ledger.ledger_timestamp
            ))
        })?;
        Ok(micros / 1_000_000 >= *unix_secs)
    }
}
