// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Solana through the nonblocking `solana-client` RPC client.

use std::{fmt, str::FromStr, sync::Arc};

use async_trait::async_trait;
use bon::bon;
use serde_json::Value;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_config::RpcSendTransactionConfig,
    rpc_request::RpcError,
};
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{hash::Hash, signature::Signature, transaction::VersionedTransaction};
use tracing::{debug, trace, Instrument};

use super::HTTP_TIMEOUT;
use crate::error::{RelayError, Result};
use crate::spans;
use crate::submit::{FreshnessAnchor, Rejection, SignedTransaction, TxId, TxStatus};
use crate::traits::ChainBackend;

/// Custom program error of the common swap programs when the output falls
/// below the quoted minimum.
pub const SLIPPAGE_TOLERANCE_EXCEEDED: u32 = 6001;

/// Invalid params, e.g. undecodable transaction bytes.
const INVALID_PARAMS: i64 = -32602;
/// Transaction signature verification failure.
const SIGNATURE_VERIFICATION_FAILURE: i64 = -32003;

/// [`ChainBackend`] for Solana.
///
/// Broadcasts with `skip_preflight` and `max_retries: 0`: the submitter does
/// its own re-broadcasting and the node's simulation would reject
/// transactions that are merely racing a fresh blockhash.
///
/// # Examples
///
/// ```rust
/// use swap_relay_rs::SolanaBackend;
///
/// let backend = SolanaBackend::builder()
///     .rpc_url("https://api.mainnet-beta.solana.com")
///     .slippage_error_codes(vec![6001, 6017])
///     .build();
/// ```
#[derive(Clone)]
pub struct SolanaBackend {
    rpc: Arc<RpcClient>,
    /// Custom program error codes reported as slippage rather than a revert.
    slippage_error_codes: Vec<u32>,
}

#[bon]
impl SolanaBackend {
    #[builder]
    pub fn new(
        #[builder(into)] rpc_url: String,
        #[builder(default = vec![SLIPPAGE_TOLERANCE_EXCEEDED])] slippage_error_codes: Vec<u32>,
    ) -> Self {
        Self {
            rpc: Arc::new(RpcClient::new_with_timeout(rpc_url, HTTP_TIMEOUT)),
            slippage_error_codes,
        }
    }

    /// Shares an RPC client the application already configured.
    pub fn from_client(rpc: Arc<RpcClient>) -> Self {
        Self {
            rpc,
            slippage_error_codes: vec![SLIPPAGE_TOLERANCE_EXCEEDED],
        }
    }

    pub fn rpc(&self) -> &Arc<RpcClient> {
        &self.rpc
    }

    /// `err` in its RPC form, e.g. `{"InstructionError":[3,{"Custom":6001}]}`.
    fn rejection(&self, err: &Value) -> Rejection {
        let custom = err
            .get("InstructionError")
            .and_then(|e| e.get(1))
            .and_then(|e| e.get("Custom"))
            .and_then(Value::as_u64);

        match custom {
            Some(code) if self.slippage_error_codes.iter().any(|c| u64::from(*c) == code) => {
                Rejection::SlippageExceeded {
                    detail: format!("custom program error {code}"),
                }
            }
            _ => Rejection::Reverted {
                detail: err.to_string(),
            },
        }
    }
}

impl fmt::Debug for SolanaBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolanaBackend")
            .field("rpc_url", &self.rpc.url())
            .field("slippage_error_codes", &self.slippage_error_codes)
            .finish()
    }
}

fn classify(method: &str, err: ClientError) -> RelayError {
    match err.kind() {
        ClientErrorKind::RpcError(RpcError::RpcResponseError { code, message, .. })
            if matches!(*code, INVALID_PARAMS | SIGNATURE_VERIFICATION_FAILURE) =>
        {
            RelayError::InvalidTransaction {
                reason: message.clone(),
            }
        }
        _ => RelayError::Transient(format!("{method} failed: {err}")),
    }
}

fn signature(id: &TxId) -> Result<Signature> {
    Signature::from_str(id.as_str()).map_err(|e| RelayError::InvalidTransaction {
        reason: format!("{id} is not a Solana signature: {e}"),
    })
}

#[async_trait]
impl ChainBackend for SolanaBackend {
    fn name(&self) -> &str {
        "solana"
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> Result<()> {
        let transaction: VersionedTransaction =
            bincode::deserialize(tx.bytes()).map_err(|e| RelayError::InvalidTransaction {
                reason: format!("not a Solana transaction: {e}"),
            })?;

        let config = RpcSendTransactionConfig {
            skip_preflight: true,
            max_retries: Some(0),
            ..Default::default()
        };
        let signature = self
            .rpc
            .send_transaction_with_config(&transaction, config)
            .instrument(spans::rpc_call("sendTransaction", self.name()))
            .await
            .map_err(|e| classify("sendTransaction", e))?;

        trace!(signature = %signature, event = "transaction_sent");
        Ok(())
    }

    async fn status(&self, id: &TxId) -> Result<TxStatus> {
        let signature = signature(id)?;
        let reply = self
            .rpc
            .get_signature_statuses_with_history(&[signature])
            .instrument(spans::rpc_call("getSignatureStatuses", self.name()))
            .await
            .map_err(|e| classify("getSignatureStatuses", e))?;

        let Some(status) = reply.value.into_iter().next().flatten() else {
            return Ok(TxStatus::NotFound);
        };

        if let Some(err) = &status.err {
            let err = serde_json::to_value(err)?;
            debug!(signature = %id, error = %err, event = "transaction_failed");
            return Ok(TxStatus::Failed(self.rejection(&err)));
        }

        Ok(if status.satisfies_commitment(CommitmentConfig::finalized()) {
            TxStatus::Finalized
        } else if status.satisfies_commitment(CommitmentConfig::confirmed()) {
            TxStatus::Confirmed
        } else {
            TxStatus::Processed
        })
    }

    async fn anchor_expired(&self, anchor: &FreshnessAnchor) -> Result<bool> {
        match anchor {
            FreshnessAnchor::BlockHeight { last_valid } => {
                let height = self
                    .rpc
                    .get_block_height_with_commitment(CommitmentConfig::confirmed())
                    .instrument(spans::rpc_call("getBlockHeight", self.name()))
                    .await
                    .map_err(|e| classify("getBlockHeight", e))?;
                trace!(height, last_valid, event = "block_height_checked");
                Ok(height > *last_valid)
            }
            FreshnessAnchor::Blockhash(hash) => {
                let hash = Hash::from_str(hash).map_err(|e| RelayError::InvalidTransaction {
                    reason: format!("invalid blockhash {hash}: {e}"),
                })?;
                let valid = self
                    .rpc
                    .is_blockhash_valid(&hash, CommitmentConfig::processed())
                    .instrument(spans::rpc_call("isBlockhashValid", self.name()))
                    .await
                    .map_err(|e| classify("isBlockhashValid", e))?;
                Ok(!valid)
            }
            FreshnessAnchor::ExpiresAt { .. } => Ok(false),
        }
    }
}
