// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

use crate::flow::Leg;
use crate::submit::{Rejection, TxId};

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Chain not supported: {chain}")]
    ChainNotSupported { chain: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Transient failure: {0}")]
    Transient(String),

    #[error("Transaction {id} expired before it was confirmed, fetch a fresh transaction")]
    Expired { id: TxId },

    #[error("Transaction {id} rejected by the network: {reason}")]
    RejectedByNetwork { id: TxId, reason: Rejection },

    #[error("Rate limit exceeded, retry after {retry_after_seconds} seconds")]
    RateLimitExceeded { retry_after_seconds: u64 },

    #[error("Transaction {id} not confirmed after {attempts} status checks, check chain state before resubmitting")]
    Timeout { id: TxId, attempts: u32 },

    #[error("Attestation failed: {reason}")]
    AttestationFailed { reason: String },

    #[error("Attestation not found (will retry)")]
    AttestationNotFound,

    #[error("Timeout waiting for attestation")]
    AttestationTimeout,

    #[error("Invalid transaction: {reason}")]
    InvalidTransaction { reason: String },

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid URL: {reason}")]
    InvalidUrl { reason: String },

    #[error("{leg} leg failed (last confirmed transaction: {}): {source}", .last_tx.as_ref().map(|id| id.as_str()).unwrap_or("none"))]
    LegFailed {
        leg: Leg,
        last_tx: Option<TxId>,
        #[source]
        source: Box<RelayError>,
    },

    #[error("RPC error: {0}")]
    Rpc(#[from] alloy_json_rpc::RpcError<alloy_transport::TransportErrorKind>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex conversion error: {0}")]
    Hex(#[from] alloy_primitives::hex::FromHexError),

    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl RelayError {
    /// Whether retrying the same request can succeed.
    ///
    /// `Expired` is not retryable with the same bytes: the caller has to fetch
    /// a fresh transaction. `Timeout` is inconclusive and must not be blindly
    /// retried either, since the transaction may still land.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_)
            | Self::Transient(_)
            | Self::RateLimitExceeded { .. }
            | Self::AttestationNotFound
            | Self::Rpc(_) => true,
            Self::LegFailed { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Whether this is a slippage rejection, looking through leg wrappers.
    pub fn is_slippage(&self) -> bool {
        match self {
            Self::RejectedByNetwork { reason, .. } => {
                matches!(reason, Rejection::SlippageExceeded { .. })
            }
            Self::LegFailed { source, .. } => source.is_slippage(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
