// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use alloy_primitives::{keccak256, Bytes, TxHash};
use serde::{Deserialize, Serialize};
use solana_sdk::{signature::Signature, transaction::VersionedTransaction};
use tokio::time::Instant;

use crate::error::{RelayError, Result};

/// Chain-native transaction identifier: a `0x` hash on EVM and Aptos, a
/// base58 signature on Solana.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<TxHash> for TxId {
    fn from(hash: TxHash) -> Self {
        Self(hash.to_string())
    }
}

/// The value a transaction was built against that bounds how long it stays
/// includable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FreshnessAnchor {
    /// Last block height at which the transaction's blockhash is accepted.
    BlockHeight { last_valid: u64 },
    /// Base58 recent blockhash embedded in the message.
    Blockhash(String),
    /// `expiration_timestamp_secs` of an Aptos transaction.
    ExpiresAt { unix_secs: u64 },
}

/// Signed, serialized transaction ready for broadcast.
///
/// The identifier is known before the first broadcast, so polling can start
/// even if that broadcast never reaches a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    bytes: Bytes,
    id: TxId,
    anchor: Option<FreshnessAnchor>,
}

impl SignedTransaction {
    pub fn new(bytes: impl Into<Bytes>, id: TxId) -> Self {
        Self {
            bytes: bytes.into(),
            id,
            anchor: None,
        }
    }

    /// EIP-2718 encoded EVM transaction; the id is the keccak256 of the bytes.
    pub fn evm(raw: impl Into<Bytes>) -> Self {
        let bytes = raw.into();
        let id = TxId::from(keccak256(&bytes));
        Self {
            bytes,
            id,
            anchor: None,
        }
    }

    /// Wire-format Solana transaction (legacy or versioned).
    ///
    /// The id is the first signature and the anchor is the message's recent
    /// blockhash. Callers that know the `lastValidBlockHeight` should replace
    /// it with [`FreshnessAnchor::BlockHeight`].
    pub fn solana(raw: impl Into<Bytes>) -> Result<Self> {
        let bytes = raw.into();
        let tx: VersionedTransaction = bincode::deserialize(&bytes)
            .map_err(|e| invalid(&format!("not a Solana transaction: {e}")))?;
        if bincode::serialized_size(&tx).ok() != Some(bytes.len() as u64) {
            return Err(invalid("trailing bytes after the transaction"));
        }

        let signature = tx
            .signatures
            .first()
            .ok_or_else(|| invalid("transaction carries no signatures"))?;
        if *signature == Signature::default() {
            return Err(invalid("fee payer signature is empty, sign before submitting"));
        }

        Ok(Self {
            id: TxId::new(signature.to_string()),
            anchor: Some(FreshnessAnchor::Blockhash(
                tx.message.recent_blockhash().to_string(),
            )),
            bytes,
        })
    }

    pub fn with_anchor(mut self, anchor: FreshnessAnchor) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn id(&self) -> &TxId {
        &self.id
    }

    pub fn anchor(&self) -> Option<&FreshnessAnchor> {
        self.anchor.as_ref()
    }
}

/// Local record of one submission: what was sent and when.
#[derive(Debug, Clone)]
pub(crate) struct SubmissionAttempt {
    pub(crate) id: TxId,
    pub(crate) broadcast_at: Instant,
    pub(crate) expiry: Option<FreshnessAnchor>,
}

impl SubmissionAttempt {
    pub(crate) fn start(tx: &SignedTransaction) -> Self {
        Self {
            id: tx.id().clone(),
            broadcast_at: Instant::now(),
            expiry: tx.anchor().cloned(),
        }
    }
}

fn invalid(reason: &str) -> RelayError {
    RelayError::InvalidTransaction {
        reason: reason.to_string(),
    }
}
