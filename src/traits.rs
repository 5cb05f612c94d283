// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Seams between the retry loops and the outside world.
//!
//! Every chain RPC, the attestation service, the swap API and signing sit
//! behind a trait here, so the loops in [`crate::submit`],
//! [`crate::attestation`] and [`crate::flow`] run unchanged against the
//! production backends and against the fakes in [`crate::testing`].
//!
//! # Example: Implementing a Backend
//!
//! ```rust,ignore
//! use swap_relay_rs::{ChainBackend, Result, SignedTransaction, TxId, TxStatus};
//!
//! struct DevnetBackend;
//!
//! #[async_trait::async_trait]
//! impl ChainBackend for DevnetBackend {
//!     fn name(&self) -> &str {
//!         "devnet"
//!     }
//!
//!     async fn broadcast(&self, _tx: &SignedTransaction) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     async fn status(&self, _id: &TxId) -> Result<TxStatus> {
//!         Ok(TxStatus::Finalized)
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::aggregator::{
    ClaimRequest, CrossChainQuoteRequest, CrossChainTransferRequest, Quote, RedeemRequest,
    SwapInstructionRequest, SwapQuoteRequest, TransactionPayload,
};
use crate::error::Result;
use crate::protocol::{DomainId, MessagesResponse};
use crate::submit::{FreshnessAnchor, SignedTransaction, TxId, TxStatus};

/// Chain-specific half of the submission loop.
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Transactions that never land
/// - Slippage and revert failures
/// - Blockhash expiry racing confirmation
/// - Flaky status lookups
#[async_trait]
pub trait ChainBackend: Send + Sync {
    /// Short label used in logs and spans.
    fn name(&self) -> &str;

    /// Sends the signed bytes to the node without simulation.
    ///
    /// Sending bytes the node has already seen must be harmless.
    ///
    /// # Errors
    ///
    /// [`RelayError::InvalidTransaction`](crate::RelayError::InvalidTransaction)
    /// when the node refuses the bytes themselves; anything else is treated
    /// as transient by the submitter.
    async fn broadcast(&self, tx: &SignedTransaction) -> Result<()>;

    /// Current status of the transaction.
    async fn status(&self, id: &TxId) -> Result<TxStatus>;

    /// Whether the transaction can no longer be included. Chains without a
    /// freshness anchor keep the default.
    async fn anchor_expired(&self, _anchor: &FreshnessAnchor) -> Result<bool> {
        Ok(false)
    }
}

/// Trait for the attestation service.
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Rate limiting (429 responses)
/// - Burn not yet indexed (404)
/// - Pending → Complete progressions
/// - Failed attestations
#[async_trait]
pub trait AttestationProvider: Send + Sync {
    /// Looks up the messages a burn transaction emitted on `domain`.
    ///
    /// # Errors
    ///
    /// [`RelayError::AttestationNotFound`](crate::RelayError::AttestationNotFound)
    /// while the service has not indexed the burn,
    /// [`RelayError::RateLimitExceeded`](crate::RelayError::RateLimitExceeded)
    /// on 429.
    async fn get_messages(&self, domain: DomainId, tx_hash: &TxId) -> Result<MessagesResponse>;
}

/// Signs a payload returned by the swap API.
///
/// Key handling stays with the implementor; the crate only sees the signed
/// bytes and the address to put into API requests.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Address in the chain's native format.
    fn address(&self) -> String;

    async fn sign(&self, payload: &TransactionPayload) -> Result<SignedTransaction>;
}

/// The swap-aggregation HTTP API.
#[async_trait]
pub trait SwapApi: Send + Sync {
    async fn swap_quote(&self, request: &SwapQuoteRequest) -> Result<Quote>;

    async fn swap_instruction(&self, request: &SwapInstructionRequest)
        -> Result<TransactionPayload>;

    async fn cross_chain_quote(&self, request: &CrossChainQuoteRequest) -> Result<Quote>;

    /// Burn transaction on the source chain.
    async fn cross_chain_transfer(
        &self,
        request: &CrossChainTransferRequest,
    ) -> Result<TransactionPayload>;

    /// Mint transaction on the destination chain.
    async fn claim(&self, request: &ClaimRequest) -> Result<TransactionPayload>;

    /// Swap out of USDC on the destination chain after the claim.
    async fn redeem(&self, request: &RedeemRequest) -> Result<TransactionPayload>;
}
