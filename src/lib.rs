// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! # swap-relay-rs
//!
//! Submission and confirmation of swap-aggregator transactions on Solana,
//! Aptos and EVM chains, plus the Circle attestation polling that joins the
//! two halves of a cross-chain transfer.
//!
//! The aggregator API hands out unsigned transactions. This crate signs them
//! through a [`TransactionSigner`], broadcasts them, keeps rebroadcasting
//! while it polls for status, and reports one of a small set of outcomes:
//! confirmed, rejected by the network, expired, or timed out.
//!
//! ## Submitting a signed transaction
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use swap_relay_rs::{Commitment, SignedTransaction, SolanaBackend, SubmitConfig, Submitter};
//!
//! # async fn example(raw: Vec<u8>) -> swap_relay_rs::Result<()> {
//! let backend = SolanaBackend::builder()
//!     .rpc_url("https://api.mainnet-beta.solana.com")
//!     .build();
//! let submitter = Submitter::new(
//!     Arc::new(backend),
//!     SubmitConfig::default().with_commitment(Commitment::Finalized),
//! );
//!
//! let signature = submitter
//!     .submit_and_confirm(SignedTransaction::solana(raw)?)
//!     .await?;
//! println!("finalized: {signature}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Waiting for an attestation
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use swap_relay_rs::{AttestationPoller, IrisAttestationProvider, PollingConfig, Chain, TxId};
//!
//! # async fn example() -> swap_relay_rs::Result<()> {
//! let poller = AttestationPoller::new(
//!     Arc::new(IrisAttestationProvider::production()),
//!     PollingConfig::fast(),
//! );
//! let burn = TxId::new("0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef");
//! let record = poller
//!     .await_attestation(Chain::Ethereum.cctp_domain(), &burn)
//!     .await?;
//! println!("attestation is {} bytes", record.attestation.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Flows
//!
//! [`SwapFlow`] and [`BridgeFlow`] chain quote, instruction, signing and
//! submission into one call. A failing leg is reported as
//! [`RelayError::LegFailed`] with the last transaction that did land.
//!
//! ## Public API
//!
//! - [`Submitter`], [`SubmitConfig`] and [`SignedTransaction`] - broadcast and confirmation
//! - [`SolanaBackend`], [`AptosBackend`] and [`EvmBackend`] - chain access behind [`ChainBackend`]
//! - [`AttestationPoller`] and [`IrisAttestationProvider`] - attestation retrieval
//! - [`SwapApiClient`] - the aggregator HTTP API behind [`SwapApi`]
//! - [`SwapFlow`] and [`BridgeFlow`] - multi-leg orchestration
//! - [`RelayError`] and [`Result`] - error types
//! - [`testing`] - scriptable fakes of every trait

mod aggregator;
mod attestation;
mod backends;
mod chain;
mod error;
mod flow;
mod protocol;
mod submit;
mod traits;

pub use aggregator::{
    AptosPayload, ClaimRequest, CrossChainQuoteRequest, CrossChainTransferRequest, EvmPayload,
    Quote, RedeemRequest, SolanaPayload, SwapApiClient, SwapInstructionRequest, SwapQuoteRequest,
    TransactionPayload, SWAP_API_KEY_ENV, SWAP_API_URL_ENV,
};
pub use attestation::{
    AttestationPoller, PollingConfig, DEFAULT_RATE_LIMIT_BACKOFF_SECS, IRIS_API,
    IRIS_API_SANDBOX, MESSAGES_PATH_V1,
};
pub use backends::{
    estimate_gas_with_buffer, AptosBackend, EvmBackend, EvmSigner, IrisAttestationProvider,
    SolanaBackend, DEFAULT_FINALITY_DEPTH, DEFAULT_GAS_BUFFER_PERCENT,
    SLIPPAGE_TOLERANCE_EXCEEDED,
};
pub use chain::{Chain, ChainFamily};
pub use error::{RelayError, Result};
pub use flow::{BridgeFlow, BridgeOutcome, Leg, SwapFlow, SwapOutcome, DEFAULT_MAX_REFETCHES};
pub use protocol::{
    AttestationRecord, AttestationStatus, AttestedMessage, DomainId, InvalidDomainId,
    MessagesResponse,
};
pub use submit::{
    Commitment, FreshnessAnchor, Rejection, SignedTransaction, SubmitConfig, Submitter, TxId,
    TxStatus,
};
pub use traits::{AttestationProvider, ChainBackend, SwapApi, TransactionSigner};

// Public module for advanced users who need custom instrumentation
pub mod spans;

pub mod testing;
