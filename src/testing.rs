// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Fake implementations of every seam in [`crate::traits`].
//!
//! The fakes are scripted up front and count every call, so tests can assert
//! on how the loops behave (how many broadcasts, how many lookups) without a
//! node or an HTTP server. Combine them with `#[tokio::test(start_paused = true)]`
//! to run multi-minute polling budgets instantly.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use alloy_primitives::Bytes;
use async_trait::async_trait;
use solana_sdk::{
    hash::Hash,
    message::{Message, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};

use crate::aggregator::{
    ClaimRequest, CrossChainQuoteRequest, CrossChainTransferRequest, Quote, RedeemRequest,
    SwapInstructionRequest, SwapQuoteRequest, TransactionPayload,
};
use crate::protocol::{
    AttestationRecord, AttestationStatus, AttestedMessage, DomainId, MessagesResponse,
};
use crate::submit::{FreshnessAnchor, SignedTransaction, TxId, TxStatus};
use crate::traits::{AttestationProvider, ChainBackend, SwapApi, TransactionSigner};
use crate::{RelayError, Result};

// ============================================================================
// Fake Chain Backend
// ============================================================================

/// One call made on a [`FakeChainBackend`], in the order it was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainCall {
    Broadcast,
    Status,
    AnchorCheck,
}

#[derive(Debug, Default)]
struct ChainState {
    calls: Vec<ChainCall>,
    statuses: VecDeque<std::result::Result<TxStatus, String>>,
    fallback: Option<std::result::Result<TxStatus, String>>,
    refusal: Option<String>,
    invalid: Option<String>,
    fail_next_broadcast: Option<String>,
    anchor_valid_checks: Option<usize>,
    broadcasts: Vec<Bytes>,
    status_checks: usize,
    anchor_checks: usize,
}

/// A fake chain that replays scripted statuses.
///
/// Scripted statuses are returned in order; once they run out the fallback
/// (by default [`TxStatus::NotFound`]) repeats forever.
///
/// This allows testing scenarios like:
/// - Transaction that never lands
/// - Processed → Confirmed → Finalized progressions
/// - On-chain failures
/// - Anchor expiry before or after landing
#[derive(Clone, Debug, Default)]
pub struct FakeChainBackend {
    state: Arc<Mutex<ChainState>>,
}

impl FakeChainBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next status lookup result
    pub fn push_status(&self, status: TxStatus) {
        self.state.lock().unwrap().statuses.push_back(Ok(status));
    }

    /// Queue a failing status lookup
    pub fn push_status_error(&self, message: &str) {
        self.state
            .lock()
            .unwrap()
            .statuses
            .push_back(Err(message.to_string()));
    }

    /// Status returned once the script is exhausted
    pub fn set_fallback_status(&self, status: TxStatus) {
        self.state.lock().unwrap().fallback = Some(Ok(status));
    }

    /// Make every unscripted status lookup fail
    pub fn fail_status_lookups(&self, message: &str) {
        self.state.lock().unwrap().fallback = Some(Err(message.to_string()));
    }

    /// Every broadcast is counted, then answered with a transient error
    pub fn refuse_broadcasts(&self, message: &str) {
        self.state.lock().unwrap().refusal = Some(message.to_string());
    }

    /// Every broadcast is answered with [`RelayError::InvalidTransaction`]
    pub fn reject_broadcasts_as_invalid(&self, reason: &str) {
        self.state.lock().unwrap().invalid = Some(reason.to_string());
    }

    /// Only the next broadcast fails, with a transient error
    pub fn fail_next_broadcast(&self, message: &str) {
        self.state.lock().unwrap().fail_next_broadcast = Some(message.to_string());
    }

    /// The anchor reads as valid for `checks` checks, then as expired
    pub fn expire_anchor_after(&self, checks: usize) {
        self.state.lock().unwrap().anchor_valid_checks = Some(checks);
    }

    pub fn broadcast_count(&self) -> usize {
        self.state.lock().unwrap().broadcasts.len()
    }

    /// Bytes of every broadcast, in order
    pub fn broadcasts(&self) -> Vec<Bytes> {
        self.state.lock().unwrap().broadcasts.clone()
    }

    pub fn status_count(&self) -> usize {
        self.state.lock().unwrap().status_checks
    }

    pub fn anchor_check_count(&self) -> usize {
        self.state.lock().unwrap().anchor_checks
    }

    /// Every call in the order it reached the fake
    pub fn calls(&self) -> Vec<ChainCall> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl ChainBackend for FakeChainBackend {
    fn name(&self) -> &str {
        "fake"
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ChainCall::Broadcast);
        state.broadcasts.push(tx.bytes().clone());

        if let Some(reason) = &state.invalid {
            return Err(RelayError::InvalidTransaction {
                reason: reason.clone(),
            });
        }
        if let Some(message) = state.fail_next_broadcast.take() {
            return Err(RelayError::Transient(message));
        }
        match &state.refusal {
            Some(message) => Err(RelayError::Transient(message.clone())),
            None => Ok(()),
        }
    }

    async fn status(&self, _id: &TxId) -> Result<TxStatus> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ChainCall::Status);
        state.status_checks += 1;

        let next = match state.statuses.pop_front() {
            Some(next) => next,
            None => state.fallback.clone().unwrap_or(Ok(TxStatus::NotFound)),
        };
        next.map_err(RelayError::Transient)
    }

    async fn anchor_expired(&self, _anchor: &FreshnessAnchor) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(ChainCall::AnchorCheck);
        state.anchor_checks += 1;
        let checks = state.anchor_checks;
        Ok(state.anchor_valid_checks.is_some_and(|valid| checks > valid))
    }
}

// ============================================================================
// Fake Attestation Provider
// ============================================================================

/// One scripted answer of [`FakeAttestationProvider`]
#[derive(Debug, Clone)]
pub enum AttestationReply {
    /// 404 from the service
    NotFound,
    /// Message known, attestation still `"PENDING"`
    Pending,
    RateLimited { retry_after_seconds: u64 },
    Failed,
    Ready(AttestationRecord),
}

impl AttestationReply {
    fn into_response(self) -> Result<MessagesResponse> {
        let message = |status: AttestationStatus, record: Option<AttestationRecord>| MessagesResponse {
            messages: vec![AttestedMessage {
                status: Some(status),
                message: Some(
                    record
                        .as_ref()
                        .map(|r| r.message.clone())
                        .unwrap_or_else(|| Bytes::from_static(&[0xde, 0xad])),
                ),
                attestation: record.map(|r| r.attestation),
                event_nonce: Some("1".to_string()),
            }],
        };

        match self {
            Self::NotFound => Err(RelayError::AttestationNotFound),
            Self::Pending => Ok(message(AttestationStatus::Pending, None)),
            Self::RateLimited {
                retry_after_seconds,
            } => Err(RelayError::RateLimitExceeded {
                retry_after_seconds,
            }),
            Self::Failed => Ok(message(AttestationStatus::Failed, None)),
            Self::Ready(record) => Ok(message(AttestationStatus::Complete, Some(record))),
        }
    }
}

/// A fake attestation service replaying a sequence of replies.
///
/// The last reply repeats once the sequence is exhausted; an empty script
/// answers 404 forever.
#[derive(Clone, Debug, Default)]
pub struct FakeAttestationProvider {
    replies: Arc<Mutex<VecDeque<AttestationReply>>>,
    last: Arc<Mutex<Option<AttestationReply>>>,
    queries: Arc<Mutex<Vec<(DomainId, TxId)>>>,
}

impl FakeAttestationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, reply: AttestationReply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    /// `pending` pending replies, then the record
    pub fn ready_after(&self, pending: usize, record: AttestationRecord) {
        for _ in 0..pending {
            self.push_reply(AttestationReply::Pending);
        }
        self.push_reply(AttestationReply::Ready(record));
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    /// Every `(domain, tx hash)` the provider was asked about, in order
    pub fn queries(&self) -> Vec<(DomainId, TxId)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AttestationProvider for FakeAttestationProvider {
    async fn get_messages(&self, domain: DomainId, tx_hash: &TxId) -> Result<MessagesResponse> {
        self.queries.lock().unwrap().push((domain, tx_hash.clone()));

        let mut last = self.last.lock().unwrap();
        let reply = match self.replies.lock().unwrap().pop_front() {
            Some(reply) => {
                *last = Some(reply.clone());
                reply
            }
            None => last.clone().unwrap_or(AttestationReply::NotFound),
        };
        reply.into_response()
    }
}

// ============================================================================
// Fake Signer
// ============================================================================

/// Signs by wrapping the payload's JSON in a [`SignedTransaction`].
///
/// Ids are `"{prefix}-{n}"`, counting from 1, so re-signed payloads get a new
/// id just like a fresh blockhash would give on a real chain.
#[derive(Clone, Debug)]
pub struct FakeSigner {
    address: String,
    prefix: String,
    signed: Arc<Mutex<Vec<TransactionPayload>>>,
}

impl FakeSigner {
    pub fn new(address: &str, prefix: &str) -> Self {
        Self {
            address: address.to_string(),
            prefix: prefix.to_string(),
            signed: Arc::default(),
        }
    }

    pub fn sign_count(&self) -> usize {
        self.signed.lock().unwrap().len()
    }

    pub fn signed_payloads(&self) -> Vec<TransactionPayload> {
        self.signed.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionSigner for FakeSigner {
    fn address(&self) -> String {
        self.address.clone()
    }

    async fn sign(&self, payload: &TransactionPayload) -> Result<SignedTransaction> {
        let mut signed = self.signed.lock().unwrap();
        signed.push(payload.clone());
        let bytes = serde_json::to_vec(payload)?;
        let id = TxId::new(format!("{}-{}", self.prefix, signed.len()));
        Ok(SignedTransaction::new(bytes, id))
    }
}

// ============================================================================
// Fake Swap API
// ============================================================================

#[derive(Debug, Default)]
struct ApiState {
    quote: Option<Quote>,
    payloads: VecDeque<TransactionPayload>,
    calls: Vec<String>,
    claims: Vec<ClaimRequest>,
    redeems: Vec<RedeemRequest>,
}

/// A fake swap API that answers every quote with one configured quote and
/// every instruction endpoint with the next queued payload.
///
/// Calls are recorded by endpoint name (`"swap_quote"`, `"claim"`, ...).
#[derive(Clone, Debug, Default)]
pub struct FakeSwapApi {
    state: Arc<Mutex<ApiState>>,
}

impl FakeSwapApi {
    pub fn new(quote: Quote) -> Self {
        let api = Self::default();
        api.state.lock().unwrap().quote = Some(quote);
        api
    }

    pub fn push_payload(&self, payload: TransactionPayload) {
        self.state.lock().unwrap().payloads.push_back(payload);
    }

    /// Endpoint names in call order
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn claims(&self) -> Vec<ClaimRequest> {
        self.state.lock().unwrap().claims.clone()
    }

    pub fn redeems(&self) -> Vec<RedeemRequest> {
        self.state.lock().unwrap().redeems.clone()
    }

    fn quote(&self, endpoint: &str) -> Result<Quote> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(endpoint.to_string());
        state.quote.clone().ok_or_else(|| RelayError::Api {
            status: 404,
            body: "no route".to_string(),
        })
    }

    fn payload(&self, endpoint: &str) -> Result<TransactionPayload> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(endpoint.to_string());
        state.payloads.pop_front().ok_or_else(|| RelayError::Api {
            status: 500,
            body: format!("no payload queued for {endpoint}"),
        })
    }
}

#[async_trait]
impl SwapApi for FakeSwapApi {
    async fn swap_quote(&self, _request: &SwapQuoteRequest) -> Result<Quote> {
        self.quote("swap_quote")
    }

    async fn swap_instruction(
        &self,
        _request: &SwapInstructionRequest,
    ) -> Result<TransactionPayload> {
        self.payload("swap_instruction")
    }

    async fn cross_chain_quote(&self, _request: &CrossChainQuoteRequest) -> Result<Quote> {
        self.quote("cross_chain_quote")
    }

    async fn cross_chain_transfer(
        &self,
        _request: &CrossChainTransferRequest,
    ) -> Result<TransactionPayload> {
        self.payload("cross_chain_transfer")
    }

    async fn claim(&self, request: &ClaimRequest) -> Result<TransactionPayload> {
        self.state.lock().unwrap().claims.push(request.clone());
        self.payload("claim")
    }

    async fn redeem(&self, request: &RedeemRequest) -> Result<TransactionPayload> {
        self.state.lock().unwrap().redeems.push(request.clone());
        self.payload("redeem")
    }
}

// ============================================================================
// Solana wire transactions
// ============================================================================

/// A bincode-encoded legacy Solana transaction with one (unverified)
/// signature, an empty instruction list and the given recent blockhash.
///
/// Enough for [`SignedTransaction::solana`] and for a mocked RPC node; it
/// would not pass signature verification on a real cluster.
pub fn solana_wire_transaction(signature: [u8; 64], blockhash: [u8; 32]) -> Vec<u8> {
    let payer = Pubkey::new_from_array([7u8; 32]);
    let message = Message::new_with_blockhash(&[], Some(&payer), &Hash::new_from_array(blockhash));
    let tx = VersionedTransaction {
        signatures: vec![Signature::from(signature)],
        message: VersionedMessage::Legacy(message),
    };
    bincode::serialize(&tx).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_chain_replays_script_then_fallback() {
        let backend = FakeChainBackend::new();
        backend.push_status(TxStatus::Processed);
        backend.push_status_error("node unavailable");

        let id = TxId::new("sig");
        assert_eq!(backend.status(&id).await.unwrap(), TxStatus::Processed);
        assert!(backend.status(&id).await.is_err());
        assert_eq!(backend.status(&id).await.unwrap(), TxStatus::NotFound);
        assert_eq!(backend.status_count(), 3);
    }

    #[tokio::test]
    async fn test_fake_chain_records_call_order() {
        let backend = FakeChainBackend::new();
        let tx = SignedTransaction::new(vec![1], TxId::new("sig"));
        backend.broadcast(&tx).await.unwrap();
        backend.status(tx.id()).await.unwrap();
        backend
            .anchor_expired(&FreshnessAnchor::ExpiresAt { unix_secs: 1 })
            .await
            .unwrap();

        assert_eq!(
            backend.calls(),
            [ChainCall::Broadcast, ChainCall::Status, ChainCall::AnchorCheck]
        );
    }

    #[tokio::test]
    async fn test_fake_chain_anchor_expiry() {
        let backend = FakeChainBackend::new();
        let anchor = FreshnessAnchor::BlockHeight { last_valid: 10 };
        assert!(!backend.anchor_expired(&anchor).await.unwrap());

        backend.expire_anchor_after(1);
        // the check above already counted
        assert!(backend.anchor_expired(&anchor).await.unwrap());
        assert_eq!(backend.anchor_check_count(), 2);
    }

    #[tokio::test]
    async fn test_fake_attestation_sequence_repeats_last() {
        let provider = FakeAttestationProvider::new();
        let record = AttestationRecord {
            message: Bytes::from_static(&[1]),
            attestation: Bytes::from_static(&[2]),
        };
        provider.ready_after(1, record.clone());

        let tx = TxId::new("0xburn");
        let first = provider.get_messages(DomainId::Base, &tx).await.unwrap();
        assert!(first.first_ready().is_none());

        for _ in 0..2 {
            let ready = provider.get_messages(DomainId::Base, &tx).await.unwrap();
            assert_eq!(ready.first_ready(), Some(record.clone()));
        }
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fake_attestation_empty_script_is_not_found() {
        let provider = FakeAttestationProvider::new();
        let result = provider.get_messages(DomainId::Solana, &TxId::new("x")).await;
        assert!(matches!(result, Err(RelayError::AttestationNotFound)));
    }
}
