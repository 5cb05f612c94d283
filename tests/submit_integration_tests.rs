// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for broadcast and confirmation using the fake backend
//! and tokio's paused clock.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use swap_relay_rs::testing::{solana_wire_transaction, ChainCall, FakeChainBackend};
use swap_relay_rs::{
    Commitment, FreshnessAnchor, RelayError, Rejection, SignedTransaction, SolanaBackend,
    SubmitConfig, Submitter, TxId, TxStatus,
};
use tokio::time::sleep;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn signed(id: &str) -> SignedTransaction {
    SignedTransaction::new(vec![0xab; 32], TxId::new(id))
}

fn submitter(backend: &Arc<FakeChainBackend>, config: SubmitConfig) -> Submitter<FakeChainBackend> {
    Submitter::new(Arc::clone(backend), config)
}

fn slippage() -> TxStatus {
    TxStatus::Failed(Rejection::SlippageExceeded {
        detail: "custom program error 6001".to_string(),
    })
}

/// Fresh single-threaded runtime on a paused clock.
///
/// Poll and re-broadcast timers share a deadline under the default schedule,
/// so tests that care about their ordering repeat on new runtimes.
fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

/// Calls recorded after the final status check.
fn calls_after_last_status(calls: &[ChainCall]) -> &[ChainCall] {
    let last = calls
        .iter()
        .rposition(|call| *call == ChainCall::Status)
        .expect("at least one status check");
    &calls[last + 1..]
}

#[tokio::test(start_paused = true)]
async fn test_finalized_returns_id_and_stops_broadcasting() {
    let backend = Arc::new(FakeChainBackend::new());
    backend.push_status(TxStatus::NotFound);
    backend.push_status(TxStatus::Processed);
    backend.push_status(TxStatus::Finalized);

    let id = submitter(
        &backend,
        SubmitConfig::default().with_commitment(Commitment::Finalized),
    )
    .submit_and_confirm(signed("sig-final"))
    .await
    .unwrap();

    assert_eq!(id, TxId::new("sig-final"));
    assert_eq!(backend.status_count(), 3);

    let sent = backend.broadcast_count();
    assert!(sent >= 1, "initial broadcast must happen");
    sleep(Duration::from_secs(30)).await;
    assert_eq!(
        backend.broadcast_count(),
        sent,
        "no broadcast after submit_and_confirm returned"
    );
}

#[tokio::test(start_paused = true)]
async fn test_every_broadcast_sends_identical_bytes() {
    let backend = Arc::new(FakeChainBackend::new());
    backend.push_status(TxStatus::NotFound);
    backend.push_status(TxStatus::NotFound);
    backend.push_status(TxStatus::Confirmed);

    submitter(
        &backend,
        SubmitConfig::default().with_rebroadcast_interval(Some(Duration::from_millis(500))),
    )
    .submit_and_confirm(signed("sig"))
    .await
    .unwrap();

    let broadcasts = backend.broadcasts();
    assert!(broadcasts.len() > 1);
    assert!(broadcasts.iter().all(|bytes| bytes == &broadcasts[0]));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_anchor_is_expired_not_timeout() {
    let backend = Arc::new(FakeChainBackend::new());
    backend.expire_anchor_after(2);

    let tx = signed("sig-stale").with_anchor(FreshnessAnchor::BlockHeight { last_valid: 500 });
    let err = submitter(&backend, SubmitConfig::default())
        .submit_and_confirm(tx)
        .await
        .unwrap_err();

    assert!(
        matches!(&err, RelayError::Expired { id } if id == &TxId::new("sig-stale")),
        "expected Expired, got {err:?}"
    );
    assert_eq!(backend.anchor_check_count(), 3);
    assert!(!err.is_retryable());
}

#[tokio::test(start_paused = true)]
async fn test_expiry_on_last_attempt_wins_over_timeout() {
    let backend = Arc::new(FakeChainBackend::new());
    backend.expire_anchor_after(0);

    let tx = signed("sig").with_anchor(FreshnessAnchor::Blockhash("11111111".to_string()));
    let err = submitter(&backend, SubmitConfig::default().with_max_attempts(1))
        .submit_and_confirm(tx)
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::Expired { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_slippage_fails_immediately_without_more_broadcasts() {
    let backend = Arc::new(FakeChainBackend::new());
    backend.push_status(slippage());

    let err = submitter(&backend, SubmitConfig::default())
        .submit_and_confirm(signed("sig-slip"))
        .await
        .unwrap_err();

    assert!(err.is_slippage());
    assert!(matches!(err, RelayError::RejectedByNetwork { .. }));
    assert_eq!(backend.status_count(), 1);

    sleep(Duration::from_secs(60)).await;
    assert_eq!(backend.broadcast_count(), 1);
    assert_eq!(backend.calls(), [ChainCall::Broadcast, ChainCall::Status]);
}

#[test]
fn test_no_broadcast_after_slippage_under_default_schedule() {
    for run in 0..200 {
        let backend = Arc::new(FakeChainBackend::new());
        backend.set_fallback_status(slippage());

        paused_runtime().block_on(async {
            let err = submitter(&backend, SubmitConfig::default())
                .submit_and_confirm(signed("sig-slip"))
                .await
                .unwrap_err();
            assert!(err.is_slippage());
            sleep(Duration::from_secs(10)).await;
        });

        let calls = backend.calls();
        assert!(
            calls_after_last_status(&calls).is_empty(),
            "run {run}: broadcast after the slippage verdict: {calls:?}"
        );
        assert_eq!(backend.broadcast_count(), 1, "run {run}: {calls:?}");
    }
}

#[test]
fn test_two_attempt_budget_under_default_schedule() {
    for run in 0..200 {
        let backend = Arc::new(FakeChainBackend::new());
        backend.fail_status_lookups("node is behind");

        paused_runtime().block_on(async {
            let err = submitter(&backend, SubmitConfig::default().with_max_attempts(2))
                .submit_and_confirm(signed("sig-lost"))
                .await
                .unwrap_err();
            assert!(matches!(err, RelayError::Timeout { attempts: 2, .. }));
            sleep(Duration::from_secs(10)).await;
        });

        let calls = backend.calls();
        // initial send, then one re-broadcast after the first check at 2s
        assert_eq!(
            calls,
            [
                ChainCall::Broadcast,
                ChainCall::Status,
                ChainCall::Broadcast,
                ChainCall::Status
            ],
            "run {run}"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_refused_rebroadcasts_after_landing_are_harmless() {
    let backend = Arc::new(FakeChainBackend::new());
    // every send is answered "already processed" once the tx is in a block
    backend.refuse_broadcasts("This transaction has already been processed");
    backend.push_status(TxStatus::Processed);
    backend.push_status(TxStatus::Confirmed);
    backend.push_status(TxStatus::Finalized);

    let id = submitter(
        &backend,
        SubmitConfig::default()
            .with_commitment(Commitment::Finalized)
            .with_rebroadcast_interval(Some(Duration::from_secs(1))),
    )
    .submit_and_confirm(signed("sig-landed"))
    .await
    .unwrap();

    assert_eq!(id, TxId::new("sig-landed"));
    assert!(backend.broadcast_count() > 1);
}

#[tokio::test(start_paused = true)]
async fn test_status_errors_exhaust_budget_with_exact_broadcasts() {
    let backend = Arc::new(FakeChainBackend::new());
    backend.fail_status_lookups("node is behind");

    let config = SubmitConfig::default()
        .with_max_attempts(2)
        .with_poll_interval(Duration::from_secs(2))
        .with_rebroadcast_interval(Some(Duration::from_secs(3)));
    let err = submitter(&backend, config)
        .submit_and_confirm(signed("sig-lost"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RelayError::Timeout { attempts: 2, .. }
    ));
    // initial send at 0s and one re-broadcast at 3s, polling ends at 4s
    assert_eq!(backend.broadcast_count(), 2);
    assert_eq!(backend.status_count(), 2);

    sleep(Duration::from_secs(30)).await;
    assert_eq!(backend.broadcast_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_status_error_then_confirmed_succeeds() {
    let backend = Arc::new(FakeChainBackend::new());
    backend.push_status_error("connection reset");
    backend.push_status(TxStatus::Confirmed);

    let id = submitter(&backend, SubmitConfig::default())
        .submit_and_confirm(signed("sig-ok"))
        .await
        .unwrap();

    assert_eq!(id, TxId::new("sig-ok"));
    assert_eq!(backend.status_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_submitter_is_reusable_across_transactions() {
    let backend = Arc::new(FakeChainBackend::new());
    backend.set_fallback_status(TxStatus::Confirmed);
    let submitter = submitter(&backend, SubmitConfig::default().with_rebroadcast_interval(None));

    let (a, b) = tokio::join!(
        submitter.submit_and_confirm(signed("sig-a")),
        submitter.submit_and_confirm(signed("sig-b")),
    );

    assert_eq!(a.unwrap(), TxId::new("sig-a"));
    assert_eq!(b.unwrap(), TxId::new("sig-b"));
    assert_eq!(backend.broadcast_count(), 2);
}

#[tokio::test]
async fn test_solana_backend_end_to_end() {
    let tx = SignedTransaction::solana(solana_wire_transaction([5u8; 64], [8u8; 32])).unwrap();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "getVersion" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": { "solana-core": "3.0.0", "feature-set": 1 }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "sendTransaction" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "jsonrpc": "2.0", "id": 1, "result": tx.id().as_str() }),
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "getSignatureStatuses" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "context": { "slot": 80 },
                "value": [{
                    "slot": 72,
                    "confirmations": 10,
                    "err": null,
                    "status": { "Ok": null },
                    "confirmationStatus": "confirmed"
                }]
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "getBlockHeight" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": 1_000 })),
        )
        .mount(&server)
        .await;

    let backend = SolanaBackend::builder().rpc_url(server.uri()).build();
    let config = SubmitConfig::default()
        .with_poll_interval(Duration::from_millis(10))
        .with_rebroadcast_interval(None);

    let expected = tx.id().clone();
    let tx = tx.with_anchor(FreshnessAnchor::BlockHeight { last_valid: 2_000 });
    let id = Submitter::new(Arc::new(backend), config)
        .submit_and_confirm(tx)
        .await
        .unwrap();

    assert_eq!(id, expected);
}
