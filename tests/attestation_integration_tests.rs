// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for attestation polling, against the fake provider with
//! a paused clock and against the Iris client over a mock HTTP server.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Bytes;
use rstest::rstest;
use serde_json::json;
use swap_relay_rs::testing::{AttestationReply, FakeAttestationProvider};
use swap_relay_rs::{
    AttestationPoller, AttestationRecord, Chain, DomainId, IrisAttestationProvider,
    PollingConfig, RelayError, TxId,
};
use tokio::time::Instant;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn record() -> AttestationRecord {
    AttestationRecord {
        message: Bytes::from_static(&[0x00, 0x00, 0x00, 0x01, 0xca, 0xfe]),
        attestation: Bytes::from_static(&[0x51; 65]),
    }
}

fn poller(provider: &Arc<FakeAttestationProvider>) -> AttestationPoller<FakeAttestationProvider> {
    AttestationPoller::new(
        Arc::clone(provider),
        PollingConfig::default()
            .with_max_attempts(10)
            .with_poll_interval_secs(5),
    )
}

#[rstest]
#[case::immediately(0)]
#[case::after_one(1)]
#[case::after_several(4)]
#[tokio::test(start_paused = true)]
async fn test_pending_then_ready(#[case] pending: usize) {
    let provider = Arc::new(FakeAttestationProvider::new());
    provider.ready_after(pending, record());
    let burn = TxId::new("0xburn");

    let start = Instant::now();
    let got = poller(&provider)
        .await_attestation(DomainId::Ethereum, &burn)
        .await
        .unwrap();

    assert_eq!(got, record(), "payload is returned unchanged");
    assert_eq!(provider.call_count(), pending + 1);
    assert_eq!(start.elapsed(), Duration::from_secs(5 * pending as u64));
    assert!(provider
        .queries()
        .iter()
        .all(|query| query == &(DomainId::Ethereum, burn.clone())));
}

#[tokio::test(start_paused = true)]
async fn test_not_found_then_timeout() {
    let provider = Arc::new(FakeAttestationProvider::new());
    provider.push_reply(AttestationReply::NotFound);

    let err = poller(&provider)
        .await_attestation(Chain::Base.cctp_domain(), &TxId::new("0xburn"))
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::AttestationTimeout));
    assert_eq!(provider.call_count(), 10);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_then_ready() {
    let provider = Arc::new(FakeAttestationProvider::new());
    provider.push_reply(AttestationReply::RateLimited {
        retry_after_seconds: 300,
    });
    provider.push_reply(AttestationReply::Pending);
    provider.push_reply(AttestationReply::Ready(record()));

    let start = Instant::now();
    let got = poller(&provider)
        .await_attestation(DomainId::Arbitrum, &TxId::new("0xburn"))
        .await
        .unwrap();

    assert_eq!(got, record());
    assert_eq!(start.elapsed(), Duration::from_secs(300 + 5));
}

#[tokio::test(start_paused = true)]
async fn test_failed_attestation_stops_polling() {
    let provider = Arc::new(FakeAttestationProvider::new());
    provider.push_reply(AttestationReply::Pending);
    provider.push_reply(AttestationReply::Failed);

    let err = poller(&provider)
        .await_attestation(DomainId::Solana, &TxId::new("5burn"))
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::AttestationFailed { .. }));
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn test_iris_pending_then_complete() {
    let server = MockServer::start().await;
    let burn = "0x7bc1a1cd0aa29fd1b4d3bb8cdb5d6c0bbb2be2a3b2ef7f0c9a69e08a0e1f2a3b";
    let url_path = format!("/v1/messages/0/{burn}");

    Mock::given(method("GET"))
        .and(path(url_path.as_str()))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "Not found" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(url_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{
                "attestation": "PENDING",
                "message": "0x000000010000",
                "eventNonce": "9682",
                "status": "pending_confirmations"
            }]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(url_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{
                "attestation": "0x1234abcd",
                "message": "0x000000010000",
                "eventNonce": "9682",
                "status": "complete"
            }]
        })))
        .mount(&server)
        .await;

    let poller = AttestationPoller::new(
        Arc::new(IrisAttestationProvider::new(server.uri())),
        PollingConfig::default()
            .with_max_attempts(5)
            .with_poll_interval_secs(1),
    );
    let got = poller
        .await_attestation(DomainId::Ethereum, &TxId::new(burn))
        .await
        .unwrap();

    assert_eq!(got.attestation.to_vec(), vec![0x12, 0x34, 0xab, 0xcd]);
    assert_eq!(got.message.to_vec(), vec![0x00, 0x00, 0x00, 0x01, 0x00, 0x00]);
}

#[tokio::test]
async fn test_iris_server_error_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{ "attestation": "0xaa", "message": "0xbb" }]
        })))
        .mount(&server)
        .await;

    let poller = AttestationPoller::new(
        Arc::new(IrisAttestationProvider::new(server.uri())),
        PollingConfig::default()
            .with_max_attempts(3)
            .with_poll_interval_secs(1),
    );
    let got = poller
        .await_attestation(DomainId::Avalanche, &TxId::new("0xburn"))
        .await
        .unwrap();

    assert_eq!(got.attestation.to_vec(), vec![0xaa]);
}
