// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end swap and bridge flows: the HTTP client against a mock API,
//! the chains and the attestation service as fakes.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Bytes;
use serde_json::json;
use swap_relay_rs::testing::{
    AttestationReply, FakeAttestationProvider, FakeChainBackend, FakeSigner, FakeSwapApi,
};
use swap_relay_rs::{
    AttestationPoller, AttestationProvider, AttestationRecord, BridgeFlow, Chain, ChainBackend,
    CrossChainQuoteRequest, Leg, PollingConfig, Quote, RelayError, SolanaPayload, SubmitConfig,
    Submitter, SwapApiClient, SwapFlow, SwapQuoteRequest, TransactionPayload, TxId, TxStatus,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_submit() -> SubmitConfig {
    SubmitConfig::default()
        .with_poll_interval(Duration::from_millis(10))
        .with_rebroadcast_interval(None)
}

fn solana_payload() -> TransactionPayload {
    TransactionPayload::Solana(SolanaPayload {
        serialized_tx: "AQID".to_string(),
        last_valid_block_height: Some(250_000_000),
    })
}

#[tokio::test]
async fn test_swap_through_http_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/swapQuote"))
        .and(header("x-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quoteId": "q-42",
            "expectedOut": "150000000",
            "minOut": "149250000"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/swapInstruction"))
        .and(body_partial_json(json!({ "quoteId": "q-42", "userAddress": "owner" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transaction": { "serializedTx": "AQID", "lastValidBlockHeight": 250000000u64 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = Arc::new(FakeChainBackend::new());
    backend.push_status(TxStatus::Processed);
    backend.push_status(TxStatus::Confirmed);
    let chain: Arc<dyn ChainBackend> = backend.clone();
    let signer = FakeSigner::new("owner", "sig");

    let flow = SwapFlow::builder()
        .api(Arc::new(
            SwapApiClient::builder()
                .base_url(server.uri())
                .api_key("test-key")
                .build(),
        ))
        .signer(Arc::new(signer.clone()))
        .submitter(Submitter::new(chain, fast_submit()))
        .chain(Chain::Solana)
        .build();

    let outcome = flow
        .execute(&SwapQuoteRequest {
            chain: Chain::Solana,
            input_token: "SOL".to_string(),
            output_token: "USDC".to_string(),
            amount: "1000000000".to_string(),
            slippage_bps: 50,
        })
        .await
        .unwrap();

    assert_eq!(outcome.tx, TxId::new("sig-1"));
    assert_eq!(outcome.quote.min_out.as_deref(), Some("149250000"));
    assert_eq!(signer.signed_payloads(), vec![solana_payload()]);
    assert_eq!(backend.broadcast_count(), 1);
}

#[tokio::test]
async fn test_swap_quote_rejected_by_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/swapQuote"))
        .respond_with(ResponseTemplate::new(400).set_body_string("no route found"))
        .mount(&server)
        .await;

    let backend = Arc::new(FakeChainBackend::new());
    let chain: Arc<dyn ChainBackend> = backend.clone();
    let flow = SwapFlow::builder()
        .api(Arc::new(
            SwapApiClient::builder()
                .base_url(server.uri())
                .api_key("test-key")
                .build(),
        ))
        .signer(Arc::new(FakeSigner::new("owner", "sig")))
        .submitter(Submitter::new(chain, fast_submit()))
        .chain(Chain::Solana)
        .build();

    let err = flow
        .execute(&SwapQuoteRequest {
            chain: Chain::Solana,
            input_token: "SOL".to_string(),
            output_token: "BONK".to_string(),
            amount: "1".to_string(),
            slippage_bps: 50,
        })
        .await
        .unwrap_err();

    insta::assert_snapshot!(
        err.to_string(),
        @"swap leg failed (last confirmed transaction: none): API error (HTTP 400): no route found"
    );
    assert_eq!(backend.broadcast_count(), 0);
}

struct Bridge {
    api: FakeSwapApi,
    source: Arc<FakeChainBackend>,
    destination: Arc<FakeChainBackend>,
    iris: Arc<FakeAttestationProvider>,
    flow: BridgeFlow,
}

fn bridge(quote: Quote) -> Bridge {
    let api = FakeSwapApi::new(quote);
    let source = Arc::new(FakeChainBackend::new());
    let destination = Arc::new(FakeChainBackend::new());
    let iris = Arc::new(FakeAttestationProvider::new());

    let source_chain: Arc<dyn ChainBackend> = source.clone();
    let destination_chain: Arc<dyn ChainBackend> = destination.clone();
    let attestation: Arc<dyn AttestationProvider> = iris.clone();

    let flow = BridgeFlow::builder()
        .api(Arc::new(api.clone()))
        .source_chain(Chain::Solana)
        .source_signer(Arc::new(FakeSigner::new("sender", "burn")))
        .source_submitter(Submitter::new(source_chain, SubmitConfig::default()))
        .destination_chain(Chain::Base)
        .destination_signer(Arc::new(FakeSigner::new("0xrecipient", "0xmint")))
        .destination_submitter(Submitter::new(destination_chain, SubmitConfig::evm()))
        .attestation(AttestationPoller::new(attestation, PollingConfig::fast()))
        .build();

    Bridge {
        api,
        source,
        destination,
        iris,
        flow,
    }
}

fn request() -> CrossChainQuoteRequest {
    CrossChainQuoteRequest {
        source_chain: Chain::Solana,
        destination_chain: Chain::Base,
        input_token: "SOL".to_string(),
        output_token: "ETH".to_string(),
        amount: "2000000000".to_string(),
        slippage_bps: 100,
    }
}

fn record() -> AttestationRecord {
    AttestationRecord {
        message: Bytes::from_static(&[0x00, 0x00, 0x00, 0x01]),
        attestation: Bytes::from_static(&[0x42; 65]),
    }
}

#[tokio::test(start_paused = true)]
async fn test_solana_to_base_bridge_with_redeem() {
    let mut quote = Quote::new("q-bridge");
    quote.requires_redeem = true;
    let b = bridge(quote);
    b.api.push_payload(solana_payload());
    b.api.push_payload(solana_payload());
    b.api.push_payload(solana_payload());
    b.source.push_status(TxStatus::Confirmed);
    b.destination.set_fallback_status(TxStatus::Confirmed);
    b.iris.ready_after(3, record());

    let outcome = b.flow.execute(&request()).await.unwrap();

    assert_eq!(outcome.burn, TxId::new("burn-1"));
    assert_eq!(outcome.claim, TxId::new("0xmint-1"));
    assert_eq!(outcome.redeem, Some(TxId::new("0xmint-2")));
    assert_eq!(outcome.attestation, record());
    assert_eq!(
        b.api.calls(),
        [
            "cross_chain_quote",
            "cross_chain_transfer",
            "claim",
            "redeem"
        ]
    );
    // Solana is CCTP domain 5
    assert_eq!(b.iris.queries()[0].0.as_u32(), 5);
    assert_eq!(b.iris.call_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_attestation_timeout_keeps_burn_for_recovery() {
    let b = bridge(Quote::new("q-bridge"));
    b.api.push_payload(solana_payload());
    b.source.push_status(TxStatus::Finalized);
    b.iris.push_reply(AttestationReply::Pending);

    let err = b.flow.execute(&request()).await.unwrap_err();

    match err {
        RelayError::LegFailed {
            leg,
            last_tx,
            source,
        } => {
            assert_eq!(leg, Leg::Attest);
            assert_eq!(last_tx, Some(TxId::new("burn-1")));
            assert!(matches!(*source, RelayError::AttestationTimeout));
        }
        other => panic!("expected attest leg failure, got {other:?}"),
    }
    assert_eq!(b.iris.call_count(), PollingConfig::fast().max_attempts as usize);
    assert_eq!(b.destination.broadcast_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_redeem_slippage_reports_claim() {
    let mut quote = Quote::new("q-bridge");
    quote.requires_redeem = true;
    let b = bridge(quote);
    b.api.push_payload(solana_payload());
    b.api.push_payload(solana_payload());
    b.api.push_payload(solana_payload());
    b.source.push_status(TxStatus::Confirmed);
    b.destination.push_status(TxStatus::Confirmed);
    b.destination.push_status(TxStatus::Failed(swap_relay_rs::Rejection::SlippageExceeded {
        detail: "execution reverted: Too little received".to_string(),
    }));
    b.iris.ready_after(0, record());

    let err = b.flow.execute(&request()).await.unwrap_err();

    assert!(err.is_slippage());
    assert!(matches!(
        &err,
        RelayError::LegFailed {
            leg: Leg::Redeem,
            last_tx: Some(id),
            ..
        } if id == &TxId::new("0xmint-1")
    ));
}
