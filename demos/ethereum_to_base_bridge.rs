// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Cross-chain transfer from Ethereum to Base
//!
//! Burns on Ethereum, waits for Circle's attestation and claims on Base. The
//! same key signs on both chains.
//!
//! Environment (a `.env` file is loaded):
//! - `SWAP_API_URL`, `SWAP_API_KEY`: aggregator API
//! - `PRIVATE_KEY`: hex private key of the wallet
//! - `ETHEREUM_RPC_URL`, `BASE_RPC_URL`
//!
//! Run with: `cargo run --example ethereum_to_base_bridge`

use std::sync::Arc;

use alloy_provider::ProviderBuilder;
use alloy_signer_local::PrivateKeySigner;
use dotenvy::dotenv;
use swap_relay_rs::{
    AttestationPoller, AttestationProvider, BridgeFlow, Chain, ChainBackend,
    CrossChainQuoteRequest, EvmBackend, EvmSigner, IrisAttestationProvider, PollingConfig,
    RelayError, Result, SubmitConfig, Submitter, SwapApiClient,
};
use tracing_subscriber::EnvFilter;
use url::Url;

const USDC_ETHEREUM: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
const USDC_BASE: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";

fn rpc_url(name: &str) -> Result<Url> {
    let raw = std::env::var(name)
        .map_err(|_| RelayError::InvalidConfig(format!("{name} must be set")))?;
    raw.parse().map_err(|e| RelayError::InvalidUrl {
        reason: format!("{name}: {e}"),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("swap_relay_rs=info")),
        )
        .init();

    println!("🌉 Bridge: Ethereum → Base");
    println!("==========================\n");

    let key: PrivateKeySigner = std::env::var("PRIVATE_KEY")
        .map_err(|_| RelayError::InvalidConfig("PRIVATE_KEY must be set".to_string()))?
        .parse()
        .map_err(|e| RelayError::Signing(format!("invalid PRIVATE_KEY: {e}")))?;

    let ethereum = ProviderBuilder::new().connect_http(rpc_url("ETHEREUM_RPC_URL")?);
    let base = ProviderBuilder::new().connect_http(rpc_url("BASE_RPC_URL")?);

    let source_backend: Arc<dyn ChainBackend> = Arc::new(EvmBackend::new(ethereum.clone()));
    let destination_backend: Arc<dyn ChainBackend> =
        Arc::new(EvmBackend::new(base.clone()).with_finality_depth(1));
    let iris: Arc<dyn AttestationProvider> = Arc::new(IrisAttestationProvider::production());

    let source_signer = EvmSigner::new(ethereum, key.clone());
    let destination_signer = EvmSigner::new(base, key);

    println!("1️⃣  Configuration");
    println!("   Source domain: {}", Chain::Ethereum.cctp_domain());
    println!("   Destination domain: {}", Chain::Base.cctp_domain());
    println!("   Attestation budget: {}s\n", PollingConfig::default().total_timeout_secs());

    let flow = BridgeFlow::builder()
        .api(Arc::new(SwapApiClient::from_env()?))
        .source_chain(Chain::Ethereum)
        .source_signer(Arc::new(source_signer))
        .source_submitter(Submitter::new(source_backend, SubmitConfig::evm()))
        .destination_chain(Chain::Base)
        .destination_signer(Arc::new(destination_signer))
        .destination_submitter(Submitter::new(destination_backend, SubmitConfig::evm()))
        .attestation(AttestationPoller::new(iris, PollingConfig::default()))
        .build();

    let request = CrossChainQuoteRequest {
        source_chain: Chain::Ethereum,
        destination_chain: Chain::Base,
        input_token: USDC_ETHEREUM.to_string(),
        output_token: USDC_BASE.to_string(),
        amount: "1000000".to_string(),
        slippage_bps: 10,
    };

    println!("2️⃣  Burning, attesting and claiming...");
    match flow.execute(&request).await {
        Ok(outcome) => {
            println!("   ✅ Burn:  {}", outcome.burn);
            println!("   ✅ Claim: {}", outcome.claim);
            if let Some(redeem) = &outcome.redeem {
                println!("   ✅ Redeem: {redeem}");
            }
        }
        Err(RelayError::LegFailed {
            leg,
            last_tx,
            source,
        }) => {
            println!("   ❌ {leg} leg failed: {source}");
            if let Some(last_tx) = &last_tx {
                println!("   Funds are recoverable from {last_tx}; claim it again later");
            }
            return Err(RelayError::LegFailed {
                leg,
                last_tx,
                source,
            });
        }
        Err(e) => return Err(e),
    }

    Ok(())
}
