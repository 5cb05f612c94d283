// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Same-chain swap on Solana
//!
//! Quotes a SOL → USDC swap, has the transaction signed by an external
//! signing service and lands it through the Solana backend.
//!
//! Environment (a `.env` file is loaded):
//! - `SWAP_API_URL`, `SWAP_API_KEY`: aggregator API
//! - `SOLANA_RPC_URL`: defaults to mainnet-beta
//! - `SIGNER_URL`, `WALLET_ADDRESS`: a service answering `POST /sign` with
//!   `{"signedTx": "<base64>"}`
//!
//! Run with: `cargo run --example solana_swap`

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use dotenvy::dotenv;
use serde::Deserialize;
use swap_relay_rs::{
    Chain, ChainBackend, FreshnessAnchor, RelayError, Result, SignedTransaction, SolanaBackend,
    SubmitConfig, Submitter, SwapApiClient, SwapFlow, SwapQuoteRequest, TransactionPayload,
    TransactionSigner,
};
use tracing_subscriber::EnvFilter;

const WSOL: &str = "So11111111111111111111111111111111111111112";
const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignResponse {
    signed_tx: String,
}

/// Forwards payloads to a signing service that holds the wallet key.
struct RemoteSigner {
    url: String,
    address: String,
    client: reqwest::Client,
}

#[async_trait]
impl TransactionSigner for RemoteSigner {
    fn address(&self) -> String {
        self.address.clone()
    }

    async fn sign(&self, payload: &TransactionPayload) -> Result<SignedTransaction> {
        let TransactionPayload::Solana(solana) = payload else {
            return Err(RelayError::Signing(
                "this signer only handles Solana transactions".to_string(),
            ));
        };

        let response: SignResponse = self
            .client
            .post(format!("{}/sign", self.url))
            .json(payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let tx = SignedTransaction::solana(STANDARD.decode(response.signed_tx)?)?;
        Ok(match solana.last_valid_block_height {
            Some(last_valid) => tx.with_anchor(FreshnessAnchor::BlockHeight { last_valid }),
            None => tx,
        })
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| RelayError::InvalidConfig(format!("{name} must be set")))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("swap_relay_rs=debug")),
        )
        .init();

    println!("🔁 Solana swap: SOL → USDC");
    println!("==========================\n");

    let rpc_url = std::env::var("SOLANA_RPC_URL")
        .unwrap_or_else(|_| "https://api.mainnet-beta.solana.com".to_string());
    let backend: Arc<dyn ChainBackend> =
        Arc::new(SolanaBackend::builder().rpc_url(rpc_url).build());

    let signer = RemoteSigner {
        url: required("SIGNER_URL")?,
        address: required("WALLET_ADDRESS")?,
        client: reqwest::Client::new(),
    };
    println!("👛 Wallet: {}", signer.address());

    let flow = SwapFlow::builder()
        .api(Arc::new(SwapApiClient::from_env()?))
        .signer(Arc::new(signer))
        .submitter(Submitter::new(backend, SubmitConfig::default()))
        .chain(Chain::Solana)
        .build();

    let request = SwapQuoteRequest {
        chain: Chain::Solana,
        input_token: WSOL.to_string(),
        output_token: USDC.to_string(),
        amount: "100000000".to_string(),
        slippage_bps: 50,
    };

    match flow.execute(&request).await {
        Ok(outcome) => {
            println!("✅ Swap confirmed: {}", outcome.tx);
            println!("   Quote: {}", outcome.quote.quote_id);
            if let Some(min_out) = &outcome.quote.min_out {
                println!("   Minimum out: {min_out}");
            }
        }
        Err(e) if e.is_slippage() => {
            println!("⚠️  Price moved beyond the slippage tolerance, request a new quote");
            return Err(e);
        }
        Err(e) => {
            println!("❌ Swap failed: {e}");
            return Err(e);
        }
    }

    Ok(())
}
