// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::{Address, Bytes, U256};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::chain::Chain;
use crate::error::Result;
use crate::submit::TxId;

/// Query of `GET /v1/swapQuote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapQuoteRequest {
    pub chain: Chain,
    pub input_token: String,
    pub output_token: String,
    /// Input amount in the token's smallest unit.
    pub amount: String,
    pub slippage_bps: u16,
}

/// A route quoted by the API.
///
/// Only the fields the flows act on are typed; the rest is kept verbatim and
/// echoed back where the API wants the quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub quote_id: String,
    #[serde(default)]
    pub expected_out: Option<String>,
    #[serde(default)]
    pub min_out: Option<String>,
    /// The destination leg ends in USDC and needs a redeem swap after the claim.
    #[serde(default)]
    pub requires_redeem: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Quote {
    pub fn new(quote_id: impl Into<String>) -> Self {
        Self {
            quote_id: quote_id.into(),
            expected_out: None,
            min_out: None,
            requires_redeem: false,
            extra: serde_json::Map::new(),
        }
    }
}

/// Body of `POST /v1/swapInstruction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapInstructionRequest {
    pub quote_id: String,
    pub user_address: String,
}

/// Query of `GET /v1/crossChainQuote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossChainQuoteRequest {
    pub source_chain: Chain,
    pub destination_chain: Chain,
    pub input_token: String,
    pub output_token: String,
    pub amount: String,
    pub slippage_bps: u16,
}

/// Body of `POST /v1/crossChainTransfer`; answered with the burn transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossChainTransferRequest {
    pub quote_id: String,
    pub source_address: String,
    pub destination_address: String,
}

/// Body of `POST /v1/claim`; answered with the mint transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub quote_id: String,
    pub source_chain: Chain,
    pub destination_chain: Chain,
    pub burn_tx: TxId,
    pub message: Bytes,
    pub attestation: Bytes,
    pub destination_address: String,
}

/// Body of `POST /v1/redeem`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    pub quote_id: String,
    pub destination_chain: Chain,
    pub claim_tx: TxId,
    pub destination_address: String,
}

/// Unsigned transaction as returned by the instruction endpoints.
///
/// The shape tells the chain family apart; no tag is sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransactionPayload {
    Solana(SolanaPayload),
    Evm(EvmPayload),
    Aptos(AptosPayload),
}

/// A base64 wire transaction with the aggregator's placeholder signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolanaPayload {
    pub serialized_tx: String,
    #[serde(default)]
    pub last_valid_block_height: Option<u64>,
}

impl SolanaPayload {
    /// Wire bytes for the signer.
    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(&self.serialized_tx)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmPayload {
    pub to: Address,
    pub data: Bytes,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub gas_price: Option<U256>,
    #[serde(default)]
    pub gas_limit: Option<u64>,
}

/// Entry function call; the signer wraps it into a raw transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AptosPayload {
    pub function: String,
    #[serde(default)]
    pub type_arguments: Vec<String>,
    #[serde(default)]
    pub arguments: Vec<serde_json::Value>,
}
