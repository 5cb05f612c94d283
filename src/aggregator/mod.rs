// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Client and wire types of the swap-aggregation API.

mod client;
mod types;

pub use client::{SwapApiClient, SWAP_API_KEY_ENV, SWAP_API_URL_ENV};
pub use types::{
    AptosPayload, ClaimRequest, CrossChainQuoteRequest, CrossChainTransferRequest, EvmPayload,
    Quote, RedeemRequest, SolanaPayload, SwapInstructionRequest, SwapQuoteRequest,
    TransactionPayload,
};
