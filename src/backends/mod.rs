// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Production implementations of the traits in [`crate::traits`].
//!
//! Applications use these backends; tests use the fakes in
//! [`crate::testing`].

use std::time::Duration;

use reqwest::Client;
use tracing::warn;

mod aptos;
mod evm;
mod iris;
mod solana;

pub use self::aptos::AptosBackend;
pub use self::evm::{
    estimate_gas_with_buffer, EvmBackend, EvmSigner, DEFAULT_FINALITY_DEPTH,
    DEFAULT_GAS_BUFFER_PERCENT,
};
pub use self::iris::IrisAttestationProvider;
pub use self::solana::{SolanaBackend, SLIPPAGE_TOLERANCE_EXCEEDED};

/// Per-request timeout of every HTTP client the crate builds.
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn http_client() -> Client {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, event = "http_client_build_failed");
            Client::new()
        })
}

/// Seconds from a `Retry-After` header, or `default` when absent or not a
/// plain number of seconds.
pub(crate) fn retry_after_secs(response: &reqwest::Response, default: u64) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
