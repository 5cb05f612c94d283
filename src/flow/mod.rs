// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Multi-leg orchestration on top of the submitter and the attestation poller.
//!
//! Every leg is fetch → sign → submit. A failing leg aborts the flow and
//! comes back as [`RelayError::LegFailed`] carrying the last transaction that
//! did land, so the caller knows what is already on-chain. Nothing is rolled
//! back: once a burn has landed the funds are recovered by claiming, not by
//! undoing.

mod bridge;
mod swap;

use std::fmt;
use std::future::Future;

use tracing::{info, warn, Instrument};

pub use bridge::{BridgeFlow, BridgeOutcome};
pub use swap::{SwapFlow, SwapOutcome};

use crate::aggregator::TransactionPayload;
use crate::chain::Chain;
use crate::error::{RelayError, Result};
use crate::spans;
use crate::submit::{Submitter, TxId};
use crate::traits::{ChainBackend, TransactionSigner};

/// Re-fetches after an expired transaction before the leg fails.
pub const DEFAULT_MAX_REFETCHES: u32 = 2;

/// One step of a swap or bridge flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Leg {
    /// Same-chain swap
    Swap,
    /// Source-chain burn (including any swap into USDC)
    Burn,
    /// Waiting for the attestation of the burn
    Attest,
    /// Destination-chain mint
    Claim,
    /// Destination-chain swap out of USDC after the claim
    Redeem,
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Leg::Swap => "swap",
            Leg::Burn => "burn",
            Leg::Attest => "attest",
            Leg::Claim => "claim",
            Leg::Redeem => "redeem",
        })
    }
}

pub(crate) fn leg_failed(leg: Leg, last_tx: Option<TxId>, source: RelayError) -> RelayError {
    RelayError::LegFailed {
        leg,
        last_tx,
        source: Box::new(source),
    }
}

/// Fetches a payload, signs it and lands it.
///
/// An [`RelayError::Expired`] transaction is never resubmitted: the payload
/// is fetched again and signed afresh, up to `max_refetches` times.
pub(crate) async fn land_leg<F, Fut>(
    leg: Leg,
    chain: Chain,
    signer: &dyn TransactionSigner,
    submitter: &Submitter<dyn ChainBackend>,
    max_refetches: u32,
    fetch: F,
) -> Result<TxId>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<TransactionPayload>>,
{
    let span = spans::flow_leg(leg, chain);

    async move {
        let mut refetches = 0;
        loop {
            let payload = fetch().await?;
            let tx = signer.sign(&payload).await?;

            match submitter.submit_and_confirm(tx).await {
                Ok(id) => {
                    tracing::Span::current().record("tx_id", id.as_str());
                    info!(tx_id = %id, refetches, event = "leg_landed");
                    return Ok(id);
                }
                Err(RelayError::Expired { id }) if refetches < max_refetches => {
                    refetches += 1;
                    warn!(
                        expired = %id,
                        refetch = refetches,
                        event = "leg_refetching_expired_transaction"
                    );
                }
                Err(e) => {
                    spans::record_error_with_context(
                        "LegFailed",
                        &e.to_string(),
                        Some(&format!("{leg} leg on {chain}")),
                    );
                    return Err(e);
                }
            }
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leg_display() {
        let legs: Vec<String> = [Leg::Swap, Leg::Burn, Leg::Attest, Leg::Claim, Leg::Redeem]
            .iter()
            .map(Leg::to_string)
            .collect();
        assert_eq!(legs, ["swap", "burn", "attest", "claim", "redeem"]);
    }

    #[test]
    fn test_leg_failed_keeps_source() {
        let err = leg_failed(
            Leg::Claim,
            Some(TxId::new("0xburn")),
            RelayError::Transient("rpc down".to_string()),
        );
        insta::assert_snapshot!(
            err.to_string(),
            @"claim leg failed (last confirmed transaction: 0xburn): Transient failure: rpc down"
        );
        assert!(err.is_retryable());
    }
}
