// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use bon::Builder;
use tracing::{info, Instrument};

use super::{land_leg, leg_failed, Leg, DEFAULT_MAX_REFETCHES};
use crate::aggregator::{
    ClaimRequest, CrossChainQuoteRequest, CrossChainTransferRequest, Quote, RedeemRequest,
};
use crate::attestation::AttestationPoller;
use crate::chain::Chain;
use crate::error::{RelayError, Result};
use crate::protocol::AttestationRecord;
use crate::spans;
use crate::submit::{Submitter, TxId};
use crate::traits::{AttestationProvider, ChainBackend, SwapApi, TransactionSigner};

/// Cross-chain transfer: burn on the source, wait for the attestation, claim
/// on the destination and, when the quote asks for it, redeem.
///
/// Each side has its own signer and submitter. The flow stops at the first
/// failing leg; see [`RelayError::LegFailed`] for what has already landed.
#[derive(Builder)]
pub struct BridgeFlow {
    api: Arc<dyn SwapApi>,

    source_chain: Chain,
    source_signer: Arc<dyn TransactionSigner>,
    source_submitter: Submitter<dyn ChainBackend>,

    destination_chain: Chain,
    destination_signer: Arc<dyn TransactionSigner>,
    destination_submitter: Submitter<dyn ChainBackend>,

    attestation: AttestationPoller<dyn AttestationProvider>,

    #[builder(default = DEFAULT_MAX_REFETCHES)]
    max_refetches: u32,
}

/// Transactions of a completed bridge, in landing order.
#[derive(Debug, Clone)]
pub struct BridgeOutcome {
    pub quote: Quote,
    pub burn: TxId,
    pub attestation: AttestationRecord,
    pub claim: TxId,
    pub redeem: Option<TxId>,
}

impl BridgeFlow {
    pub fn source_chain(&self) -> Chain {
        self.source_chain
    }

    pub fn destination_chain(&self) -> Chain {
        self.destination_chain
    }

    /// Runs every leg of the transfer.
    ///
    /// # Errors
    ///
    /// A leg failure is returned as [`RelayError::LegFailed`]. Once the burn
    /// has landed its `last_tx` is never empty: an attestation or claim
    /// failure carries the burn, a redeem failure carries the claim.
    pub async fn execute(&self, request: &CrossChainQuoteRequest) -> Result<BridgeOutcome> {
        self.check_route(request)?;

        let quote = self
            .api
            .cross_chain_quote(request)
            .await
            .map_err(|e| leg_failed(Leg::Burn, None, e))?;
        info!(
            quote_id = %quote.quote_id,
            source = %self.source_chain,
            destination = %self.destination_chain,
            requires_redeem = quote.requires_redeem,
            event = "bridge_quoted"
        );

        let burn = self
            .burn(&quote)
            .await
            .map_err(|e| leg_failed(Leg::Burn, None, e))?;

        let attestation = self
            .attest(&burn)
            .await
            .map_err(|e| leg_failed(Leg::Attest, Some(burn.clone()), e))?;

        let claim = self
            .claim(&quote, &burn, &attestation)
            .await
            .map_err(|e| leg_failed(Leg::Claim, Some(burn.clone()), e))?;

        let redeem = if quote.requires_redeem {
            let redeem = self
                .redeem(&quote, &claim)
                .await
                .map_err(|e| leg_failed(Leg::Redeem, Some(claim.clone()), e))?;
            Some(redeem)
        } else {
            None
        };

        info!(
            burn = %burn,
            claim = %claim,
            redeem = ?redeem,
            event = "bridge_completed"
        );

        Ok(BridgeOutcome {
            quote,
            burn,
            attestation,
            claim,
            redeem,
        })
    }

    fn check_route(&self, request: &CrossChainQuoteRequest) -> Result<()> {
        if request.source_chain != self.source_chain
            || request.destination_chain != self.destination_chain
        {
            return Err(RelayError::InvalidConfig(format!(
                "route {} -> {} does not match the flow's {} -> {}",
                request.source_chain,
                request.destination_chain,
                self.source_chain,
                self.destination_chain
            )));
        }
        if self.source_chain == self.destination_chain {
            return Err(RelayError::InvalidConfig(format!(
                "source and destination are both {}, use a swap instead",
                self.source_chain
            )));
        }
        Ok(())
    }

    async fn burn(&self, quote: &Quote) -> Result<TxId> {
        let transfer = CrossChainTransferRequest {
            quote_id: quote.quote_id.clone(),
            source_address: self.source_signer.address(),
            destination_address: self.destination_signer.address(),
        };
        let api = self.api.as_ref();
        land_leg(
            Leg::Burn,
            self.source_chain,
            self.source_signer.as_ref(),
            &self.source_submitter,
            self.max_refetches,
            || api.cross_chain_transfer(&transfer),
        )
        .await
    }

    async fn attest(&self, burn: &TxId) -> Result<AttestationRecord> {
        let span = spans::flow_leg(Leg::Attest, self.source_chain);
        span.record("tx_id", burn.as_str());

        self.attestation
            .await_attestation(self.source_chain.cctp_domain(), burn)
            .instrument(span)
            .await
    }

    async fn claim(
        &self,
        quote: &Quote,
        burn: &TxId,
        attestation: &AttestationRecord,
    ) -> Result<TxId> {
        let claim = ClaimRequest {
            quote_id: quote.quote_id.clone(),
            source_chain: self.source_chain,
            destination_chain: self.destination_chain,
            burn_tx: burn.clone(),
            message: attestation.message.clone(),
            attestation: attestation.attestation.clone(),
            destination_address: self.destination_signer.address(),
        };
        let api = self.api.as_ref();
        land_leg(
            Leg::Claim,
            self.destination_chain,
            self.destination_signer.as_ref(),
            &self.destination_submitter,
            self.max_refetches,
            || api.claim(&claim),
        )
        .await
    }

    async fn redeem(&self, quote: &Quote, claim: &TxId) -> Result<TxId> {
        let redeem = RedeemRequest {
            quote_id: quote.quote_id.clone(),
            destination_chain: self.destination_chain,
            claim_tx: claim.clone(),
            destination_address: self.destination_signer.address(),
        };
        let api = self.api.as_ref();
        land_leg(
            Leg::Redeem,
            self.destination_chain,
            self.destination_signer.as_ref(),
            &self.destination_submitter,
            self.max_refetches,
            || api.redeem(&redeem),
        )
        .await
    }
}
