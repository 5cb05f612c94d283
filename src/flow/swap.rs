// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use bon::Builder;
use tracing::info;

use super::{land_leg, leg_failed, Leg, DEFAULT_MAX_REFETCHES};
use crate::aggregator::{Quote, SwapInstructionRequest, SwapQuoteRequest};
use crate::chain::Chain;
use crate::error::{RelayError, Result};
use crate::submit::{Submitter, TxId};
use crate::traits::{ChainBackend, SwapApi, TransactionSigner};

/// Same-chain swap: quote → instruction → sign → submit.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use swap_relay_rs::{
///     Chain, ChainBackend, SolanaBackend, SubmitConfig, Submitter, SwapApiClient, SwapFlow,
///     SwapQuoteRequest, TransactionSigner,
/// };
///
/// # async fn example(signer: Arc<dyn TransactionSigner>) -> swap_relay_rs::Result<()> {
/// let backend: Arc<dyn ChainBackend> = Arc::new(
///     SolanaBackend::builder()
///         .rpc_url("https://api.mainnet-beta.solana.com")
///         .build(),
/// );
///
/// let flow = SwapFlow::builder()
///     .api(Arc::new(SwapApiClient::from_env()?))
///     .signer(signer)
///     .submitter(Submitter::new(backend, SubmitConfig::default()))
///     .chain(Chain::Solana)
///     .build();
///
/// let outcome = flow
///     .execute(&SwapQuoteRequest {
///         chain: Chain::Solana,
///         input_token: "So11111111111111111111111111111111111111112".to_string(),
///         output_token: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".to_string(),
///         amount: "1000000000".to_string(),
///         slippage_bps: 50,
///     })
///     .await?;
/// println!("swapped in {}", outcome.tx);
/// # Ok(())
/// # }
/// ```
#[derive(Builder)]
pub struct SwapFlow {
    api: Arc<dyn SwapApi>,
    signer: Arc<dyn TransactionSigner>,
    submitter: Submitter<dyn ChainBackend>,
    chain: Chain,

    #[builder(default = DEFAULT_MAX_REFETCHES)]
    max_refetches: u32,
}

/// Result of a landed same-chain swap.
#[derive(Debug, Clone)]
pub struct SwapOutcome {
    pub quote: Quote,
    pub tx: TxId,
}

impl SwapFlow {
    pub fn chain(&self) -> Chain {
        self.chain
    }

    /// Quotes, then lands the swap.
    ///
    /// # Errors
    ///
    /// Any failure is wrapped in [`RelayError::LegFailed`] for [`Leg::Swap`].
    /// A slippage failure can be detected with [`RelayError::is_slippage`];
    /// re-quote before trying again.
    pub async fn execute(&self, request: &SwapQuoteRequest) -> Result<SwapOutcome> {
        if request.chain != self.chain {
            return Err(RelayError::InvalidConfig(format!(
                "swap requested on {} but the flow submits to {}",
                request.chain, self.chain
            )));
        }

        let quote = self
            .api
            .swap_quote(request)
            .await
            .map_err(|e| leg_failed(Leg::Swap, None, e))?;
        info!(quote_id = %quote.quote_id, min_out = ?quote.min_out, event = "swap_quoted");

        let instruction = SwapInstructionRequest {
            quote_id: quote.quote_id.clone(),
            user_address: self.signer.address(),
        };
        let api = self.api.as_ref();
        let tx = land_leg(
            Leg::Swap,
            self.chain,
            self.signer.as_ref(),
            &self.submitter,
            self.max_refetches,
            || api.swap_instruction(&instruction),
        )
        .await
        .map_err(|e| leg_failed(Leg::Swap, None, e))?;

        Ok(SwapOutcome { quote, tx })
    }
}
