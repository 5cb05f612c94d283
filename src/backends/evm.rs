// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! EVM chains through an alloy [`Provider`].

use alloy_eips::eip2718::Encodable2718;
use alloy_network::{
    Ethereum, EthereumWallet, NetworkWallet, ReceiptResponse, TransactionBuilder,
};
use alloy_primitives::{Address, TxHash};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use async_trait::async_trait;
use tracing::{debug, instrument, trace, Instrument};

use crate::aggregator::TransactionPayload;
use crate::error::{RelayError, Result};
use crate::spans;
use crate::submit::{Rejection, SignedTransaction, TxId, TxStatus};
use crate::traits::{ChainBackend, TransactionSigner};

/// Blocks on top of the receipt's block before it counts as finalized.
pub const DEFAULT_FINALITY_DEPTH: u64 = 12;

/// Default gas buffer percentage (20%)
pub const DEFAULT_GAS_BUFFER_PERCENT: u64 = 20;

/// Node error messages that mean the bytes can never be included.
const INVALID_TX_MESSAGES: &[&str] = &[
    "insufficient funds",
    "intrinsic gas too low",
    "invalid sender",
    "exceeds block gas limit",
];

/// [`ChainBackend`] for any chain reachable through an alloy provider.
///
/// There is no freshness anchor on EVM chains: a transaction stays valid
/// until its nonce is used.
///
/// # Examples
///
/// ```rust,no_run
/// use swap_relay_rs::EvmBackend;
/// use alloy_provider::ProviderBuilder;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = ProviderBuilder::new()
///     .connect("https://eth.llamarpc.com")
///     .await?;
///
/// let backend = EvmBackend::new(provider).with_finality_depth(64);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct EvmBackend<P> {
    provider: P,
    finality_depth: u64,
}

impl<P: Provider<Ethereum>> EvmBackend<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            finality_depth: DEFAULT_FINALITY_DEPTH,
        }
    }

    pub fn with_finality_depth(mut self, depth: u64) -> Self {
        self.finality_depth = depth.max(1);
        self
    }

    /// Returns a reference to the underlying alloy provider.
    pub fn inner(&self) -> &P {
        &self.provider
    }
}

#[async_trait]
impl<P> ChainBackend for EvmBackend<P>
where
    P: Provider<Ethereum> + Send + Sync,
{
    fn name(&self) -> &str {
        "evm"
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> Result<()> {
        let span = spans::rpc_call("eth_sendRawTransaction", self.name());
        let result = self
            .provider
            .send_raw_transaction(tx.bytes())
            .instrument(span)
            .await;

        match result {
            Ok(_pending) => {
                trace!(tx_hash = %tx.id(), event = "raw_transaction_sent");
                Ok(())
            }
            Err(e) => {
                let message = e.to_string().to_lowercase();
                if message.contains("already known") {
                    // the node has the identical transaction in its pool
                    return Ok(());
                }
                if INVALID_TX_MESSAGES.iter().any(|m| message.contains(m)) {
                    return Err(RelayError::InvalidTransaction {
                        reason: e.to_string(),
                    });
                }
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self), fields(tx_hash = %id))]
    async fn status(&self, id: &TxId) -> Result<TxStatus> {
        let hash: TxHash = id.as_str().parse()?;

        let Some(receipt) = self.provider.get_transaction_receipt(hash).await? else {
            trace!(event = "receipt_not_found");
            return Ok(TxStatus::NotFound);
        };

        if !receipt.status() {
            debug!(event = "transaction_reverted");
            return Ok(TxStatus::Failed(Rejection::Reverted {
                detail: format!("receipt status 0 in block {:?}", receipt.block_number()),
            }));
        }

        let Some(included_in) = receipt.block_number() else {
            return Ok(TxStatus::Processed);
        };
        let head = self.provider.get_block_number().await?;
        let depth = head.saturating_sub(included_in) + 1;
        trace!(block = included_in, head = head, depth = depth, event = "receipt_found");

        if depth >= self.finality_depth {
            Ok(TxStatus::Finalized)
        } else {
            Ok(TxStatus::Confirmed)
        }
    }
}

/// Estimate gas for a transaction with an optional safety buffer.
///
/// # Example
///
/// ```rust,ignore
/// let gas_limit = estimate_gas_with_buffer(&provider, &tx, Some(20)).await?;
/// let tx = tx.with_gas_limit(gas_limit);
/// ```
pub async fn estimate_gas_with_buffer<P: Provider<Ethereum>>(
    provider: &P,
    tx: &TransactionRequest,
    buffer_percent: Option<u64>,
) -> Result<u64> {
    let buffer = buffer_percent.unwrap_or(DEFAULT_GAS_BUFFER_PERCENT);

    let estimate = provider.estimate_gas(tx.clone()).await.map_err(|e| {
        RelayError::InvalidTransaction {
            reason: format!("Gas estimation failed: {e}"),
        }
    })?;

    // estimate * (100 + buffer) / 100
    Ok(estimate.saturating_mul(100 + buffer) / 100)
}

/// Signs EVM payloads from the swap API with a local wallet.
///
/// Fills in nonce, chain id, gas price and gas limit from the provider where
/// the payload leaves them out, then produces EIP-2718 bytes.
#[derive(Debug, Clone)]
pub struct EvmSigner<P> {
    provider: P,
    wallet: EthereumWallet,
}

impl<P: Provider<Ethereum>> EvmSigner<P> {
    pub fn new(provider: P, wallet: impl Into<EthereumWallet>) -> Self {
        Self {
            provider,
            wallet: wallet.into(),
        }
    }

    fn from_address(&self) -> Address {
        NetworkWallet::<Ethereum>::default_signer_address(&self.wallet)
    }
}

#[async_trait]
impl<P> TransactionSigner for EvmSigner<P>
where
    P: Provider<Ethereum> + Send + Sync,
{
    fn address(&self) -> String {
        self.from_address().to_checksum(None)
    }

    async fn sign(&self, payload: &TransactionPayload) -> Result<SignedTransaction> {
        let TransactionPayload::Evm(payload) = payload else {
            return Err(RelayError::InvalidTransaction {
                reason: "EVM signer received a non-EVM payload".to_string(),
            });
        };

        let from = self.from_address();
        let nonce = self.provider.get_transaction_count(from).pending().await?;
        let chain_id = self.provider.get_chain_id().await?;
        let gas_price = match payload.gas_price {
            Some(price) => price.saturating_to::<u128>(),
            None => self.provider.get_gas_price().await?,
        };

        let mut request = TransactionRequest::default()
            .with_from(from)
            .with_to(payload.to)
            .with_input(payload.data.clone())
            .with_value(payload.value)
            .with_nonce(nonce)
            .with_chain_id(chain_id)
            .with_gas_price(gas_price);

        let gas_limit = match payload.gas_limit {
            Some(limit) => limit,
            None => estimate_gas_with_buffer(&self.provider, &request, None).await?,
        };
        request.set_gas_limit(gas_limit);

        let envelope =
            <TransactionRequest as TransactionBuilder<Ethereum>>::build(request, &self.wallet)
                .await
                .map_err(|e| RelayError::Signing(e.to_string()))?;

        let signed = SignedTransaction::evm(envelope.encoded_2718());
        debug!(
            tx_hash = %signed.id(),
            nonce = nonce,
            gas_limit = gas_limit,
            event = "evm_transaction_signed"
        );
        Ok(signed)
    }
}
