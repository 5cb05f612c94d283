// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Chains the swap API routes between.
//!
//! [`Chain`] uses the aggregator's own chain identifiers on the wire. Every
//! chain-indexed table in the crate is an exhaustive `match` on it, so adding a
//! chain without a CCTP domain or a family does not compile.

use std::{fmt, str::FromStr};

use alloy_chains::NamedChain;
use serde::{Deserialize, Serialize};

use crate::error::RelayError;
use crate::DomainId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Solana,
    Ethereum,
    Bsc,
    Polygon,
    Avalanche,
    Arbitrum,
    Optimism,
    Base,
    Unichain,
    Linea,
    Sonic,
    Aptos,
    Sui,
}

/// Execution environment of a chain, which decides the backend and the
/// payload shape returned by the swap API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainFamily {
    Evm,
    Solana,
    Aptos,
    Sui,
}

impl Chain {
    pub const ALL: [Chain; 13] = [
        Chain::Solana,
        Chain::Ethereum,
        Chain::Bsc,
        Chain::Polygon,
        Chain::Avalanche,
        Chain::Arbitrum,
        Chain::Optimism,
        Chain::Base,
        Chain::Unichain,
        Chain::Linea,
        Chain::Sonic,
        Chain::Aptos,
        Chain::Sui,
    ];

    /// Identifier used by the swap API
    pub const fn as_str(self) -> &'static str {
        match self {
            Chain::Solana => "solana",
            Chain::Ethereum => "ethereum",
            Chain::Bsc => "bsc",
            Chain::Polygon => "polygon",
            Chain::Avalanche => "avalanche",
            Chain::Arbitrum => "arbitrum",
            Chain::Optimism => "optimism",
            Chain::Base => "base",
            Chain::Unichain => "unichain",
            Chain::Linea => "linea",
            Chain::Sonic => "sonic",
            Chain::Aptos => "aptos",
            Chain::Sui => "sui",
        }
    }

    pub const fn family(self) -> ChainFamily {
        match self {
            Chain::Solana => ChainFamily::Solana,
            Chain::Aptos => ChainFamily::Aptos,
            Chain::Sui => ChainFamily::Sui,
            Chain::Ethereum
            | Chain::Bsc
            | Chain::Polygon
            | Chain::Avalanche
            | Chain::Arbitrum
            | Chain::Optimism
            | Chain::Base
            | Chain::Unichain
            | Chain::Linea
            | Chain::Sonic => ChainFamily::Evm,
        }
    }

    /// The attestation service's domain for burns on this chain.
    ///
    /// This is the only chain → domain table in the crate.
    pub const fn cctp_domain(self) -> DomainId {
        match self {
            Chain::Ethereum => DomainId::Ethereum,
            Chain::Avalanche => DomainId::Avalanche,
            Chain::Optimism => DomainId::Optimism,
            Chain::Arbitrum => DomainId::Arbitrum,
            Chain::Solana => DomainId::Solana,
            Chain::Base => DomainId::Base,
            Chain::Polygon => DomainId::Polygon,
            Chain::Sui => DomainId::Sui,
            Chain::Aptos => DomainId::Aptos,
            Chain::Unichain => DomainId::Unichain,
            Chain::Linea => DomainId::Linea,
            Chain::Sonic => DomainId::Sonic,
            Chain::Bsc => DomainId::BnbSmartChain,
        }
    }

    /// The alloy chain for EVM chains, `None` otherwise
    pub const fn named_chain(self) -> Option<NamedChain> {
        match self {
            Chain::Ethereum => Some(NamedChain::Mainnet),
            Chain::Bsc => Some(NamedChain::BinanceSmartChain),
            Chain::Polygon => Some(NamedChain::Polygon),
            Chain::Avalanche => Some(NamedChain::Avalanche),
            Chain::Arbitrum => Some(NamedChain::Arbitrum),
            Chain::Optimism => Some(NamedChain::Optimism),
            Chain::Base => Some(NamedChain::Base),
            Chain::Unichain => Some(NamedChain::Unichain),
            Chain::Linea => Some(NamedChain::Linea),
            Chain::Sonic => Some(NamedChain::Sonic),
            Chain::Solana | Chain::Aptos | Chain::Sui => None,
        }
    }

    pub fn is_evm(self) -> bool {
        self.family() == ChainFamily::Evm
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chain::ALL
            .into_iter()
            .find(|chain| chain.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RelayError::ChainNotSupported {
                chain: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[test]
    fn test_every_chain_has_a_distinct_domain() {
        let domains: HashSet<_> = Chain::ALL.iter().map(|c| c.cctp_domain()).collect();
        assert_eq!(domains.len(), Chain::ALL.len());
    }

    #[rstest]
    #[case(Chain::Sui, 8)]
    #[case(Chain::Bsc, 17)]
    #[case(Chain::Aptos, 9)]
    #[case(Chain::Solana, 5)]
    #[case(Chain::Ethereum, 0)]
    #[case(Chain::Base, 6)]
    fn test_domain_mapping(#[case] chain: Chain, #[case] domain: u32) {
        assert_eq!(chain.cctp_domain().as_u32(), domain);
    }

    #[test]
    fn test_named_chain_only_for_evm() {
        for chain in Chain::ALL {
            assert_eq!(chain.named_chain().is_some(), chain.is_evm(), "{chain}");
        }
    }

    #[test]
    fn test_parse_roundtrips_wire_name() {
        for chain in Chain::ALL {
            assert_eq!(chain.as_str().parse::<Chain>().unwrap(), chain);
            let json = serde_json::to_string(&chain).unwrap();
            assert_eq!(json, format!("\"{}\"", chain.as_str()));
        }
        assert!(matches!(
            "tron".parse::<Chain>(),
            Err(RelayError::ChainNotSupported { .. })
        ));
    }
}
