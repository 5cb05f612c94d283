// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Attestation-service domain numbering.
//!
//! Circle's attestation service keys every burn by the numeric domain of the
//! chain it happened on. These numbers are Circle's, not ours, and are only
//! reachable from [`Chain::cctp_domain`](crate::Chain::cctp_domain).
//!
//! Reference: <https://developers.circle.com/stablecoins/supported-domains>

use std::fmt;

/// CCTP domain identifier
///
/// # Example
///
/// ```rust
/// use swap_relay_rs::DomainId;
///
/// let domain: u32 = DomainId::Solana.into();
/// assert_eq!(domain, 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
#[non_exhaustive]
pub enum DomainId {
    Ethereum = 0,
    Avalanche = 1,
    Optimism = 2,
    Arbitrum = 3,
    Noble = 4,
    Solana = 5,
    Base = 6,
    Polygon = 7,
    Sui = 8,
    Aptos = 9,
    Unichain = 10,
    Linea = 11,
    Sonic = 13,
    WorldChain = 14,
    Sei = 16,
    BnbSmartChain = 17,
    HyperEvm = 19,
}

impl DomainId {
    /// Returns the numeric domain used in attestation-service URLs
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Attempts to create a DomainId from a u32 value
    ///
    /// ```rust
    /// use swap_relay_rs::DomainId;
    ///
    /// assert_eq!(DomainId::from_u32(9), Some(DomainId::Aptos));
    /// assert_eq!(DomainId::from_u32(12), None);
    /// ```
    #[inline]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Ethereum),
            1 => Some(Self::Avalanche),
            2 => Some(Self::Optimism),
            3 => Some(Self::Arbitrum),
            4 => Some(Self::Noble),
            5 => Some(Self::Solana),
            6 => Some(Self::Base),
            7 => Some(Self::Polygon),
            8 => Some(Self::Sui),
            9 => Some(Self::Aptos),
            10 => Some(Self::Unichain),
            11 => Some(Self::Linea),
            13 => Some(Self::Sonic),
            14 => Some(Self::WorldChain),
            16 => Some(Self::Sei),
            17 => Some(Self::BnbSmartChain),
            19 => Some(Self::HyperEvm),
            _ => None,
        }
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ethereum => "Ethereum",
            Self::Avalanche => "Avalanche",
            Self::Optimism => "Optimism",
            Self::Arbitrum => "Arbitrum",
            Self::Noble => "Noble",
            Self::Solana => "Solana",
            Self::Base => "Base",
            Self::Polygon => "Polygon",
            Self::Sui => "Sui",
            Self::Aptos => "Aptos",
            Self::Unichain => "Unichain",
            Self::Linea => "Linea",
            Self::Sonic => "Sonic",
            Self::WorldChain => "World Chain",
            Self::Sei => "Sei",
            Self::BnbSmartChain => "BNB Smart Chain",
            Self::HyperEvm => "HyperEVM",
        }
    }
}

impl From<DomainId> for u32 {
    #[inline]
    fn from(domain: DomainId) -> Self {
        domain.as_u32()
    }
}

impl TryFrom<u32> for DomainId {
    type Error = InvalidDomainId;

    #[inline]
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_u32(value).ok_or(InvalidDomainId(value))
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u32())
    }
}

/// Error returned when a u32 is not a known domain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDomainId(pub u32);

impl fmt::Display for InvalidDomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid CCTP domain ID: {}", self.0)
    }
}

impl std::error::Error for InvalidDomainId {}
