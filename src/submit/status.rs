// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// Confirmation level a submission waits for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Commitment {
    #[default]
    Confirmed,
    Finalized,
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed => f.write_str("confirmed"),
            Self::Finalized => f.write_str("finalized"),
        }
    }
}

/// What a status lookup reported for a transaction id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    /// Unknown to the node, or still only in a mempool.
    NotFound,
    Processed,
    Confirmed,
    Finalized,
    /// Included but failed on-chain.
    Failed(Rejection),
}

impl TxStatus {
    /// Whether the transaction is at or beyond `target`.
    pub fn reaches(&self, target: Commitment) -> bool {
        match self {
            Self::Finalized => true,
            Self::Confirmed => target == Commitment::Confirmed,
            Self::NotFound | Self::Processed | Self::Failed(_) => false,
        }
    }

    /// Included in a block, successful or not. A landed transaction no
    /// longer depends on its freshness anchor.
    pub fn is_landed(&self) -> bool {
        !matches!(self, Self::NotFound)
    }
}

/// Why a transaction failed on-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Output fell below the quote's minimum. Re-quote rather than retry.
    SlippageExceeded { detail: String },
    Reverted { detail: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlippageExceeded { detail } => write!(f, "slippage tolerance exceeded ({detail})"),
            Self::Reverted { detail } => write!(f, "reverted ({detail})"),
        }
    }
}
