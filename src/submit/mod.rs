// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Broadcast a signed transaction and wait for it to land.
//!
//! [`Submitter::submit_and_confirm`] is the single loop every chain goes
//! through: one broadcast, a background re-broadcast of the same bytes, and a
//! status poll that ends in confirmation, rejection, expiry or timeout.

mod config;
mod rebroadcast;
mod status;
mod submitter;
mod transaction;

pub use config::SubmitConfig;
pub use status::{Commitment, Rejection, TxStatus};
pub use submitter::Submitter;
pub use transaction::{FreshnessAnchor, SignedTransaction, TxId};

pub(crate) use transaction::SubmissionAttempt;
