// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use super::Commitment;
use crate::error::{RelayError, Result};

/// Configuration for broadcast and confirmation polling.
///
/// # Examples
///
/// ```rust
/// use swap_relay_rs::SubmitConfig;
/// use std::time::Duration;
///
/// // 60 status checks, 2 seconds apart, re-broadcasting every 2 seconds
/// let config = SubmitConfig::default();
///
/// let config = SubmitConfig::default()
///     .with_max_attempts(30)
///     .with_rebroadcast_interval(None);
/// assert_eq!(config.total_timeout(), Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitConfig {
    /// Delay before each status check.
    pub poll_interval: Duration,
    /// Period of the background re-broadcast; `None` broadcasts only once.
    pub rebroadcast_interval: Option<Duration>,
    /// Status checks before giving up with a timeout.
    pub max_attempts: u32,
    /// Wall-clock budget measured from the first broadcast.
    pub max_duration: Option<Duration>,
    pub commitment: Commitment,
}

impl Default for SubmitConfig {
    /// Solana-tuned defaults: a blockhash lives for roughly 60-90 seconds,
    /// so 60 checks two seconds apart outlive it and expiry wins over timeout.
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            rebroadcast_interval: Some(Duration::from_secs(2)),
            max_attempts: 60,
            max_duration: None,
            commitment: Commitment::Confirmed,
        }
    }
}

impl SubmitConfig {
    /// EVM chains have no freshness anchor and slower blocks; a raw
    /// transaction stays in the mempool so re-broadcasts can be sparse.
    pub fn evm() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            rebroadcast_interval: Some(Duration::from_secs(15)),
            max_attempts: 100,
            max_duration: None,
            commitment: Commitment::Confirmed,
        }
    }

    /// Aptos commits with finality and has an expiration timestamp anchor.
    pub fn aptos() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            rebroadcast_interval: Some(Duration::from_secs(5)),
            max_attempts: 60,
            max_duration: None,
            commitment: Commitment::Finalized,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_rebroadcast_interval(mut self, interval: Option<Duration>) -> Self {
        self.rebroadcast_interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_max_duration(mut self, duration: Duration) -> Self {
        self.max_duration = Some(duration);
        self
    }

    pub fn with_commitment(mut self, commitment: Commitment) -> Self {
        self.commitment = commitment;
        self
    }

    /// Upper bound of time spent polling, ignoring time spent in calls.
    pub fn total_timeout(&self) -> Duration {
        let by_attempts = self.poll_interval * self.max_attempts;
        match self.max_duration {
            Some(limit) => by_attempts.min(limit),
            None => by_attempts,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(RelayError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.rebroadcast_interval.is_some_and(|i| i.is_zero()) {
            return Err(RelayError::InvalidConfig(
                "rebroadcast_interval must be non-zero, use None to disable".to_string(),
            ));
        }
        Ok(())
    }
}
