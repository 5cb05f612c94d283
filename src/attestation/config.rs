// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{RelayError, Result};

/// Attestation service environment URLs
///
/// See <https://developers.circle.com/stablecoins/cctp-apis>
pub const IRIS_API: &str = "https://iris-api.circle.com";
pub const IRIS_API_SANDBOX: &str = "https://iris-api-sandbox.circle.com";

/// Messages lookup path: `/v1/messages/{sourceDomain}/{txHash}`
pub const MESSAGES_PATH_V1: &str = "/v1/messages/";

/// Seconds to back off after a 429 that carries no `Retry-After`.
pub const DEFAULT_RATE_LIMIT_BACKOFF_SECS: u64 = 300;

/// Configuration for attestation polling behavior.
///
/// # Examples
///
/// ```rust
/// use swap_relay_rs::PollingConfig;
///
/// // 360 attempts, 5 seconds apart
/// let config = PollingConfig::default();
///
/// let config = PollingConfig::default()
///     .with_max_attempts(20)
///     .with_poll_interval_secs(30);
///
/// // 150 attempts, 2 seconds apart
/// let config = PollingConfig::fast();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    /// Maximum number of lookups before giving up.
    pub max_attempts: u32,
    /// Seconds to wait between lookups.
    pub poll_interval_secs: u64,
}

impl Default for PollingConfig {
    /// 30 minutes in total, which covers hard-finality burns on Ethereum.
    fn default() -> Self {
        Self {
            max_attempts: 360,
            poll_interval_secs: 5,
        }
    }
}

impl PollingConfig {
    /// For burns from chains with fast finality, or fast transfers.
    pub fn fast() -> Self {
        Self {
            max_attempts: 150,
            poll_interval_secs: 2,
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    /// Returns the total maximum wait time in seconds, not counting
    /// rate-limit back-off.
    ///
    /// # Example
    ///
    /// ```rust
    /// use swap_relay_rs::PollingConfig;
    ///
    /// let config = PollingConfig::default();
    /// assert_eq!(config.total_timeout_secs(), 30 * 60);
    /// ```
    pub fn total_timeout_secs(&self) -> u64 {
        self.max_attempts as u64 * self.poll_interval_secs
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(RelayError::InvalidConfig(
                "attestation max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
