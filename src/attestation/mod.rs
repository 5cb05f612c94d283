// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Polling the attestation service for a burn's signed message.

mod config;
mod poller;

pub use config::{
    PollingConfig, DEFAULT_RATE_LIMIT_BACKOFF_SECS, IRIS_API, IRIS_API_SANDBOX, MESSAGES_PATH_V1,
};
pub use poller::AttestationPoller;
