// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! OpenTelemetry span helpers for relay operations
//!
//! Span names are static and prefixed with `swap_relay.`; everything variable
//! is a structured field. Spans that can fail declare `error.type`,
//! `error.message` and `error.context` up front so
//! [`record_error_with_context`] can fill them in.
//!
//! # Example
//!
//! ```rust,no_run
//! use swap_relay_rs::{spans, DomainId, TxId};
//!
//! let span = spans::await_attestation(DomainId::Ethereum, &TxId::new("0xburn"), 360, 5);
//! let _guard = span.enter();
//! // custom attestation logic here
//! ```

use std::time::Duration;

use tracing::Span;
use url::Url;

use crate::chain::Chain;
use crate::flow::Leg;
use crate::protocol::DomainId;
use crate::submit::{SubmitConfig, TxId};

/// Create span for one full submission.
///
/// Parent: flow leg span, if any
/// Children: swap_relay.rebroadcast, backend RPC spans
#[inline]
pub fn submit_and_confirm(tx_id: &TxId, backend: &str, config: &SubmitConfig) -> Span {
    tracing::info_span!(
        "swap_relay.submit_and_confirm",
        tx_id = %tx_id,
        backend = backend,
        max_attempts = config.max_attempts,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        commitment = %config.commitment,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for the background re-broadcast task.
///
/// Parent: swap_relay.submit_and_confirm
#[inline]
pub fn rebroadcast(tx_id: &TxId, backend: &str, interval: Duration) -> Span {
    tracing::debug_span!(
        "swap_relay.rebroadcast",
        tx_id = %tx_id,
        backend = backend,
        interval_ms = interval.as_millis() as u64,
    )
}

/// Create span for polling the attestation service.
///
/// Parent: flow leg span, if any
/// Children: swap_relay.get_messages (one per attempt)
#[inline]
pub fn await_attestation(
    domain: DomainId,
    tx_hash: &TxId,
    max_attempts: u32,
    poll_interval_secs: u64,
) -> Span {
    tracing::info_span!(
        "swap_relay.await_attestation",
        source_domain = domain.as_u32(),
        tx_hash = %tx_hash,
        max_attempts = max_attempts,
        poll_interval_secs = poll_interval_secs,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for a single attestation service request.
#[inline]
pub fn get_messages(url: &Url) -> Span {
    tracing::debug_span!("swap_relay.get_messages", url = %url)
}

/// Create span for a swap API request.
///
/// Children: HTTP client request spans
#[inline]
pub fn api_request(method: &str, url: &Url) -> Span {
    tracing::debug_span!(
        "swap_relay.api_request",
        http.method = method,
        http.url = %url,
        http.status_code = tracing::field::Empty,
    )
}

/// Create span for a JSON-RPC or REST call to a chain node.
#[inline]
pub fn rpc_call(method: &str, backend: &str) -> Span {
    tracing::trace_span!("swap_relay.rpc_call", rpc.method = method, rpc.backend = backend)
}

/// Create span for one leg of a swap or bridge flow.
///
/// Children: swap_relay.api_request, swap_relay.submit_and_confirm,
/// swap_relay.await_attestation
#[inline]
pub fn flow_leg(leg: Leg, chain: Chain) -> Span {
    tracing::info_span!(
        "swap_relay.flow_leg",
        leg = %leg,
        chain = %chain,
        tx_id = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Record error attributes on the current span.
///
/// Follows OpenTelemetry semantic conventions for error tracking:
/// - error.type: The error type/variant
/// - error.message: Human-readable error message
/// - error.context: Optional additional context
///
/// # Example
///
/// ```rust,no_run
/// use swap_relay_rs::spans;
///
/// # fn example() {
/// let span = tracing::info_span!("swap_relay.operation", error.type = tracing::field::Empty);
/// let _guard = span.enter();
///
/// if let Err(e) = some_operation() {
///     spans::record_error_with_context(
///         "TransactionFailed",
///         &format!("Failed to submit transaction: {}", e),
///         Some("Transaction may have been dropped from mempool"),
///     );
/// }
/// # }
/// # fn some_operation() -> Result<(), String> { Ok(()) }
/// ```
pub fn record_error_with_context(
    error_type: &str,
    error_message: &str,
    additional_context: Option<&str>,
) {
    let current_span = tracing::Span::current();
    current_span.record("error.type", error_type);
    current_span.record("error.message", error_message);
    current_span.record("otel.status_code", "ERROR");

    if let Some(context) = additional_context {
        current_span.record("error.context", context);
    }
}
