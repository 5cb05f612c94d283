// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use alloy_primitives::{hex::FromHex, Bytes};
use serde::{Deserialize, Deserializer};

/// Response of the attestation service's `/v1/messages/{domain}/{txHash}`
/// endpoint.
///
/// A burn transaction can emit several messages, so the service returns a
/// list. While the attestation is not ready the `attestation` field is the
/// literal string `"PENDING"`.
///
/// # Example Response
///
/// ```json
/// {
///   "messages": [
///     {
///       "attestation": "0x...",
///       "message": "0x...",
///       "eventNonce": "9682"
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub messages: Vec<AttestedMessage>,
}

impl MessagesResponse {
    /// The first message whose attestation has been issued, if any.
    pub fn first_ready(&self) -> Option<AttestationRecord> {
        self.messages.iter().find_map(AttestedMessage::ready)
    }

    /// Whether the service reports any of the messages as failed.
    pub fn has_failed(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.status == Some(AttestationStatus::Failed))
    }
}

/// A single message of a [`MessagesResponse`]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestedMessage {
    /// Only some deployments of the service report a status; the
    /// attestation field is authoritative.
    #[serde(default)]
    pub status: Option<AttestationStatus>,

    #[serde(default, deserialize_with = "deserialize_optional_bytes_or_pending")]
    pub message: Option<Bytes>,

    #[serde(default, deserialize_with = "deserialize_optional_bytes_or_pending")]
    pub attestation: Option<Bytes>,

    #[serde(default)]
    pub event_nonce: Option<String>,
}

impl AttestedMessage {
    fn ready(&self) -> Option<AttestationRecord> {
        match (&self.message, &self.attestation) {
            (Some(message), Some(attestation)) => Some(AttestationRecord {
                message: message.clone(),
                attestation: attestation.clone(),
            }),
            _ => None,
        }
    }
}

/// Message bytes plus Circle's signature over them, consumed exactly once by
/// the claim step on the destination chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationRecord {
    pub message: Bytes,
    pub attestation: Bytes,
}

/// Treats `"PENDING"`, empty strings and null as "not there yet"
///
/// - Valid hex string (with or without "0x") → `Some(Bytes)`
/// - "PENDING" or "pending" → `None`
/// - null or missing field → `None`
/// - Empty string → `None`
/// - Invalid hex → error
fn deserialize_optional_bytes_or_pending<'de, D>(deserializer: D) -> Result<Option<Bytes>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;

    match opt {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("pending") => Ok(None),
        Some(s) => {
            let bytes = Bytes::from_hex(s).map_err(serde::de::Error::custom)?;
            Ok(Some(bytes))
        }
    }
}

/// Status of the attestation.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttestationStatus {
    Complete,
    Pending,
    PendingConfirmations,
    Failed,
}
