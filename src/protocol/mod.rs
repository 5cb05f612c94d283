// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! CCTP protocol types: domain identifiers and attestation-service responses.

mod attestation;
mod domain_id;

pub use attestation::{AttestationRecord, AttestationStatus, AttestedMessage, MessagesResponse};
pub use domain_id::{DomainId, InvalidDomainId};
