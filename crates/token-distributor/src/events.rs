//! # Event Schema
//!
//! Events committed by the distribution engine and the IPC payloads served by
//! [`crate::adapters::DistributorEventHandler`].
//!
//! ## Envelope-Only Identity
//!
//! Request payloads carry NO caller field. The calling identity is taken from
//! the envelope the payload arrived in, never from the payload itself.

use crate::domain::services::keccak256;
use crate::domain::value_objects::{Address, Hash, U256};
use crate::errors::ErrorCategory;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ENGINE EVENTS
// =============================================================================

/// Event emitted by a successful call.
///
/// Events are buffered during a call and only appended to the engine's log
/// once the call commits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistributorEvent {
    /// Ownership moved to a new identity.
    OwnershipTransferred {
        /// Owner before the call.
        previous_owner: Address,
        /// Owner after the call.
        new_owner: Address,
    },
    /// A custodial token was fanned out.
    TokensDistributed {
        /// Token ledger identity.
        ledger: Address,
        /// Paying identity.
        caller: Address,
        /// Sum of payouts.
        total: U256,
        /// Number of payouts.
        receivers: usize,
    },
    /// Attached native value was split.
    NativeDistributed {
        /// Paying identity.
        caller: Address,
        /// Sum of payouts (equal to the attached value).
        total: U256,
        /// Number of payouts.
        receivers: usize,
    },
}

impl DistributorEvent {
    /// Canonical signature of the event.
    #[must_use]
    pub fn signature(&self) -> &'static str {
        match self {
            Self::OwnershipTransferred { .. } => "OwnershipTransferred(address,address)",
            Self::TokensDistributed { .. } => "TokensDistributed(address,address,uint256,uint256)",
            Self::NativeDistributed { .. } => "NativeDistributed(address,uint256,uint256)",
        }
    }

    /// Topic 0 of the event: keccak256 of its signature.
    #[must_use]
    pub fn topic(&self) -> Hash {
        keccak256(self.signature().as_bytes())
    }
}

// =============================================================================
// INBOUND REQUESTS
// =============================================================================

/// Request to fan out a custodial token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DistributeTokenRequestPayload {
    // NO caller - identity comes from the envelope
    /// Token ledger identity.
    pub ledger: Address,
    /// Receivers in payout order.
    pub receivers: Vec<Address>,
    /// Amounts paired with `receivers`.
    pub amounts: Vec<U256>,
}

/// Request to split attached native value.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DistributeNativeRequestPayload {
    /// Receivers in payout order.
    pub receivers: Vec<Address>,
    /// Amounts paired with `receivers`.
    pub amounts: Vec<U256>,
    /// Native value attached to the call.
    pub value: U256,
}

/// Request to hand over ownership.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferOwnershipRequestPayload {
    /// Proposed owner.
    pub new_owner: Address,
}

// =============================================================================
// OUTBOUND RESPONSES
// =============================================================================

/// Response to any distributor request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributorResponsePayload {
    /// Correlation ID of the request.
    pub correlation_id: Uuid,
    /// Whether the call committed.
    pub success: bool,
    /// Total moved (zero on failure and for ownership transfers).
    pub total: U256,
    /// Events committed by the call.
    pub events: Vec<DistributorEvent>,
    /// Failure class (if failed).
    pub category: Option<ErrorCategory>,
    /// Revert reason (if failed).
    pub revert_reason: Option<String>,
}

// =============================================================================
// EVENT BUS TOPICS
// =============================================================================

/// Topics served and published by the distributor.
pub mod topics {
    /// Topic for custodial token distribution requests.
    pub const DISTRIBUTE_TOKEN_REQUEST: &str = "distributor.token.request";

    /// Topic for native value distribution requests.
    pub const DISTRIBUTE_NATIVE_REQUEST: &str = "distributor.native.request";

    /// Topic for ownership transfer requests.
    pub const TRANSFER_OWNERSHIP_REQUEST: &str = "distributor.ownership.request";

    /// Topic for publishing responses.
    pub const RESPONSE: &str = "distributor.response";
}

// =============================================================================
// TESTS
// =============================================================================
