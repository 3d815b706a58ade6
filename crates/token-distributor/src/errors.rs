//! # Error Types
//!
//! All error types for the distribution engine and its ledger ports.

use crate::domain::value_objects::{Address, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// ERROR CATEGORY
// =============================================================================

/// Machine-checkable classification of a failed call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Wrong caller or invalid owner.
    Authorization,
    /// Malformed request.
    Validation,
    /// Allowance, balance or attached value does not cover the request.
    Funds,
    /// A collaborator or the environment aborted the call.
    Execution,
}

impl ErrorCategory {
    /// Lowercase label, used in logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorization => "authorization",
            Self::Validation => "validation",
            Self::Funds => "funds",
            Self::Execution => "execution",
        }
    }
}

// =============================================================================
// DISTRIBUTOR ERRORS
// =============================================================================

/// Errors returned by distributor operations.
///
/// Every variant aborts the whole call: no ledger change made during the call
/// survives and no event is committed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DistributorError {
    /// Caller is not the owner.
    #[error("unauthorized account: {caller:?}")]
    Unauthorized { caller: Address },

    /// Proposed owner is the zero address.
    #[error("invalid owner: {0:?}")]
    InvalidOwner(Address),

    /// Receivers and amounts differ in length.
    #[error("Receivers and amounts must have the same length.")]
    LengthMismatch { receivers: usize, amounts: usize },

    /// Sum of amounts does not fit in 256 bits.
    #[error("total amount overflows 256 bits")]
    AmountOverflow,

    /// The token ledger refused a delegated transfer for lack of allowance.
    #[error("Insufficient allowance granted to contract.")]
    InsufficientAllowance { required: U256, available: U256 },

    /// A debited account cannot cover the transfer.
    #[error("insufficient balance for {account:?}: required {required}, available {available}")]
    InsufficientBalance {
        account: Address,
        required: U256,
        available: U256,
    },

    /// Value was attached to a call that does not accept any.
    #[error("operation is not payable: {attached} attached")]
    NonPayable { attached: U256 },

    /// Attached native value differs from the request total.
    #[error("Attached value does not match the total amount.")]
    ValueMismatch { attached: U256, total: U256 },

    /// No token ledger is registered under this identity.
    #[error("unknown asset ledger: {0:?}")]
    UnknownLedger(Address),

    /// The token ledger returned `false` for a transfer.
    #[error("token ledger rejected transfer to {receiver:?}")]
    TransferRejected { receiver: Address },

    /// A receiver refused incoming native value.
    #[error("receiver {0:?} refused incoming value")]
    ReceiverRejected(Address),

    /// Request exceeds the per-call transfer budget.
    #[error("too many transfers: {count} > {max}")]
    TooManyTransfers { count: usize, max: usize },

    /// Interaction phase did not finish in time.
    #[error("execution timeout after {max_ms}ms")]
    Timeout { max_ms: u64 },

    /// A post-call invariant failed.
    #[error("invariant violated: {0}")]
    InvariantViolated(String),

    /// Any other ledger failure.
    #[error("ledger error: {0}")]
    Ledger(LedgerError),
}

impl DistributorError {
    /// Category this error belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Unauthorized { .. } | Self::InvalidOwner(_) => ErrorCategory::Authorization,
            Self::LengthMismatch { .. } | Self::AmountOverflow => ErrorCategory::Validation,
            Self::InsufficientAllowance { .. }
            | Self::InsufficientBalance { .. }
            | Self::NonPayable { .. }
            | Self::ValueMismatch { .. } => ErrorCategory::Funds,
            Self::UnknownLedger(_)
            | Self::TransferRejected { .. }
            | Self::ReceiverRejected(_)
            | Self::TooManyTransfers { .. }
            | Self::Timeout { .. }
            | Self::InvariantViolated(_)
            | Self::Ledger(_) => ErrorCategory::Execution,
        }
    }
}

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Errors raised by a token or native ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Debited account balance is too low.
    #[error("insufficient balance for {account:?}: required {required}, available {available}")]
    InsufficientBalance {
        account: Address,
        required: U256,
        available: U256,
    },

    /// Spender's allowance over `owner` is too low.
    #[error("insufficient allowance: {spender:?} over {owner:?}, required {required}, available {available}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        required: U256,
        available: U256,
    },

    /// Receiver refused incoming value.
    #[error("receiver {0:?} refused incoming value")]
    ReceiverRejected(Address),

    /// Credit would overflow the receiver's balance.
    #[error("balance overflow for {0:?}")]
    BalanceOverflow(Address),

    /// Ledger cannot be reached.
    #[error("ledger unavailable")]
    Unavailable,

    /// Other ledger error.
    #[error("ledger error: {0}")]
    Other(String),
}

impl From<LedgerError> for DistributorError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientAllowance {
                required,
                available,
                ..
            } => DistributorError::InsufficientAllowance {
                required,
                available,
            },
            LedgerError::InsufficientBalance {
                account,
                required,
                available,
            } => DistributorError::InsufficientBalance {
                account,
                required,
                available,
            },
            LedgerError::ReceiverRejected(receiver) => DistributorError::ReceiverRejected(receiver),
            other => DistributorError::Ledger(other),
        }
    }
}

// =============================================================================
// IPC ERRORS
// =============================================================================

/// Errors raised while decoding inbound requests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IpcError {
    /// Payload could not be decoded.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Topic is not served by this handler.
    #[error("unknown topic: {0}")]
    UnknownTopic(String),
}

// =============================================================================
// TESTS
// =============================================================================
