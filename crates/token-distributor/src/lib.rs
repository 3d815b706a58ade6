//! # Token Distributor - Owner-Gated Batch Payouts
//!
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Fans out a custodial token, or native value attached to the call, from the
//! owner to many receivers in one atomic call. Either every payout lands or
//! none does.
//!
//! ## Operations
//!
//! | Operation | Guard | Moves |
//! |-----------|-------|-------|
//! | `distribute_token` | owner, non-payable | caller -> receivers via delegated transfers |
//! | `distribute_native` | owner, value == total | attached value -> receivers |
//! | `transfer_ownership` | owner, non-zero target | nothing |
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Owner is never zero | `domain/entities.rs` - `DistributorState` |
//! | Only the owner mutates | `domain/entities.rs` - `ensure_owner()` |
//! | Receivers and amounts pair up | `domain/services.rs` - `validate_request()` |
//! | Native value equals the total | `domain/services.rs` - `ensure_exact_value()` |
//! | Engine holds nothing after a call | `domain/invariants.rs` - `check_no_residual_invariant()` |
//! | Caller is debited exactly the total | `domain/invariants.rs` - `check_caller_debit_invariant()` |
//! | All-or-nothing | `service.rs` - exclusive session, then commit or revert |
//!
//! ## Execution Safety Limits
//!
//! | Limit | Default | Env |
//! |-------|---------|-----|
//! | `execution_timeout_ms` | 5000 | `QC_DISTRIBUTOR_TIMEOUT_MS` |
//! | `max_transfers_per_call` | 1024 | `QC_DISTRIBUTOR_MAX_TRANSFERS` |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `TokenLedger` | Balances, allowances, delegated transfers |
//! | `NativeLedger` | Native balances and transfers |
//! | `Session` | Exclusive ledger session, committed or reverted as a whole |
//!
//! ## Usage Example
//!
//! ```ignore
//! use token_distributor::prelude::*;
//!
//! let d = create_test_deployment(owner, ServiceConfig::default())?;
//! d.token.approve(owner, d.service.address(), U256::from(300)).await?;
//!
//! let receipt = d
//!     .service
//!     .distribute_token(CallContext::new(owner), d.token_address, vec![alice, bob], amounts)
//!     .await?;
//! assert_eq!(receipt.total, U256::from(300));
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        AssetKind, CallContext, DistributionRequest, DistributorState, Payout,
    };

    // Value objects
    pub use crate::domain::value_objects::{Address, Hash, U256};

    // Domain services
    pub use crate::domain::services::{
        check_transfer_limit, compute_deployment_address, ensure_exact_value, keccak256,
        validate_request,
    };

    // Invariants
    pub use crate::domain::invariants::{
        check_all_invariants, BalanceSnapshot, InvariantCheckResult, InvariantViolation,
        SettlementAudit,
    };

    // Ports
    pub use crate::ports::inbound::{DistributionReceipt, DistributorApi};
    pub use crate::ports::outbound::{
        NativeLedger, NativeSession, Session, TokenLedger, TokenSession,
    };

    // Events
    pub use crate::events::{
        topics, DistributeNativeRequestPayload, DistributeTokenRequestPayload, DistributorEvent,
        DistributorResponsePayload, TransferOwnershipRequestPayload,
    };

    // Errors
    pub use crate::errors::{DistributorError, ErrorCategory, IpcError, LedgerError};

    // Adapters
    pub use crate::adapters::{
        DistributorEventHandler, InMemoryNativeLedger, InMemoryTokenLedger, InboundMessage,
        OutboundMessage,
    };

    // Service
    pub use crate::service::{
        create_test_deployment, CustodialStrategy, DistributorService, ServiceConfig,
        ServiceStats, TestDeployment,
    };
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
