//! # Driving Ports (API - Inbound)
//!
//! The public API of the distribution engine. Every mutating operation runs
//! the access guard first, then the request validator, then exactly one
//! distribution path.

use crate::domain::entities::{AssetKind, CallContext, Payout};
use crate::domain::value_objects::{Address, U256};
use crate::errors::DistributorError;
use crate::events::DistributorEvent;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// DISTRIBUTION RECEIPT
// =============================================================================

/// Outcome of a successful distribution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionReceipt {
    /// Correlation ID of the call.
    pub correlation_id: Uuid,
    /// Asset that was distributed.
    pub asset: AssetKind,
    /// Identity that paid.
    pub caller: Address,
    /// Sum of all payouts.
    pub total: U256,
    /// Payouts in execution order.
    pub payouts: Vec<Payout>,
    /// Events committed by the call.
    pub events: Vec<DistributorEvent>,
}

// =============================================================================
// DISTRIBUTOR API (Primary Driving Port)
// =============================================================================

/// Primary API of a distribution engine.
///
/// ## Usage
///
/// ```ignore
/// let receipt = api
///     .distribute_token(CallContext::new(owner), usdc, vec![alice, bob], amounts)
///     .await?;
/// assert_eq!(receipt.total, U256::from(300));
/// ```
#[async_trait]
pub trait DistributorApi: Send + Sync {
    /// The engine's own identity on the ledgers (the spender to approve).
    fn address(&self) -> Address;

    /// Current owner.
    async fn owner(&self) -> Address;

    /// Fans out a custodial token from the caller to every receiver.
    ///
    /// The caller must have approved at least the total to [`Self::address`]
    /// on `ledger`. Non-payable: `ctx.value` must be zero.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `NonPayable`, `LengthMismatch`, `AmountOverflow`,
    /// `UnknownLedger`, `InsufficientAllowance`, `InsufficientBalance`,
    /// `TransferRejected` and the environment aborts.
    async fn distribute_token(
        &self,
        ctx: CallContext,
        ledger: Address,
        receivers: Vec<Address>,
        amounts: Vec<U256>,
    ) -> Result<DistributionReceipt, DistributorError>;

    /// Splits the value attached to the call among the receivers.
    ///
    /// `ctx.value` must equal the total exactly.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `LengthMismatch`, `AmountOverflow`, `ValueMismatch`,
    /// `InsufficientBalance`, `ReceiverRejected` and the environment aborts.
    async fn distribute_native(
        &self,
        ctx: CallContext,
        receivers: Vec<Address>,
        amounts: Vec<U256>,
    ) -> Result<DistributionReceipt, DistributorError>;

    /// Hands ownership to `new_owner`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` is not the owner, `InvalidOwner` if
    /// `new_owner` is the zero address.
    async fn transfer_ownership(
        &self,
        caller: Address,
        new_owner: Address,
    ) -> Result<DistributorEvent, DistributorError>;
}
