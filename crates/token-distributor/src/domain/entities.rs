//! # Core Domain Entities
//!
//! Main business entities of the distribution engine: the persistent owner
//! state, the call context and the call-scoped distribution request.

use crate::domain::value_objects::{Address, U256};
use crate::errors::DistributorError;
use serde::{Deserialize, Serialize};

// =============================================================================
// CALL CONTEXT
// =============================================================================

/// Context of a single inbound call.
///
/// `caller` is the authenticated identity invoking the engine and `value` is
/// the native value attached to the call. Only the native path accepts a
/// non-zero `value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// Identity invoking the operation.
    pub caller: Address,
    /// Native value pledged with the call.
    pub value: U256,
}

impl CallContext {
    /// Creates a context with no attached value.
    #[must_use]
    pub fn new(caller: Address) -> Self {
        Self {
            caller,
            value: U256::zero(),
        }
    }

    /// Attaches native value to the call.
    #[must_use]
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

// =============================================================================
// DISTRIBUTION REQUEST
// =============================================================================

/// A call-scoped fan-out request.
///
/// `receivers[i]` is paid `amounts[i]`. The two sequences are only guaranteed
/// to have equal length after [`crate::domain::services::validate_request`]
/// has accepted the request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionRequest {
    /// Receiver identities, in payout order.
    pub receivers: Vec<Address>,
    /// Amounts, positionally paired with `receivers`.
    pub amounts: Vec<U256>,
}

impl DistributionRequest {
    /// Creates a request from its two sequences.
    #[must_use]
    pub fn new(receivers: Vec<Address>, amounts: Vec<U256>) -> Self {
        Self { receivers, amounts }
    }

    /// Number of payouts (receivers side).
    #[must_use]
    pub fn len(&self) -> usize {
        self.receivers.len()
    }

    /// Returns true if the request pays nobody.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receivers.is_empty()
    }

    /// Iterates `(receiver, amount)` pairs in order.
    pub fn payouts(&self) -> impl Iterator<Item = Payout> + '_ {
        self.receivers
            .iter()
            .zip(self.amounts.iter())
            .map(|(&receiver, &amount)| Payout { receiver, amount })
    }

    /// Sum of all amounts, or `None` if it does not fit in 256 bits.
    #[must_use]
    pub fn total(&self) -> Option<U256> {
        self.amounts
            .iter()
            .try_fold(U256::zero(), |acc, amount| acc.checked_add(*amount))
    }
}

/// A single `(receiver, amount)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    /// Receiving identity.
    pub receiver: Address,
    /// Amount paid to `receiver`.
    pub amount: U256,
}

// =============================================================================
// DISTRIBUTION KIND
// =============================================================================

/// Which asset a distribution moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    /// A custodial token held in an external ledger.
    Token {
        /// Identity of the token ledger.
        ledger: Address,
    },
    /// The native settlement asset.
    Native,
}

// =============================================================================
// OWNER STATE
// =============================================================================

/// Persistent state of an engine instance.
///
/// The owner is the only field that survives across calls. It is never the
/// zero address and is only written by [`DistributorState::transfer_ownership`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistributorState {
    address: Address,
    owner: Address,
}

impl DistributorState {
    /// Creates the state of a freshly deployed engine.
    ///
    /// # Errors
    ///
    /// `InvalidOwner` if `initial_owner` is the zero address.
    pub fn new(address: Address, initial_owner: Address) -> Result<Self, DistributorError> {
        if initial_owner.is_zero() {
            return Err(DistributorError::InvalidOwner(initial_owner));
        }
        Ok(Self {
            address,
            owner: initial_owner,
        })
    }

    /// The engine's own identity on the ledgers.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Current owner.
    #[must_use]
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Access guard: fails unless `caller` is the owner.
    ///
    /// # Errors
    ///
    /// `Unauthorized` carrying the offending caller.
    pub fn ensure_owner(&self, caller: Address) -> Result<(), DistributorError> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(DistributorError::Unauthorized { caller })
        }
    }

    /// Replaces the owner. Returns the previous owner.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `caller` is not the owner, `InvalidOwner` if
    /// `new_owner` is the zero address. The state is untouched on error.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<Address, DistributorError> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(DistributorError::InvalidOwner(new_owner));
        }
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }
}

// =============================================================================
// TESTS
// =============================================================================
