//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the distribution engine depends on:
//! - Token ledgers holding custodial balances and delegated allowances
//! - The native settlement ledger
//! - Exclusive write sessions on either ledger, the environment's whole-call
//!   rollback hook
//!
//! The engine only consumes these contracts. Balance and allowance accounting
//! is entirely the ledger's business.

use crate::domain::value_objects::{Address, U256};
use crate::errors::LedgerError;
use async_trait::async_trait;

// =============================================================================
// SESSIONS (whole-call rollback)
// =============================================================================

/// Exclusive write session on a ledger.
///
/// While a session is open every other write to the same ledger waits for it
/// to close. Writes made through the session are kept by `commit` and undone
/// by `revert`. Dropping a session without committing it reverts it.
pub trait Session: Send + Sync {
    /// Keeps every write made through the session and closes it.
    fn commit(self: Box<Self>);

    /// Undoes every write made through the session and closes it.
    fn revert(self: Box<Self>);
}

/// Token ledger operations available inside a session.
#[async_trait]
pub trait TokenSession: Session {
    /// Balance of `account`.
    async fn balance_of(&self, account: Address) -> Result<U256, LedgerError>;

    /// Same as [`TokenLedger::transfer`], journaled in this session.
    async fn transfer(&self, from: Address, to: Address, amount: U256)
        -> Result<bool, LedgerError>;

    /// Same as [`TokenLedger::transfer_from`], journaled in this session.
    async fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<bool, LedgerError>;
}

/// Native ledger operations available inside a session.
#[async_trait]
pub trait NativeSession: Session {
    /// Native balance of `account`.
    async fn balance(&self, account: Address) -> Result<U256, LedgerError>;

    /// Same as [`NativeLedger::transfer`], journaled in this session.
    async fn transfer(&self, from: Address, to: Address, amount: U256)
        -> Result<(), LedgerError>;
}

// =============================================================================
// TOKEN LEDGER
// =============================================================================

/// A fungible-token ledger with delegated spending.
///
/// Identities that a real ledger would read from the message sender are
/// passed explicitly. A write that fails changes nothing.
#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Balance of `account`.
    async fn balance_of(&self, account: Address) -> Result<U256, LedgerError>;

    /// Amount `spender` may still move out of `owner`'s balance.
    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, LedgerError>;

    /// `owner` lets `spender` move up to `amount` (replaces any previous value).
    async fn approve(
        &self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<bool, LedgerError>;

    /// Moves `amount` from `from` to `to`, authorised by `from` itself.
    async fn transfer(&self, from: Address, to: Address, amount: U256)
        -> Result<bool, LedgerError>;

    /// Moves `amount` from `from` to `to` on behalf of `spender`,
    /// consuming `spender`'s allowance over `from`.
    ///
    /// # Errors
    ///
    /// `InsufficientAllowance` or `InsufficientBalance` when either does not
    /// cover `amount`.
    async fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<bool, LedgerError>;

    /// Opens an exclusive write session, waiting for any open one to close.
    async fn open_session(&self) -> Result<Box<dyn TokenSession>, LedgerError>;
}

// =============================================================================
// NATIVE LEDGER
// =============================================================================

/// The execution environment's own balance ledger.
#[async_trait]
pub trait NativeLedger: Send + Sync {
    /// Native balance of `account`.
    async fn balance(&self, account: Address) -> Result<U256, LedgerError>;

    /// Moves native value. A failed transfer changes nothing.
    ///
    /// # Errors
    ///
    /// `InsufficientBalance` if `from` cannot cover `amount`,
    /// `ReceiverRejected` if `to` refuses incoming value.
    async fn transfer(&self, from: Address, to: Address, amount: U256)
        -> Result<(), LedgerError>;

    /// Opens an exclusive write session, waiting for any open one to close.
    async fn open_session(&self) -> Result<Box<dyn NativeSession>, LedgerError>;
}
