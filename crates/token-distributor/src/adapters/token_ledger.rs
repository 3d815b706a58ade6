//! # Token Ledger Adapter
//!
//! In-memory fungible-token ledger for testing and local runs.
//! Production deployments point the engine at a real token ledger through the
//! same `TokenLedger` port.
//!
//! Semantics follow the usual delegated-spend token contract:
//! - `transfer_from` checks allowance first, then balance
//! - an allowance of `U256::MAX` is never decremented
//! - `approve` overwrites the previous allowance
//! - every new value is computed before anything is written, so a failed
//!   call changes nothing

use crate::adapters::journal::Journal;
use crate::domain::value_objects::{Address, U256};
use crate::errors::LedgerError;
use crate::ports::outbound::{Session, TokenLedger, TokenSession};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex as Gate, OwnedMutexGuard};

/// A single ledger slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Balance(Address),
    Allowance { owner: Address, spender: Address },
    Supply,
}

#[derive(Debug, Default)]
struct TokenBook {
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    total_supply: U256,
}

impl TokenBook {
    fn balance(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn read(&self, slot: Slot) -> U256 {
        match slot {
            Slot::Balance(account) => self.balance(account),
            Slot::Allowance { owner, spender } => self.allowance(owner, spender),
            Slot::Supply => self.total_supply,
        }
    }

    /// Writes `writes` in order and returns the previous value of each slot.
    fn apply(&mut self, writes: Vec<(Slot, U256)>) -> Vec<(Slot, U256)> {
        let mut previous = Vec::with_capacity(writes.len());
        for (slot, value) in writes {
            previous.push((slot, self.read(slot)));
            match slot {
                Slot::Balance(account) => {
                    self.balances.insert(account, value);
                }
                Slot::Allowance { owner, spender } => {
                    self.allowances.insert((owner, spender), value);
                }
                Slot::Supply => self.total_supply = value,
            }
        }
        previous
    }

    fn plan_spend(
        &self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<Option<(Slot, U256)>, LedgerError> {
        let current = self.allowance(owner, spender);
        if current == U256::MAX {
            return Ok(None);
        }
        let remaining = current
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientAllowance {
                owner,
                spender,
                required: amount,
                available: current,
            })?;
        Ok(Some((Slot::Allowance { owner, spender }, remaining)))
    }

    fn plan_move(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<[(Slot, U256); 2], LedgerError> {
        let available = self.balance(from);
        let debited = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                account: from,
                required: amount,
                available,
            })?;
        let base = if to == from { debited } else { self.balance(to) };
        let credited = base
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow(to))?;
        Ok([(Slot::Balance(from), debited), (Slot::Balance(to), credited)])
    }
}

#[derive(Debug, Default)]
struct TokenShared {
    book: RwLock<TokenBook>,
    /// Receivers for which `transfer`/`transfer_from` report `false`.
    silent_failures: RwLock<HashSet<Address>>,
    /// Held by every writer; a session holds it until it closes.
    gate: Arc<Gate<()>>,
}

impl TokenShared {
    /// Performs a transfer. `None` when the ledger reports `false`,
    /// otherwise the previous value of every written slot.
    fn apply_transfer(
        &self,
        spender: Option<Address>,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<Option<Vec<(Slot, U256)>>, LedgerError> {
        if self.silent_failures.read().contains(&to) {
            return Ok(None);
        }

        let mut book = self.book.write();
        let mut writes = Vec::with_capacity(3);
        if let Some(spender) = spender {
            writes.extend(book.plan_spend(from, spender, amount)?);
        }
        writes.extend(book.plan_move(from, to, amount)?);
        Ok(Some(book.apply(writes)))
    }
}

/// In-memory token ledger.
#[derive(Debug, Default)]
pub struct InMemoryTokenLedger {
    shared: Arc<TokenShared>,
}

impl InMemoryTokenLedger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `amount` new units for `account`.
    ///
    /// # Errors
    ///
    /// `BalanceOverflow` if the supply or the balance would overflow.
    pub async fn mint(&self, account: Address, amount: U256) -> Result<(), LedgerError> {
        let _gate = self.shared.gate.lock().await;
        let mut book = self.shared.book.write();
        let supply = book
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow(account))?;
        let balance = book
            .balance(account)
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow(account))?;
        book.apply(vec![(Slot::Supply, supply), (Slot::Balance(account), balance)]);
        Ok(())
    }

    /// Total units in circulation.
    #[must_use]
    pub fn total_supply(&self) -> U256 {
        self.shared.book.read().total_supply
    }

    /// Makes transfers to `receiver` return `false` instead of failing.
    pub fn fail_silently_for(&self, receiver: Address) {
        self.shared.silent_failures.write().insert(receiver);
    }

    /// Whether a session currently holds the ledger.
    #[must_use]
    pub fn has_open_session(&self) -> bool {
        self.shared.gate.try_lock().is_err()
    }
}

#[async_trait]
impl TokenLedger for InMemoryTokenLedger {
    async fn balance_of(&self, account: Address) -> Result<U256, LedgerError> {
        Ok(self.shared.book.read().balance(account))
    }

    async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, LedgerError> {
        Ok(self.shared.book.read().allowance(owner, spender))
    }

    async fn approve(
        &self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<bool, LedgerError> {
        let _gate = self.shared.gate.lock().await;
        self.shared
            .book
            .write()
            .apply(vec![(Slot::Allowance { owner, spender }, amount)]);
        Ok(true)
    }

    async fn transfer(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<bool, LedgerError> {
        let _gate = self.shared.gate.lock().await;
        Ok(self.shared.apply_transfer(None, from, to, amount)?.is_some())
    }

    async fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<bool, LedgerError> {
        let _gate = self.shared.gate.lock().await;
        Ok(self
            .shared
            .apply_transfer(Some(spender), from, to, amount)?
            .is_some())
    }

    async fn open_session(&self) -> Result<Box<dyn TokenSession>, LedgerError> {
        let gate = Arc::clone(&self.shared.gate).lock_owned().await;
        Ok(Box::new(InMemoryTokenSession {
            shared: Arc::clone(&self.shared),
            journal: Mutex::new(Journal::default()),
            _gate: gate,
        }))
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Exclusive session on an [`InMemoryTokenLedger`].
struct InMemoryTokenSession {
    shared: Arc<TokenShared>,
    journal: Mutex<Journal<(Slot, U256)>>,
    _gate: OwnedMutexGuard<()>,
}

impl InMemoryTokenSession {
    fn journaled(
        &self,
        spender: Option<Address>,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<bool, LedgerError> {
        match self.shared.apply_transfer(spender, from, to, amount)? {
            Some(previous) => {
                let mut journal = self.journal.lock();
                for entry in previous {
                    journal.record(entry);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl Session for InMemoryTokenSession {
    fn commit(self: Box<Self>) {
        self.journal.lock().clear();
    }

    fn revert(self: Box<Self>) {
        drop(self);
    }
}

impl Drop for InMemoryTokenSession {
    fn drop(&mut self) {
        let undo = self.journal.get_mut().unwind();
        if !undo.is_empty() {
            self.shared.book.write().apply(undo);
        }
    }
}

#[async_trait]
impl TokenSession for InMemoryTokenSession {
    async fn balance_of(&self, account: Address) -> Result<U256, LedgerError> {
        Ok(self.shared.book.read().balance(account))
    }

    async fn transfer(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<bool, LedgerError> {
        self.journaled(None, from, to, amount)
    }

    async fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<bool, LedgerError> {
        self.journaled(Some(spender), from, to, amount)
    }
}

// =============================================================================
// TESTS
// =============================================================================
