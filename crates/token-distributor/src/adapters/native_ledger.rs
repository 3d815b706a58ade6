//! # Native Ledger Adapter
//!
//! In-memory native balance ledger for testing. Receivers can be marked as
//! refusing incoming value, which models an account whose receive hook
//! reverts.

use crate::adapters::journal::Journal;
use crate::domain::value_objects::{Address, U256};
use crate::errors::LedgerError;
use crate::ports::outbound::{NativeLedger, NativeSession, Session};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex as Gate, OwnedMutexGuard};

#[derive(Debug, Default)]
struct NativeBook {
    balances: HashMap<Address, U256>,
}

impl NativeBook {
    fn balance(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    /// Writes `writes` in order and returns the previous balances.
    fn apply(&mut self, writes: Vec<(Address, U256)>) -> Vec<(Address, U256)> {
        writes
            .into_iter()
            .map(|(account, value)| {
                let previous = self.balance(account);
                self.balances.insert(account, value);
                (account, previous)
            })
            .collect()
    }
}

#[derive(Debug, Default)]
struct NativeShared {
    book: RwLock<NativeBook>,
    refusing: RwLock<HashSet<Address>>,
    /// Held by every writer; a session holds it until it closes.
    gate: Arc<Gate<()>>,
}

impl NativeShared {
    /// Moves native value and returns the previous balances it overwrote.
    fn apply_transfer(
        &self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<Vec<(Address, U256)>, LedgerError> {
        if self.refusing.read().contains(&to) {
            return Err(LedgerError::ReceiverRejected(to));
        }

        let mut book = self.book.write();
        let available = book.balance(from);
        let debited = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                account: from,
                required: amount,
                available,
            })?;
        let base = if to == from { debited } else { book.balance(to) };
        let credited = base
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow(to))?;
        Ok(book.apply(vec![(from, debited), (to, credited)]))
    }
}

/// In-memory native settlement ledger.
#[derive(Debug, Default)]
pub struct InMemoryNativeLedger {
    shared: Arc<NativeShared>,
}

impl InMemoryNativeLedger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set balance for an address.
    pub async fn set_balance(&self, account: Address, balance: U256) {
        let _gate = self.shared.gate.lock().await;
        self.shared.book.write().apply(vec![(account, balance)]);
    }

    /// Makes `account` refuse every incoming transfer.
    pub fn refuse_incoming(&self, account: Address) {
        self.shared.refusing.write().insert(account);
    }

    /// Makes `account` accept incoming transfers again.
    pub fn accept_incoming(&self, account: Address) {
        self.shared.refusing.write().remove(&account);
    }

    /// Whether a session currently holds the ledger.
    #[must_use]
    pub fn has_open_session(&self) -> bool {
        self.shared.gate.try_lock().is_err()
    }
}

#[async_trait]
impl NativeLedger for InMemoryNativeLedger {
    async fn balance(&self, account: Address) -> Result<U256, LedgerError> {
        Ok(self.shared.book.read().balance(account))
    }

    async fn transfer(&self, from: Address, to: Address, amount: U256) -> Result<(), LedgerError> {
        let _gate = self.shared.gate.lock().await;
        self.shared.apply_transfer(from, to, amount).map(drop)
    }

    async fn open_session(&self) -> Result<Box<dyn NativeSession>, LedgerError> {
        let gate = Arc::clone(&self.shared.gate).lock_owned().await;
        Ok(Box::new(InMemoryNativeSession {
            shared: Arc::clone(&self.shared),
            journal: Mutex::new(Journal::default()),
            _gate: gate,
        }))
    }
}

/// Exclusive session on an [`InMemoryNativeLedger`].
struct InMemoryNativeSession {
    shared: Arc<NativeShared>,
    /// Previous balances, keyed by account.
    journal: Mutex<Journal<(Address, U256)>>,
    _gate: OwnedMutexGuard<()>,
}

impl Session for InMemoryNativeSession {
    fn commit(self: Box<Self>) {
        self.journal.lock().clear();
    }

    fn revert(self: Box<Self>) {
        drop(self);
    }
}

impl Drop for InMemoryNativeSession {
    fn drop(&mut self) {
        let undo = self.journal.get_mut().unwind();
        if !undo.is_empty() {
            self.shared.book.write().apply(undo);
        }
    }
}

#[async_trait]
impl NativeSession for InMemoryNativeSession {
    async fn balance(&self, account: Address) -> Result<U256, LedgerError> {
        Ok(self.shared.book.read().balance(account))
    }

    async fn transfer(&self, from: Address, to: Address, amount: U256) -> Result<(), LedgerError> {
        let previous = self.shared.apply_transfer(from, to, amount)?;
        let mut journal = self.journal.lock();
        for entry in previous {
            journal.record(entry);
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
