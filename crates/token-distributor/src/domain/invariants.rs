//! # Domain Invariants
//!
//! Post-conditions checked after the interaction phase of every distribution,
//! before the ledger session is committed. A violation reverts the call.
//!
//! - No residual balance: the engine holds the same balance before and after.
//! - Exact debit: the caller loses exactly the total, less whatever it paid
//!   to itself.

use crate::domain::value_objects::U256;

// =============================================================================
// AUDIT INPUT
// =============================================================================

/// Balances of the two parties the engine is accountable for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BalanceSnapshot {
    /// Caller's balance.
    pub caller: U256,
    /// Engine's own balance.
    pub engine: U256,
}

/// Everything needed to audit one completed fan-out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementAudit {
    /// Validated total of the request.
    pub total: U256,
    /// Part of the total whose receiver is the caller itself.
    pub paid_to_caller: U256,
    /// Balances before the first transfer.
    pub before: BalanceSnapshot,
    /// Balances after the last transfer.
    pub after: BalanceSnapshot,
}

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// The engine never keeps value across a call.
#[must_use]
pub fn check_no_residual_invariant(audit: &SettlementAudit) -> bool {
    audit.before.engine == audit.after.engine
}

/// The caller is debited exactly `total - paid_to_caller`.
#[must_use]
pub fn check_caller_debit_invariant(audit: &SettlementAudit) -> bool {
    let expected = audit.total.checked_sub(audit.paid_to_caller);
    let actual = audit.before.caller.checked_sub(audit.after.caller);
    expected.is_some() && expected == actual
}

/// Check all invariants at once.
#[must_use]
pub fn check_all_invariants(audit: &SettlementAudit) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_no_residual_invariant(audit) {
        violations.push(InvariantViolation::ResidualBalance {
            before: audit.before.engine,
            after: audit.after.engine,
        });
    }

    if !check_caller_debit_invariant(audit) {
        violations.push(InvariantViolation::CallerDebitMismatch {
            before: audit.before.caller,
            after: audit.after.caller,
            total: audit.total,
        });
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The engine's balance changed over the call.
    ResidualBalance { before: U256, after: U256 },
    /// The caller was not debited exactly the total.
    CallerDebitMismatch {
        before: U256,
        after: U256,
        total: U256,
    },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResidualBalance { before, after } => {
                write!(f, "engine balance changed: {before} -> {after}")
            }
            Self::CallerDebitMismatch {
                before,
                after,
                total,
            } => {
                write!(
                    f,
                    "caller debit mismatch: {before} -> {after} for total {total}"
                )
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
