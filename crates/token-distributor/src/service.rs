//! # Distributor Service
//!
//! The distribution engine. Wires the access guard, the request validator and
//! the two distribution paths over the ledger ports.
//!
//! ## Execution Order
//!
//! Every call holds the engine's call lock from start to finish, so calls on
//! one instance are totally ordered and never interleave. Within a call:
//!
//! 1. Access guard (before anything else is looked at)
//! 2. Request validation, transfer budget, value rules
//! 3. Exclusive ledger session, then every transfer in request order
//! 4. Post-call invariants, then commit, or revert on any failure
//!
//! Other writers to the ledger wait while the session is open, so a revert
//! only undoes the engine's own transfers.
//!
//! The owner is never written by a distribution, so nothing a ledger or a
//! receiver does during step 3 can change what steps 1-2 decided.

use crate::adapters::{InMemoryNativeLedger, InMemoryTokenLedger};
use crate::domain::entities::{AssetKind, CallContext, DistributionRequest, DistributorState};
use crate::domain::invariants::{
    check_all_invariants, BalanceSnapshot, InvariantCheckResult, SettlementAudit,
};
use crate::domain::services::{
    check_transfer_limit, compute_deployment_address, ensure_exact_value, validate_request,
};
use crate::domain::value_objects::{Address, U256};
use crate::errors::{DistributorError, ErrorCategory};
use crate::events::DistributorEvent;
use crate::metrics;
use crate::ports::inbound::{DistributionReceipt, DistributorApi};
use crate::ports::outbound::{NativeLedger, NativeSession, Session, TokenLedger, TokenSession};

use async_trait::async_trait;
use std::collections::HashMap;
use std::env;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// How the custodial path moves tokens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CustodialStrategy {
    /// One delegated transfer per receiver, straight from the caller.
    #[default]
    Direct,
    /// One delegated pull of the total into the engine, then one plain
    /// transfer per receiver.
    PullThenPush,
}

impl FromStr for CustodialStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "pull-then-push" | "pull_then_push" => Ok(Self::PullThenPush),
            other => Err(format!("unknown custodial strategy: {other}")),
        }
    }
}

/// Distributor Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Budget for the interaction phase of one call, in milliseconds.
    pub execution_timeout_ms: u64,
    /// Maximum payouts in one call.
    pub max_transfers_per_call: usize,
    /// Custodial transfer strategy.
    pub custodial_strategy: CustodialStrategy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            execution_timeout_ms: 5000,
            max_transfers_per_call: 1024,
            custodial_strategy: CustodialStrategy::Direct,
        }
    }
}

impl ServiceConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_DISTRIBUTOR_TIMEOUT_MS`: Interaction budget (default: 5000)
    /// - `QC_DISTRIBUTOR_MAX_TRANSFERS`: Payouts per call (default: 1024)
    /// - `QC_DISTRIBUTOR_CUSTODIAL_STRATEGY`: `direct` or `pull-then-push`
    ///   (default: direct)
    ///
    /// Unparseable values fall back to the default.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            execution_timeout_ms: env::var("QC_DISTRIBUTOR_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.execution_timeout_ms),

            max_transfers_per_call: env::var("QC_DISTRIBUTOR_MAX_TRANSFERS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_transfers_per_call),

            custodial_strategy: env::var("QC_DISTRIBUTOR_CUSTODIAL_STRATEGY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.custodial_strategy),
        }
    }
}

/// Statistics for the Distributor Service.
#[derive(Debug, Default, Clone)]
pub struct ServiceStats {
    /// Distributions that passed the access guard.
    pub distributions_attempted: u64,
    /// Distributions that committed.
    pub successful_distributions: u64,
    /// Distributions that reverted after passing the access guard.
    pub failed_distributions: u64,
    /// Calls refused by the access guard.
    pub rejected_requests: u64,
    /// Payouts made by committed distributions.
    pub payouts_made: u64,
    /// Native value split by committed distributions.
    pub native_volume: U256,
    /// Committed ownership transfers.
    pub ownership_transfers: u64,
}

// =============================================================================
// SERVICE
// =============================================================================

/// The distribution engine.
pub struct DistributorService<N: NativeLedger> {
    /// Service configuration.
    config: ServiceConfig,
    /// The engine's identity on every ledger.
    address: Address,
    /// Persistent state; its lock is the call lock.
    state: Mutex<DistributorState>,
    /// Native settlement ledger.
    native: Arc<N>,
    /// Token ledgers by identity.
    token_ledgers: HashMap<Address, Arc<dyn TokenLedger>>,
    /// Committed events.
    event_log: RwLock<Vec<DistributorEvent>>,
    /// Service statistics.
    stats: RwLock<ServiceStats>,
}

impl<N: NativeLedger> DistributorService<N> {
    /// Deploys an engine.
    ///
    /// The engine's address is derived from `deployer` and `nonce`. Deployment
    /// is not owner-gated.
    ///
    /// # Errors
    ///
    /// `InvalidOwner` if `initial_owner` is the zero address.
    pub fn deploy(
        deployer: Address,
        nonce: u64,
        initial_owner: Address,
        native: Arc<N>,
        config: ServiceConfig,
    ) -> Result<Self, DistributorError> {
        let address = compute_deployment_address(deployer, nonce);
        let state = DistributorState::new(address, initial_owner)?;

        info!(
            engine = ?address,
            owner = ?initial_owner,
            strategy = ?config.custodial_strategy,
            "Distributor deployed"
        );

        Ok(Self {
            config,
            address,
            state: Mutex::new(state),
            native,
            token_ledgers: HashMap::new(),
            event_log: RwLock::new(vec![DistributorEvent::OwnershipTransferred {
                previous_owner: Address::ZERO,
                new_owner: initial_owner,
            }]),
            stats: RwLock::new(ServiceStats::default()),
        })
    }

    /// Makes a token ledger reachable under `address`.
    #[must_use]
    pub fn with_token_ledger(mut self, address: Address, ledger: Arc<dyn TokenLedger>) -> Self {
        self.token_ledgers.insert(address, ledger);
        self
    }

    /// Service configuration.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Every committed event, oldest first.
    pub async fn events(&self) -> Vec<DistributorEvent> {
        self.event_log.read().await.clone()
    }

    /// Handle a custodial token distribution.
    #[instrument(skip_all, fields(correlation_id = %correlation_id, caller = ?ctx.caller, ledger = ?ledger))]
    pub async fn handle_distribute_token(
        &self,
        correlation_id: Uuid,
        ctx: CallContext,
        ledger: Address,
        receivers: Vec<Address>,
        amounts: Vec<U256>,
    ) -> Result<DistributionReceipt, DistributorError> {
        let request = DistributionRequest::new(receivers, amounts);
        let state = self.state.lock().await;

        let result = self.execute_token(&state, ctx, ledger, &request).await;

        self.conclude(correlation_id, ctx.caller, AssetKind::Token { ledger }, request, result)
            .await
    }

    /// Handle a native value distribution.
    #[instrument(skip_all, fields(correlation_id = %correlation_id, caller = ?ctx.caller, value = %ctx.value))]
    pub async fn handle_distribute_native(
        &self,
        correlation_id: Uuid,
        ctx: CallContext,
        receivers: Vec<Address>,
        amounts: Vec<U256>,
    ) -> Result<DistributionReceipt, DistributorError> {
        let request = DistributionRequest::new(receivers, amounts);
        let state = self.state.lock().await;

        let result = self.execute_native(&state, ctx, &request).await;

        self.conclude(correlation_id, ctx.caller, AssetKind::Native, request, result)
            .await
    }

    /// Handle an ownership transfer.
    #[instrument(skip_all, fields(correlation_id = %correlation_id, caller = ?caller))]
    pub async fn handle_transfer_ownership(
        &self,
        correlation_id: Uuid,
        caller: Address,
        new_owner: Address,
    ) -> Result<DistributorEvent, DistributorError> {
        let mut state = self.state.lock().await;

        match state.transfer_ownership(caller, new_owner) {
            Ok(previous_owner) => {
                let event = DistributorEvent::OwnershipTransferred {
                    previous_owner,
                    new_owner,
                };
                self.event_log.write().await.push(event.clone());
                self.stats.write().await.ownership_transfers += 1;

                info!(
                    previous_owner = ?previous_owner,
                    new_owner = ?new_owner,
                    "Ownership transferred"
                );
                Ok(event)
            }
            Err(err) => {
                if matches!(err, DistributorError::Unauthorized { .. }) {
                    self.stats.write().await.rejected_requests += 1;
                }
                warn!(error = %err, "Ownership transfer refused");
                metrics::record_failure(err.category().as_str());
                Err(err)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Custodial path
    // -------------------------------------------------------------------------

    async fn execute_token(
        &self,
        state: &DistributorState,
        ctx: CallContext,
        ledger: Address,
        request: &DistributionRequest,
    ) -> Result<U256, DistributorError> {
        state.ensure_owner(ctx.caller)?;
        if !ctx.value.is_zero() {
            return Err(DistributorError::NonPayable {
                attached: ctx.value,
            });
        }
        let total = validate_request(request)?;
        check_transfer_limit(request.len(), self.config.max_transfers_per_call)?;
        let token = self
            .token_ledgers
            .get(&ledger)
            .ok_or(DistributorError::UnknownLedger(ledger))?;

        debug!(total = %total, receivers = request.len(), "Checks passed, moving tokens");

        // A session dropped by the deadline reverts itself
        self.with_deadline(async {
            let session = token.open_session().await?;
            let outcome = self
                .fan_out_token(session.as_ref(), ctx.caller, request, total)
                .await;
            settle(session, outcome)
        })
        .await?;

        Ok(total)
    }

    async fn fan_out_token(
        &self,
        token: &dyn TokenSession,
        caller: Address,
        request: &DistributionRequest,
        total: U256,
    ) -> Result<SettlementAudit, DistributorError> {
        let engine = self.address;
        let before = BalanceSnapshot {
            caller: token.balance_of(caller).await?,
            engine: token.balance_of(engine).await?,
        };

        match self.config.custodial_strategy {
            CustodialStrategy::Direct => {
                for payout in request.payouts() {
                    if !token
                        .transfer_from(engine, caller, payout.receiver, payout.amount)
                        .await?
                    {
                        return Err(DistributorError::TransferRejected {
                            receiver: payout.receiver,
                        });
                    }
                }
            }
            CustodialStrategy::PullThenPush => {
                if !token.transfer_from(engine, caller, engine, total).await? {
                    return Err(DistributorError::TransferRejected { receiver: engine });
                }
                for payout in request.payouts() {
                    if !token
                        .transfer(engine, payout.receiver, payout.amount)
                        .await?
                    {
                        return Err(DistributorError::TransferRejected {
                            receiver: payout.receiver,
                        });
                    }
                }
            }
        }

        let after = BalanceSnapshot {
            caller: token.balance_of(caller).await?,
            engine: token.balance_of(engine).await?,
        };

        Ok(SettlementAudit {
            total,
            paid_to_caller: paid_to(request, caller),
            before,
            after,
        })
    }

    // -------------------------------------------------------------------------
    // Native path
    // -------------------------------------------------------------------------

    async fn execute_native(
        &self,
        state: &DistributorState,
        ctx: CallContext,
        request: &DistributionRequest,
    ) -> Result<U256, DistributorError> {
        state.ensure_owner(ctx.caller)?;
        let total = validate_request(request)?;
        check_transfer_limit(request.len(), self.config.max_transfers_per_call)?;
        ensure_exact_value(ctx.value, total)?;

        debug!(total = %total, receivers = request.len(), "Checks passed, splitting value");

        self.with_deadline(async {
            let session = self.native.open_session().await?;
            let outcome = self.fan_out_native(session.as_ref(), ctx, request, total).await;
            settle(session, outcome)
        })
        .await?;

        Ok(total)
    }

    async fn fan_out_native(
        &self,
        native: &dyn NativeSession,
        ctx: CallContext,
        request: &DistributionRequest,
        total: U256,
    ) -> Result<SettlementAudit, DistributorError> {
        let engine = self.address;
        let before = BalanceSnapshot {
            caller: native.balance(ctx.caller).await?,
            engine: native.balance(engine).await?,
        };

        // The attached value enters the engine with the call
        native.transfer(ctx.caller, engine, ctx.value).await?;

        for payout in request.payouts() {
            native
                .transfer(engine, payout.receiver, payout.amount)
                .await?;
        }

        let after = BalanceSnapshot {
            caller: native.balance(ctx.caller).await?,
            engine: native.balance(engine).await?,
        };

        Ok(SettlementAudit {
            total,
            paid_to_caller: paid_to(request, ctx.caller),
            before,
            after,
        })
    }

    // -------------------------------------------------------------------------
    // Shared
    // -------------------------------------------------------------------------

    async fn with_deadline<T, F>(&self, interaction: F) -> Result<T, DistributorError>
    where
        F: Future<Output = Result<T, DistributorError>>,
    {
        let max_ms = self.config.execution_timeout_ms;
        tokio::time::timeout(Duration::from_millis(max_ms), interaction)
            .await
            .map_err(|_| DistributorError::Timeout { max_ms })?
    }

    async fn conclude(
        &self,
        correlation_id: Uuid,
        caller: Address,
        asset: AssetKind,
        request: DistributionRequest,
        result: Result<U256, DistributorError>,
    ) -> Result<DistributionReceipt, DistributorError> {
        let mut stats = self.stats.write().await;

        match result {
            Ok(total) => {
                let receivers = request.len();
                let (event, label) = match asset {
                    AssetKind::Token { ledger } => (
                        DistributorEvent::TokensDistributed {
                            ledger,
                            caller,
                            total,
                            receivers,
                        },
                        "token",
                    ),
                    AssetKind::Native => {
                        stats.native_volume = stats.native_volume.saturating_add(total);
                        (
                            DistributorEvent::NativeDistributed {
                                caller,
                                total,
                                receivers,
                            },
                            "native",
                        )
                    }
                };
                self.event_log.write().await.push(event.clone());

                stats.distributions_attempted += 1;
                stats.successful_distributions += 1;
                stats.payouts_made += receivers as u64;
                metrics::record_distribution(label, receivers);

                info!(total = %total, receivers, "Distribution committed");

                Ok(DistributionReceipt {
                    correlation_id,
                    asset,
                    caller,
                    total,
                    payouts: request.payouts().collect(),
                    events: vec![event],
                })
            }
            Err(err) => {
                let category = err.category();
                if matches!(err, DistributorError::Unauthorized { .. }) {
                    stats.rejected_requests += 1;
                    warn!(error = %err, "Unauthorized distribution request");
                } else {
                    stats.distributions_attempted += 1;
                    stats.failed_distributions += 1;
                    if category == ErrorCategory::Execution {
                        error!(error = %err, category = category.as_str(), "Distribution reverted");
                    } else {
                        debug!(error = %err, category = category.as_str(), "Distribution reverted");
                    }
                }
                metrics::record_failure(category.as_str());
                Err(err)
            }
        }
    }
}

/// Commits the session if the interaction phase succeeded and every
/// invariant holds, reverts it otherwise.
fn settle<S: Session + ?Sized>(
    session: Box<S>,
    outcome: Result<SettlementAudit, DistributorError>,
) -> Result<(), DistributorError> {
    let verdict = outcome.and_then(|audit| match check_all_invariants(&audit) {
        InvariantCheckResult::Valid => Ok(()),
        InvariantCheckResult::Invalid(violations) => {
            let reason = violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            Err(DistributorError::InvariantViolated(reason))
        }
    });

    match verdict {
        Ok(()) => {
            session.commit();
            Ok(())
        }
        Err(err) => {
            session.revert();
            Err(err)
        }
    }
}

/// Part of the request paid back to `caller` itself.
fn paid_to(request: &DistributionRequest, caller: Address) -> U256 {
    request
        .payouts()
        .filter(|payout| payout.receiver == caller)
        .fold(U256::zero(), |acc, payout| acc.saturating_add(payout.amount))
}

// =============================================================================
// DistributorApi Implementation
// =============================================================================

#[async_trait]
impl<N: NativeLedger + 'static> DistributorApi for DistributorService<N> {
    fn address(&self) -> Address {
        self.address
    }

    async fn owner(&self) -> Address {
        self.state.lock().await.owner()
    }

    async fn distribute_token(
        &self,
        ctx: CallContext,
        ledger: Address,
        receivers: Vec<Address>,
        amounts: Vec<U256>,
    ) -> Result<DistributionReceipt, DistributorError> {
        self.handle_distribute_token(Uuid::new_v4(), ctx, ledger, receivers, amounts)
            .await
    }

    async fn distribute_native(
        &self,
        ctx: CallContext,
        receivers: Vec<Address>,
        amounts: Vec<U256>,
    ) -> Result<DistributionReceipt, DistributorError> {
        self.handle_distribute_native(Uuid::new_v4(), ctx, receivers, amounts)
            .await
    }

    async fn transfer_ownership(
        &self,
        caller: Address,
        new_owner: Address,
    ) -> Result<DistributorEvent, DistributorError> {
        self.handle_transfer_ownership(Uuid::new_v4(), caller, new_owner)
            .await
    }
}

// =============================================================================
// TEST DEPLOYMENT
// =============================================================================

/// An engine wired to fresh in-memory ledgers.
pub struct TestDeployment {
    /// The engine, deployed by the owner at nonce 0.
    pub service: Arc<DistributorService<InMemoryNativeLedger>>,
    /// Native ledger.
    pub native: Arc<InMemoryNativeLedger>,
    /// Token ledger.
    pub token: Arc<InMemoryTokenLedger>,
    /// Identity of `token` (the owner's deployment at nonce 1).
    pub token_address: Address,
}

/// Deploy an engine over in-memory ledgers (for testing).
///
/// # Errors
///
/// `InvalidOwner` if `owner` is the zero address.
pub fn create_test_deployment(
    owner: Address,
    config: ServiceConfig,
) -> Result<TestDeployment, DistributorError> {
    let native = Arc::new(InMemoryNativeLedger::new());
    let token = Arc::new(InMemoryTokenLedger::new());
    let token_address = compute_deployment_address(owner, 1);

    let service = DistributorService::deploy(owner, 0, owner, Arc::clone(&native), config)?
        .with_token_ledger(token_address, Arc::clone(&token) as Arc<dyn TokenLedger>);

    Ok(TestDeployment {
        service: Arc::new(service),
        native,
        token,
        token_address,
    })
}

// =============================================================================
// TESTS
// =============================================================================
