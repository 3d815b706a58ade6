//! # Integration Test Flows
//!
//! Drives a deployed engine the way a client would: approve, distribute,
//! hand over ownership, and the same calls through the bus handler.
//!
//! ## Flows Tested:
//!
//! 1. **Custodial fan-out**: approve the engine, split tokens between receivers
//! 2. **Native fan-out**: attach exactly the total, split it
//! 3. **Ownership hand-over**: new owner distributes, old owner is locked out
//! 4. **Bus round-trip**: JSON requests in, response payloads out
//! 5. **Concurrent callers**: calls serialize and balances stay conserved

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use std::sync::Arc;
    use token_distributor::prelude::*;
    use uuid::Uuid;

    // =============================================================================
    // CUSTODIAL FLOW
    // =============================================================================

    #[tokio::test]
    async fn test_custodial_distribution_end_to_end() {
        let d = funded_deployment(ServiceConfig::default()).await;

        let receipt = d
            .service
            .distribute_token(
                CallContext::new(owner()),
                d.token_address,
                receivers(),
                amounts(),
            )
            .await
            .unwrap();

        assert_eq!(token_balance(&d, alice()).await, U256::from(AMOUNT_FOR_ALICE));
        assert_eq!(token_balance(&d, bob()).await, U256::from(AMOUNT_FOR_BOB));
        assert_eq!(token_balance(&d, owner()).await, U256::zero());
        assert_eq!(token_balance(&d, d.service.address()).await, U256::zero());
        assert_eq!(d.token.total_supply(), U256::from(TOTAL));

        assert_eq!(
            receipt.events,
            vec![DistributorEvent::TokensDistributed {
                ledger: d.token_address,
                caller: owner(),
                total: U256::from(TOTAL),
                receivers: 2,
            }]
        );
    }

    #[tokio::test]
    async fn test_custodial_strategies_agree() {
        for strategy in [CustodialStrategy::Direct, CustodialStrategy::PullThenPush] {
            let d = funded_deployment(ServiceConfig {
                custodial_strategy: strategy,
                ..ServiceConfig::default()
            })
            .await;

            d.service
                .distribute_token(
                    CallContext::new(owner()),
                    d.token_address,
                    receivers(),
                    amounts(),
                )
                .await
                .unwrap();

            assert_eq!(
                token_balance(&d, alice()).await,
                U256::from(AMOUNT_FOR_ALICE),
                "{strategy:?}"
            );
            assert_eq!(
                token_balance(&d, bob()).await,
                U256::from(AMOUNT_FOR_BOB),
                "{strategy:?}"
            );
            assert_eq!(
                token_balance(&d, d.service.address()).await,
                U256::zero(),
                "{strategy:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_repeated_distributions_until_allowance_runs_out() {
        let d = funded_deployment(ServiceConfig::default()).await;
        let ctx = CallContext::new(owner());

        // 3 x 100 fits the 300 allowance, the 4th call does not
        for _ in 0..3 {
            d.service
                .distribute_token(ctx, d.token_address, vec![alice()], vec![U256::from(100)])
                .await
                .unwrap();
        }
        let err = d
            .service
            .distribute_token(ctx, d.token_address, vec![alice()], vec![U256::from(1)])
            .await
            .unwrap_err();

        assert!(matches!(err, DistributorError::InsufficientAllowance { .. }));
        assert_eq!(token_balance(&d, alice()).await, U256::from(TOTAL));

        let stats = d.service.stats().await;
        assert_eq!(stats.successful_distributions, 3);
        assert_eq!(stats.failed_distributions, 1);
        assert_eq!(stats.payouts_made, 3);
    }

    // =============================================================================
    // NATIVE FLOW
    // =============================================================================

    #[tokio::test]
    async fn test_native_distribution_end_to_end() {
        let d = funded_deployment(ServiceConfig::default()).await;

        // Wrong amounts first; none of them move anything
        for attached in [0u64, 100, 400] {
            let err = d
                .service
                .distribute_native(
                    CallContext::new(owner()).with_value(U256::from(attached)),
                    receivers(),
                    amounts(),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, DistributorError::ValueMismatch { .. }));
        }
        assert_eq!(native_balance(&d, owner()).await, U256::from(OWNER_NATIVE));

        d.service
            .distribute_native(
                CallContext::new(owner()).with_value(U256::from(TOTAL)),
                receivers(),
                amounts(),
            )
            .await
            .unwrap();

        assert_eq!(native_balance(&d, alice()).await, U256::from(AMOUNT_FOR_ALICE));
        assert_eq!(native_balance(&d, bob()).await, U256::from(AMOUNT_FOR_BOB));
        assert_eq!(
            native_balance(&d, owner()).await,
            U256::from(OWNER_NATIVE - TOTAL)
        );
        assert_eq!(native_balance(&d, d.service.address()).await, U256::zero());
    }

    // =============================================================================
    // OWNERSHIP FLOW
    // =============================================================================

    #[tokio::test]
    async fn test_new_owner_takes_over_distribution() {
        let d = funded_deployment(ServiceConfig::default()).await;
        d.service.transfer_ownership(owner(), alice()).await.unwrap();

        // Alice funds and approves her own tokens
        d.token.mint(alice(), U256::from(50)).await.unwrap();
        d.token
            .approve(alice(), d.service.address(), U256::from(50))
            .await
            .unwrap();

        d.service
            .distribute_token(
                CallContext::new(alice()),
                d.token_address,
                vec![bob()],
                vec![U256::from(50)],
            )
            .await
            .unwrap();
        assert_eq!(token_balance(&d, bob()).await, U256::from(50));

        let err = d
            .service
            .distribute_token(
                CallContext::new(owner()),
                d.token_address,
                vec![bob()],
                vec![U256::from(1)],
            )
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Authorization);

        let events = d.service.events().await;
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[1],
            DistributorEvent::OwnershipTransferred {
                previous_owner: owner(),
                new_owner: alice(),
            }
        );
    }

    // =============================================================================
    // BUS ROUND-TRIP
    // =============================================================================

    #[tokio::test]
    async fn test_bus_round_trip() {
        let d = funded_deployment(ServiceConfig::default()).await;
        let handler = DistributorEventHandler::new(Arc::clone(&d.service));

        let request = DistributeTokenRequestPayload {
            ledger: d.token_address,
            receivers: receivers(),
            amounts: amounts(),
        };
        let correlation_id = Uuid::new_v4();
        let response = handler
            .dispatch(InboundMessage {
                topic: topics::DISTRIBUTE_TOKEN_REQUEST.to_string(),
                caller: owner(),
                correlation_id,
                payload: serde_json::to_vec(&request).unwrap(),
            })
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.correlation_id, correlation_id);
        assert_eq!(response.total, U256::from(TOTAL));

        // Response survives the wire
        let bytes = serde_json::to_vec(&response).unwrap();
        let decoded: DistributorResponsePayload = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, response);
    }

    // =============================================================================
    // CONCURRENT CALLERS
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_serialize() {
        let d = funded_deployment(ServiceConfig::default()).await;
        d.native.set_balance(owner(), U256::from(10_000)).await;
        let crowd = crowd(10);

        let calls = crowd.iter().map(|receiver| {
            let service = Arc::clone(&d.service);
            let receiver = *receiver;
            tokio::spawn(async move {
                service
                    .distribute_native(
                        CallContext::new(owner()).with_value(U256::from(10)),
                        vec![receiver, alice()],
                        vec![U256::from(7), U256::from(3)],
                    )
                    .await
            })
        });
        let results = futures::future::join_all(calls).await;

        for result in results {
            assert!(result.unwrap().is_ok());
        }
        for receiver in &crowd {
            assert_eq!(native_balance(&d, *receiver).await, U256::from(7));
        }
        assert_eq!(native_balance(&d, alice()).await, U256::from(30));
        assert_eq!(native_balance(&d, owner()).await, U256::from(10_000 - 100));
        assert_eq!(native_balance(&d, d.service.address()).await, U256::zero());

        let stats = d.service.stats().await;
        assert_eq!(stats.successful_distributions, 10);
        assert_eq!(stats.native_volume, U256::from(100));
    }
}
