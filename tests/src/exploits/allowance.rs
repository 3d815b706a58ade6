//! # Allowance Attacks
//!
//! The engine spends the caller's tokens through a delegated allowance. These
//! attacks try to make it spend more than was approved, spend someone else's
//! approval, or keep a partial spend when the approval runs out mid-call.
//!
//! ## Expected Defense
//!
//! Only the caller's own approval is ever spent, and a call that cannot be
//! fully covered spends none of it.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use token_distributor::prelude::*;

    #[tokio::test]
    async fn test_allowance_one_short_spends_nothing() {
        let d = funded_deployment(ServiceConfig::default()).await;
        d.token
            .approve(owner(), d.service.address(), U256::from(TOTAL - 1))
            .await
            .unwrap();

        let err = d
            .service
            .distribute_token(CallContext::new(owner()), d.token_address, receivers(), amounts())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Insufficient allowance granted to contract.");
        assert_eq!(
            d.token.allowance(owner(), d.service.address()).await.unwrap(),
            U256::from(TOTAL - 1)
        );
        assert_eq!(token_balance(&d, alice()).await, U256::zero());
        assert_eq!(token_balance(&d, owner()).await, U256::from(TOTAL));
    }

    #[tokio::test]
    async fn test_balance_short_of_allowance() {
        let d = funded_deployment(ServiceConfig::default()).await;
        d.token
            .approve(owner(), d.service.address(), U256::MAX)
            .await
            .unwrap();

        let err = d
            .service
            .distribute_token(
                CallContext::new(owner()),
                d.token_address,
                vec![alice(), bob()],
                vec![U256::from(TOTAL), U256::one()],
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DistributorError::InsufficientBalance { account, .. } if account == owner()
        ));
        assert_eq!(token_balance(&d, alice()).await, U256::zero());
        assert_eq!(token_balance(&d, owner()).await, U256::from(TOTAL));
    }

    #[tokio::test]
    async fn test_unlimited_allowance_is_not_consumed() {
        let d = funded_deployment(ServiceConfig::default()).await;
        d.token
            .approve(owner(), d.service.address(), U256::MAX)
            .await
            .unwrap();

        d.service
            .distribute_token(CallContext::new(owner()), d.token_address, receivers(), amounts())
            .await
            .unwrap();

        assert_eq!(
            d.token.allowance(owner(), d.service.address()).await.unwrap(),
            U256::MAX
        );
    }

    #[tokio::test]
    async fn test_third_party_approval_cannot_be_spent() {
        // Alice approved the engine generously, but only the owner can call
        let d = funded_deployment(ServiceConfig::default()).await;
        d.token.mint(alice(), U256::from(1_000)).await.unwrap();
        d.token
            .approve(alice(), d.service.address(), U256::MAX)
            .await
            .unwrap();

        let err = d
            .service
            .distribute_token(
                CallContext::new(attacker()),
                d.token_address,
                vec![attacker()],
                vec![U256::from(1_000)],
            )
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Authorization);

        // The owner's call only ever spends the owner's approval
        let err = d
            .service
            .distribute_token(
                CallContext::new(owner()),
                d.token_address,
                vec![attacker()],
                vec![U256::from(TOTAL + 1)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DistributorError::InsufficientAllowance { .. }));

        assert_eq!(token_balance(&d, alice()).await, U256::from(1_000));
        assert_eq!(token_balance(&d, attacker()).await, U256::zero());
    }

    #[tokio::test]
    async fn test_pull_then_push_cannot_overdraw() {
        let d = funded_deployment(ServiceConfig {
            custodial_strategy: CustodialStrategy::PullThenPush,
            ..ServiceConfig::default()
        })
        .await;

        let err = d
            .service
            .distribute_token(
                CallContext::new(owner()),
                d.token_address,
                vec![alice(), bob(), attacker()],
                vec![
                    U256::from(AMOUNT_FOR_ALICE),
                    U256::from(AMOUNT_FOR_BOB),
                    U256::one(),
                ],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DistributorError::InsufficientAllowance { .. }));
        assert_eq!(token_balance(&d, d.service.address()).await, U256::zero());
        assert_eq!(token_balance(&d, owner()).await, U256::from(TOTAL));
    }
}
