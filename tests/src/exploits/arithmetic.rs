//! # Arithmetic Attacks
//!
//! Batch-transfer overflow: amounts chosen so their sum wraps to a small
//! number, so a wrapped total passes the funds check while the individual
//! payouts are huge.
//!
//! ## Expected Defense
//!
//! The total is computed with checked addition; a wrap is a validation
//! failure before any ledger is touched.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use token_distributor::prelude::*;

    /// Two amounts whose sum wraps to exactly zero.
    fn wrapping_to_zero() -> Vec<U256> {
        let half = U256([0, 0, 0, 1 << 63]);
        vec![half, half]
    }

    #[tokio::test]
    async fn test_native_total_wrapping_to_zero_is_rejected() {
        let d = funded_deployment(ServiceConfig::default()).await;

        // A wrapped total of 0 would match the 0 attached
        let err = d
            .service
            .distribute_native(CallContext::new(owner()), receivers(), wrapping_to_zero())
            .await
            .unwrap_err();

        assert_eq!(err, DistributorError::AmountOverflow);
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(native_balance(&d, alice()).await, U256::zero());
        assert_eq!(native_balance(&d, owner()).await, U256::from(OWNER_NATIVE));
    }

    #[tokio::test]
    async fn test_token_total_wrapping_is_rejected() {
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
                receivers(),
                vec![U256::MAX, U256::from(TOTAL + 1)],
            )
            .await
            .unwrap_err();

        assert_eq!(err, DistributorError::AmountOverflow);
        assert_eq!(token_balance(&d, owner()).await, U256::from(TOTAL));
    }

    #[tokio::test]
    async fn test_largest_exact_total_is_accepted_by_validation() {
        let d = funded_deployment(ServiceConfig::default()).await;

        // Sums to exactly U256::MAX: valid request, fails only on funds
        let err = d
            .service
            .distribute_native(
                CallContext::new(owner()).with_value(U256::MAX),
                receivers(),
                vec![U256::MAX - U256::one(), U256::one()],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DistributorError::InsufficientBalance { .. }));
        assert_eq!(native_balance(&d, owner()).await, U256::from(OWNER_NATIVE));
    }
}
