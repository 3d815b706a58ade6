//! # Shared Fixtures
//!
//! Named accounts and a funded deployment, shared by every test module.

use token_distributor::prelude::*;

/// Tokens (and native units) paid to Alice in the reference scenario.
pub const AMOUNT_FOR_ALICE: u64 = 100;

/// Tokens (and native units) paid to Bob in the reference scenario.
pub const AMOUNT_FOR_BOB: u64 = 200;

/// Sum of the reference payouts.
pub const TOTAL: u64 = AMOUNT_FOR_ALICE + AMOUNT_FOR_BOB;

/// Native balance the owner starts with.
pub const OWNER_NATIVE: u64 = 1_000;

pub fn owner() -> Address {
    Address::from_low_u64(0x0A11)
}

pub fn alice() -> Address {
    Address::from_low_u64(0xA11CE)
}

pub fn bob() -> Address {
    Address::from_low_u64(0xB0B)
}

pub fn attacker() -> Address {
    Address::from_low_u64(0xBAD)
}

pub fn receivers() -> Vec<Address> {
    vec![alice(), bob()]
}

pub fn amounts() -> Vec<U256> {
    vec![U256::from(AMOUNT_FOR_ALICE), U256::from(AMOUNT_FOR_BOB)]
}

/// `n` distinct receivers, none of them a named account.
pub fn crowd(n: u64) -> Vec<Address> {
    (1..=n).map(|i| Address::from_low_u64(0x1_0000 + i)).collect()
}

/// Deployment where the owner holds `TOTAL` tokens, has approved exactly
/// `TOTAL` to the engine, and holds `OWNER_NATIVE` native units.
pub async fn funded_deployment(config: ServiceConfig) -> TestDeployment {
    let d = create_test_deployment(owner(), config).expect("deploy");
    d.token
        .mint(owner(), U256::from(TOTAL))
        .await
        .expect("mint");
    d.token
        .approve(owner(), d.service.address(), U256::from(TOTAL))
        .await
        .expect("approve");
    d.native.set_balance(owner(), U256::from(OWNER_NATIVE)).await;
    d
}

pub async fn token_balance(d: &TestDeployment, account: Address) -> U256 {
    d.token.balance_of(account).await.expect("balance")
}

pub async fn native_balance(d: &TestDeployment, account: Address) -> U256 {
    d.native.balance(account).await.expect("balance")
}
