//! # Integration Tests
//!
//! End-to-end flows through `DistributorApi` and the bus handler.

pub mod flows;
