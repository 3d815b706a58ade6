//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions for the distribution engine.
//!
//! - **Driving Ports (Inbound)**: `DistributorApi`
//! - **Driven Ports (Outbound)**: `TokenLedger`, `NativeLedger`, `Session`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
