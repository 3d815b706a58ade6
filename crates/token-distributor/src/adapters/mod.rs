//! # Adapters Layer (Outer Hexagon)
//!
//! Adapters connect the distribution engine to ledgers and to the event bus.
//!
//! - The in-memory ledgers implement the driven ports; each session journals
//!   its own writes
//! - The event handler drives the inbound port from decoded bus messages

mod journal;

pub mod event_handler;
pub mod native_ledger;
pub mod token_ledger;

pub use event_handler::*;
pub use native_ledger::*;
pub use token_ledger::*;
