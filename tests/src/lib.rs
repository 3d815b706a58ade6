//! # Token Distributor Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── exploits/         # Attack simulations against the engine
//! │   ├── griefing.rs   # Receivers and ledgers that fail mid fan-out
//! │   ├── allowance.rs  # Draining or overdrawing the caller's approval
//! │   ├── arithmetic.rs # Totals that wrap
//! │   └── ownership.rs  # Taking over the access guard
//! │
//! └── integration/      # End-to-end flows through the public API and the bus
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p distributor-tests
//!
//! # By category
//! cargo test -p distributor-tests integration::
//! cargo test -p distributor-tests exploits::
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod exploits;
pub mod fixtures;
pub mod integration;
