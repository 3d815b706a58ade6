//! # Exploit Simulations
//!
//! Each module attacks one guarantee of the engine and asserts that the
//! attack either fails outright or leaves every ledger exactly as it was.
//!
//! | Module | Target |
//! |--------|--------|
//! | `griefing` | All-or-nothing under receivers and ledgers that fail mid fan-out |
//! | `allowance` | Caller-approved funds only, never more |
//! | `arithmetic` | Totals that wrap past `U256::MAX` |
//! | `ownership` | The access guard and envelope-only identity |

pub mod allowance;
pub mod arithmetic;
