//! # Domain Layer (Inner Hexagon)
//!
//! Pure business logic of the distribution engine: the owner state and its
//! access guard, the request validator and the post-call invariants.
//! NO I/O, NO async.

pub mod entities;
pub mod invariants;
pub mod services;
pub mod value_objects;

pub use entities::*;
pub use invariants::*;
pub use services::*;
pub use value_objects::*;
