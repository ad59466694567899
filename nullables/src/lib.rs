//! Nullable infrastructure for deterministic testing.
//!
//! Real collaborators (the document store, the wall clock) swapped for
//! in-memory stand-ins that behave identically but are fully controllable
//! from tests.

pub mod clock;
pub mod store;

pub use clock::NullClock;
pub use store::NullStore;
