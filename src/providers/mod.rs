//! Identity-provider implementations.
//!
//! `firebase` talks to the hosted identity service; `mock` is the
//! in-memory provider backing the demo binary and the coordinator tests.

pub mod firebase;
pub mod mock;
