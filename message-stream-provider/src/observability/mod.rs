//! Structured logging vocabulary shared by all provider layers.
//!
//! Library code only emits `tracing` events and spans. Installing a subscriber is
//! left to binaries and tests.

pub mod events;
pub mod fields;
