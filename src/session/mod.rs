//! Session Module
//!
//! Tamper-evident cart sessions carried by the client. Every mutation must be
//! followed by `SessionSigner::sign` before the payload leaves the process.

mod payload;
mod signer;

#[cfg(test)]
mod property_tests;

pub use payload::{OrderItem, SessionPayload};
pub use signer::SessionSigner;
