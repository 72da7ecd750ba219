//! Availability Module
//!
//! Gates remote calls on whether this node should currently behave as down.
//!
//! # Implementations
//! - `AlwaysUp`: production default, never down
//! - `AvailabilitySimulator`: deterministic synthetic outages for load tests

mod simulator;

pub use simulator::{host_frame_offset, AvailabilitySimulator, FAILURE_WINDOW_SECONDS};

use std::fmt::Debug;

use tracing::warn;

use crate::error::{Result, ServiceError};

// == Availability Trait ==
/// Reports whether the local node is currently degraded.
///
/// Callers seeing `true` must answer with a service-unavailable result
/// without touching any cache or remote call.
pub trait Availability: Send + Sync + Debug {
    fn is_down(&self) -> bool;
}

// == Always Up ==
/// Health gate that never reports an outage.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysUp;

impl Availability for AlwaysUp {
    fn is_down(&self) -> bool {
        false
    }
}

/// Fails with `Unavailable` when the gate reports the node as down.
pub fn ensure_available(gate: &dyn Availability, context: &str) -> Result<()> {
    if gate.is_down() {
        warn!(context, "Node reported down; refusing request");
        return Err(ServiceError::Unavailable);
    }
    Ok(())
}
