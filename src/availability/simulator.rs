//! Availability Simulator
//!
//! Marks the node as down for a fixed number of seconds in every 10-second
//! wall-clock window. Each node shifts its window by a frame offset derived
//! from its host identity, so a fleet does not fail in lockstep.

use std::fs;
use std::sync::Arc;

use chrono::Timelike;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::Availability;
use crate::clock::Clock;
use crate::error::{Result, ServiceError};

/// Length of one outage window in seconds.
pub const FAILURE_WINDOW_SECONDS: u8 = 10;

// == Availability Simulator ==
/// Deterministic, lock-free synthetic outage gate.
#[derive(Debug, Clone)]
pub struct AvailabilitySimulator {
    failure_seconds: u8,
    frame_offset: u8,
    clock: Arc<dyn Clock>,
}

impl AvailabilitySimulator {
    // == Constructor ==
    /// Creates a simulator down for `failure_seconds` of every window, with
    /// the frame offset derived from the host identity.
    ///
    /// Fails with `InvalidConfiguration` unless `failure_seconds` is in [0, 10].
    pub fn new(failure_seconds: u8, clock: Arc<dyn Clock>) -> Result<Self> {
        let simulator = Self::with_frame_offset(failure_seconds, host_frame_offset(), clock)?;
        info!(
            failure_seconds,
            frame_offset = simulator.frame_offset,
            "Availability simulator enabled"
        );
        Ok(simulator)
    }

    /// Creates a simulator with an explicit frame offset in [0, 9].
    pub fn with_frame_offset(
        failure_seconds: u8,
        frame_offset: u8,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        if failure_seconds > FAILURE_WINDOW_SECONDS {
            return Err(ServiceError::InvalidConfiguration(format!(
                "failure seconds must be between 0 (no failure) and {FAILURE_WINDOW_SECONDS} \
                 (always failing), got {failure_seconds}"
            )));
        }
        if frame_offset >= FAILURE_WINDOW_SECONDS {
            return Err(ServiceError::InvalidConfiguration(format!(
                "frame offset must be below {FAILURE_WINDOW_SECONDS}, got {frame_offset}"
            )));
        }
        Ok(Self {
            failure_seconds,
            frame_offset,
            clock,
        })
    }

    pub fn failure_seconds(&self) -> u8 {
        self.failure_seconds
    }

    pub fn frame_offset(&self) -> u8 {
        self.frame_offset
    }

    /// Position of the current wall-clock second within the shifted window.
    fn current_frame_second(&self) -> u8 {
        let second = self.clock.now().second() as u8;
        (second + self.frame_offset) % FAILURE_WINDOW_SECONDS
    }
}

impl Availability for AvailabilitySimulator {
    fn is_down(&self) -> bool {
        let start_outage = FAILURE_WINDOW_SECONDS - self.failure_seconds;
        self.current_frame_second() >= start_outage
    }
}

// == Frame Offset ==
/// Reads the host identity: `HOSTNAME`, then `/etc/hostname`.
fn host_identity() -> Option<String> {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Stable offset in [0, 9] from a hash of the host identity.
///
/// Falls back to 0 when the identity cannot be resolved.
pub fn host_frame_offset() -> u8 {
    match host_identity() {
        Some(identity) => frame_offset_for(&identity),
        None => {
            debug!("Host identity unavailable; using frame offset 0");
            0
        }
    }
}

fn frame_offset_for(identity: &str) -> u8 {
    let digest = Sha256::digest(identity.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) % u64::from(FAILURE_WINDOW_SECONDS)) as u8
}
