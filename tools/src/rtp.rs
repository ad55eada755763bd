//! The runner's process-wide RTP setting.
//!
//! The core never stores RTP; the runner keeps the one mutable copy here
//! and reads it once per simulate command.

use matchday_core::{config::validate_rtp, error::SimResult};
use std::sync::RwLock;

pub struct RtpCell {
    value: RwLock<f64>,
}

impl RtpCell {
    pub fn new(initial: f64) -> SimResult<Self> {
        Ok(Self {
            value: RwLock::new(validate_rtp(initial)?),
        })
    }

    pub fn get(&self) -> f64 {
        match self.value.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Replace the value; out-of-range values are rejected and leave it unchanged.
    pub fn set(&self, rtp: f64) -> SimResult<f64> {
        let rtp = validate_rtp(rtp)?;
        match self.value.write() {
            Ok(mut guard) => *guard = rtp,
            Err(poisoned) => *poisoned.into_inner() = rtp,
        }
        log::info!("rtp set to {rtp:.4}");
        Ok(rtp)
    }
}
