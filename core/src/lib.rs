//! matchday-core: seeded football match simulation with RTP-steered
//! outcome rigging, timeline synthesis and bet settlement.

pub mod clock;
pub mod config;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod event;
pub mod market;
pub mod record;
pub mod rigging;
pub mod rng;
pub mod settlement;
pub mod squad;
pub mod stats;
pub mod store;
pub mod timeline;
pub mod types;
