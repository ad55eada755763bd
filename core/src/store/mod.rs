//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The engine never touches it; callers hand finished records to a
//! `SimulationSink`, which `SimStore` implements.

mod analytics;
mod simulation;

pub use analytics::{PlayerSummary, RtpSummary, RtpTrendPoint};
pub use simulation::SimulationFilter;

use crate::{
    error::SimResult,
    record::{SimulationRecord, SimulationSink},
};
use rusqlite::Connection;

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    /// Open (or create) the database at `path`. Accepts SQLite URIs.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_simulations.sql"))?;
        Ok(())
    }
}

impl SimulationSink for SimStore {
    fn append(&self, record: &SimulationRecord) -> SimResult<i64> {
        self.insert_simulation(record)
    }
}
