//! SQLite persistence layer.
//!
//! RULE: Only store/ talks to the database.
//! The pricing engine, recruit pool and maintenance tasks call store
//! methods. They never execute SQL directly.
//!
//! Every read and write goes through a `LedgerTx`. `begin()` opens an
//! IMMEDIATE transaction (takes the write lock up front, so two writers
//! never interleave a read-check-write); `snapshot()` opens a DEFERRED one
//! for consistent reads. Dropping a LedgerTx without `commit()` rolls
//! every statement in it back.

mod account;
mod building;
mod market;
mod recruit;
mod universe;

pub use account::ShipRow;
pub use building::{BuildingRow, BuildingStatus};
pub use market::{InventoryRow, MarketKey};
pub use recruit::EpochRecord;
pub(crate) use recruit::HiredRecruit;

use crate::{
    error::EngineResult,
    event::{EventLogEntry, LedgerEvent},
};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

pub struct LedgerStore {
    conn: Connection,
}

impl LedgerStore {
    pub fn open(path: &str) -> EngineResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> EngineResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> EngineResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_ledger.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_buildings.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/003_market.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/004_universe.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/005_recruits.sql"))?;
        Ok(())
    }

    /// Write transaction. Holds the database write lock until commit or drop.
    pub fn begin(&mut self) -> EngineResult<LedgerTx<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(LedgerTx { tx })
    }

    /// Read transaction: a consistent view, no write lock until first write.
    pub fn snapshot(&mut self) -> EngineResult<LedgerTx<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Deferred)?;
        Ok(LedgerTx { tx })
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn events(&self) -> EngineResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, event_type, payload, recorded_at
             FROM event_log ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(EventLogEntry {
                    id:          Some(row.get(0)?),
                    event_type:  row.get(1)?,
                    payload:     row.get(2)?,
                    recorded_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn count_events(&self, event_type: &str) -> EngineResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE event_type = ?1",
            params![event_type],
            |row| row.get(0),
        )?;
        Ok(n)
    }
}

/// One ledger transaction. Store submodules add their queries as
/// `impl LedgerTx` blocks.
pub struct LedgerTx<'a> {
    tx: Transaction<'a>,
}

impl LedgerTx<'_> {
    pub fn commit(self) -> EngineResult<()> {
        self.tx.commit()?;
        Ok(())
    }

    pub fn append_event(&self, event: &LedgerEvent) -> EngineResult<()> {
        self.tx.execute(
            "INSERT INTO event_log (event_type, payload, recorded_at)
             VALUES (?1, ?2, ?3)",
            params![
                event.type_name(),
                serde_json::to_string(event)?,
                now_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
