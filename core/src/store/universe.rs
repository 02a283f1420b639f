use super::{now_rfc3339, LedgerTx};
use crate::{error::EngineResult, types::SystemId};
use rusqlite::{params, OptionalExtension};

impl LedgerTx<'_> {
    // ── Realized systems ──────────────────────────────────────────

    /// First writer wins. Returns true when this call stored the row.
    pub fn insert_realized_system(&self, system: SystemId, payload: &str) -> EngineResult<bool> {
        let n = self.tx.execute(
            "INSERT OR IGNORE INTO realized_system (system_id, payload, realized_at)
             VALUES (?1, ?2, ?3)",
            params![system.as_i64(), payload, now_rfc3339()],
        )?;
        Ok(n > 0)
    }

    pub fn realized_system(&self, system: SystemId) -> EngineResult<Option<String>> {
        let payload = self
            .tx
            .query_row(
                "SELECT payload FROM realized_system WHERE system_id = ?1",
                params![system.as_i64()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }
}
