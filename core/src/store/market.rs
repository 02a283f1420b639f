//! Market rows: inventory and price delta per (system, commodity).
//!
//! Every mutation here is a relative adjustment (`quantity = quantity + n`,
//! `delta = delta + n`), never a read-then-overwrite, so maintenance and
//! trades can interleave on the same row without losing an update.

use super::LedgerTx;
use crate::{
    error::{EngineError, EngineResult},
    tables::Commodity,
    types::SystemId,
};
use rusqlite::{params, OptionalExtension};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarketKey {
    pub system:    SystemId,
    pub commodity: Commodity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryRow {
    pub quantity:     i64,
    pub max_quantity: i64,
}

impl LedgerTx<'_> {
    // ── Inventory ─────────────────────────────────────────────────

    /// Create the inventory row on first touch. No-op when it exists.
    pub fn ensure_inventory(
        &self,
        key: MarketKey,
        initial: i64,
        max_quantity: i64,
    ) -> EngineResult<()> {
        self.tx.execute(
            "INSERT OR IGNORE INTO market_inventory (system_id, commodity, quantity, max_quantity)
             VALUES (?1, ?2, ?3, ?4)",
            params![key.system.as_i64(), key.commodity.key(), initial, max_quantity],
        )?;
        Ok(())
    }

    pub fn inventory(&self, key: MarketKey) -> EngineResult<Option<InventoryRow>> {
        let row = self
            .tx
            .query_row(
                "SELECT quantity, max_quantity FROM market_inventory
                 WHERE system_id = ?1 AND commodity = ?2",
                params![key.system.as_i64(), key.commodity.key()],
                |row| {
                    Ok(InventoryRow {
                        quantity:     row.get(0)?,
                        max_quantity: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Remove stock. The guard makes an oversell a no-op that is reported
    /// as InsufficientStock instead of a negative row.
    pub fn withdraw_stock(&self, key: MarketKey, quantity: i64) -> EngineResult<()> {
        let n = self.tx.execute(
            "UPDATE market_inventory SET quantity = quantity - ?1
             WHERE system_id = ?2 AND commodity = ?3 AND quantity >= ?1",
            params![quantity, key.system.as_i64(), key.commodity.key()],
        )?;
        if n == 0 {
            let available = self.inventory(key)?.map(|r| r.quantity).unwrap_or(0);
            return Err(EngineError::InsufficientStock { requested: quantity, available });
        }
        Ok(())
    }

    /// Add stock, capped at the row's maximum.
    pub fn deposit_stock(&self, key: MarketKey, quantity: i64) -> EngineResult<()> {
        self.tx.execute(
            "UPDATE market_inventory SET quantity = MIN(max_quantity, quantity + ?1)
             WHERE system_id = ?2 AND commodity = ?3",
            params![quantity, key.system.as_i64(), key.commodity.key()],
        )?;
        Ok(())
    }

    /// Restock one row. Returns false when the row does not exist.
    pub fn restock(&self, key: MarketKey, rate: i64) -> EngineResult<bool> {
        let n = self.tx.execute(
            "UPDATE market_inventory SET quantity = MIN(max_quantity, quantity + ?1)
             WHERE system_id = ?2 AND commodity = ?3",
            params![rate, key.system.as_i64(), key.commodity.key()],
        )?;
        Ok(n > 0)
    }

    /// Rows below their maximum.
    pub fn restockable_markets(&self) -> EngineResult<Vec<(i64, String)>> {
        let mut stmt = self.tx.prepare(
            "SELECT system_id, commodity FROM market_inventory
             WHERE quantity < max_quantity ORDER BY system_id, commodity",
        )?;
        let keys = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    // ── Price delta ───────────────────────────────────────────────

    pub fn price_delta(&self, key: MarketKey) -> EngineResult<i64> {
        let delta = self
            .tx
            .query_row(
                "SELECT delta FROM price_delta WHERE system_id = ?1 AND commodity = ?2",
                params![key.system.as_i64(), key.commodity.key()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(delta.unwrap_or(0))
    }

    pub fn add_price_delta(&self, key: MarketKey, push: i64) -> EngineResult<()> {
        self.tx.execute(
            "INSERT INTO price_delta (system_id, commodity, delta) VALUES (?1, ?2, ?3)
             ON CONFLICT(system_id, commodity) DO UPDATE SET delta = delta + excluded.delta",
            params![key.system.as_i64(), key.commodity.key(), push],
        )?;
        Ok(())
    }

    /// Move one delta `decay_bp` of the way toward zero. A step that
    /// truncates to nothing still moves by one so small deltas reach zero.
    pub fn decay_delta(&self, key: MarketKey, decay_bp: i64) -> EngineResult<bool> {
        let n = self.tx.execute(
            "UPDATE price_delta SET delta = CASE
                 WHEN delta = 0 OR ?1 = 0      THEN delta
                 WHEN (delta * ?1) / 10000 = 0 THEN delta - (CASE WHEN delta > 0 THEN 1 ELSE -1 END)
                 ELSE delta - (delta * ?1) / 10000
             END
             WHERE system_id = ?2 AND commodity = ?3",
            params![decay_bp, key.system.as_i64(), key.commodity.key()],
        )?;
        Ok(n > 0)
    }

    /// Rows with a nonzero delta.
    pub fn decaying_deltas(&self) -> EngineResult<Vec<(i64, String)>> {
        let mut stmt = self.tx.prepare(
            "SELECT system_id, commodity FROM price_delta
             WHERE delta != 0 ORDER BY system_id, commodity",
        )?;
        let keys = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

impl MarketKey {
    pub fn new(system: SystemId, commodity: Commodity) -> Self {
        Self { system, commodity }
    }

    /// Decode a raw (system_id, commodity) pair listed by a maintenance scan.
    pub fn decode(raw: &(i64, String)) -> EngineResult<Self> {
        Ok(Self {
            system:    SystemId::from_i64(raw.0)?,
            commodity: Commodity::from_key(&raw.1)?,
        })
    }
}
