use super::{now_rfc3339, LedgerTx};
use crate::{
    error::{EngineError, EngineResult},
    ship_generator::ShipAttributes,
    tables::Commodity,
    types::{ActorId, Credits, SystemId},
};
use rusqlite::{params, OptionalExtension};

/// A commissioned ship as the ledger sees it. `attributes` is the frozen
/// generator output taken at commission time.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipRow {
    pub ship_id:        String,
    pub actor_id:       ActorId,
    pub registry:       String,
    pub cargo_capacity: i64,
    pub attributes:     ShipAttributes,
}

impl LedgerTx<'_> {
    // ── Account ───────────────────────────────────────────────────

    pub fn insert_account(&self, actor: &str, credits: Credits) -> EngineResult<()> {
        self.tx.execute(
            "INSERT INTO account (actor_id, credits, opened_at) VALUES (?1, ?2, ?3)",
            params![actor, credits, now_rfc3339()],
        )?;
        Ok(())
    }

    pub fn credits(&self, actor: &str) -> EngineResult<Option<Credits>> {
        let credits = self
            .tx
            .query_row(
                "SELECT credits FROM account WHERE actor_id = ?1",
                params![actor],
                |row| row.get(0),
            )
            .optional()?;
        Ok(credits)
    }

    /// Relative balance change. The CHECK constraint on `credits` turns an
    /// overdraw into a database error, which aborts the transaction.
    pub fn adjust_credits(&self, actor: &str, delta: Credits) -> EngineResult<()> {
        self.tx.execute(
            "UPDATE account SET credits = credits + ?1 WHERE actor_id = ?2",
            params![delta, actor],
        )?;
        Ok(())
    }

    // ── Ship ──────────────────────────────────────────────────────

    pub fn insert_ship(
        &self,
        ship_id: &str,
        actor: &str,
        attributes: &ShipAttributes,
    ) -> EngineResult<()> {
        self.tx.execute(
            "INSERT INTO ship (ship_id, actor_id, registry, cargo_capacity, attributes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                ship_id,
                actor,
                attributes.registry,
                attributes.cargo_capacity,
                serde_json::to_string(attributes)?,
            ],
        )?;
        Ok(())
    }

    pub fn ship(&self, ship_id: &str) -> EngineResult<Option<ShipRow>> {
        let raw = self
            .tx
            .query_row(
                "SELECT ship_id, actor_id, registry, cargo_capacity, attributes
                 FROM ship WHERE ship_id = ?1",
                params![ship_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;
        match raw {
            None => Ok(None),
            Some((ship_id, actor_id, registry, cargo_capacity, json)) => Ok(Some(ShipRow {
                ship_id,
                actor_id,
                registry,
                cargo_capacity,
                attributes: serde_json::from_str(&json)?,
            })),
        }
    }

    // ── Cargo ─────────────────────────────────────────────────────

    pub fn cargo(&self, ship_id: &str, commodity: Commodity) -> EngineResult<i64> {
        let qty = self
            .tx
            .query_row(
                "SELECT quantity FROM cargo WHERE ship_id = ?1 AND commodity = ?2",
                params![ship_id, commodity.key()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(qty.unwrap_or(0))
    }

    /// Units held across every commodity.
    pub fn cargo_total(&self, ship_id: &str) -> EngineResult<i64> {
        let total = self.tx.query_row(
            "SELECT COALESCE(SUM(quantity), 0) FROM cargo WHERE ship_id = ?1",
            params![ship_id],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Load (`delta > 0`) or unload (`delta < 0`) goods.
    ///
    /// Unloading is a guarded UPDATE: an upsert would have SQLite check the
    /// negative proposed row against `quantity >= 0` before resolving the
    /// conflict. Unloading more than is held is InsufficientCargo.
    pub fn adjust_cargo(&self, ship_id: &str, commodity: Commodity, delta: i64) -> EngineResult<()> {
        if delta >= 0 {
            self.tx.execute(
                "INSERT INTO cargo (ship_id, commodity, quantity) VALUES (?1, ?2, ?3)
                 ON CONFLICT(ship_id, commodity) DO UPDATE SET quantity = quantity + excluded.quantity",
                params![ship_id, commodity.key(), delta],
            )?;
            return Ok(());
        }
        let n = self.tx.execute(
            "UPDATE cargo SET quantity = quantity + ?1
             WHERE ship_id = ?2 AND commodity = ?3 AND quantity + ?1 >= 0",
            params![delta, ship_id, commodity.key()],
        )?;
        if n == 0 {
            return Err(EngineError::InsufficientCargo {
                requested: -delta,
                held:      self.cargo(ship_id, commodity)?,
            });
        }
        Ok(())
    }

    // ── Ownership ─────────────────────────────────────────────────

    /// Claim or transfer a system.
    pub fn set_system_owner(&self, system: SystemId, actor: &str) -> EngineResult<()> {
        self.tx.execute(
            "INSERT INTO system_owner (system_id, actor_id, claimed_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(system_id) DO UPDATE SET actor_id = excluded.actor_id,
                                                  claimed_at = excluded.claimed_at",
            params![system.as_i64(), actor, now_rfc3339()],
        )?;
        Ok(())
    }

    pub fn system_owner(&self, system: SystemId) -> EngineResult<Option<ActorId>> {
        let owner = self
            .tx
            .query_row(
                "SELECT actor_id FROM system_owner WHERE system_id = ?1",
                params![system.as_i64()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(owner)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::EngineError,
        ship_generator::generate_ship,
        store::LedgerStore,
        tables::{Commodity, HullSize, Race, ShipVariant},
    };

    #[test]
    fn unloading_cargo_updates_in_place_and_never_goes_negative() {
        let mut store = LedgerStore::in_memory().unwrap();
        store.migrate().unwrap();
        let tx = store.begin().unwrap();
        tx.insert_account("ada", 0).unwrap();
        let ship = generate_ship(Race::Vex, HullSize::Frigate, ShipVariant::Hauler, 0);
        tx.insert_ship("ada-ship", "ada", &ship).unwrap();

        tx.adjust_cargo("ada-ship", Commodity::Iron, 10).unwrap();
        tx.adjust_cargo("ada-ship", Commodity::Iron, -4).unwrap();
        assert_eq!(tx.cargo("ada-ship", Commodity::Iron).unwrap(), 6);
        tx.adjust_cargo("ada-ship", Commodity::Iron, -6).unwrap();
        assert_eq!(tx.cargo("ada-ship", Commodity::Iron).unwrap(), 0);

        let err = tx.adjust_cargo("ada-ship", Commodity::Iron, -1).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientCargo { requested: 1, held: 0 }), "{err}");
        let err = tx.adjust_cargo("ada-ship", Commodity::Copper, -3).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientCargo { requested: 3, held: 0 }), "{err}");
        assert_eq!(tx.cargo_total("ada-ship").unwrap(), 0);
    }
}
