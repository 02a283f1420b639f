//! Recruit pool tables.
//!
//! `recruit_epoch` holds one row per level tier and is advanced only by a
//! conditional upsert that refuses to move backwards. Pool rows and hired
//! copies store the full generated entry (chaos factor included) as JSON;
//! projection to the player-facing shape happens above the store.

use super::{now_rfc3339, LedgerTx};
use crate::{
    error::EngineResult,
    recruit_generator::RecruitPoolEntry,
    tables::LevelTier,
    types::ActorId,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochRecord {
    pub level_tier: LevelTier,
    pub epoch:      u64,
    /// Number of times this tier's epoch has advanced, starting at 1.
    pub version:    u64,
}

/// A frozen copy of a pool entry, owned by the hiring actor.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HiredRecruit {
    pub hire_id:  String,
    pub actor_id: ActorId,
    pub hired_at: String,
    pub entry:    RecruitPoolEntry,
}

impl LedgerTx<'_> {
    // ── Epoch record ──────────────────────────────────────────────

    pub fn epoch_record(&self, level_tier: LevelTier) -> EngineResult<Option<EpochRecord>> {
        let row = self
            .tx
            .query_row(
                "SELECT epoch, version FROM recruit_epoch WHERE level_tier = ?1",
                params![level_tier.get()],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;
        Ok(row.map(|(epoch, version)| EpochRecord {
            level_tier,
            epoch: epoch as u64,
            version: version as u64,
        }))
    }

    /// Idempotent, monotone upsert. Returns true only when this call created
    /// the record or moved it to a later epoch.
    pub fn advance_epoch(&self, level_tier: LevelTier, epoch: u64) -> EngineResult<bool> {
        let n = self.tx.execute(
            "INSERT INTO recruit_epoch (level_tier, epoch, version, rotated_at)
             VALUES (?1, ?2, 1, ?3)
             ON CONFLICT(level_tier) DO UPDATE
                 SET epoch      = excluded.epoch,
                     version    = recruit_epoch.version + 1,
                     rotated_at = excluded.rotated_at
                 WHERE excluded.epoch > recruit_epoch.epoch",
            params![level_tier.get(), epoch as i64, now_rfc3339()],
        )?;
        Ok(n > 0)
    }

    // ── Pool entries ──────────────────────────────────────────────

    pub(crate) fn insert_pool_entry(&self, entry: &RecruitPoolEntry) -> EngineResult<()> {
        self.tx.execute(
            "INSERT OR IGNORE INTO recruit_pool_entry
                 (level_tier, epoch, slot, available_at, expires_at, payload)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.key.level_tier.get(),
                entry.key.epoch as i64,
                entry.key.slot,
                entry.available_at.timestamp(),
                entry.expires_at.timestamp(),
                serde_json::to_string(entry)?,
            ],
        )?;
        Ok(())
    }

    /// Drop materialized slots from epochs before `epoch`. Hired copies
    /// live in their own table and are untouched.
    pub fn prune_pool(&self, level_tier: LevelTier, epoch: u64) -> EngineResult<usize> {
        let n = self.tx.execute(
            "DELETE FROM recruit_pool_entry WHERE level_tier = ?1 AND epoch < ?2",
            params![level_tier.get(), epoch as i64],
        )?;
        Ok(n)
    }

    /// Entries of one epoch whose window contains `now`, in slot order.
    pub(crate) fn pool_entries(
        &self,
        level_tier: LevelTier,
        epoch: u64,
        now: DateTime<Utc>,
    ) -> EngineResult<Vec<RecruitPoolEntry>> {
        let mut stmt = self.tx.prepare(
            "SELECT payload FROM recruit_pool_entry
             WHERE level_tier = ?1 AND epoch = ?2
               AND available_at <= ?3 AND expires_at > ?3
             ORDER BY slot ASC",
        )?;
        let payloads = stmt
            .query_map(
                params![level_tier.get(), epoch as i64, now.timestamp()],
                |row| row.get::<_, String>(0),
            )?
            .collect::<Result<Vec<_>, _>>()?;
        payloads
            .iter()
            .map(|p| serde_json::from_str(p).map_err(Into::into))
            .collect()
    }

    // ── Hired recruits ────────────────────────────────────────────

    pub(crate) fn insert_hire(
        &self,
        hire_id: &str,
        actor: &str,
        entry: &RecruitPoolEntry,
    ) -> EngineResult<()> {
        self.tx.execute(
            "INSERT INTO hired_recruit
                 (hire_id, actor_id, level_tier, epoch, slot, payload, hired_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                hire_id,
                actor,
                entry.key.level_tier.get(),
                entry.key.epoch as i64,
                entry.key.slot,
                serde_json::to_string(entry)?,
                now_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn has_hired(
        &self,
        actor: &str,
        level_tier: LevelTier,
        epoch: u64,
        slot: u16,
    ) -> EngineResult<bool> {
        let n: i64 = self.tx.query_row(
            "SELECT COUNT(*) FROM hired_recruit
             WHERE actor_id = ?1 AND level_tier = ?2 AND epoch = ?3 AND slot = ?4",
            params![actor, level_tier.get(), epoch as i64, slot],
            |row| row.get(0),
        )?;
        Ok(n > 0)
    }

    pub(crate) fn hired_recruit(&self, hire_id: &str) -> EngineResult<Option<HiredRecruit>> {
        let raw = self
            .tx
            .query_row(
                "SELECT hire_id, actor_id, hired_at, payload FROM hired_recruit WHERE hire_id = ?1",
                params![hire_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;
        match raw {
            None => Ok(None),
            Some((hire_id, actor_id, hired_at, json)) => Ok(Some(HiredRecruit {
                hire_id,
                actor_id,
                hired_at,
                entry: serde_json::from_str(&json)?,
            })),
        }
    }
}
