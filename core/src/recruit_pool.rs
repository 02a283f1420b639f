//! Recruit pool state: rotation, listing and hiring.
//!
//! RULE: The epoch record is the only shared state. It moves through one
//! conditional upsert per level tier, so concurrent rotations for the same
//! epoch agree and a stale caller can never move it backwards.
//! Readers filter by the recorded epoch AND the validity window.
//!
//! Hiring copies the pool entry verbatim into its own table. Later
//! rotations prune pool rows but never touch a hired copy.

use crate::{
    config::RecruitConfig,
    error::{EngineError, EngineResult},
    event::LedgerEvent,
    recruit_generator::{generate_pool, RecruitListing, RecruitPoolEntry},
    store::{HiredRecruit, LedgerTx},
    tables::LevelTier,
    types::ActorId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationOutcome {
    pub level_tier: LevelTier,
    /// The tier's current epoch after this call.
    pub epoch:      u64,
    pub version:    u64,
    /// False when the record was already at (or past) the requested epoch.
    pub advanced:   bool,
}

/// Player-facing view of a hired recruit. Like `RecruitListing`, it has
/// no chaos factor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiredRecruitView {
    pub hire_id:  String,
    pub actor:    ActorId,
    pub hired_at: String,
    pub recruit:  RecruitListing,
}

impl HiredRecruitView {
    pub(crate) fn from_hire(h: &HiredRecruit) -> Self {
        Self {
            hire_id:  h.hire_id.clone(),
            actor:    h.actor_id.clone(),
            hired_at: h.hired_at.clone(),
            recruit:  h.entry.listing(),
        }
    }
}

/// Advance `level_tier` to the epoch containing `now` and materialize its
/// slots. Idempotent within an epoch.
pub fn rotate(
    tx: &LedgerTx<'_>,
    cfg: &RecruitConfig,
    level_tier: LevelTier,
    now: DateTime<Utc>,
) -> EngineResult<RotationOutcome> {
    let schedule = cfg.schedule();
    let epoch = schedule.epoch_at(now);

    let advanced = tx.advance_epoch(level_tier, epoch)?;
    if advanced {
        for entry in generate_pool(level_tier, epoch, cfg.pool_size, &schedule) {
            tx.insert_pool_entry(&entry)?;
        }
        let pruned = tx.prune_pool(level_tier, epoch)?;
        tx.append_event(&LedgerEvent::PoolRotated {
            level_tier,
            epoch,
            slots: cfg.pool_size,
        })?;
        log::info!("recruits: {level_tier} rotated to epoch {epoch} ({pruned} stale slots pruned)");
    }

    let record = tx.epoch_record(level_tier)?.ok_or_else(|| {
        EngineError::Validation(format!("epoch record for {level_tier} missing after upsert"))
    })?;
    Ok(RotationOutcome {
        level_tier,
        epoch: record.epoch,
        version: record.version,
        advanced,
    })
}

/// Listings of the current epoch valid at `now`. Empty when the tier has
/// never been rotated or its epoch has lapsed without a rotation.
pub fn available(
    tx: &LedgerTx<'_>,
    level_tier: LevelTier,
    now: DateTime<Utc>,
) -> EngineResult<Vec<RecruitListing>> {
    let Some(record) = tx.epoch_record(level_tier)? else {
        return Ok(Vec::new());
    };
    let entries = tx.pool_entries(level_tier, record.epoch, now)?;
    Ok(entries.iter().map(RecruitPoolEntry::listing).collect())
}

pub fn hire(
    tx: &LedgerTx<'_>,
    actor: &str,
    level_tier: LevelTier,
    slot: u16,
    now: DateTime<Utc>,
    hire_id: String,
) -> EngineResult<HiredRecruitView> {
    if tx.credits(actor)?.is_none() {
        return Err(EngineError::Validation(format!("unknown actor '{actor}'")));
    }
    let record = tx.epoch_record(level_tier)?.ok_or_else(|| {
        EngineError::Validation(format!("no recruit pool has been rotated for {level_tier}"))
    })?;
    let entry = tx
        .pool_entries(level_tier, record.epoch, now)?
        .into_iter()
        .find(|e| e.key.slot == slot)
        .ok_or_else(|| {
            EngineError::Validation(format!(
                "no recruit available in {level_tier} slot {slot} at {now}"
            ))
        })?;
    if tx.has_hired(actor, level_tier, record.epoch, slot)? {
        return Err(EngineError::Validation(format!(
            "'{actor}' already hired {level_tier} slot {slot} this epoch"
        )));
    }

    tx.insert_hire(&hire_id, actor, &entry)?;
    tx.append_event(&LedgerEvent::RecruitHired {
        hire_id: hire_id.clone(),
        actor: actor.to_string(),
        level_tier,
        epoch: record.epoch,
        slot,
    })?;

    let hired = tx.hired_recruit(&hire_id)?.ok_or_else(|| {
        EngineError::Validation(format!("hire {hire_id} missing after insert"))
    })?;
    Ok(HiredRecruitView::from_hire(&hired))
}
