//! Maintenance tasks and registry.
//!
//! RULE: Every background job implements MaintenanceTask.
//! A task is safe to retry and safe to run on any schedule. Row-level
//! tasks commit each record in its own transaction and count a failing
//! record instead of aborting, so one bad row never blocks the batch.
//! Execution order for `run_maintenance` is fixed in engine.rs.

use crate::{
    config::EngineConfig,
    error::EngineResult,
    event::LedgerEvent,
    recruit_pool,
    store::{LedgerStore, MarketKey},
    tables::LevelTier,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceReport {
    pub task:      String,
    pub processed: usize,
    pub failed:    usize,
}

/// The contract every maintenance job must fulfill.
pub trait MaintenanceTask: Send + Sync {
    /// Unique stable name for this task.
    fn name(&self) -> &'static str;

    /// One pass over the task's records.
    fn run(
        &self,
        ledger: &mut LedgerStore,
        cfg: &EngineConfig,
        now: DateTime<Utc>,
    ) -> EngineResult<MaintenanceReport>;
}

/// Moves every nonzero price delta a fixed share of the way toward zero.
pub struct DeltaDecay;

/// Refills every market row by the restock rate, capped at its maximum.
pub struct InventoryRestock;

/// Advances each level tier's recruit pool to the epoch containing `now`.
pub struct PoolRotation;

impl MaintenanceTask for DeltaDecay {
    fn name(&self) -> &'static str {
        "delta_decay"
    }

    fn run(
        &self,
        ledger: &mut LedgerStore,
        cfg: &EngineConfig,
        _now: DateTime<Utc>,
    ) -> EngineResult<MaintenanceReport> {
        let keys = ledger.snapshot()?.decaying_deltas()?;
        let decay_bp = cfg.market.decay_bp;
        per_record(ledger, self.name(), &keys, |ledger, raw| {
            let key = MarketKey::decode(raw)?;
            let tx = ledger.begin()?;
            tx.decay_delta(key, decay_bp)?;
            tx.commit()
        })
    }
}

impl MaintenanceTask for InventoryRestock {
    fn name(&self) -> &'static str {
        "inventory_restock"
    }

    fn run(
        &self,
        ledger: &mut LedgerStore,
        cfg: &EngineConfig,
        _now: DateTime<Utc>,
    ) -> EngineResult<MaintenanceReport> {
        let keys = ledger.snapshot()?.restockable_markets()?;
        let rate = cfg.market.restock_rate;
        per_record(ledger, self.name(), &keys, |ledger, raw| {
            let key = MarketKey::decode(raw)?;
            let tx = ledger.begin()?;
            tx.restock(key, rate)?;
            tx.commit()
        })
    }
}

impl MaintenanceTask for PoolRotation {
    fn name(&self) -> &'static str {
        "pool_rotation"
    }

    fn run(
        &self,
        ledger: &mut LedgerStore,
        cfg: &EngineConfig,
        now: DateTime<Utc>,
    ) -> EngineResult<MaintenanceReport> {
        let tiers: Vec<LevelTier> = LevelTier::all().collect();
        per_record(ledger, self.name(), &tiers, |ledger, tier| {
            let tx = ledger.begin()?;
            recruit_pool::rotate(&tx, &cfg.recruits, *tier, now)?;
            tx.commit()
        })
    }
}

/// Apply `op` to every record, isolating failures, then log the batch.
fn per_record<T: std::fmt::Debug>(
    ledger: &mut LedgerStore,
    task: &str,
    records: &[T],
    mut op: impl FnMut(&mut LedgerStore, &T) -> EngineResult<()>,
) -> EngineResult<MaintenanceReport> {
    let mut report = MaintenanceReport {
        task:      task.to_string(),
        processed: 0,
        failed:    0,
    };
    for record in records {
        match op(ledger, record) {
            Ok(()) => report.processed += 1,
            Err(e) => {
                report.failed += 1;
                log::warn!("{task}: record {record:?} failed: {e}");
            }
        }
    }

    let tx = ledger.begin()?;
    tx.append_event(&LedgerEvent::MaintenanceRan {
        task:      report.task.clone(),
        processed: report.processed,
        failed:    report.failed,
    })?;
    tx.commit()?;

    log::debug!("{task}: processed={} failed={}", report.processed, report.failed);
    Ok(report)
}
