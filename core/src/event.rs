//! The ledger event log.
//!
//! RULE: Every state change the ledger accepts is recorded as exactly one
//! LedgerEvent, appended inside the same transaction as the change.
//! A rolled-back change therefore leaves no event behind.

use crate::{
    tables::{Commodity, LevelTier},
    types::{ActorId, Credits, ShipId, SystemId},
};
use serde::{Deserialize, Serialize};

/// Variants are appended, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    // ── Setup ──────────────────────────────────────
    AccountOpened {
        actor:   ActorId,
        credits: Credits,
    },
    ShipCommissioned {
        actor:          ActorId,
        ship_id:        ShipId,
        registry:       String,
        cargo_capacity: i64,
    },
    BuildingConstructed {
        building_id: String,
        system:      SystemId,
        function:    String,
        tier:        u8,
    },
    BuildingStatusChanged {
        building_id: String,
        status:      String,
    },
    SystemClaimed {
        system: SystemId,
        owner:  ActorId,
    },
    SystemRealized {
        system: SystemId,
        name:   String,
    },

    // ── Trading ────────────────────────────────────
    TradeExecuted {
        trade_id:   String,
        actor:      ActorId,
        ship_id:    ShipId,
        system:     SystemId,
        commodity:  Commodity,
        direction:  String,
        quantity:   i64,
        unit_price: Credits,
        fee:        Credits,
        owner_tax:  Credits,
        net:        Credits,
    },

    // ── Recruits ───────────────────────────────────
    PoolRotated {
        level_tier: LevelTier,
        epoch:      u64,
        slots:      u16,
    },
    RecruitHired {
        hire_id:    String,
        actor:      ActorId,
        level_tier: LevelTier,
        epoch:      u64,
        slot:       u16,
    },

    // ── Maintenance ────────────────────────────────
    MaintenanceRan {
        task:      String,
        processed: usize,
        failed:    usize,
    },
}

impl LedgerEvent {
    /// Stable name for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::AccountOpened { .. }         => "account_opened",
            Self::ShipCommissioned { .. }      => "ship_commissioned",
            Self::BuildingConstructed { .. }   => "building_constructed",
            Self::BuildingStatusChanged { .. } => "building_status_changed",
            Self::SystemClaimed { .. }         => "system_claimed",
            Self::SystemRealized { .. }        => "system_realized",
            Self::TradeExecuted { .. }         => "trade_executed",
            Self::PoolRotated { .. }           => "pool_rotated",
            Self::RecruitHired { .. }          => "recruit_hired",
            Self::MaintenanceRan { .. }        => "maintenance_ran",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:          Option<i64>,
    pub event_type:  String,
    pub payload:     String, // JSON-serialized LedgerEvent
    pub recorded_at: String, // RFC 3339
}

impl EventLogEntry {
    pub fn decode(&self) -> serde_json::Result<LedgerEvent> {
        serde_json::from_str(&self.payload)
    }
}
