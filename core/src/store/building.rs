use super::LedgerTx;
use crate::{
    building_generator::BuildingAttributes,
    error::{EngineError, EngineResult},
    tables::{BuildingFunction, Commodity, Tier},
    types::{ActorId, BuildingId, SystemId},
};
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingStatus {
    Operational,
    Disabled,
    Destroyed,
}

impl BuildingStatus {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Operational => "operational",
            Self::Disabled    => "disabled",
            Self::Destroyed   => "destroyed",
        }
    }

    pub fn from_key(key: &str) -> EngineResult<Self> {
        match key {
            "operational" => Ok(Self::Operational),
            "disabled"    => Ok(Self::Disabled),
            "destroyed"   => Ok(Self::Destroyed),
            other => Err(EngineError::Validation(format!("unknown building status '{other}'"))),
        }
    }
}

impl fmt::Display for BuildingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A constructed building. `commodity` is the extracted mineral for
/// Extraction and the produced good for Refinery; None otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingRow {
    pub building_id: BuildingId,
    pub system:      SystemId,
    pub actor_id:    ActorId,
    pub function:    BuildingFunction,
    pub tier:        Tier,
    pub commodity:   Option<Commodity>,
    pub status:      BuildingStatus,
    pub attributes:  BuildingAttributes,
}

type RawBuilding = (String, i64, String, String, u8, Option<String>, String, String);

fn decode(raw: RawBuilding) -> EngineResult<BuildingRow> {
    let (building_id, system, actor_id, function, tier, commodity, status, json) = raw;
    Ok(BuildingRow {
        building_id,
        system: SystemId::from_i64(system)?,
        actor_id,
        function: BuildingFunction::from_key(&function)?,
        tier: Tier::new(tier)?,
        commodity: commodity.as_deref().map(Commodity::from_key).transpose()?,
        status: BuildingStatus::from_key(&status)?,
        attributes: serde_json::from_str(&json)?,
    })
}

const SELECT_BUILDING: &str =
    "SELECT building_id, system_id, actor_id, function, tier, commodity, status, attributes
     FROM building";

impl LedgerTx<'_> {
    // ── Building ──────────────────────────────────────────────────

    pub fn insert_building(&self, row: &BuildingRow) -> EngineResult<()> {
        self.tx.execute(
            "INSERT INTO building
                 (building_id, system_id, actor_id, function, tier, commodity, status, attributes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                row.building_id,
                row.system.as_i64(),
                row.actor_id,
                row.function.key(),
                row.tier.get(),
                row.commodity.map(|c| c.key()),
                row.status.key(),
                serde_json::to_string(&row.attributes)?,
            ],
        )?;
        Ok(())
    }

    /// Returns false when no building has that id.
    pub fn set_building_status(&self, building_id: &str, status: BuildingStatus) -> EngineResult<bool> {
        let n = self.tx.execute(
            "UPDATE building SET status = ?1 WHERE building_id = ?2",
            params![status.key(), building_id],
        )?;
        Ok(n > 0)
    }

    pub fn building(&self, building_id: &str) -> EngineResult<Option<BuildingRow>> {
        let raw = self
            .tx
            .query_row(
                &format!("{SELECT_BUILDING} WHERE building_id = ?1"),
                params![building_id],
                raw_building,
            )
            .optional()?;
        raw.map(decode).transpose()
    }

    /// Operational buildings in a system, in construction order.
    pub fn operational_buildings(&self, system: SystemId) -> EngineResult<Vec<BuildingRow>> {
        let mut stmt = self.tx.prepare(&format!(
            "{SELECT_BUILDING} WHERE system_id = ?1 AND status = 'operational' ORDER BY rowid ASC"
        ))?;
        let raws = stmt
            .query_map(params![system.as_i64()], raw_building)?
            .collect::<Result<Vec<_>, _>>()?;
        raws.into_iter().map(decode).collect()
    }
}

fn raw_building(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawBuilding> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}
