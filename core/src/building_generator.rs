//! Building generation: (race, function, tier, location seed) in,
//! stat block out.
//!
//! Construction cost and output rate come straight from the published
//! per-function tier tables, untouched by seeds or race. Everything else
//! scales from the tier-1 base with the tier's cost or output ratio, then
//! gets seed variance and, last, the racial multiplier.

use crate::{
    seed::{ByteRange, Seed},
    tables::{BuildingAttribute, BuildingFunction, Race, Tier},
};
use serde::{Deserialize, Serialize};

// ── Byte layout: building seed ────────────────────────────────────
/// One 2-byte variance roll per `BuildingAttribute` (bytes 0..12).
pub const ATTRIBUTE_VARIANCE: ByteRange = ByteRange::new(0, 12);
pub const DESIGNATION:        ByteRange = ByteRange::new(12, 2);
// bytes 14..32 spare

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingAttributes {
    pub race:              Race,
    pub function:          BuildingFunction,
    pub tier:              Tier,
    pub location_seed:     u64,
    pub designation:       String,
    pub construction_cost: i64,
    pub output_rate:       i64,
    pub staff_slots:       u32,
    pub maintenance_rate:  f64,
    pub hardpoints:        u32,
    pub storage:           i64,
    pub power_draw:        f64,
    pub durability:        i64,
}

pub fn generate_building(
    race: Race,
    function: BuildingFunction,
    tier: Tier,
    location_seed: u64,
) -> BuildingAttributes {
    let seed = Seed::derive(&[&"building", &race, &function, &tier.get(), &location_seed]);
    let table = function.table();
    let profile = race.profile();
    let cost_ratio = table.cost_ratio(tier);
    let output_ratio = table.output_ratio(tier);

    let tiered = |attr: BuildingAttribute| -> f64 {
        let base = table.base[attr as usize];
        match attr {
            BuildingAttribute::StaffSlots => base * output_ratio.sqrt(),
            BuildingAttribute::Hardpoints => base + table.hardpoints_per_tier * tier.index() as f64,
            BuildingAttribute::Storage    => base * output_ratio,
            BuildingAttribute::MaintenanceRate
            | BuildingAttribute::PowerDraw
            | BuildingAttribute::Durability => base * cost_ratio,
        }
    };

    let scale = |attr: BuildingAttribute| -> f64 {
        let unit = seed.extract_unit(ATTRIBUTE_VARIANCE.slot(attr as usize, 2));
        tiered(attr) * (1.0 + attr.variance_band() * unit) * profile.building_multiplier(attr)
    };

    BuildingAttributes {
        race,
        function,
        tier,
        location_seed,
        designation: format!(
            "{}-{}-{:04}",
            function.key()[..3].to_uppercase(),
            tier.get(),
            seed.extract(DESIGNATION, 10_000)
        ),
        construction_cost: table.cost(tier),
        output_rate: table.output(tier),
        staff_slots: scale(BuildingAttribute::StaffSlots).round().max(1.0) as u32,
        maintenance_rate: (scale(BuildingAttribute::MaintenanceRate) * 100.0).round() / 100.0,
        hardpoints: scale(BuildingAttribute::Hardpoints).round().max(0.0) as u32,
        storage: scale(BuildingAttribute::Storage).round() as i64,
        power_draw: (scale(BuildingAttribute::PowerDraw) * 100.0).round() / 100.0,
        durability: scale(BuildingAttribute::Durability).round().max(1.0) as i64,
    }
}
