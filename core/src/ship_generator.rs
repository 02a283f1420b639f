//! Ship generation: (race, hull, variant, location seed) in, stat block out.
//!
//! Every attribute follows the same pipeline:
//!   hull base × (1 + band × seed unit) × variant tilt × racial multiplier
//! The racial multiplier is always the last factor applied.

use crate::{
    name_generator::NameGenerator,
    rng::{SeedStream, StreamSlot},
    seed::{ByteRange, Seed},
    tables::{HullSize, Race, ShipAttribute, ShipVariant},
};
use serde::{Deserialize, Serialize};

// ── Byte layout: ship seed ────────────────────────────────────────
/// One 2-byte variance roll per `ShipAttribute`, in `ALL` order (bytes 0..16).
pub const ATTRIBUTE_VARIANCE: ByteRange = ByteRange::new(0, 16);
/// Registry number stamped on the hull (bytes 16..19).
pub const REGISTRY: ByteRange = ByteRange::new(16, 3);
// bytes 19..32 spare

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipAttributes {
    pub race:             Race,
    pub hull_size:        HullSize,
    pub variant:          ShipVariant,
    pub location_seed:    u64,
    pub name:             String,
    pub registry:         String,
    pub cargo_capacity:   i64,
    pub fuel_efficiency:  f64,
    pub maneuverability:  f64,
    pub hardpoints:       u32,
    pub crew_min:         u32,
    pub crew_max:         u32,
    pub maintenance_rate: f64,
    pub hull_points:      i64,
    pub sensor_range:     f64,
}

impl ShipAttributes {
    /// Numeric value of one attribute, for population audits.
    pub fn attribute(&self, attr: ShipAttribute) -> f64 {
        match attr {
            ShipAttribute::CargoCapacity   => self.cargo_capacity as f64,
            ShipAttribute::FuelEfficiency  => self.fuel_efficiency,
            ShipAttribute::Maneuverability => self.maneuverability,
            ShipAttribute::Hardpoints      => self.hardpoints as f64,
            ShipAttribute::CrewCapacity    => self.crew_max as f64,
            ShipAttribute::MaintenanceRate => self.maintenance_rate,
            ShipAttribute::HullPoints      => self.hull_points as f64,
            ShipAttribute::SensorRange     => self.sensor_range,
        }
    }
}

pub fn ship_seed(race: Race, hull: HullSize, variant: ShipVariant, location_seed: u64) -> Seed {
    Seed::derive(&[&"ship", &race, &hull, &(variant as u8), &location_seed])
}

pub fn generate_ship(
    race: Race,
    hull_size: HullSize,
    variant: ShipVariant,
    location_seed: u64,
) -> ShipAttributes {
    let seed = ship_seed(race, hull_size, variant, location_seed);
    let base = hull_size.base();
    let tilt = variant.tilt();
    let profile = race.profile();

    let scale = |attr: ShipAttribute, base_value: f64| -> f64 {
        let unit = seed.extract_unit(ATTRIBUTE_VARIANCE.slot(attr as usize, 2));
        base_value
            * (1.0 + attr.variance_band() * unit)
            * tilt[attr as usize]
            * profile.ship_multiplier(attr)
    };

    let crew_min = scale(ShipAttribute::CrewCapacity, base.crew_min).round().max(1.0) as u32;
    let crew_max = (scale(ShipAttribute::CrewCapacity, base.crew_max).round() as u32).max(crew_min);

    let mut names = SeedStream::new(&seed, StreamSlot::ShipName);

    ShipAttributes {
        race,
        hull_size,
        variant,
        location_seed,
        name: NameGenerator::ship_name(&mut names),
        registry: format!(
            "{}-{:06}",
            race.key().to_uppercase(),
            seed.extract(REGISTRY, 1_000_000)
        ),
        cargo_capacity: scale(ShipAttribute::CargoCapacity, base.cargo_capacity).round().max(1.0) as i64,
        fuel_efficiency: round2(scale(ShipAttribute::FuelEfficiency, base.fuel_efficiency)),
        maneuverability: round2(scale(ShipAttribute::Maneuverability, base.maneuverability)),
        hardpoints: scale(ShipAttribute::Hardpoints, base.hardpoints).round().max(0.0) as u32,
        crew_min,
        crew_max,
        maintenance_rate: round2(scale(ShipAttribute::MaintenanceRate, base.maintenance_rate)),
        hull_points: scale(ShipAttribute::HullPoints, base.hull_points).round().max(1.0) as i64,
        sensor_range: round2(scale(ShipAttribute::SensorRange, base.sensor_range)),
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
