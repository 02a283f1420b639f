//! Star system generation: coordinate in, immutable system out.
//!
//! Key fields: (x, y, z). Planets use child seeds ("planet", i) so a system
//! can carry twelve planets without exhausting the parent digest.
//!
//! The origin is The Cradle: a hard-coded, zero-hazard tutorial system that
//! never touches the extractor.
//!
//! No database access, no clock, no shared state.

use crate::{
    name_generator::NameGenerator,
    rng::{SeedStream, StreamSlot},
    seed::{ByteRange, Seed},
    tables::{
        Abundance, Commodity, MineralTier, PlanetClass, StarType,
        EXOTIC_UNLOCK_DIST_SQ, FUTURISTIC_UNLOCK_DIST_SQ, RARE_UNLOCK_DIST_SQ,
    },
    types::{Coordinate, SystemId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MAX_PLANETS: u8 = 12;
pub const MAX_HAZARD: u8 = 100;
pub const CRADLE_NAME: &str = "The Cradle";

/// Half-width of the base price variance band, in basis points (±20%).
pub const PRICE_VARIANCE_BP: i64 = 2_000;

// ── Byte layout: system seed ──────────────────────────────────────
pub const STAR_TYPE:    ByteRange = ByteRange::new(0, 2);
pub const PLANET_COUNT: ByteRange = ByteRange::new(2, 1);
pub const HAZARD:       ByteRange = ByteRange::new(3, 2);
/// One byte per commodity, in `Commodity::ALL` order (bytes 5..21).
pub const PRICE_VARIANCE: ByteRange = ByteRange::new(5, 16);
// bytes 21..32 spare

// ── Byte layout: planet seed ──────────────────────────────────────
pub const PLANET_CLASS:  ByteRange = ByteRange::new(0, 1);
pub const MINERAL_COUNT: ByteRange = ByteRange::new(1, 1);
/// Three 2-byte mineral picks (bytes 2..8).
pub const MINERAL_PICKS: ByteRange = ByteRange::new(2, 6);
/// Three 2-byte abundance rolls (bytes 8..14).
pub const ABUNDANCE:     ByteRange = ByteRange::new(8, 6);
// bytes 14..32 spare

pub const MAX_MINERALS_PER_PLANET: u64 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MineralDeposit {
    pub mineral:   Commodity,
    pub tier:      MineralTier,
    pub abundance: Abundance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Planet {
    pub index:    u8,
    pub class:    PlanetClass,
    pub minerals: Vec<MineralDeposit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemAttributes {
    pub coordinate:   Coordinate,
    pub system_id:    SystemId,
    pub name:         String,
    pub is_cradle:    bool,
    pub star_type:    StarType,
    pub planet_count: u8,
    pub hazard:       u8,
    pub planets:      Vec<Planet>,
    pub base_prices:  BTreeMap<Commodity, i64>,
}

impl SystemAttributes {
    /// Best local abundance of a mineral across all planets.
    /// None when no planet carries it (or it is not a mineral).
    pub fn abundance_of(&self, commodity: Commodity) -> Option<Abundance> {
        self.planets
            .iter()
            .flat_map(|p| p.minerals.iter())
            .filter(|d| d.mineral == commodity)
            .map(|d| d.abundance)
            .max()
    }

    pub fn base_price(&self, commodity: Commodity) -> i64 {
        self.base_prices
            .get(&commodity)
            .copied()
            .unwrap_or_else(|| commodity.base_value())
    }

    /// Distinct minerals present anywhere in the system.
    pub fn mineral_set(&self) -> Vec<Commodity> {
        let mut set: Vec<Commodity> = self
            .planets
            .iter()
            .flat_map(|p| p.minerals.iter().map(|d| d.mineral))
            .collect();
        set.sort();
        set.dedup();
        set
    }
}

/// Generate the system at `coord`. Total over every valid coordinate.
pub fn generate_system(coord: Coordinate) -> SystemAttributes {
    if coord.is_origin() {
        return the_cradle();
    }

    let seed = Seed::derive(&[&coord.x, &coord.y, &coord.z]);

    let star_type =
        StarType::ALL[seed.extract_weighted(STAR_TYPE, &StarType::CUMULATIVE_WEIGHTS)];
    let planet_count = seed.extract(PLANET_COUNT, MAX_PLANETS as u64 + 1) as u8;
    let raw_hazard = seed.extract(HAZARD, MAX_HAZARD as u64 + 1) as u8;
    let hazard = raw_hazard.max(star_type.hazard_floor());

    let eligible = eligible_minerals(coord, star_type);
    let planets = (0..planet_count)
        .map(|i| generate_planet(&seed.child("planet", i as usize), i, &eligible))
        .collect();

    let base_prices = Commodity::ALL
        .iter()
        .map(|c| {
            let raw = seed.extract(PRICE_VARIANCE.slot(c.index(), 1), 256) as i64;
            (*c, varied_price(c.base_value(), raw))
        })
        .collect();

    let mut names = SeedStream::new(&seed, StreamSlot::SystemName);

    SystemAttributes {
        coordinate: coord,
        system_id: coord.system_id(),
        name: NameGenerator::system_name(&mut names),
        is_cradle: false,
        star_type,
        planet_count,
        hazard,
        planets,
        base_prices,
    }
}

/// Base value adjusted by a variance byte mapped onto ±PRICE_VARIANCE_BP.
/// Integer arithmetic only, floored at 1.
fn varied_price(base: i64, variance_byte: i64) -> i64 {
    let variance_bp = variance_byte * (2 * PRICE_VARIANCE_BP) / 255 - PRICE_VARIANCE_BP;
    let scaled = base * (10_000 + variance_bp);
    // round half up
    ((scaled + 5_000) / 10_000).max(1)
}

/// Minerals a system may carry, given its distance and star.
pub fn eligible_minerals(coord: Coordinate, star: StarType) -> Vec<Commodity> {
    let d = coord.distance_sq();
    let mut tiers = vec![MineralTier::Common, MineralTier::Uncommon];
    if d >= RARE_UNLOCK_DIST_SQ {
        tiers.push(MineralTier::Rare);
    }
    if d >= EXOTIC_UNLOCK_DIST_SQ {
        tiers.push(MineralTier::Exotic);
    }
    if d >= FUTURISTIC_UNLOCK_DIST_SQ && star.hosts_futuristic() {
        tiers.push(MineralTier::Futuristic);
    }
    tiers.iter().flat_map(|t| t.minerals().iter().copied()).collect()
}

fn generate_planet(seed: &Seed, index: u8, eligible: &[Commodity]) -> Planet {
    let class = PlanetClass::ALL[seed.extract(PLANET_CLASS, PlanetClass::ALL.len() as u64) as usize];
    let count = 1 + seed.extract(MINERAL_COUNT, MAX_MINERALS_PER_PLANET) as usize;

    let mut minerals: Vec<MineralDeposit> = Vec::with_capacity(count);
    for k in 0..count {
        let pick = seed.extract(MINERAL_PICKS.slot(k, 2), eligible.len() as u64) as usize;
        let mineral = eligible[pick];
        // A repeated pick is dropped, not re-rolled.
        if minerals.iter().any(|d| d.mineral == mineral) {
            continue;
        }
        let abundance =
            Abundance::ALL[seed.extract_weighted(ABUNDANCE.slot(k, 2), &Abundance::CUMULATIVE_WEIGHTS)];
        minerals.push(MineralDeposit {
            mineral,
            tier: mineral.mineral_tier().unwrap_or(MineralTier::Common),
            abundance,
        });
    }

    Planet { index, class, minerals }
}

/// The fixed tutorial system at (0, 0, 0).
fn the_cradle() -> SystemAttributes {
    let deposit = |mineral: Commodity, abundance: Abundance| MineralDeposit {
        mineral,
        tier: mineral.mineral_tier().unwrap_or(MineralTier::Common),
        abundance,
    };
    let planets = vec![
        Planet {
            index: 0,
            class: PlanetClass::Rocky,
            minerals: vec![
                deposit(Commodity::Iron, Abundance::High),
                deposit(Commodity::Silicon, Abundance::Medium),
            ],
        },
        Planet {
            index: 1,
            class: PlanetClass::Oceanic,
            minerals: vec![deposit(Commodity::Copper, Abundance::Medium)],
        },
        Planet {
            index: 2,
            class: PlanetClass::Ice,
            minerals: vec![deposit(Commodity::Titanium, Abundance::Low)],
        },
    ];
    SystemAttributes {
        coordinate: Coordinate::ORIGIN,
        system_id: Coordinate::ORIGIN.system_id(),
        name: CRADLE_NAME.to_string(),
        is_cradle: true,
        star_type: StarType::YellowDwarf,
        planet_count: planets.len() as u8,
        hazard: 0,
        planets,
        base_prices: Commodity::ALL.iter().map(|c| (*c, c.base_value())).collect(),
    }
}
