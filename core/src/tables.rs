//! Static balance tables.
//!
//! RULE: Everything in this file is configuration, not hashing.
//! Racial multipliers, hull bases, per-function tier tables and price
//! modifiers are retuned here without touching any seed layout.
//! Enum order is part of the seed contract: append only.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Commodities and minerals ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Commodity {
    Iron,
    Silicon,
    Copper,
    Titanium,
    Cobalt,
    Platinum,
    Iridium,
    Xenotite,
    Voidglass,
    Chronium,
    Neutronium,
    Fuel,
    Food,
    Alloys,
    Electronics,
    Medicine,
}

impl Commodity {
    pub const ALL: [Commodity; 16] = [
        Self::Iron, Self::Silicon, Self::Copper, Self::Titanium,
        Self::Cobalt, Self::Platinum, Self::Iridium, Self::Xenotite,
        Self::Voidglass, Self::Chronium, Self::Neutronium, Self::Fuel,
        Self::Food, Self::Alloys, Self::Electronics, Self::Medicine,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Iron        => "iron",
            Self::Silicon     => "silicon",
            Self::Copper      => "copper",
            Self::Titanium    => "titanium",
            Self::Cobalt      => "cobalt",
            Self::Platinum    => "platinum",
            Self::Iridium     => "iridium",
            Self::Xenotite    => "xenotite",
            Self::Voidglass   => "voidglass",
            Self::Chronium    => "chronium",
            Self::Neutronium  => "neutronium",
            Self::Fuel        => "fuel",
            Self::Food        => "food",
            Self::Alloys      => "alloys",
            Self::Electronics => "electronics",
            Self::Medicine    => "medicine",
        }
    }

    pub fn from_key(key: &str) -> EngineResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.key() == key)
            .ok_or_else(|| EngineError::UnknownCommodity(key.to_string()))
    }

    /// Canonical galactic base value in credits.
    pub fn base_value(&self) -> i64 {
        match self {
            Self::Iron        => 20,
            Self::Silicon     => 25,
            Self::Copper      => 30,
            Self::Titanium    => 60,
            Self::Cobalt      => 70,
            Self::Platinum    => 150,
            Self::Iridium     => 180,
            Self::Xenotite    => 400,
            Self::Voidglass   => 450,
            Self::Chronium    => 1_000,
            Self::Neutronium  => 1_200,
            Self::Fuel        => 40,
            Self::Food        => 15,
            Self::Alloys      => 90,
            Self::Electronics => 160,
            Self::Medicine    => 120,
        }
    }

    /// Mineral tier for raw minerals, None for manufactured goods.
    pub fn mineral_tier(&self) -> Option<MineralTier> {
        match self {
            Self::Iron | Self::Silicon | Self::Copper => Some(MineralTier::Common),
            Self::Titanium | Self::Cobalt             => Some(MineralTier::Uncommon),
            Self::Platinum | Self::Iridium            => Some(MineralTier::Rare),
            Self::Xenotite | Self::Voidglass          => Some(MineralTier::Exotic),
            Self::Chronium | Self::Neutronium         => Some(MineralTier::Futuristic),
            _ => None,
        }
    }

    pub fn is_mineral(&self) -> bool {
        self.mineral_tier().is_some()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MineralTier {
    Common,
    Uncommon,
    Rare,
    Exotic,
    Futuristic,
}

impl MineralTier {
    pub fn minerals(&self) -> &'static [Commodity] {
        match self {
            Self::Common     => &[Commodity::Iron, Commodity::Silicon, Commodity::Copper],
            Self::Uncommon   => &[Commodity::Titanium, Commodity::Cobalt],
            Self::Rare       => &[Commodity::Platinum, Commodity::Iridium],
            Self::Exotic     => &[Commodity::Xenotite, Commodity::Voidglass],
            Self::Futuristic => &[Commodity::Chronium, Commodity::Neutronium],
        }
    }
}

/// Squared distance from the origin at which each tier unlocks.
pub const RARE_UNLOCK_DIST_SQ:       u64 = 50_000 * 50_000;
pub const EXOTIC_UNLOCK_DIST_SQ:     u64 = 200_000 * 200_000;
pub const FUTURISTIC_UNLOCK_DIST_SQ: u64 = 500_000 * 500_000;

/// Refinery recipes: (output, input).
pub const REFINERY_RECIPES: [(Commodity, Commodity); 5] = [
    (Commodity::Alloys,      Commodity::Iron),
    (Commodity::Electronics, Commodity::Copper),
    (Commodity::Fuel,        Commodity::Cobalt),
    (Commodity::Medicine,    Commodity::Silicon),
    (Commodity::Food,        Commodity::Titanium),
];

pub fn refinery_input(output: Commodity) -> Option<Commodity> {
    REFINERY_RECIPES
        .iter()
        .find(|(out, _)| *out == output)
        .map(|(_, input)| *input)
}

// ── Stars, planets, abundance ─────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StarType {
    RedDwarf,
    OrangeDwarf,
    YellowDwarf,
    WhiteDwarf,
    RedGiant,
    BlueGiant,
    BinaryStar,
    NeutronStar,
    BlackHole,
}

impl StarType {
    pub const ALL: [StarType; 9] = [
        Self::RedDwarf, Self::OrangeDwarf, Self::YellowDwarf,
        Self::WhiteDwarf, Self::RedGiant, Self::BlueGiant,
        Self::BinaryStar, Self::NeutronStar, Self::BlackHole,
    ];

    /// Cumulative frequency out of 100, in `ALL` order.
    pub const CUMULATIVE_WEIGHTS: [u64; 9] = [30, 45, 65, 75, 83, 90, 96, 99, 100];

    /// Minimum hazard level around this star.
    pub fn hazard_floor(&self) -> u8 {
        match self {
            Self::RedDwarf | Self::OrangeDwarf | Self::YellowDwarf => 0,
            Self::WhiteDwarf  => 10,
            Self::RedGiant    => 15,
            Self::BinaryStar  => 20,
            Self::BlueGiant   => 25,
            Self::NeutronStar => 40,
            Self::BlackHole   => 60,
        }
    }

    /// Only collapsed stars seed futuristic minerals.
    pub fn hosts_futuristic(&self) -> bool {
        matches!(self, Self::NeutronStar | Self::BlackHole)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanetClass {
    Barren,
    Rocky,
    Ice,
    GasGiant,
    Oceanic,
    Volcanic,
}

impl PlanetClass {
    pub const ALL: [PlanetClass; 6] = [
        Self::Barren, Self::Rocky, Self::Ice,
        Self::GasGiant, Self::Oceanic, Self::Volcanic,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Abundance {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Abundance {
    pub const ALL: [Abundance; 5] = [
        Self::VeryLow, Self::Low, Self::Medium, Self::High, Self::VeryHigh,
    ];

    pub const CUMULATIVE_WEIGHTS: [u64; 5] = [15, 40, 70, 90, 100];

    /// Local price multiplier in basis points.
    pub fn price_modifier_bp(&self) -> i64 {
        match self {
            Self::VeryLow  => 15_000,
            Self::Low      => 12_000,
            Self::Medium   => 10_000,
            Self::High     => 8_500,
            Self::VeryHigh => 7_000,
        }
    }
}

// ── Races ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Race {
    Human,
    Vex,
    Krath,
    Solari,
    Nomari,
    Zeth,
}

impl Race {
    pub const ALL: [Race; 6] = [
        Self::Human, Self::Vex, Self::Krath, Self::Solari, Self::Nomari, Self::Zeth,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Human  => "human",
            Self::Vex    => "vex",
            Self::Krath  => "krath",
            Self::Solari => "solari",
            Self::Nomari => "nomari",
            Self::Zeth   => "zeth",
        }
    }

    pub fn from_key(key: &str) -> EngineResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.key() == key)
            .ok_or_else(|| EngineError::Validation(format!("unknown race '{key}'")))
    }

    pub fn profile(&self) -> &'static RaceProfile {
        &RACE_PROFILES[*self as usize]
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipAttribute {
    CargoCapacity,
    FuelEfficiency,
    Maneuverability,
    Hardpoints,
    CrewCapacity,
    MaintenanceRate,
    HullPoints,
    SensorRange,
}

impl ShipAttribute {
    pub const ALL: [ShipAttribute; 8] = [
        Self::CargoCapacity, Self::FuelEfficiency, Self::Maneuverability,
        Self::Hardpoints, Self::CrewCapacity, Self::MaintenanceRate,
        Self::HullPoints, Self::SensorRange,
    ];

    /// Half-width of the seed variance band (0.20 = ±20%).
    pub fn variance_band(&self) -> f64 {
        match self {
            Self::CargoCapacity   => 0.20,
            Self::FuelEfficiency  => 0.15,
            Self::Maneuverability => 0.10,
            Self::Hardpoints      => 0.25,
            Self::CrewCapacity    => 0.10,
            Self::MaintenanceRate => 0.15,
            Self::HullPoints      => 0.15,
            Self::SensorRange     => 0.20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingAttribute {
    StaffSlots,
    MaintenanceRate,
    Hardpoints,
    Storage,
    PowerDraw,
    Durability,
}

impl BuildingAttribute {
    pub const ALL: [BuildingAttribute; 6] = [
        Self::StaffSlots, Self::MaintenanceRate, Self::Hardpoints,
        Self::Storage, Self::PowerDraw, Self::Durability,
    ];

    pub fn variance_band(&self) -> f64 {
        match self {
            Self::StaffSlots      => 0.15,
            Self::MaintenanceRate => 0.10,
            Self::Hardpoints      => 0.20,
            Self::Storage         => 0.15,
            Self::PowerDraw       => 0.10,
            Self::Durability      => 0.15,
        }
    }
}

pub struct RaceProfile {
    pub race: Race,
    /// The ship attribute this race is known for.
    pub signature: ShipAttribute,
    /// Documented band for (race mean / cross-race mean) of the signature
    /// attribute over the full ship cross-product.
    pub signature_band: (f64, f64),
    /// Indexed by `ShipAttribute as usize`.
    pub ship_multipliers: [f64; 8],
    /// Indexed by `BuildingAttribute as usize`.
    pub building_multipliers: [f64; 6],
}

impl RaceProfile {
    pub fn ship_multiplier(&self, attr: ShipAttribute) -> f64 {
        self.ship_multipliers[attr as usize]
    }

    pub fn building_multiplier(&self, attr: BuildingAttribute) -> f64 {
        self.building_multipliers[attr as usize]
    }
}

//                           cargo fuel  man   hard  crew  maint hull  sensor
pub const RACE_PROFILES: [RaceProfile; 6] = [
    RaceProfile {
        race: Race::Human,
        signature: ShipAttribute::CrewCapacity,
        signature_band: (1.13, 1.23),
        ship_multipliers:     [1.00, 1.00, 1.00, 1.00, 1.20, 1.00, 1.00, 1.00],
        building_multipliers: [1.20, 1.00, 1.00, 1.00, 1.00, 1.00],
    },
    RaceProfile {
        race: Race::Vex,
        signature: ShipAttribute::CargoCapacity,
        signature_band: (1.15, 1.25),
        ship_multipliers:     [1.25, 1.00, 1.00, 0.85, 1.00, 1.00, 1.00, 1.00],
        building_multipliers: [1.00, 1.00, 1.00, 1.25, 1.00, 1.00],
    },
    RaceProfile {
        race: Race::Krath,
        signature: ShipAttribute::HullPoints,
        signature_band: (1.15, 1.25),
        ship_multipliers:     [1.00, 1.00, 1.00, 1.00, 1.00, 1.10, 1.25, 0.90],
        building_multipliers: [1.00, 1.05, 1.10, 1.00, 1.00, 1.25],
    },
    RaceProfile {
        race: Race::Solari,
        signature: ShipAttribute::SensorRange,
        signature_band: (1.15, 1.25),
        ship_multipliers:     [1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 0.90, 1.25],
        building_multipliers: [1.00, 1.00, 1.00, 1.00, 0.85, 0.95],
    },
    RaceProfile {
        race: Race::Nomari,
        signature: ShipAttribute::FuelEfficiency,
        signature_band: (1.11, 1.21),
        ship_multipliers:     [0.90, 1.20, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00],
        building_multipliers: [1.00, 0.90, 1.00, 1.00, 1.00, 1.00],
    },
    RaceProfile {
        race: Race::Zeth,
        signature: ShipAttribute::Maneuverability,
        signature_band: (1.15, 1.25),
        ship_multipliers:     [1.00, 1.00, 1.25, 1.00, 0.90, 1.00, 1.00, 1.00],
        building_multipliers: [0.90, 1.00, 1.25, 1.00, 1.00, 1.00],
    },
];

// ── Hulls and variants ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HullSize {
    Scout,
    Frigate,
    Destroyer,
    Cruiser,
    Capital,
}

impl HullSize {
    pub const ALL: [HullSize; 5] = [
        Self::Scout, Self::Frigate, Self::Destroyer, Self::Cruiser, Self::Capital,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Scout     => "scout",
            Self::Frigate   => "frigate",
            Self::Destroyer => "destroyer",
            Self::Cruiser   => "cruiser",
            Self::Capital   => "capital",
        }
    }

    pub fn from_key(key: &str) -> EngineResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|h| h.key() == key)
            .ok_or_else(|| EngineError::Validation(format!("unknown hull size '{key}'")))
    }

    pub fn base(&self) -> &'static HullBase {
        &HULL_BASES[*self as usize]
    }
}

impl fmt::Display for HullSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

pub struct HullBase {
    pub cargo_capacity:   f64,
    pub fuel_efficiency:  f64,
    pub maneuverability:  f64,
    pub hardpoints:       f64,
    pub crew_min:         f64,
    pub crew_max:         f64,
    pub maintenance_rate: f64,
    pub hull_points:      f64,
    pub sensor_range:     f64,
}

pub const HULL_BASES: [HullBase; 5] = [
    // Scout
    HullBase {
        cargo_capacity: 40.0, fuel_efficiency: 1.60, maneuverability: 90.0,
        hardpoints: 1.0, crew_min: 1.0, crew_max: 4.0,
        maintenance_rate: 15.0, hull_points: 200.0, sensor_range: 120.0,
    },
    // Frigate
    HullBase {
        cargo_capacity: 150.0, fuel_efficiency: 1.30, maneuverability: 70.0,
        hardpoints: 3.0, crew_min: 4.0, crew_max: 20.0,
        maintenance_rate: 45.0, hull_points: 900.0, sensor_range: 90.0,
    },
    // Destroyer
    HullBase {
        cargo_capacity: 300.0, fuel_efficiency: 1.10, maneuverability: 55.0,
        hardpoints: 6.0, crew_min: 12.0, crew_max: 60.0,
        maintenance_rate: 110.0, hull_points: 2_400.0, sensor_range: 75.0,
    },
    // Cruiser
    HullBase {
        cargo_capacity: 800.0, fuel_efficiency: 0.90, maneuverability: 40.0,
        hardpoints: 10.0, crew_min: 40.0, crew_max: 150.0,
        maintenance_rate: 260.0, hull_points: 6_000.0, sensor_range: 60.0,
    },
    // Capital
    HullBase {
        cargo_capacity: 2_500.0, fuel_efficiency: 0.70, maneuverability: 20.0,
        hardpoints: 18.0, crew_min: 120.0, crew_max: 400.0,
        maintenance_rate: 700.0, hull_points: 18_000.0, sensor_range: 50.0,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipVariant {
    Standard,
    Hauler,
    Interceptor,
    Surveyor,
}

impl ShipVariant {
    pub const ALL: [ShipVariant; 4] = [
        Self::Standard, Self::Hauler, Self::Interceptor, Self::Surveyor,
    ];

    /// Per-attribute tilt, indexed by `ShipAttribute as usize`.
    pub fn tilt(&self) -> [f64; 8] {
        //                     cargo fuel  man   hard  crew  maint hull  sensor
        match self {
            Self::Standard    => [1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00, 1.00],
            Self::Hauler      => [1.15, 1.00, 0.90, 0.80, 1.00, 1.05, 1.00, 1.00],
            Self::Interceptor => [0.85, 0.95, 1.15, 1.10, 1.00, 1.00, 0.95, 1.00],
            Self::Surveyor    => [0.90, 1.10, 1.00, 0.80, 1.00, 1.00, 1.00, 1.20],
        }
    }
}

impl TryFrom<u8> for ShipVariant {
    type Error = EngineError;

    fn try_from(idx: u8) -> EngineResult<Self> {
        Self::ALL
            .get(idx as usize)
            .copied()
            .ok_or_else(|| EngineError::Validation(format!("variant index {idx} out of range")))
    }
}

// ── Buildings ─────────────────────────────────────────────────────

pub const MAX_TIER: u8 = 5;

/// Building tier, 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Tier(u8);

impl Tier {
    pub fn new(tier: u8) -> EngineResult<Self> {
        if (1..=MAX_TIER).contains(&tier) {
            Ok(Self(tier))
        } else {
            Err(EngineError::Validation(format!("tier {tier} outside 1..={MAX_TIER}")))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Zero-based index into per-tier tables.
    pub fn index(&self) -> usize {
        self.0 as usize - 1
    }

    pub fn all() -> impl Iterator<Item = Tier> {
        (1..=MAX_TIER).map(Tier)
    }
}

impl TryFrom<u8> for Tier {
    type Error = EngineError;
    fn try_from(t: u8) -> EngineResult<Self> {
        Tier::new(t)
    }
}

impl From<Tier> for u8 {
    fn from(t: Tier) -> u8 {
        t.0
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingFunction {
    Extraction,
    Refinery,
    Marketplace,
    Habitat,
    Shipyard,
    Defense,
}

impl BuildingFunction {
    pub const ALL: [BuildingFunction; 6] = [
        Self::Extraction, Self::Refinery, Self::Marketplace,
        Self::Habitat, Self::Shipyard, Self::Defense,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Extraction  => "extraction",
            Self::Refinery    => "refinery",
            Self::Marketplace => "marketplace",
            Self::Habitat     => "habitat",
            Self::Shipyard    => "shipyard",
            Self::Defense     => "defense",
        }
    }

    pub fn from_key(key: &str) -> EngineResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.key() == key)
            .ok_or_else(|| EngineError::Validation(format!("unknown building function '{key}'")))
    }

    pub fn table(&self) -> &'static FunctionTable {
        &FUNCTION_TABLES[*self as usize]
    }
}

impl fmt::Display for BuildingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Published per-function tier table. Cost and output are authoritative
/// per tier; `cost_factor`/`output_factor` document the step multiplier.
pub struct FunctionTable {
    pub function:      BuildingFunction,
    pub cost_factor:   f64,
    pub output_factor: f64,
    pub cost_by_tier:   [i64; 5],
    pub output_by_tier: [i64; 5],
    /// Tier-1 bases indexed by `BuildingAttribute as usize`.
    pub base: [f64; 6],
    /// Hardpoints added per tier step.
    pub hardpoints_per_tier: f64,
}

impl FunctionTable {
    pub fn cost(&self, tier: Tier) -> i64 {
        self.cost_by_tier[tier.index()]
    }

    pub fn output(&self, tier: Tier) -> i64 {
        self.output_by_tier[tier.index()]
    }

    pub fn cost_ratio(&self, tier: Tier) -> f64 {
        self.cost(tier) as f64 / self.cost_by_tier[0] as f64
    }

    pub fn output_ratio(&self, tier: Tier) -> f64 {
        self.output(tier) as f64 / self.output_by_tier[0] as f64
    }
}

/// Overall tier exponents the per-function tables roughly follow.
pub const TARGET_COST_FACTOR:   f64 = 1.8;
pub const TARGET_OUTPUT_FACTOR: f64 = 2.5;

//                                  staff  maint  hard  storage  power  durability
pub const FUNCTION_TABLES: [FunctionTable; 6] = [
    FunctionTable {
        function: BuildingFunction::Extraction,
        cost_factor: 1.8, output_factor: 2.5,
        cost_by_tier:   [10_000, 18_000, 32_400, 58_320, 104_976],
        output_by_tier: [100, 250, 625, 1_563, 3_906],
        base: [6.0, 120.0, 0.0, 500.0, 40.0, 1_000.0],
        hardpoints_per_tier: 0.0,
    },
    FunctionTable {
        function: BuildingFunction::Refinery,
        cost_factor: 2.0, output_factor: 2.2,
        cost_by_tier:   [15_000, 30_000, 60_000, 120_000, 240_000],
        output_by_tier: [80, 176, 387, 852, 1_874],
        base: [10.0, 180.0, 0.0, 800.0, 60.0, 1_200.0],
        hardpoints_per_tier: 0.0,
    },
    FunctionTable {
        function: BuildingFunction::Marketplace,
        cost_factor: 1.6, output_factor: 2.0,
        cost_by_tier:   [8_000, 12_800, 20_480, 32_768, 52_429],
        output_by_tier: [50, 100, 200, 400, 800],
        base: [8.0, 90.0, 1.0, 1_500.0, 25.0, 900.0],
        hardpoints_per_tier: 1.0,
    },
    FunctionTable {
        function: BuildingFunction::Habitat,
        cost_factor: 1.5, output_factor: 1.8,
        cost_by_tier:   [6_000, 9_000, 13_500, 20_250, 30_375],
        output_by_tier: [200, 360, 648, 1_166, 2_100],
        base: [4.0, 60.0, 0.0, 300.0, 30.0, 1_500.0],
        hardpoints_per_tier: 0.0,
    },
    FunctionTable {
        function: BuildingFunction::Shipyard,
        cost_factor: 2.2, output_factor: 3.0,
        cost_by_tier:   [25_000, 55_000, 121_000, 266_200, 585_640],
        output_by_tier: [10, 30, 90, 270, 810],
        base: [20.0, 300.0, 2.0, 2_000.0, 90.0, 2_500.0],
        hardpoints_per_tier: 1.0,
    },
    FunctionTable {
        function: BuildingFunction::Defense,
        cost_factor: 1.7, output_factor: 2.6,
        cost_by_tier:   [12_000, 20_400, 34_680, 58_956, 100_225],
        output_by_tier: [40, 104, 270, 703, 1_828],
        base: [12.0, 150.0, 6.0, 200.0, 70.0, 4_000.0],
        hardpoints_per_tier: 3.0,
    },
];

// ── Price modifiers by tier ───────────────────────────────────────

/// Extraction: discount on the local price of its output.
pub const EXTRACTION_OUTPUT_DISCOUNT_BP: [i64; 5] = [500, 800, 1_200, 1_600, 2_000];
/// Refinery: premium on its input commodity.
pub const REFINERY_INPUT_PREMIUM_BP: [i64; 5] = [300, 500, 700, 900, 1_200];
/// Refinery: discount on its output commodity.
pub const REFINERY_OUTPUT_DISCOUNT_BP: [i64; 5] = [400, 600, 900, 1_200, 1_500];
/// Marketplace: trading fee on every trade in the system.
pub const MARKETPLACE_FEE_BP: [i64; 5] = [500, 400, 300, 200, 100];

// ── Recruits ──────────────────────────────────────────────────────

pub const MAX_LEVEL_TIER: u8 = 5;

/// Recruit pool level tier, 1..=5. Higher tiers roll stronger candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LevelTier(u8);

impl LevelTier {
    pub fn new(tier: u8) -> EngineResult<Self> {
        if (1..=MAX_LEVEL_TIER).contains(&tier) {
            Ok(Self(tier))
        } else {
            Err(EngineError::Validation(format!(
                "level tier {tier} outside 1..={MAX_LEVEL_TIER}"
            )))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = LevelTier> {
        (1..=MAX_LEVEL_TIER).map(LevelTier)
    }
}

impl TryFrom<u8> for LevelTier {
    type Error = EngineError;
    fn try_from(t: u8) -> EngineResult<Self> {
        LevelTier::new(t)
    }
}

impl From<LevelTier> for u8 {
    fn from(t: LevelTier) -> u8 {
        t.0
    }
}

impl fmt::Display for LevelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecruitClass {
    Governor,
    Navigator,
    Engineer,
    Marine,
}

impl RecruitClass {
    pub const ALL: [RecruitClass; 4] = [
        Self::Governor, Self::Navigator, Self::Engineer, Self::Marine,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [Self::Common, Self::Uncommon, Self::Rare, Self::Legendary];

    /// Common 70% / Uncommon 20% / Rare 8% / Legendary 2%.
    pub const CUMULATIVE_WEIGHTS: [u64; 4] = [70, 90, 98, 100];

    /// Inclusive skill range before the level-tier bonus.
    pub fn skill_range(&self) -> (u64, u64) {
        match self {
            Self::Common    => (1, 60),
            Self::Uncommon  => (20, 75),
            Self::Rare      => (40, 90),
            Self::Legendary => (60, 100),
        }
    }
}

/// Skill points added per level tier above 1.
pub const SKILL_BONUS_PER_LEVEL: u64 = 5;

pub const POSITIVE_QUIRKS: [&str; 8] = [
    "Meticulous",
    "Calm Under Fire",
    "Frugal",
    "Loyal",
    "Quick Study",
    "Well Connected",
    "Iron Stomach",
    "Night Owl",
];

pub const NEGATIVE_QUIRKS: [&str; 8] = [
    "Gambler",
    "Short Fuse",
    "Sticky Fingers",
    "Reckless",
    "Paranoid",
    "Smuggler's Habits",
    "Insubordinate",
    "Drinks On Watch",
];

/// Chance (percent) that a quirk comes from the negative pool.
/// 10% at chaos 0, rising to 90% at chaos 100.
pub fn negative_quirk_percent(chaos: u8) -> u64 {
    10 + chaos as u64 * 80 / 100
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOutcome {
    CleanExit,
    Incident,
    Catastrophe,
}

/// Outcome weights (percent) for a given chaos factor, in
/// [CleanExit, Incident, Catastrophe] order, cumulative.
/// Chaos 0 → 90/8/2, chaos 100 → 15/45/40.
pub fn history_outcome_weights(chaos: u8) -> [u64; 3] {
    let c = chaos as u64;
    let clean = 90 - c * 75 / 100;
    let catastrophe = 2 + c * 38 / 100;
    [clean, 100 - catastrophe, 100]
}

/// Upper bound on tenure (months) for a given chaos factor: 60 → 20.
pub fn max_tenure_months(chaos: u8) -> u64 {
    60 - chaos as u64 * 40 / 100
}

/// Chance (percent) that a separation reason is vague: 10% → 80%.
pub fn vague_reason_percent(chaos: u8) -> u64 {
    10 + chaos as u64 * 70 / 100
}

pub const VAGUE_REASONS: [&str; 5] = [
    "Personal reasons",
    "Mutual decision",
    "Declined to elaborate",
    "Circumstances beyond control",
    "Contract dissolved",
];

pub fn specific_reasons(outcome: HistoryOutcome) -> &'static [&'static str] {
    match outcome {
        HistoryOutcome::CleanExit => &[
            "Contract completed",
            "Promoted to a command posting",
            "Relocated with family",
            "Vessel decommissioned on schedule",
        ],
        HistoryOutcome::Incident => &[
            "Disciplinary review over missing inventory",
            "Brawl in the crew mess",
            "Failed a routine safety inspection",
            "Unauthorized course deviation",
        ],
        HistoryOutcome::Catastrophe => &[
            "Reactor breach during their watch",
            "Cargo hold vented with the manifest aboard",
            "Station docking collision",
            "Abandoned post during a boarding action",
        ],
    }
}
