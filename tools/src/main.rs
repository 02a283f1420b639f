//! universe-probe: headless inspector and trading soak for the universe engine.
//!
//! Usage:
//!   universe-probe --x 12 --y 400 --z 9001
//!   universe-probe --seed 7 --trades 500 --db probe.db --data-dir ./data
//!   universe-probe --json --x 1 --y 1 --z 1

use anyhow::Result;
use chrono::{Duration, Utc};
use rand::Rng;
use starmarket_core::{
    config::EngineConfig,
    pricing_engine::{TradeDirection, TradeRequest},
    rng::soak_rng,
    tables::{BuildingFunction, Commodity, HullSize, Race, ShipVariant},
    types::Coordinate,
    EngineError, UniverseEngine,
};
use std::collections::BTreeMap;
use std::env;

const OWNER: &str = "probe-owner";
const TRADERS: usize = 5;
const SOAK_GOODS: [Commodity; 5] = [
    Commodity::Iron,
    Commodity::Silicon,
    Commodity::Copper,
    Commodity::Alloys,
    Commodity::Food,
];

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let trades = parse_arg(&args, "--trades", 250usize);
    let x = parse_arg(&args, "--x", 1u32);
    let y = parse_arg(&args, "--y", 1u32);
    let z = parse_arg(&args, "--z", 1u32);
    let json = args.iter().any(|a| a == "--json");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    let config = EngineConfig::load(data_dir)?;
    let engine = if db == ":memory:" {
        UniverseEngine::in_memory(config)?
    } else {
        UniverseEngine::open(db, config)?
    };

    let coord = Coordinate::new(x, y, z)?;
    log::info!("probe: seed={seed} trades={trades} db={db}");
    if json {
        let system = engine.realize_system(coord)?;
        println!("{}", serde_json::to_string_pretty(&system)?);
        return Ok(());
    }

    println!("universe-probe");
    println!("  seed:      {seed}");
    println!("  trades:    {trades}");
    println!("  db:        {db}");
    println!("  data_dir:  {data_dir}");
    println!();

    print_system(&engine, coord)?;
    print_ships(&engine, coord)?;
    print_recruits(&engine)?;
    run_soak(&engine, seed, trades)?;
    Ok(())
}

fn print_system(engine: &UniverseEngine, coord: Coordinate) -> Result<()> {
    let sys = engine.realize_system(coord)?;
    println!("=== SYSTEM {} ===", sys.coordinate);
    println!("  name:      {}", sys.name);
    println!("  star:      {:?}", sys.star_type);
    println!("  hazard:    {}", sys.hazard);
    println!("  planets:   {}", sys.planet_count);
    for p in &sys.planets {
        let minerals: Vec<String> = p
            .minerals
            .iter()
            .map(|d| format!("{} ({:?})", d.mineral, d.abundance))
            .collect();
        println!("    #{:<2} {:?}: {}", p.index, p.class, minerals.join(", "));
    }
    println!();
    Ok(())
}

fn print_ships(engine: &UniverseEngine, coord: Coordinate) -> Result<()> {
    println!("=== SHIPS (Frigate, Standard) ===");
    for race in Race::ALL {
        let s = engine.generate_ship(race, HullSize::Frigate, ShipVariant::Standard as u8, coord.system_id().0)?;
        println!(
            "  {:<7} {:<22} {} | cargo {:>4} | hull {:>5} | sensor {:>6.2} | crew {}-{}",
            race.key(),
            s.name,
            s.registry,
            s.cargo_capacity,
            s.hull_points,
            s.sensor_range,
            s.crew_min,
            s.crew_max
        );
    }
    println!();
    Ok(())
}

fn print_recruits(engine: &UniverseEngine) -> Result<()> {
    let now = Utc::now();
    let outcome = engine.rotate_recruit_pool(1, now)?;
    println!("=== RECRUITS (L1, epoch {}) ===", outcome.epoch);
    for r in engine.available_recruits(1, now)? {
        let clean = r
            .history
            .iter()
            .filter(|h| h.outcome == starmarket_core::tables::HistoryOutcome::CleanExit)
            .count();
        println!(
            "  slot {} | {:<20} {:?} {:?} {:?} skill {:>3} | quirks: {} | history {}/{} clean",
            r.slot,
            r.name,
            r.race,
            r.class,
            r.rarity,
            r.skill,
            r.quirks.join(", "),
            clean,
            r.history.len()
        );
    }
    println!();
    Ok(())
}

/// Seeded random trading against The Cradle with maintenance interleaved.
fn run_soak(engine: &UniverseEngine, seed: u64, trades: usize) -> Result<()> {
    let cradle = Coordinate::ORIGIN;
    // A reused --db file already holds the fixtures.
    if engine.credits(OWNER).is_err() {
        setup_fixtures(engine, cradle)?;
    }

    let opening: BTreeMap<Commodity, i64> = SOAK_GOODS
        .iter()
        .map(|c| Ok((*c, engine.current_price(cradle, *c)?)))
        .collect::<Result<_>>()?;

    let mut rng = soak_rng(seed);
    let mut accepted = 0usize;
    let mut rejected: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut now = Utc::now();

    for n in 0..trades {
        let i = rng.gen_range(0..TRADERS);
        let actor = format!("trader-{i}");
        let req = TradeRequest {
            ship_id:   format!("{actor}-ship"),
            actor,
            system:    cradle.system_id(),
            commodity: SOAK_GOODS[rng.gen_range(0..SOAK_GOODS.len())],
            quantity:  rng.gen_range(1..=40),
            direction: if rng.gen_bool(0.55) { TradeDirection::Buy } else { TradeDirection::Sell },
        };
        match engine.execute_trade(&req) {
            Ok(_) => accepted += 1,
            Err(e) if e.is_rejection() => *rejected.entry(rejection_kind(&e)).or_default() += 1,
            Err(e) => return Err(e.into()),
        }
        if n % 25 == 24 {
            now += Duration::minutes(30);
            let reports = engine.run_maintenance(now)?;
            log::debug!("probe: maintenance after trade {n}: {reports:?}");
        }
    }

    println!("=== SOAK SUMMARY ===");
    println!("  seed:          {seed}");
    println!("  accepted:      {accepted}");
    for (kind, count) in &rejected {
        println!("  rejected:      {count} ({kind})");
    }
    println!("  owner credits: {}", engine.credits(OWNER)?);
    println!("  events:        {}", engine.events()?.len());
    println!();
    println!("  {:<12} {:>8} {:>8} {:>8} {:>8}", "commodity", "open", "close", "delta", "stock");
    for c in SOAK_GOODS {
        let stock = engine.inventory(cradle, c)?.map(|r| r.quantity).unwrap_or(0);
        println!(
            "  {:<12} {:>8} {:>8} {:>8} {:>8}",
            c.key(),
            opening[&c],
            engine.current_price(cradle, c)?,
            engine.price_delta(cradle, c)?,
            stock
        );
    }
    Ok(())
}

fn setup_fixtures(engine: &UniverseEngine, cradle: Coordinate) -> Result<()> {
    engine.open_account(OWNER, 1_000_000)?;
    engine.claim_system(cradle, OWNER)?;
    engine.construct_building("probe-market", OWNER, cradle, Race::Human, BuildingFunction::Marketplace, 3, None)?;
    engine.construct_building("probe-mine", OWNER, cradle, Race::Krath, BuildingFunction::Extraction, 2, Some(Commodity::Iron))?;
    engine.construct_building("probe-foundry", OWNER, cradle, Race::Vex, BuildingFunction::Refinery, 1, Some(Commodity::Alloys))?;

    for i in 0..TRADERS {
        let actor = format!("trader-{i}");
        engine.open_account(&actor, 50_000)?;
        let ship = engine.generate_ship(Race::ALL[i % Race::ALL.len()], HullSize::Frigate, ShipVariant::Hauler as u8, i as u64)?;
        engine.commission_ship(&actor, &format!("{actor}-ship"), &ship)?;
    }
    Ok(())
}

fn rejection_kind(e: &EngineError) -> &'static str {
    match e {
        EngineError::InsufficientFunds { .. }      => "insufficient funds",
        EngineError::InsufficientCargoSpace { .. } => "cargo hold full",
        EngineError::InsufficientCargo { .. }      => "nothing to sell",
        EngineError::InsufficientStock { .. }      => "market sold out",
        EngineError::NoMarketplace { .. }          => "no marketplace",
        _                                          => "invalid request",
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
