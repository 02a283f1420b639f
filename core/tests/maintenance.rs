use starmarket_core::{
    config::EngineConfig,
    pricing_engine::{TradeDirection, TradeRequest},
    tables::{BuildingFunction, Commodity, HullSize, Race},
    types::Coordinate,
    UniverseEngine,
};
use std::path::PathBuf;

const CRADLE: Coordinate = Coordinate::ORIGIN;

/// Steep impact so a single trade leaves a visible delta.
fn steep_engine() -> UniverseEngine {
    let mut config = EngineConfig::default_test();
    config.market.delta_impact_bp = 1_000;
    config.validate().unwrap();
    let engine = UniverseEngine::in_memory(config).unwrap();
    seed_market(&engine);
    engine
}

fn seed_market(engine: &UniverseEngine) {
    engine.open_account("owner", 0).unwrap();
    engine.open_account("ada", 1_000_000).unwrap();
    engine
        .construct_building("market", "owner", CRADLE, Race::Human, BuildingFunction::Marketplace, 1, None)
        .unwrap();
    let ship = engine.generate_ship(Race::Vex, HullSize::Cruiser, 1, 0).unwrap();
    engine.commission_ship("ada", "ada-ship", &ship).unwrap();
}

fn trade(engine: &UniverseEngine, commodity: Commodity, quantity: i64, direction: TradeDirection) {
    engine
        .execute_trade(&TradeRequest {
            actor:    "ada".into(),
            ship_id:  "ada-ship".into(),
            system:   CRADLE.system_id(),
            commodity,
            quantity,
            direction,
        })
        .unwrap();
}

fn temp_db(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("starmarket-{name}-{}.db", std::process::id()));
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
    path
}

#[test]
fn positive_delta_decays_to_zero() {
    let engine = steep_engine();
    // Alloys 90: push = min(90 × 10 × 10%, 90 × 15%) = 13.
    trade(&engine, Commodity::Alloys, 10, TradeDirection::Buy);
    assert_eq!(engine.price_delta(CRADLE, Commodity::Alloys).unwrap(), 13);

    let report = engine.decay_price_deltas().unwrap();
    assert_eq!((report.processed, report.failed), (1, 0));
    assert_eq!(engine.price_delta(CRADLE, Commodity::Alloys).unwrap(), 12);

    for _ in 0..20 {
        engine.decay_price_deltas().unwrap();
    }
    assert_eq!(engine.price_delta(CRADLE, Commodity::Alloys).unwrap(), 0);
    assert_eq!(engine.current_price(CRADLE, Commodity::Alloys).unwrap(), 90);
    assert_eq!(engine.decay_price_deltas().unwrap().processed, 0);
}

#[test]
fn negative_delta_decays_toward_zero_without_overshooting() {
    let engine = steep_engine();
    trade(&engine, Commodity::Alloys, 10, TradeDirection::Buy);
    // Sell at 103: push = -min(103, 15) = -15, leaving 13 - 15 = -2.
    trade(&engine, Commodity::Alloys, 10, TradeDirection::Sell);
    assert_eq!(engine.price_delta(CRADLE, Commodity::Alloys).unwrap(), -2);

    engine.decay_price_deltas().unwrap();
    assert_eq!(engine.price_delta(CRADLE, Commodity::Alloys).unwrap(), -1);
    engine.decay_price_deltas().unwrap();
    assert_eq!(engine.price_delta(CRADLE, Commodity::Alloys).unwrap(), 0);
    engine.decay_price_deltas().unwrap();
    assert_eq!(engine.price_delta(CRADLE, Commodity::Alloys).unwrap(), 0);
}

#[test]
fn restock_refills_up_to_the_maximum() {
    let engine = steep_engine();
    trade(&engine, Commodity::Iron, 100, TradeDirection::Buy);
    assert_eq!(engine.inventory(CRADLE, Commodity::Iron).unwrap().unwrap().quantity, 400);

    engine.restock_inventories().unwrap();
    assert_eq!(engine.inventory(CRADLE, Commodity::Iron).unwrap().unwrap().quantity, 425);

    for _ in 0..40 {
        engine.restock_inventories().unwrap();
    }
    let row = engine.inventory(CRADLE, Commodity::Iron).unwrap().unwrap();
    assert_eq!(row.quantity, row.max_quantity);
    assert_eq!(engine.restock_inventories().unwrap().processed, 0);
}

#[test]
fn run_maintenance_reports_each_task_in_order() {
    let engine = steep_engine();
    trade(&engine, Commodity::Alloys, 10, TradeDirection::Buy);
    let now = engine.config().recruits.genesis + chrono::Duration::hours(1);

    let reports = engine.run_maintenance(now).unwrap();
    let names: Vec<&str> = reports.iter().map(|r| r.task.as_str()).collect();
    assert_eq!(names, ["delta_decay", "inventory_restock", "pool_rotation"]);
    assert_eq!(reports[0].processed, 1);
    assert_eq!(reports[1].processed, 1);
    assert_eq!(reports[2].processed, 5);
    assert!(reports.iter().all(|r| r.failed == 0));

    assert_eq!(engine.count_events("maintenance_ran").unwrap(), 3);
    assert_eq!(engine.count_events("pool_rotated").unwrap(), 5);
    assert_eq!(engine.available_recruits(3, now).unwrap().len(), 8);
}

#[test]
fn one_bad_row_does_not_block_the_batch() {
    let path = temp_db("maintenance");
    let engine = UniverseEngine::open(path.to_str().unwrap(), EngineConfig::default_test()).unwrap();

    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(
        "INSERT INTO price_delta (system_id, commodity, delta) VALUES
             (0, 'iron', 10), (0, 'unobtainium', 40);
         INSERT INTO market_inventory (system_id, commodity, quantity, max_quantity) VALUES
             (0, 'iron', 10, 100), (0, 'unobtainium', 10, 100);",
    )
    .unwrap();
    drop(conn);

    let decay = engine.decay_price_deltas().unwrap();
    assert_eq!((decay.processed, decay.failed), (1, 1));
    assert_eq!(engine.price_delta(CRADLE, Commodity::Iron).unwrap(), 9);

    let restock = engine.restock_inventories().unwrap();
    assert_eq!((restock.processed, restock.failed), (1, 1));
    assert_eq!(engine.inventory(CRADLE, Commodity::Iron).unwrap().unwrap().quantity, 35);

    drop(engine);
    let _ = std::fs::remove_file(&path);
}
