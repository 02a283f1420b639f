//! Realized systems and the event log.

use starmarket_core::{
    config::EngineConfig,
    event::LedgerEvent,
    types::Coordinate,
    EngineError, UniverseEngine,
};
use std::path::PathBuf;

fn temp_db(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("starmarket-{name}-{}.db", std::process::id()));
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
    path
}

#[test]
fn realization_is_idempotent() {
    let engine = UniverseEngine::build_test().unwrap();
    let coord = Coordinate::new(12, 400, 9_001).unwrap();
    assert!(engine.realized_system(coord).unwrap().is_none());

    let first = engine.realize_system(coord).unwrap();
    let second = engine.realize_system(coord).unwrap();
    assert_eq!(first, second);
    assert_eq!(engine.realized_system(coord).unwrap(), Some(first.clone()));
    assert_eq!(first, engine.generate_system(12, 400, 9_001).unwrap());
    assert_eq!(engine.count_events("system_realized").unwrap(), 1);
}

#[test]
fn concurrent_realization_stores_one_copy() {
    let engine = UniverseEngine::build_test().unwrap();
    let coord = Coordinate::new(5, 5, 5).unwrap();
    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| engine.realize_system(coord).unwrap());
        }
    });
    assert_eq!(engine.count_events("system_realized").unwrap(), 1);
}

#[test]
fn tampered_copy_is_reported() {
    let path = temp_db("realization");
    let engine = UniverseEngine::open(path.to_str().unwrap(), EngineConfig::default_test()).unwrap();
    let coord = Coordinate::new(3, 1, 4).unwrap();
    engine.realize_system(coord).unwrap();

    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute(
        "UPDATE realized_system SET payload = REPLACE(payload, '\"hazard\":', '\"hazard\":1') WHERE system_id = ?1",
        [coord.system_id().as_i64()],
    )
    .unwrap();
    drop(conn);

    let err = engine.realize_system(coord).unwrap_err();
    assert!(matches!(err, EngineError::RealizationMismatch { .. }), "{err}");

    drop(engine);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn reopening_a_ledger_keeps_its_state() {
    let path = temp_db("reopen");
    let db = path.to_str().unwrap();
    {
        let engine = UniverseEngine::open(db, EngineConfig::default_test()).unwrap();
        engine.open_account("ada", 250).unwrap();
        engine.realize_system(Coordinate::new(9, 9, 9).unwrap()).unwrap();
    }
    let engine = UniverseEngine::open(db, EngineConfig::default_test()).unwrap();
    assert_eq!(engine.credits("ada").unwrap(), 250);
    assert!(engine.realized_system(Coordinate::new(9, 9, 9).unwrap()).unwrap().is_some());
    assert!(engine.realize_system(Coordinate::new(9, 9, 9).unwrap()).is_ok());
    assert_eq!(engine.count_events("system_realized").unwrap(), 1);

    drop(engine);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn every_write_appends_a_decodable_event() {
    let engine = UniverseEngine::build_test().unwrap();
    engine.open_account("ada", 100).unwrap();
    engine.claim_system(Coordinate::ORIGIN, "ada").unwrap();
    let ship = engine
        .generate_ship(starmarket_core::tables::Race::Zeth, starmarket_core::tables::HullSize::Scout, 0, 1)
        .unwrap();
    engine.commission_ship("ada", "ada-1", &ship).unwrap();

    let events = engine.events().unwrap();
    let kinds: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
    assert_eq!(kinds, ["account_opened", "system_claimed", "ship_commissioned"]);

    for entry in &events {
        let event = entry.decode().unwrap();
        assert_eq!(event.type_name(), entry.event_type);
    }
    match events[2].decode().unwrap() {
        LedgerEvent::ShipCommissioned { registry, cargo_capacity, .. } => {
            assert_eq!(registry, ship.registry);
            assert_eq!(cargo_capacity, ship.cargo_capacity);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn duplicate_and_negative_accounts_are_rejected() {
    let engine = UniverseEngine::build_test().unwrap();
    engine.open_account("ada", 0).unwrap();
    assert!(matches!(engine.open_account("ada", 10), Err(EngineError::Validation(_))));
    assert!(matches!(engine.open_account("bob", -1), Err(EngineError::Validation(_))));
    assert!(engine.credits("bob").is_err());
    assert_eq!(engine.count_events("account_opened").unwrap(), 1);
}
