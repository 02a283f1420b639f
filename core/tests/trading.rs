//! Trade settlement: balances, cargo, stock and the price delta move
//! together or not at all.

use starmarket_core::{
    config::EngineConfig,
    pricing_engine::{TradeDirection, TradeRequest},
    tables::{BuildingFunction, Commodity, HullSize, Race},
    types::Coordinate,
    EngineError, UniverseEngine,
};

const CRADLE: Coordinate = Coordinate::ORIGIN;

fn market_engine(config: EngineConfig) -> UniverseEngine {
    let engine = UniverseEngine::in_memory(config).unwrap();
    engine.open_account("owner", 1_000).unwrap();
    engine.claim_system(CRADLE, "owner").unwrap();
    engine
        .construct_building("market", "owner", CRADLE, Race::Human, BuildingFunction::Marketplace, 1, None)
        .unwrap();
    engine
}

/// Open `actor` with `credits` and commission `{actor}-ship` holding `capacity`.
fn trader(engine: &UniverseEngine, actor: &str, credits: i64, capacity: i64) -> String {
    engine.open_account(actor, credits).unwrap();
    let mut ship = engine.generate_ship(Race::Vex, HullSize::Frigate, 1, 0).unwrap();
    ship.cargo_capacity = capacity;
    let ship_id = format!("{actor}-ship");
    engine.commission_ship(actor, &ship_id, &ship).unwrap();
    ship_id
}

fn request(actor: &str, commodity: Commodity, quantity: i64, direction: TradeDirection) -> TradeRequest {
    TradeRequest {
        actor:     actor.to_string(),
        ship_id:   format!("{actor}-ship"),
        system:    CRADLE.system_id(),
        commodity,
        quantity,
        direction,
    }
}

#[test]
fn buy_moves_credits_cargo_stock_and_tax() {
    let engine = market_engine(EngineConfig::default_test());
    let ship = trader(&engine, "ada", 10_000, 100);

    let r = engine.execute_trade(&request("ada", Commodity::Iron, 10, TradeDirection::Buy)).unwrap();
    assert_eq!(r.net, -200);
    assert_eq!(r.credits_after, 9_800);
    assert_eq!(r.cargo_after, 10);
    assert_eq!(r.stock_after, 490);

    assert_eq!(engine.credits("ada").unwrap(), 9_800);
    assert_eq!(engine.cargo(&ship, Commodity::Iron).unwrap(), 10);
    assert_eq!(engine.credits("owner").unwrap(), 1_002);
    assert_eq!(engine.count_events("trade_executed").unwrap(), 1);
}

#[test]
fn non_owner_round_trip_always_loses() {
    let engine = market_engine(EngineConfig::default_test());
    trader(&engine, "ada", 100_000, 1_000);

    for (commodity, qty) in [(Commodity::Iron, 1), (Commodity::Iron, 250), (Commodity::Alloys, 40), (Commodity::Copper, 7)] {
        let before = engine.credits("ada").unwrap();
        engine.execute_trade(&request("ada", commodity, qty, TradeDirection::Buy)).unwrap();
        engine.execute_trade(&request("ada", commodity, qty, TradeDirection::Sell)).unwrap();
        let after = engine.credits("ada").unwrap();
        assert!(after < before, "{commodity} x{qty}: {before} -> {after}");
    }
}

#[test]
fn owner_round_trip_always_loses_at_every_marketplace_tier() {
    for tier in 1..=5u8 {
        let engine = UniverseEngine::in_memory(EngineConfig::default_test()).unwrap();
        trader(&engine, "owner", 1_000_000, 1_000);
        engine.claim_system(CRADLE, "owner").unwrap();
        engine
            .construct_building("market", "owner", CRADLE, Race::Human, BuildingFunction::Marketplace, tier, None)
            .unwrap();

        for (commodity, qty) in [(Commodity::Iron, 400), (Commodity::Iron, 1), (Commodity::Alloys, 60), (Commodity::Food, 250)] {
            let before = engine.credits("owner").unwrap();
            let b = engine.execute_trade(&request("owner", commodity, qty, TradeDirection::Buy)).unwrap();
            assert!(b.quote.is_owner);
            assert_eq!(b.quote.unit_price, b.quote.current_price);
            let s = engine.execute_trade(&request("owner", commodity, qty, TradeDirection::Sell)).unwrap();
            assert_eq!(s.cargo_after, 0);
            let after = engine.credits("owner").unwrap();
            assert!(after < before, "T{tier} {commodity} x{qty}: {before} -> {after}");
        }
    }
}

#[test]
fn sell_settles_credits_cargo_and_stock() {
    let engine = market_engine(EngineConfig::default_test());
    let ship = trader(&engine, "ada", 10_000, 100);
    engine.execute_trade(&request("ada", Commodity::Iron, 10, TradeDirection::Buy)).unwrap();
    let credits = engine.credits("ada").unwrap();

    let s = engine.execute_trade(&request("ada", Commodity::Iron, 4, TradeDirection::Sell)).unwrap();
    assert!(s.net > 0);
    assert_eq!(s.credits_after, credits + s.net);
    assert_eq!(s.cargo_after, 6);
    assert_eq!(s.stock_after, 494);
    assert_eq!(engine.cargo(&ship, Commodity::Iron).unwrap(), 6);
    assert_eq!(engine.count_events("trade_executed").unwrap(), 2);
}

#[test]
fn large_buy_pushes_the_price_up_but_within_the_cap() {
    let engine = market_engine(EngineConfig::default_test());
    trader(&engine, "ada", 100_000, 1_000);

    let before = engine.current_price(CRADLE, Commodity::Iron).unwrap();
    let r = engine.execute_trade(&request("ada", Commodity::Iron, 400, TradeDirection::Buy)).unwrap();
    let cap = before * engine.config().market.delta_impact_cap_bp / 10_000;
    assert!(r.quote.delta_push > 0);
    assert!(r.quote.delta_push <= cap, "push {} > cap {cap}", r.quote.delta_push);
    assert_eq!(engine.current_price(CRADLE, Commodity::Iron).unwrap(), before + r.delta_after);

    let s = engine.execute_trade(&request("ada", Commodity::Iron, 400, TradeDirection::Sell)).unwrap();
    assert!(s.quote.delta_push < 0);
    assert!(engine.current_price(CRADLE, Commodity::Iron).unwrap() < before + r.delta_after);
}

#[test]
fn insufficient_funds_changes_nothing() {
    let engine = market_engine(EngineConfig::default_test());
    let ship = trader(&engine, "ada", 50, 100);
    let events = engine.events().unwrap().len();

    let err = engine.execute_trade(&request("ada", Commodity::Iron, 5, TradeDirection::Buy)).unwrap_err();
    match err {
        EngineError::InsufficientFunds { needed, available } => {
            assert_eq!(needed, 100);
            assert_eq!(available, 50);
        }
        other => panic!("expected InsufficientFunds, got {other}"),
    }
    assert_eq!(engine.credits("ada").unwrap(), 50);
    assert_eq!(engine.credits("owner").unwrap(), 1_000);
    assert_eq!(engine.cargo(&ship, Commodity::Iron).unwrap(), 0);
    assert_eq!(engine.price_delta(CRADLE, Commodity::Iron).unwrap(), 0);
    assert_eq!(engine.inventory(CRADLE, Commodity::Iron).unwrap(), None);
    assert_eq!(engine.events().unwrap().len(), events);
}

#[test]
fn insufficient_cargo_space_changes_nothing() {
    let engine = market_engine(EngineConfig::default_test());
    let ship = trader(&engine, "ada", 10_000, 5);
    engine.execute_trade(&request("ada", Commodity::Iron, 3, TradeDirection::Buy)).unwrap();

    let err = engine.execute_trade(&request("ada", Commodity::Copper, 3, TradeDirection::Buy)).unwrap_err();
    assert!(matches!(err, EngineError::InsufficientCargoSpace { needed: 3, free: 2 }), "{err}");
    assert_eq!(engine.cargo(&ship, Commodity::Copper).unwrap(), 0);
    assert_eq!(engine.cargo(&ship, Commodity::Iron).unwrap(), 3);
}

#[test]
fn selling_more_than_held_is_rejected() {
    let engine = market_engine(EngineConfig::default_test());
    let ship = trader(&engine, "ada", 10_000, 100);
    engine.execute_trade(&request("ada", Commodity::Silicon, 4, TradeDirection::Buy)).unwrap();
    let credits = engine.credits("ada").unwrap();

    let err = engine.execute_trade(&request("ada", Commodity::Silicon, 5, TradeDirection::Sell)).unwrap_err();
    assert!(matches!(err, EngineError::InsufficientCargo { requested: 5, held: 4 }), "{err}");
    assert_eq!(engine.credits("ada").unwrap(), credits);
    assert_eq!(engine.cargo(&ship, Commodity::Silicon).unwrap(), 4);
}

#[test]
fn market_cannot_sell_stock_it_does_not_hold() {
    let mut config = EngineConfig::default_test();
    config.market.initial_inventory = 5;
    let engine = market_engine(config);
    trader(&engine, "ada", 10_000, 100);
    engine.execute_trade(&request("ada", Commodity::Iron, 1, TradeDirection::Buy)).unwrap();

    let err = engine.execute_trade(&request("ada", Commodity::Iron, 5, TradeDirection::Buy)).unwrap_err();
    assert!(matches!(err, EngineError::InsufficientStock { requested: 5, available: 4 }), "{err}");
    assert_eq!(engine.inventory(CRADLE, Commodity::Iron).unwrap().unwrap().quantity, 4);
}

#[test]
fn selling_into_a_full_market_caps_stock() {
    let mut config = EngineConfig::default_test();
    config.market.initial_inventory = 1_000;
    let engine = market_engine(config);
    trader(&engine, "ada", 100_000, 200);

    engine.execute_trade(&request("ada", Commodity::Food, 50, TradeDirection::Buy)).unwrap();
    engine.restock_inventories().unwrap();
    assert_eq!(engine.inventory(CRADLE, Commodity::Food).unwrap().unwrap().quantity, 975);
    let r = engine.execute_trade(&request("ada", Commodity::Food, 50, TradeDirection::Sell)).unwrap();
    assert_eq!(r.stock_after, 1_000);
    let row = engine.inventory(CRADLE, Commodity::Food).unwrap().unwrap();
    assert!(row.quantity <= row.max_quantity);
}

#[test]
fn ship_and_actor_must_match() {
    let engine = market_engine(EngineConfig::default_test());
    trader(&engine, "ada", 10_000, 100);
    trader(&engine, "bob", 10_000, 100);

    let mut req = request("bob", Commodity::Iron, 1, TradeDirection::Buy);
    req.ship_id = "ada-ship".into();
    assert!(matches!(engine.execute_trade(&req), Err(EngineError::Validation(_))));

    let ghost = request("ghost", Commodity::Iron, 1, TradeDirection::Buy);
    assert!(matches!(engine.execute_trade(&ghost), Err(EngineError::Validation(_))));
}

#[test]
fn concurrent_buyers_never_oversell() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut config = EngineConfig::default_test();
    config.market.initial_inventory = 5;
    let engine = market_engine(config);
    for i in 0..10 {
        trader(&engine, &format!("buyer-{i}"), 10_000, 10);
    }

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let engine = &engine;
                s.spawn(move || {
                    engine.execute_trade(&request(&format!("buyer-{i}"), Commodity::Iron, 1, TradeDirection::Buy))
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let ok = results.iter().filter(|r| r.is_ok()).count();
    let sold_out = results
        .iter()
        .filter(|r| matches!(r, Err(EngineError::InsufficientStock { .. })))
        .count();
    assert_eq!(ok, 5);
    assert_eq!(sold_out, 5);
    assert_eq!(engine.inventory(CRADLE, Commodity::Iron).unwrap().unwrap().quantity, 0);
    assert_eq!(engine.count_events("trade_executed").unwrap(), 5);
}
