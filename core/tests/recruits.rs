//! Recruit pools: rotation, listing windows and hiring.

use chrono::{DateTime, Duration, Utc};
use starmarket_core::{EngineError, UniverseEngine};

fn engine_at_genesis() -> (UniverseEngine, DateTime<Utc>, Duration) {
    let engine = UniverseEngine::build_test().unwrap();
    let genesis = engine.config().recruits.genesis;
    let period = Duration::seconds(engine.config().recruits.rotation_period_secs);
    engine.open_account("ada", 0).unwrap();
    engine.open_account("bob", 0).unwrap();
    (engine, genesis + Duration::minutes(10), period)
}

#[test]
fn pool_is_empty_until_first_rotation() {
    let (engine, now, _) = engine_at_genesis();
    assert!(engine.available_recruits(1, now).unwrap().is_empty());
    let err = engine.hire_recruit("ada", 1, 0, now).unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)), "{err}");
}

#[test]
fn reads_within_an_epoch_are_byte_identical() {
    let (engine, now, _) = engine_at_genesis();
    engine.rotate_recruit_pool(2, now).unwrap();

    let first = serde_json::to_string(&engine.available_recruits(2, now).unwrap()).unwrap();
    let later = serde_json::to_string(&engine.available_recruits(2, now + Duration::hours(2)).unwrap()).unwrap();
    assert_eq!(first, later);

    let other = UniverseEngine::build_test().unwrap();
    other.rotate_recruit_pool(2, now + Duration::hours(1)).unwrap();
    let elsewhere = serde_json::to_string(&other.available_recruits(2, now).unwrap()).unwrap();
    assert_eq!(first, elsewhere, "two ledgers disagree on the same epoch");
}

#[test]
fn no_read_path_reveals_the_chaos_factor() {
    let (engine, now, _) = engine_at_genesis();
    engine.rotate_recruit_pool(1, now).unwrap();
    let listings = engine.available_recruits(1, now).unwrap();
    let hired = engine.hire_recruit("ada", 1, 2, now).unwrap();
    let stored = engine.hired_recruit(&hired.hire_id).unwrap().unwrap();

    let rendered = [
        serde_json::to_string(&listings).unwrap(),
        format!("{listings:?}"),
        serde_json::to_string(&hired).unwrap(),
        format!("{stored:?}"),
        serde_json::to_string(&engine.events().unwrap()).unwrap(),
    ];
    for text in &rendered {
        assert!(!text.contains("chaos"), "{text}");
        assert!(!text.contains("positive"), "{text}");
    }
}

#[test]
fn rotation_is_idempotent_within_an_epoch() {
    let (engine, now, period) = engine_at_genesis();
    let a = engine.rotate_recruit_pool(1, now).unwrap();
    let b = engine.rotate_recruit_pool(1, now + Duration::minutes(30)).unwrap();
    assert!(a.advanced);
    assert!(!b.advanced);
    assert_eq!((a.epoch, a.version), (b.epoch, b.version));
    assert_eq!(engine.count_events("pool_rotated").unwrap(), 1);

    let c = engine.rotate_recruit_pool(1, now + period).unwrap();
    assert!(c.advanced);
    assert_eq!(c.epoch, 1);
    assert_eq!(c.version, a.version + 1);

    // A caller with a stale clock cannot move the tier back.
    let stale = engine.rotate_recruit_pool(1, now).unwrap();
    assert!(!stale.advanced);
    assert_eq!(stale.epoch, 1);
}

#[test]
fn tiers_rotate_independently() {
    let (engine, now, _) = engine_at_genesis();
    engine.rotate_recruit_pool(1, now).unwrap();
    assert_eq!(engine.available_recruits(1, now).unwrap().len(), 8);
    assert!(engine.available_recruits(4, now).unwrap().is_empty());
    assert!(engine.rotate_recruit_pool(0, now).is_err());
    assert!(engine.rotate_recruit_pool(6, now).is_err());
}

#[test]
fn lapsed_epoch_lists_nothing_until_rotated() {
    let (engine, now, period) = engine_at_genesis();
    engine.rotate_recruit_pool(1, now).unwrap();
    let next = now + period;

    assert!(engine.available_recruits(1, next).unwrap().is_empty());
    assert!(engine.hire_recruit("ada", 1, 0, next).is_err());

    engine.rotate_recruit_pool(1, next).unwrap();
    let listings = engine.available_recruits(1, next).unwrap();
    assert_eq!(listings.len(), 8);
    assert!(listings.iter().all(|l| l.epoch == 1));
    assert!(listings.iter().all(|l| l.available_at <= next && next < l.expires_at));
}

#[test]
fn hired_copy_matches_the_listing_and_survives_rotation() {
    let (engine, now, period) = engine_at_genesis();
    engine.rotate_recruit_pool(3, now).unwrap();
    let listing = engine.available_recruits(3, now).unwrap().remove(5);

    let hired = engine.hire_recruit("ada", 3, 5, now).unwrap();
    assert_eq!(hired.recruit, listing);
    assert_eq!(hired.actor, "ada");

    // The slot stays listed for everyone else.
    assert_eq!(engine.available_recruits(3, now).unwrap()[5], listing);

    engine.rotate_recruit_pool(3, now + period).unwrap();
    engine.rotate_recruit_pool(3, now + period * 2).unwrap();
    assert!(engine.available_recruits(3, now + period * 2).unwrap().iter().all(|l| l.epoch == 2));

    let stored = engine.hired_recruit(&hired.hire_id).unwrap().unwrap();
    assert_eq!(stored, hired);
    assert_eq!(engine.count_events("recruit_hired").unwrap(), 1);
}

#[test]
fn one_hire_per_actor_per_slot_per_epoch() {
    let (engine, now, _) = engine_at_genesis();
    engine.rotate_recruit_pool(1, now).unwrap();

    engine.hire_recruit("ada", 1, 0, now).unwrap();
    let again = engine.hire_recruit("ada", 1, 0, now).unwrap_err();
    assert!(matches!(again, EngineError::Validation(_)), "{again}");

    let bob = engine.hire_recruit("bob", 1, 0, now).unwrap();
    assert_eq!(bob.recruit.slot, 0);
    assert!(engine.hire_recruit("ada", 1, 1, now).is_ok());
    assert!(engine.hire_recruit("ada", 1, 99, now).is_err());
    assert!(engine.hire_recruit("nobody", 1, 2, now).is_err());
    assert!(engine.hired_recruit("missing").unwrap().is_none());
}
