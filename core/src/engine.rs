//! The universe engine, the public face of the crate.
//!
//! Generation is pure and goes straight to the generator modules with no
//! lock. Everything that reads or writes the ledger takes the single
//! ledger lock and runs inside one LedgerTx, so concurrent callers on the
//! same (system, commodity) row serialize and a rejected call leaves the
//! ledger exactly as it found it.
//!
//! MAINTENANCE ORDER (fixed, documented, never reordered):
//!   1. DeltaDecay
//!   2. InventoryRestock
//!   3. PoolRotation

use crate::{
    building_generator::{generate_building, BuildingAttributes},
    config::EngineConfig,
    error::{EngineError, EngineResult},
    event::{EventLogEntry, LedgerEvent},
    maintenance::{DeltaDecay, InventoryRestock, MaintenanceReport, MaintenanceTask, PoolRotation},
    pricing_engine::{self, PriceQuote, TradeDirection, TradeReceipt, TradeRequest},
    recruit_generator::RecruitListing,
    recruit_pool::{self, HiredRecruitView, RotationOutcome},
    ship_generator::{generate_ship, ShipAttributes},
    store::{BuildingRow, BuildingStatus, InventoryRow, LedgerStore, MarketKey, ShipRow},
    system_generator::{generate_system, SystemAttributes},
    tables::{refinery_input, BuildingFunction, Commodity, HullSize, LevelTier, Race, ShipVariant, Tier},
    types::{Coordinate, Credits},
};
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

pub struct UniverseEngine {
    config: EngineConfig,
    ledger: Mutex<LedgerStore>,
    tasks:  Vec<Box<dyn MaintenanceTask>>,
}

impl UniverseEngine {
    /// Wrap a migrated store. Maintenance tasks are registered in the
    /// documented order.
    pub fn new(config: EngineConfig, store: LedgerStore) -> Self {
        let mut engine = Self {
            config,
            ledger: Mutex::new(store),
            tasks:  Vec::new(),
        };
        engine.register(Box::new(DeltaDecay));
        engine.register(Box::new(InventoryRestock));
        engine.register(Box::new(PoolRotation));
        engine
    }

    pub fn register(&mut self, task: Box<dyn MaintenanceTask>) {
        self.tasks.push(task);
    }

    /// Open (or create) a file-backed ledger and apply migrations.
    pub fn open(path: &str, config: EngineConfig) -> EngineResult<Self> {
        let store = LedgerStore::open(path)?;
        store.migrate()?;
        log::info!("engine: ledger opened at {path}");
        Ok(Self::new(config, store))
    }

    pub fn in_memory(config: EngineConfig) -> EngineResult<Self> {
        let store = LedgerStore::in_memory()?;
        store.migrate()?;
        Ok(Self::new(config, store))
    }

    /// In-memory engine with test defaults.
    pub fn build_test() -> EngineResult<Self> {
        Self::in_memory(EngineConfig::default_test())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, LedgerStore>> {
        self.ledger.lock().map_err(|_| EngineError::LockPoisoned)
    }

    // ── Generation (pure) ──────────────────────────────────────

    pub fn generate_system(&self, x: u32, y: u32, z: u32) -> EngineResult<SystemAttributes> {
        Ok(generate_system(Coordinate::new(x, y, z)?))
    }

    pub fn generate_ship(
        &self,
        race: Race,
        hull_size: HullSize,
        variant_idx: u8,
        location_seed: u64,
    ) -> EngineResult<ShipAttributes> {
        let variant = ShipVariant::try_from(variant_idx)?;
        Ok(generate_ship(race, hull_size, variant, location_seed))
    }

    pub fn generate_building(
        &self,
        race: Race,
        function: BuildingFunction,
        tier: u8,
        location_seed: u64,
    ) -> EngineResult<BuildingAttributes> {
        Ok(generate_building(race, function, Tier::new(tier)?, location_seed))
    }

    // ── Realization ────────────────────────────────────────────

    /// Persist the generated system. Concurrent and repeated calls are
    /// safe: the first copy wins and every call checks the stored copy
    /// against fresh generator output.
    pub fn realize_system(&self, coord: Coordinate) -> EngineResult<SystemAttributes> {
        let generated = generate_system(coord);
        let payload = serde_json::to_string(&generated)?;

        let mut ledger = self.lock()?;
        let tx = ledger.begin()?;
        let inserted = tx.insert_realized_system(generated.system_id, &payload)?;
        let stored = tx.realized_system(generated.system_id)?;
        if stored.as_deref() != Some(payload.as_str()) {
            log::warn!("engine: realized copy of {} diverges from generator", generated.system_id);
            return Err(EngineError::RealizationMismatch {
                system: generated.system_id.to_string(),
            });
        }
        if inserted {
            tx.append_event(&LedgerEvent::SystemRealized {
                system: generated.system_id,
                name:   generated.name.clone(),
            })?;
            log::info!("engine: realized {} ({})", generated.name, generated.system_id);
        }
        tx.commit()?;
        Ok(generated)
    }

    pub fn realized_system(&self, coord: Coordinate) -> EngineResult<Option<SystemAttributes>> {
        let mut ledger = self.lock()?;
        let tx = ledger.snapshot()?;
        match tx.realized_system(coord.system_id())? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    // ── Ledger setup ───────────────────────────────────────────

    pub fn open_account(&self, actor: &str, credits: Credits) -> EngineResult<()> {
        if credits < 0 {
            return Err(EngineError::Validation(format!(
                "opening balance must be >= 0, got {credits}"
            )));
        }
        let mut ledger = self.lock()?;
        let tx = ledger.begin()?;
        if tx.credits(actor)?.is_some() {
            return Err(EngineError::Validation(format!("account '{actor}' already exists")));
        }
        tx.insert_account(actor, credits)?;
        tx.append_event(&LedgerEvent::AccountOpened {
            actor: actor.to_string(),
            credits,
        })?;
        tx.commit()
    }

    /// Persist a generated ship as `ship_id`, owned by `actor`. The stored
    /// copy is frozen at commission time.
    pub fn commission_ship(
        &self,
        actor: &str,
        ship_id: &str,
        attributes: &ShipAttributes,
    ) -> EngineResult<ShipRow> {
        let mut ledger = self.lock()?;
        let tx = ledger.begin()?;
        if tx.credits(actor)?.is_none() {
            return Err(EngineError::Validation(format!("unknown actor '{actor}'")));
        }
        if tx.ship(ship_id)?.is_some() {
            return Err(EngineError::Validation(format!("ship '{ship_id}' already exists")));
        }
        tx.insert_ship(ship_id, actor, attributes)?;
        tx.append_event(&LedgerEvent::ShipCommissioned {
            actor:          actor.to_string(),
            ship_id:        ship_id.to_string(),
            registry:       attributes.registry.clone(),
            cargo_capacity: attributes.cargo_capacity,
        })?;
        let row = tx
            .ship(ship_id)?
            .ok_or_else(|| EngineError::Validation(format!("ship '{ship_id}' missing after insert")))?;
        tx.commit()?;
        Ok(row)
    }

    /// Construct a building in the system at `coord`. Its attributes are
    /// generated with the system id as location seed.
    ///
    /// `commodity` names the extracted mineral (Extraction, must occur in
    /// the system) or the produced good (Refinery, must have a recipe).
    /// Other functions take None.
    #[allow(clippy::too_many_arguments)]
    pub fn construct_building(
        &self,
        building_id: &str,
        actor: &str,
        coord: Coordinate,
        race: Race,
        function: BuildingFunction,
        tier: u8,
        commodity: Option<Commodity>,
    ) -> EngineResult<BuildingRow> {
        let tier = Tier::new(tier)?;
        let system = generate_system(coord);
        match (function, commodity) {
            (BuildingFunction::Extraction, Some(c)) if system.mineral_set().contains(&c) => {}
            (BuildingFunction::Extraction, other) => {
                return Err(EngineError::Validation(format!(
                    "extraction in {} needs a local mineral, got {other:?}",
                    system.system_id
                )));
            }
            (BuildingFunction::Refinery, Some(c)) if refinery_input(c).is_some() => {}
            (BuildingFunction::Refinery, other) => {
                return Err(EngineError::Validation(format!(
                    "refinery needs a refined output, got {other:?}"
                )));
            }
            (_, None) => {}
            (f, Some(c)) => {
                return Err(EngineError::Validation(format!("{f} does not produce {c}")));
            }
        }

        let row = BuildingRow {
            building_id: building_id.to_string(),
            system:      system.system_id,
            actor_id:    actor.to_string(),
            function,
            tier,
            commodity,
            status:      BuildingStatus::Operational,
            attributes:  generate_building(race, function, tier, system.system_id.0),
        };

        let mut ledger = self.lock()?;
        let tx = ledger.begin()?;
        if tx.credits(actor)?.is_none() {
            return Err(EngineError::Validation(format!("unknown actor '{actor}'")));
        }
        if tx.building(building_id)?.is_some() {
            return Err(EngineError::Validation(format!("building '{building_id}' already exists")));
        }
        tx.insert_building(&row)?;
        tx.append_event(&LedgerEvent::BuildingConstructed {
            building_id: row.building_id.clone(),
            system:      row.system,
            function:    function.key().to_string(),
            tier:        tier.get(),
        })?;
        tx.commit()?;
        Ok(row)
    }

    pub fn set_building_status(&self, building_id: &str, status: BuildingStatus) -> EngineResult<()> {
        let mut ledger = self.lock()?;
        let tx = ledger.begin()?;
        if !tx.set_building_status(building_id, status)? {
            return Err(EngineError::Validation(format!("unknown building '{building_id}'")));
        }
        tx.append_event(&LedgerEvent::BuildingStatusChanged {
            building_id: building_id.to_string(),
            status:      status.key().to_string(),
        })?;
        tx.commit()
    }

    pub fn claim_system(&self, coord: Coordinate, actor: &str) -> EngineResult<()> {
        let system = coord.system_id();
        let mut ledger = self.lock()?;
        let tx = ledger.begin()?;
        if tx.credits(actor)?.is_none() {
            return Err(EngineError::Validation(format!("unknown actor '{actor}'")));
        }
        tx.set_system_owner(system, actor)?;
        tx.append_event(&LedgerEvent::SystemClaimed {
            system,
            owner: actor.to_string(),
        })?;
        tx.commit()
    }

    // ── Ledger reads ───────────────────────────────────────────

    pub fn credits(&self, actor: &str) -> EngineResult<Credits> {
        let mut ledger = self.lock()?;
        let tx = ledger.snapshot()?;
        tx.credits(actor)?
            .ok_or_else(|| EngineError::Validation(format!("unknown actor '{actor}'")))
    }

    pub fn cargo(&self, ship_id: &str, commodity: Commodity) -> EngineResult<i64> {
        let mut ledger = self.lock()?;
        let tx = ledger.snapshot()?;
        tx.cargo(ship_id, commodity)
    }

    /// None until the market row is first touched by a trade.
    pub fn inventory(&self, coord: Coordinate, commodity: Commodity) -> EngineResult<Option<InventoryRow>> {
        let mut ledger = self.lock()?;
        let tx = ledger.snapshot()?;
        tx.inventory(MarketKey::new(coord.system_id(), commodity))
    }

    pub fn price_delta(&self, coord: Coordinate, commodity: Commodity) -> EngineResult<i64> {
        let mut ledger = self.lock()?;
        let tx = ledger.snapshot()?;
        tx.price_delta(MarketKey::new(coord.system_id(), commodity))
    }

    pub fn system_owner(&self, coord: Coordinate) -> EngineResult<Option<String>> {
        let mut ledger = self.lock()?;
        let tx = ledger.snapshot()?;
        tx.system_owner(coord.system_id())
    }

    pub fn events(&self) -> EngineResult<Vec<EventLogEntry>> {
        self.lock()?.events()
    }

    pub fn count_events(&self, event_type: &str) -> EngineResult<i64> {
        self.lock()?.count_events(event_type)
    }

    // ── Pricing ────────────────────────────────────────────────

    pub fn current_price(&self, coord: Coordinate, commodity: Commodity) -> EngineResult<Credits> {
        let system = generate_system(coord);
        let mut ledger = self.lock()?;
        let tx = ledger.snapshot()?;
        pricing_engine::current_price(&tx, &system, commodity)
    }

    pub fn quote(
        &self,
        actor: &str,
        coord: Coordinate,
        commodity: Commodity,
        quantity: i64,
        direction: TradeDirection,
    ) -> EngineResult<PriceQuote> {
        let system = generate_system(coord);
        let mut ledger = self.lock()?;
        let tx = ledger.snapshot()?;
        pricing_engine::quote(&tx, &self.config.market, &system, commodity, quantity, direction, actor)
    }

    /// Settle one trade atomically. On any error nothing is written.
    pub fn execute_trade(&self, req: &TradeRequest) -> EngineResult<TradeReceipt> {
        let system = generate_system(req.system.coordinate());
        let trade_id = Uuid::new_v4().to_string();

        let mut ledger = self.lock()?;
        let tx = ledger.begin()?;
        match pricing_engine::execute_trade(&tx, &self.config.market, &system, req, trade_id) {
            Ok(receipt) => {
                tx.commit()?;
                Ok(receipt)
            }
            Err(e) => {
                if e.is_rejection() {
                    log::info!("engine: trade rejected for {}: {e}", req.actor);
                } else {
                    log::warn!("engine: trade failed for {}: {e}", req.actor);
                }
                Err(e)
            }
        }
    }

    // ── Recruits ───────────────────────────────────────────────

    pub fn rotate_recruit_pool(&self, level_tier: u8, now: DateTime<Utc>) -> EngineResult<RotationOutcome> {
        let tier = LevelTier::new(level_tier)?;
        let mut ledger = self.lock()?;
        let tx = ledger.begin()?;
        let outcome = recruit_pool::rotate(&tx, &self.config.recruits, tier, now)?;
        tx.commit()?;
        Ok(outcome)
    }

    pub fn available_recruits(&self, level_tier: u8, now: DateTime<Utc>) -> EngineResult<Vec<RecruitListing>> {
        let tier = LevelTier::new(level_tier)?;
        let mut ledger = self.lock()?;
        let tx = ledger.snapshot()?;
        recruit_pool::available(&tx, tier, now)
    }

    pub fn hire_recruit(
        &self,
        actor: &str,
        level_tier: u8,
        slot: u16,
        now: DateTime<Utc>,
    ) -> EngineResult<HiredRecruitView> {
        let tier = LevelTier::new(level_tier)?;
        let hire_id = Uuid::new_v4().to_string();
        let mut ledger = self.lock()?;
        let tx = ledger.begin()?;
        let view = recruit_pool::hire(&tx, actor, tier, slot, now, hire_id)?;
        tx.commit()?;
        Ok(view)
    }

    pub fn hired_recruit(&self, hire_id: &str) -> EngineResult<Option<HiredRecruitView>> {
        let mut ledger = self.lock()?;
        let tx = ledger.snapshot()?;
        Ok(tx.hired_recruit(hire_id)?.as_ref().map(HiredRecruitView::from_hire))
    }

    // ── Maintenance ────────────────────────────────────────────

    pub fn decay_price_deltas(&self) -> EngineResult<MaintenanceReport> {
        self.run_task(&DeltaDecay, Utc::now())
    }

    pub fn restock_inventories(&self) -> EngineResult<MaintenanceReport> {
        self.run_task(&InventoryRestock, Utc::now())
    }

    /// Every registered task, in registration order.
    pub fn run_maintenance(&self, now: DateTime<Utc>) -> EngineResult<Vec<MaintenanceReport>> {
        let mut ledger = self.lock()?;
        self.tasks
            .iter()
            .map(|task| task.run(&mut ledger, &self.config, now))
            .collect()
    }

    fn run_task(&self, task: &dyn MaintenanceTask, now: DateTime<Utc>) -> EngineResult<MaintenanceReport> {
        let mut ledger = self.lock()?;
        task.run(&mut ledger, &self.config, now)
    }
}

