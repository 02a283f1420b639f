//! Deterministic universe content and trading economy engine.
//!
//! Generators turn key fields into systems, ships, buildings and recruits
//! without touching storage. The ledger holds the only mutable state:
//! credits, cargo, market rows, ownership, recruit epochs and the event log.

pub mod audit;
pub mod building_generator;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod maintenance;
pub mod name_generator;
pub mod pricing_engine;
pub mod recruit_generator;
pub mod recruit_pool;
pub mod rng;
pub mod seed;
pub mod ship_generator;
pub mod store;
pub mod system_generator;
pub mod tables;
pub mod types;

pub use engine::UniverseEngine;
pub use error::{EngineError, EngineResult};
