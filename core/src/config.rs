//! Engine tunables.
//!
//! Balance tables that are part of the content contract live in
//! `tables.rs`. This file holds the knobs an operator retunes per
//! deployment: spreads, fees, decay, restock and pool cadence.
//! All rates are integer basis points (1/10_000).

use crate::recruit_generator::RotationSchedule;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 2025-01-01T00:00:00Z.
pub const DEFAULT_GENESIS_UNIX: i64 = 1_735_689_600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub market:   MarketConfig,
    pub recruits: RecruitConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Markup a non-owner pays over the current price.
    pub buy_spread_bp:       i64,
    /// Markdown a non-owner accepts under the current price.
    pub sell_spread_bp:      i64,
    /// Share of a non-owner's spread credited to the system owner.
    pub owner_tax_bp:        i64,
    /// Delta push per unit traded, as a share of the unit price.
    pub delta_impact_bp:     i64,
    /// Ceiling on a single trade's delta push, as a share of the unit price.
    pub delta_impact_cap_bp: i64,
    /// Share of the delta removed per decay tick.
    pub decay_bp:            i64,
    pub restock_rate:        i64,
    pub max_inventory:       i64,
    /// Stock a market starts with the first time it is touched.
    pub initial_inventory:   i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecruitConfig {
    pub pool_size:            u16,
    pub rotation_period_secs: i64,
    pub genesis:              DateTime<Utc>,
}

impl RecruitConfig {
    pub fn schedule(&self) -> RotationSchedule {
        RotationSchedule {
            genesis:     self.genesis,
            period_secs: self.rotation_period_secs,
        }
    }
}

impl EngineConfig {
    /// Load from `<data_dir>/engine_config.json`.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/engine_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings under which a non-owner round trip could profit or
    /// inventory bounds are incoherent.
    pub fn validate(&self) -> anyhow::Result<()> {
        let m = &self.market;
        if m.max_inventory <= 0 || !(0..=m.max_inventory).contains(&m.initial_inventory) {
            anyhow::bail!(
                "initial_inventory {} must lie in 0..={}",
                m.initial_inventory,
                m.max_inventory
            );
        }
        if m.restock_rate < 0 {
            anyhow::bail!("restock_rate must be >= 0");
        }
        if !(0..=10_000).contains(&m.decay_bp) {
            anyhow::bail!("decay_bp {} outside 0..=10000", m.decay_bp);
        }
        if m.delta_impact_cap_bp >= m.buy_spread_bp + m.sell_spread_bp {
            anyhow::bail!(
                "delta_impact_cap_bp {} must stay below the combined spread {}",
                m.delta_impact_cap_bp,
                m.buy_spread_bp + m.sell_spread_bp
            );
        }
        if self.recruits.pool_size == 0 || self.recruits.rotation_period_secs <= 0 {
            anyhow::bail!("recruit pool needs a positive size and rotation period");
        }
        Ok(())
    }

    /// Config with hardcoded defaults for use in tests.
    pub fn default_test() -> Self {
        Self::default()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            market: MarketConfig {
                buy_spread_bp:       1_000,
                sell_spread_bp:      1_000,
                owner_tax_bp:        1_000,
                delta_impact_bp:     50,
                delta_impact_cap_bp: 1_500,
                decay_bp:            1_000,
                restock_rate:        25,
                max_inventory:       1_000,
                initial_inventory:   500,
            },
            recruits: RecruitConfig {
                pool_size:            8,
                rotation_period_secs: 6 * 3_600,
                genesis:              DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(DEFAULT_GENESIS_UNIX),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_config_matches_defaults() {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../data");
        let loaded = EngineConfig::load(dir).unwrap();
        assert_eq!(loaded, EngineConfig::default());
    }

    #[test]
    fn cap_at_or_above_spread_is_rejected() {
        let mut cfg = EngineConfig::default_test();
        cfg.market.delta_impact_cap_bp = 2_000;
        assert!(cfg.validate().is_err());
    }
}
