//! Population audits over generator output.
//!
//! These do not sample a live universe; they regenerate a full
//! cross-product and measure it, so they are reproducible and can gate a
//! retune of `tables.rs`.

use crate::{
    building_generator::generate_building,
    ship_generator::generate_ship,
    tables::{
        BuildingFunction, HullSize, Race, ShipAttribute, ShipVariant, Tier, MAX_TIER,
        TARGET_COST_FACTOR, TARGET_OUTPUT_FACTOR,
    },
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceBalance {
    pub race:        Race,
    pub attribute:   ShipAttribute,
    /// Race mean of the signature attribute ÷ cross-race mean.
    pub ratio:       f64,
    pub band:        (f64, f64),
    pub within_band: bool,
}

/// Signature-attribute ratios over races × hulls × variants × `0..seeds`.
pub fn racial_balance(seeds: u64) -> Vec<RaceBalance> {
    let mut sums = [[0.0f64; 8]; 6];
    let mut counts = [0u64; 6];

    for (ri, race) in Race::ALL.iter().enumerate() {
        for hull in HullSize::ALL {
            for variant in ShipVariant::ALL {
                for loc in 0..seeds {
                    let ship = generate_ship(*race, hull, variant, loc);
                    for attr in ShipAttribute::ALL {
                        sums[ri][attr as usize] += ship.attribute(attr);
                    }
                    counts[ri] += 1;
                }
            }
        }
    }

    Race::ALL
        .iter()
        .enumerate()
        .map(|(ri, race)| {
            let profile = race.profile();
            let a = profile.signature as usize;
            let race_mean = sums[ri][a] / counts[ri].max(1) as f64;
            let global_mean = sums.iter().map(|s| s[a]).sum::<f64>()
                / counts.iter().sum::<u64>().max(1) as f64;
            let ratio = race_mean / global_mean;
            let (lo, hi) = profile.signature_band;
            RaceBalance {
                race: *race,
                attribute: profile.signature,
                ratio,
                band: profile.signature_band,
                within_band: ratio >= lo && ratio <= hi,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierCurve {
    pub function:     BuildingFunction,
    pub costs:        Vec<i64>,
    pub outputs:      Vec<i64>,
    /// costs[t+1] / costs[t].
    pub cost_steps:   Vec<f64>,
    pub output_steps: Vec<f64>,
    /// Geometric mean step over all tiers.
    pub mean_cost_step:   f64,
    pub mean_output_step: f64,
}

impl TierCurve {
    /// Distance of this function's mean steps from the overall targets.
    pub fn drift_from_target(&self) -> (f64, f64) {
        (
            self.mean_cost_step - TARGET_COST_FACTOR,
            self.mean_output_step - TARGET_OUTPUT_FACTOR,
        )
    }
}

/// Cost and output per tier for every function, read back through the
/// building generator.
pub fn building_tier_ratios() -> Vec<TierCurve> {
    BuildingFunction::ALL
        .iter()
        .map(|function| {
            let built: Vec<_> = Tier::all()
                .map(|t| generate_building(Race::Human, *function, t, 0))
                .collect();
            let costs: Vec<i64> = built.iter().map(|b| b.construction_cost).collect();
            let outputs: Vec<i64> = built.iter().map(|b| b.output_rate).collect();
            let steps = |v: &[i64]| -> Vec<f64> {
                v.windows(2).map(|w| w[1] as f64 / w[0] as f64).collect()
            };
            let span = (MAX_TIER - 1) as f64;
            TierCurve {
                function: *function,
                cost_steps: steps(&costs),
                output_steps: steps(&outputs),
                mean_cost_step: (costs[costs.len() - 1] as f64 / costs[0] as f64).powf(1.0 / span),
                mean_output_step: (outputs[outputs.len() - 1] as f64 / outputs[0] as f64)
                    .powf(1.0 / span),
                costs,
                outputs,
            }
        })
        .collect()
}
