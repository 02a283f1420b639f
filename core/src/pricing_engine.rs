//! Pricing and trade settlement.
//!
//! current_price = max(round(base × abundance × Π building modifiers) + delta, 1)
//!
//! The static part (base, abundance, buildings) is multiplicative; the live
//! delta is added afterwards. All money is integer credits. Every rounding
//! step that touches a trader rounds against the trader: buy prices and
//! fees round up, sell prices round down.
//!
//! RULE: execute_trade validates everything before its first write, and
//! runs inside a caller-supplied LedgerTx. Any error drops the transaction,
//! so a rejected trade leaves no trace.

use crate::{
    config::MarketConfig,
    error::{EngineError, EngineResult},
    event::LedgerEvent,
    store::{BuildingRow, LedgerTx, MarketKey},
    system_generator::SystemAttributes,
    tables::{
        refinery_input, BuildingFunction, Commodity, EXTRACTION_OUTPUT_DISCOUNT_BP,
        MARKETPLACE_FEE_BP, REFINERY_INPUT_PREMIUM_BP, REFINERY_OUTPUT_DISCOUNT_BP,
    },
    types::{ActorId, Credits, ShipId, SystemId},
};
use serde::{Deserialize, Serialize};
use std::fmt;

const BP: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Buy  => "buy",
            Self::Sell => "sell",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRequest {
    pub actor:     ActorId,
    pub ship_id:   ShipId,
    pub system:    SystemId,
    pub commodity: Commodity,
    pub quantity:  i64,
    pub direction: TradeDirection,
}

/// What a trade would cost or pay right now. Produced without writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub system:        SystemId,
    pub commodity:     Commodity,
    pub direction:     TradeDirection,
    pub quantity:      i64,
    pub current_price: Credits,
    /// Per-unit price after the non-owner spread (equal to current_price
    /// for the owner).
    pub unit_price:    Credits,
    pub gross:         Credits,
    pub fee:           Credits,
    pub fee_bp:        i64,
    /// Owed to the system owner out of the spread. Zero for the owner or
    /// an unowned system.
    pub owner_tax:     Credits,
    /// Buy: total debited. Sell: total credited.
    pub total:         Credits,
    /// Delta change this trade applies, signed.
    pub delta_push:    i64,
    pub is_owner:      bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub trade_id:      String,
    pub quote:         PriceQuote,
    /// Signed change to the trader's credits.
    pub net:           Credits,
    pub credits_after: Credits,
    pub cargo_after:   i64,
    pub stock_after:   i64,
    pub delta_after:   i64,
}

// ── Price ─────────────────────────────────────────────────────────

/// Price before the live delta: base × abundance × building modifiers,
/// rounded half away from zero. `buildings` must be operational.
pub fn static_price(
    system: &SystemAttributes,
    commodity: Commodity,
    buildings: &[BuildingRow],
) -> i64 {
    let abundance_bp = system
        .abundance_of(commodity)
        .map(|a| a.price_modifier_bp())
        .unwrap_or(BP);

    let mut price = system.base_price(commodity) as f64 * abundance_bp as f64 / BP as f64;
    for modifier_bp in building_modifiers(commodity, buildings) {
        price *= (BP + modifier_bp) as f64 / BP as f64;
    }
    price.round() as i64
}

/// Signed basis-point modifiers the buildings apply to one commodity.
fn building_modifiers(commodity: Commodity, buildings: &[BuildingRow]) -> Vec<i64> {
    let mut mods = Vec::new();
    for b in buildings {
        let idx = b.tier.index();
        match (b.function, b.commodity) {
            (BuildingFunction::Extraction, Some(out)) if out == commodity => {
                mods.push(-EXTRACTION_OUTPUT_DISCOUNT_BP[idx]);
            }
            (BuildingFunction::Refinery, Some(out)) => {
                if out == commodity {
                    mods.push(-REFINERY_OUTPUT_DISCOUNT_BP[idx]);
                } else if refinery_input(out) == Some(commodity) {
                    mods.push(REFINERY_INPUT_PREMIUM_BP[idx]);
                }
            }
            _ => {}
        }
    }
    mods
}

/// Live price. Never below 1 however negative the delta gets.
pub fn current_price(
    tx: &LedgerTx<'_>,
    system: &SystemAttributes,
    commodity: Commodity,
) -> EngineResult<Credits> {
    let buildings = tx.operational_buildings(system.system_id)?;
    let delta = tx.price_delta(MarketKey::new(system.system_id, commodity))?;
    Ok(apply_delta(static_price(system, commodity, &buildings), delta))
}

pub fn apply_delta(static_price: i64, delta: i64) -> Credits {
    static_price.saturating_add(delta).max(1)
}

/// Fee rate of the best operational marketplace, or None when the system
/// has no operational marketplace.
pub fn marketplace_fee_bp(buildings: &[BuildingRow]) -> Option<i64> {
    buildings
        .iter()
        .filter(|b| b.function == BuildingFunction::Marketplace)
        .map(|b| b.tier)
        .max()
        .map(|t| MARKETPLACE_FEE_BP[t.index()])
}

// ── Quote ─────────────────────────────────────────────────────────

/// Price a prospective trade. Performs no writes.
pub fn quote(
    tx: &LedgerTx<'_>,
    cfg: &MarketConfig,
    system: &SystemAttributes,
    commodity: Commodity,
    quantity: i64,
    direction: TradeDirection,
    actor: &str,
) -> EngineResult<PriceQuote> {
    if quantity <= 0 {
        return Err(EngineError::Validation(format!(
            "quantity must be positive, got {quantity}"
        )));
    }

    let buildings = tx.operational_buildings(system.system_id)?;
    let fee_bp = marketplace_fee_bp(&buildings).ok_or_else(|| EngineError::NoMarketplace {
        system: system.system_id.to_string(),
    })?;

    let delta = tx.price_delta(MarketKey::new(system.system_id, commodity))?;
    let p = apply_delta(static_price(system, commodity, &buildings), delta);

    let owner = tx.system_owner(system.system_id)?;
    let is_owner = owner.as_deref() == Some(actor);

    let unit_price = match (is_owner, direction) {
        (true, _) => p,
        (false, TradeDirection::Buy)  => ceil_bp(p, BP + cfg.buy_spread_bp),
        (false, TradeDirection::Sell) => floor_bp(p, BP - cfg.sell_spread_bp),
    };

    let overflow = || EngineError::Validation(format!("trade of {quantity} units overflows"));
    let gross = unit_price.checked_mul(quantity).ok_or_else(overflow)?;
    let fee = ceil_bp(gross, fee_bp);

    let spread = (unit_price - p).abs().checked_mul(quantity).ok_or_else(overflow)?;
    let owner_tax = if owner.is_some() && !is_owner {
        floor_bp(spread, cfg.owner_tax_bp)
    } else {
        0
    };

    let total = match direction {
        TradeDirection::Buy  => gross.checked_add(fee).ok_or_else(overflow)?,
        TradeDirection::Sell => (gross - fee).max(0),
    };

    // Impact grows with quantity but one trade moves the price at most
    // delta_impact_cap_bp, which stays below the combined spread. The owner
    // pays no spread, so their own push is held to the two fees of a round
    // trip: buying Q and selling Q straight back always costs them.
    let cap_bp = if is_owner {
        cfg.delta_impact_cap_bp.min(2 * fee_bp)
    } else {
        cfg.delta_impact_cap_bp
    };
    let magnitude = floor_bp(p.saturating_mul(quantity), cfg.delta_impact_bp)
        .min(floor_bp(p, cap_bp));
    let delta_push = match direction {
        TradeDirection::Buy  => magnitude,
        TradeDirection::Sell => -magnitude,
    };

    Ok(PriceQuote {
        system: system.system_id,
        commodity,
        direction,
        quantity,
        current_price: p,
        unit_price,
        gross,
        fee,
        fee_bp,
        owner_tax,
        total,
        delta_push,
        is_owner,
    })
}

// ── Settlement ────────────────────────────────────────────────────

/// Validate and apply one trade inside `tx`. The caller commits.
pub fn execute_trade(
    tx: &LedgerTx<'_>,
    cfg: &MarketConfig,
    system: &SystemAttributes,
    req: &TradeRequest,
    trade_id: String,
) -> EngineResult<TradeReceipt> {
    let ship = tx
        .ship(&req.ship_id)?
        .ok_or_else(|| EngineError::Validation(format!("unknown ship '{}'", req.ship_id)))?;
    if ship.actor_id != req.actor {
        return Err(EngineError::Validation(format!(
            "ship '{}' is not owned by '{}'",
            req.ship_id, req.actor
        )));
    }
    let credits = tx
        .credits(&req.actor)?
        .ok_or_else(|| EngineError::Validation(format!("unknown actor '{}'", req.actor)))?;

    let q = quote(tx, cfg, system, req.commodity, req.quantity, req.direction, &req.actor)?;

    let key = MarketKey::new(system.system_id, req.commodity);
    tx.ensure_inventory(key, cfg.initial_inventory, cfg.max_inventory)?;
    let stock = tx.inventory(key)?.map(|r| r.quantity).unwrap_or(0);
    let held = tx.cargo(&req.ship_id, req.commodity)?;

    // ── Validate ──────────────────────────────────────────────────
    match req.direction {
        TradeDirection::Buy => {
            if stock < req.quantity {
                return Err(EngineError::InsufficientStock {
                    requested: req.quantity,
                    available: stock,
                });
            }
            if credits < q.total {
                return Err(EngineError::InsufficientFunds {
                    needed:    q.total,
                    available: credits,
                });
            }
            let free = ship.cargo_capacity - tx.cargo_total(&req.ship_id)?;
            if free < req.quantity {
                return Err(EngineError::InsufficientCargoSpace {
                    needed: req.quantity,
                    free,
                });
            }
        }
        TradeDirection::Sell => {
            if held < req.quantity {
                return Err(EngineError::InsufficientCargo {
                    requested: req.quantity,
                    held,
                });
            }
        }
    }

    // ── Apply ─────────────────────────────────────────────────────
    let net = match req.direction {
        TradeDirection::Buy => {
            tx.adjust_credits(&req.actor, -q.total)?;
            tx.adjust_cargo(&req.ship_id, req.commodity, req.quantity)?;
            tx.withdraw_stock(key, req.quantity)?;
            -q.total
        }
        TradeDirection::Sell => {
            tx.adjust_credits(&req.actor, q.total)?;
            tx.adjust_cargo(&req.ship_id, req.commodity, -req.quantity)?;
            tx.deposit_stock(key, req.quantity)?;
            q.total
        }
    };
    if q.delta_push != 0 {
        tx.add_price_delta(key, q.delta_push)?;
    }
    if q.owner_tax > 0 {
        if let Some(owner) = tx.system_owner(system.system_id)? {
            tx.adjust_credits(&owner, q.owner_tax)?;
        }
    }

    tx.append_event(&LedgerEvent::TradeExecuted {
        trade_id:   trade_id.clone(),
        actor:      req.actor.clone(),
        ship_id:    req.ship_id.clone(),
        system:     system.system_id,
        commodity:  req.commodity,
        direction:  req.direction.to_string(),
        quantity:   req.quantity,
        unit_price: q.unit_price,
        fee:        q.fee,
        owner_tax:  q.owner_tax,
        net,
    })?;

    let receipt = TradeReceipt {
        trade_id,
        net,
        credits_after: tx.credits(&req.actor)?.unwrap_or(0),
        cargo_after:   tx.cargo(&req.ship_id, req.commodity)?,
        stock_after:   tx.inventory(key)?.map(|r| r.quantity).unwrap_or(0),
        delta_after:   tx.price_delta(key)?,
        quote:         q,
    };
    log::debug!(
        "pricing: {} {} x{} {} at {} in {} (fee {}, tax {})",
        req.actor,
        req.direction,
        req.quantity,
        req.commodity,
        receipt.quote.unit_price,
        system.system_id,
        receipt.quote.fee,
        receipt.quote.owner_tax
    );
    Ok(receipt)
}

/// value × bp / 10_000, rounded up. Non-negative inputs only.
pub fn ceil_bp(value: i64, bp: i64) -> i64 {
    let n = value as i128 * bp as i128;
    ((n + BP as i128 - 1) / BP as i128) as i64
}

/// value × bp / 10_000, rounded down. Non-negative inputs only.
pub fn floor_bp(value: i64, bp: i64) -> i64 {
    (value as i128 * bp as i128 / BP as i128) as i64
}
