//! Recruit generation: (level tier, rotation epoch, slot) in, candidate out.
//!
//! The key never includes a player, so every viewer of a pool sees the
//! same candidates. The chaos factor is generated here and kept in a
//! private field: the only public read shapes are `RecruitListing` and
//! `HiredRecruitView`, which do not carry it.
//!
//! Employment history is drawn from chaos-weighted tables and is the
//! structured signal a player can use to guess a candidate's volatility.

use crate::{
    name_generator::NameGenerator,
    rng::{SeedStream, StreamSlot},
    seed::{ByteRange, Seed},
    tables::{
        history_outcome_weights, max_tenure_months, negative_quirk_percent,
        specific_reasons, vague_reason_percent, HistoryOutcome, LevelTier, Race,
        Rarity, RecruitClass, NEGATIVE_QUIRKS, POSITIVE_QUIRKS, SKILL_BONUS_PER_LEVEL,
        VAGUE_REASONS,
    },
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_CHAOS: u8 = 100;
pub const MAX_SKILL: u64 = 100;

// ── Byte layout: recruit seed ─────────────────────────────────────
pub const RACE:          ByteRange = ByteRange::new(0, 1);
pub const CLASS:         ByteRange = ByteRange::new(1, 1);
pub const RARITY:        ByteRange = ByteRange::new(2, 2);
pub const SKILL:         ByteRange = ByteRange::new(4, 2);
pub const CHAOS:         ByteRange = ByteRange::new(6, 2);
pub const QUIRK_COUNT:   ByteRange = ByteRange::new(8, 1);
pub const HISTORY_COUNT: ByteRange = ByteRange::new(9, 1);
// bytes 10..32 spare

// ── Byte layout: quirk seed ("quirk", i) ──────────────────────────
pub const QUIRK_POLARITY: ByteRange = ByteRange::new(0, 2);
pub const QUIRK_PICK:     ByteRange = ByteRange::new(2, 2);
// bytes 4..32 spare

// ── Byte layout: history seed ("history", i) ──────────────────────
pub const OUTCOME:     ByteRange = ByteRange::new(0, 2);
pub const TENURE:      ByteRange = ByteRange::new(2, 2);
pub const VAGUENESS:   ByteRange = ByteRange::new(4, 2);
pub const REASON_PICK: ByteRange = ByteRange::new(6, 2);
// bytes 8..32 spare

/// Pool rotation cadence: epoch n is valid over
/// [genesis + n·period, genesis + (n+1)·period).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationSchedule {
    pub genesis:     DateTime<Utc>,
    pub period_secs: i64,
}

impl RotationSchedule {
    /// Epoch containing `now`. Instants before genesis map to epoch 0.
    pub fn epoch_at(&self, now: DateTime<Utc>) -> u64 {
        let elapsed = (now - self.genesis).num_seconds();
        if elapsed <= 0 {
            0
        } else {
            (elapsed / self.period_secs.max(1)) as u64
        }
    }

    pub fn window(&self, epoch: u64) -> (DateTime<Utc>, DateTime<Utc>) {
        let period = self.period_secs.max(1);
        let start = self.genesis + Duration::seconds(period.saturating_mul(epoch as i64));
        (start, start + Duration::seconds(period))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecruitKey {
    pub level_tier: LevelTier,
    pub epoch:      u64,
    pub slot:       u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Quirk {
    pub name: String,
    positive: bool,
}

impl Quirk {
    #[cfg(test)]
    pub(crate) fn is_positive(&self) -> bool {
        self.positive
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentRecord {
    pub employer:          String,
    pub tenure_months:     u32,
    pub outcome:           HistoryOutcome,
    pub separation_reason: String,
}

/// A full candidate, including the hidden chaos factor. Crate-private: it
/// serializes the chaos factor for storage, so every read path outside the
/// crate goes through `RecruitListing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RecruitPoolEntry {
    pub key:          RecruitKey,
    pub name:         String,
    pub race:         Race,
    pub class:        RecruitClass,
    pub skill:        u8,
    pub rarity:       Rarity,
    chaos_factor:     u8,
    pub quirks:       Vec<Quirk>,
    pub history:      Vec<EmploymentRecord>,
    pub available_at: DateTime<Utc>,
    pub expires_at:   DateTime<Utc>,
}

impl RecruitPoolEntry {
    #[cfg(test)]
    pub(crate) fn chaos_factor(&self) -> u8 {
        self.chaos_factor
    }

    /// Half-open validity window check.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.available_at <= now && now < self.expires_at
    }

    pub(crate) fn listing(&self) -> RecruitListing {
        RecruitListing {
            level_tier:   self.key.level_tier,
            epoch:        self.key.epoch,
            slot:         self.key.slot,
            name:         self.name.clone(),
            race:         self.race,
            class:        self.class,
            skill:        self.skill,
            rarity:       self.rarity,
            quirks:       self.quirks.iter().map(|q| q.name.clone()).collect(),
            history:      self.history.clone(),
            available_at: self.available_at,
            expires_at:   self.expires_at,
        }
    }
}

/// Player-facing projection of a pool entry. Structurally has no chaos
/// factor and no quirk polarity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruitListing {
    pub level_tier:   LevelTier,
    pub epoch:        u64,
    pub slot:         u16,
    pub name:         String,
    pub race:         Race,
    pub class:        RecruitClass,
    pub skill:        u8,
    pub rarity:       Rarity,
    pub quirks:       Vec<String>,
    pub history:      Vec<EmploymentRecord>,
    pub available_at: DateTime<Utc>,
    pub expires_at:   DateTime<Utc>,
}

pub(crate) fn generate_recruit(key: RecruitKey, schedule: &RotationSchedule) -> RecruitPoolEntry {
    let seed = Seed::derive(&[&"recruit", &key.level_tier.get(), &key.epoch, &key.slot]);

    let race = Race::ALL[seed.extract(RACE, Race::ALL.len() as u64) as usize];
    let class = RecruitClass::ALL[seed.extract(CLASS, RecruitClass::ALL.len() as u64) as usize];
    let rarity = Rarity::ALL[seed.extract_weighted(RARITY, &Rarity::CUMULATIVE_WEIGHTS)];

    let (lo, hi) = rarity.skill_range();
    let level_bonus = (key.level_tier.get() as u64 - 1) * SKILL_BONUS_PER_LEVEL;
    let skill = (lo + seed.extract(SKILL, hi - lo + 1) + level_bonus).min(MAX_SKILL) as u8;

    let chaos = seed.extract(CHAOS, MAX_CHAOS as u64 + 1) as u8;

    let quirk_count = 1 + seed.extract(QUIRK_COUNT, 3) as usize;
    let mut quirks: Vec<Quirk> = Vec::with_capacity(quirk_count);
    for i in 0..quirk_count {
        let q = roll_quirk(&seed.child("quirk", i), chaos);
        if !quirks.iter().any(|existing| existing.name == q.name) {
            quirks.push(q);
        }
    }

    let history_count = 2 + seed.extract(HISTORY_COUNT, 4) as usize;
    let history = (0..history_count)
        .map(|i| roll_history(&seed.child("history", i), chaos))
        .collect();

    let (available_at, expires_at) = schedule.window(key.epoch);
    let mut names = SeedStream::new(&seed, StreamSlot::RecruitName);

    RecruitPoolEntry {
        key,
        name: NameGenerator::recruit_name(&mut names),
        race,
        class,
        skill,
        rarity,
        chaos_factor: chaos,
        quirks,
        history,
        available_at,
        expires_at,
    }
}

/// Every slot of one pool, in slot order.
pub(crate) fn generate_pool(
    level_tier: LevelTier,
    epoch: u64,
    pool_size: u16,
    schedule: &RotationSchedule,
) -> Vec<RecruitPoolEntry> {
    (0..pool_size)
        .map(|slot| generate_recruit(RecruitKey { level_tier, epoch, slot }, schedule))
        .collect()
}

fn roll_quirk(seed: &Seed, chaos: u8) -> Quirk {
    let negative = seed.extract(QUIRK_POLARITY, 100) < negative_quirk_percent(chaos);
    let pool: &[&str] = if negative { &NEGATIVE_QUIRKS } else { &POSITIVE_QUIRKS };
    let name = pool[seed.extract(QUIRK_PICK, pool.len() as u64) as usize];
    Quirk {
        name: name.to_string(),
        positive: !negative,
    }
}

fn roll_history(seed: &Seed, chaos: u8) -> EmploymentRecord {
    let outcomes = [
        HistoryOutcome::CleanExit,
        HistoryOutcome::Incident,
        HistoryOutcome::Catastrophe,
    ];
    let outcome = outcomes[seed.extract_weighted(OUTCOME, &history_outcome_weights(chaos))];

    let mut tenure = 1 + seed.extract(TENURE, max_tenure_months(chaos));
    if outcome == HistoryOutcome::Catastrophe {
        tenure = tenure.div_ceil(2);
    }

    let vague = seed.extract(VAGUENESS, 100) < vague_reason_percent(chaos);
    let reasons: &[&str] = if vague { &VAGUE_REASONS } else { specific_reasons(outcome) };
    let reason = reasons[seed.extract(REASON_PICK, reasons.len() as u64) as usize];

    let mut employer = SeedStream::new(seed, StreamSlot::Employer);

    EmploymentRecord {
        employer: NameGenerator::employer(&mut employer),
        tenure_months: tenure as u32,
        outcome,
        separation_reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::assert_layout;
    use chrono::TimeZone;

    fn schedule() -> RotationSchedule {
        RotationSchedule {
            genesis: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            period_secs: 6 * 3600,
        }
    }

    fn all_entries() -> Vec<RecruitPoolEntry> {
        let sched = schedule();
        LevelTier::all()
            .flat_map(|tier| (0..150u64).flat_map(move |epoch| generate_pool(tier, epoch, 8, &sched)))
            .collect()
    }

    #[test]
    fn byte_layouts_do_not_overlap() {
        assert_layout("recruit", &[RACE, CLASS, RARITY, SKILL, CHAOS, QUIRK_COUNT, HISTORY_COUNT]);
        assert_layout("quirk", &[QUIRK_POLARITY, QUIRK_PICK]);
        assert_layout("history", &[OUTCOME, TENURE, VAGUENESS, REASON_PICK]);
    }

    #[test]
    fn fields_stay_in_documented_ranges() {
        for e in all_entries() {
            assert!((1..=100).contains(&e.skill), "skill {}", e.skill);
            assert!(e.chaos_factor() <= MAX_CHAOS);
            assert!((1..=3).contains(&e.quirks.len()));
            assert!((2..=5).contains(&e.history.len()));
            assert!(e.available_at < e.expires_at);
        }
    }

    #[test]
    fn rarity_follows_cumulative_thresholds() {
        let entries = all_entries();
        let n = entries.len() as f64;
        let share = |r: Rarity| entries.iter().filter(|e| e.rarity == r).count() as f64 / n;
        assert!((share(Rarity::Common) - 0.70).abs() < 0.03);
        assert!((share(Rarity::Uncommon) - 0.20).abs() < 0.03);
        assert!((share(Rarity::Rare) - 0.08).abs() < 0.02);
        assert!((share(Rarity::Legendary) - 0.02).abs() < 0.01);
    }

    #[test]
    fn quirks_sour_as_chaos_rises() {
        let entries = all_entries();
        let negative_share = |lo: u8, hi: u8| {
            let quirks: Vec<&Quirk> = entries
                .iter()
                .filter(|e| (lo..=hi).contains(&e.chaos_factor()))
                .flat_map(|e| e.quirks.iter())
                .collect();
            quirks.iter().filter(|q| !q.is_positive()).count() as f64 / quirks.len() as f64
        };
        let calm = negative_share(0, 20);
        let wild = negative_share(80, 100);
        assert!(calm < 0.35, "calm recruits too negative: {calm:.2}");
        assert!(wild > 0.65, "wild recruits too positive: {wild:.2}");
    }

    #[test]
    fn history_correlates_strongly_with_chaos() {
        let entries = all_entries();
        let score = |e: &RecruitPoolEntry| {
            let total: f64 = e
                .history
                .iter()
                .map(|h| {
                    let outcome = match h.outcome {
                        HistoryOutcome::CleanExit   => 0.0,
                        HistoryOutcome::Incident    => 1.0,
                        HistoryOutcome::Catastrophe => 3.0,
                    };
                    let vague = if VAGUE_REASONS.contains(&h.separation_reason.as_str()) { 1.0 } else { 0.0 };
                    outcome + vague
                })
                .sum();
            total / e.history.len() as f64
        };
        let xs: Vec<f64> = entries.iter().map(|e| e.chaos_factor() as f64).collect();
        let ys: Vec<f64> = entries.iter().map(score).collect();
        let r = pearson(&xs, &ys);
        assert!(r > 0.5, "history/chaos correlation too weak: {r:.3}");
    }

    #[test]
    fn listing_serialization_never_mentions_chaos() {
        let e = generate_recruit(
            RecruitKey { level_tier: LevelTier::new(3).unwrap(), epoch: 9, slot: 2 },
            &schedule(),
        );
        let json = serde_json::to_string(&e.listing()).unwrap();
        assert!(!json.contains("chaos"));
        assert!(!json.contains("positive"));
    }

    #[test]
    fn window_is_half_open_and_contiguous() {
        let sched = schedule();
        let (s0, e0) = sched.window(0);
        let (s1, _) = sched.window(1);
        assert_eq!(e0, s1);
        assert_eq!(sched.epoch_at(s0), 0);
        assert_eq!(sched.epoch_at(e0), 1);
        assert_eq!(sched.epoch_at(e0 - Duration::seconds(1)), 0);
    }

    fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
        let n = xs.len() as f64;
        let mx = xs.iter().sum::<f64>() / n;
        let my = ys.iter().sum::<f64>() / n;
        let cov: f64 = xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).sum();
        let vx: f64 = xs.iter().map(|x| (x - mx).powi(2)).sum();
        let vy: f64 = ys.iter().map(|y| (y - my).powi(2)).sum();
        cov / (vx.sqrt() * vy.sqrt())
    }
}
