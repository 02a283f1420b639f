//! Deterministic names for systems, ships, recruits and past employers.
//!
//! All generation is driven by a SeedStream, so the same key fields always
//! yield the same name.

use crate::rng::SeedStream;

/// Deterministic name generator using curated syllable and word lists
pub struct NameGenerator;

impl NameGenerator {
    /// Star system name: two or three syllables plus an optional
    /// catalogue suffix, e.g. "Velmora IV".
    pub fn system_name(stream: &mut SeedStream) -> String {
        let mut name = String::from(stream.pick(Self::star_prefixes()));
        let middles = 1 + stream.next_u64_below(2);
        for _ in 0..middles {
            name.push_str(stream.pick(Self::star_middles()));
        }
        name.push_str(stream.pick(Self::star_suffixes()));
        if stream.chance(0.35) {
            format!("{} {}", name, stream.pick(Self::catalogue_suffixes()))
        } else {
            name
        }
    }

    /// Ship name, e.g. "Quiet Harbinger".
    pub fn ship_name(stream: &mut SeedStream) -> String {
        format!(
            "{} {}",
            stream.pick(Self::ship_adjectives()),
            stream.pick(Self::ship_nouns())
        )
    }

    /// Recruit name (given + family).
    pub fn recruit_name(stream: &mut SeedStream) -> String {
        format!(
            "{} {}",
            stream.pick(Self::given_names()),
            stream.pick(Self::family_names())
        )
    }

    /// Past employer for an employment-history entry.
    pub fn employer(stream: &mut SeedStream) -> String {
        format!(
            "{} {}",
            stream.pick(Self::employer_stems()),
            stream.pick(Self::employer_kinds())
        )
    }

    fn star_prefixes() -> &'static [&'static str] {
        &[
            "Al", "Bel", "Cor", "Dra", "Eri", "Fal", "Gor", "Hel", "Ix", "Jor",
            "Kal", "Lyr", "Mor", "Nex", "Or", "Pra", "Qua", "Rho", "Syl", "Tau",
            "Ul", "Vel", "Wyr", "Xan", "Yor", "Zed",
        ]
    }

    fn star_middles() -> &'static [&'static str] {
        &["a", "e", "i", "o", "u", "ae", "ia", "or", "an", "el", "mo", "ri"]
    }

    fn star_suffixes() -> &'static [&'static str] {
        &["ris", "nus", "tor", "lon", "mir", "dra", "phe", "gan", "th", "x", "ra", "on"]
    }

    fn catalogue_suffixes() -> &'static [&'static str] {
        &["II", "III", "IV", "V", "VI", "Prime", "Major", "Minor"]
    }

    fn ship_adjectives() -> &'static [&'static str] {
        &[
            "Quiet", "Restless", "Crimson", "Distant", "Iron", "Patient", "Silver",
            "Hollow", "Burning", "Drifting", "Stubborn", "Last", "Lucky", "Grey",
        ]
    }

    fn ship_nouns() -> &'static [&'static str] {
        &[
            "Harbinger", "Margin", "Comet", "Ledger", "Wanderer", "Anvil", "Lantern",
            "Tide", "Promise", "Verdict", "Sparrow", "Horizon", "Covenant", "Ember",
        ]
    }

    fn given_names() -> &'static [&'static str] {
        &[
            "Ada", "Bram", "Cass", "Dex", "Enna", "Fenn", "Galen", "Hale", "Iris",
            "Jax", "Kira", "Lio", "Mara", "Nils", "Oona", "Pax", "Quill", "Rhea",
            "Soren", "Tamsin", "Ursa", "Vale", "Wren", "Xiu", "Yara", "Zane",
        ]
    }

    fn family_names() -> &'static [&'static str] {
        &[
            "Achterberg", "Blackwood", "Castellan", "Drexler", "Everhart", "Falk",
            "Greaves", "Holloway", "Ivanova", "Jourdain", "Kestrel", "Lindqvist",
            "Moreau", "Nakamura", "Okonkwo", "Petrov", "Quintero", "Rask",
            "Saltmarsh", "Thorne", "Umber", "Voss", "Whitlock", "Yilmaz",
        ]
    }

    fn employer_stems() -> &'static [&'static str] {
        &[
            "Helix", "Orion", "Tessellate", "Meridian", "Kuiper", "Aster", "Halcyon",
            "Baryon", "Corona", "Drift", "Umbra", "Vantage",
        ]
    }

    fn employer_kinds() -> &'static [&'static str] {
        &[
            "Freight Consortium", "Mining Collective", "Salvage Co.", "Navy Reserve",
            "Charter Lines", "Refining Guild", "Security Contractors", "Survey Corps",
        ]
    }
}
