//! Seed derivation and bit extraction.
//!
//! RULE: Generators never touch a platform RNG or the clock.
//! Every generated value is read out of a Seed: the SHA-256 digest of the
//! generator's ordered key fields joined with `SEED_DELIMITER`.
//!
//! Each generator owns a static table of `ByteRange`s. Ranges inside one
//! table never overlap, and every table leaves spare bytes at the end so a
//! new field can be appended without shifting existing ones.
//! NEVER move an existing range. Moving one changes every generated entity.

use sha2::{Digest, Sha256};
use std::fmt;

pub const SEED_DELIMITER: &str = "|";
pub const SEED_BYTES: usize = 32;

/// A fixed slice of the digest reserved for one generated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub offset: usize,
    pub len:    usize,
}

impl ByteRange {
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    /// The n-th `width`-byte range inside this one. Used for per-commodity
    /// and per-pick blocks.
    pub const fn slot(&self, n: usize, width: usize) -> ByteRange {
        ByteRange::new(self.offset + n * width, width)
    }
}

/// A 256-bit digest derived from a generator's key fields.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seed([u8; SEED_BYTES]);

impl Seed {
    /// Hash the ordered key fields. Field order is part of the contract.
    pub fn derive(fields: &[&dyn fmt::Display]) -> Self {
        let mut hasher = Sha256::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                hasher.update(SEED_DELIMITER.as_bytes());
            }
            hasher.update(field.to_string().as_bytes());
        }
        Self(hasher.finalize().into())
    }

    /// Child seed for a repeated sub-entity (planet i, history entry i).
    pub fn child(&self, label: &str, index: usize) -> Self {
        Self::derive(&[&self.hex(), &label, &index])
    }

    pub fn bytes(&self) -> &[u8; SEED_BYTES] {
        &self.0
    }

    /// 64 lowercase hex characters.
    pub fn hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Read `range.len` bytes big-endian and reduce modulo `modulus`.
    /// Panics on a malformed range or zero modulus; both are programming
    /// errors caught by the layout tests.
    pub fn extract(&self, range: ByteRange, modulus: u64) -> u64 {
        assert!(modulus > 0, "modulus must be > 0");
        assert!(
            range.len >= 1 && range.len <= 8 && range.end() <= SEED_BYTES,
            "byte range {range:?} outside digest"
        );
        let raw = self.0[range.offset..range.end()]
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | *b as u64);
        raw % modulus
    }

    /// Extract a signed unit value in [-1.0, 1.0] with 1/10_000 resolution.
    pub fn extract_unit(&self, range: ByteRange) -> f64 {
        (self.extract(range, 20_001) as f64 - 10_000.0) / 10_000.0
    }

    /// Pick an index into a cumulative threshold table (last entry == total).
    pub fn extract_weighted(&self, range: ByteRange, cumulative: &[u64]) -> usize {
        let total = cumulative.last().copied().unwrap_or(1).max(1);
        let roll = self.extract(range, total);
        cumulative.iter().position(|&t| roll < t).unwrap_or(cumulative.len() - 1)
    }

    /// 128 bits of stream seed material from the tail of the digest.
    pub(crate) fn stream_material(&self) -> u128 {
        self.0[16..32]
            .iter()
            .fold(0u128, |acc, b| (acc << 8) | *b as u128)
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({})", self.hex())
    }
}

/// Assert that a layout table is well-formed: in bounds, no overlap.
#[cfg(test)]
pub(crate) fn assert_layout(name: &str, ranges: &[ByteRange]) {
    let mut used = [false; SEED_BYTES];
    for r in ranges {
        assert!(r.len >= 1 && r.len <= 8, "{name}: bad length in {r:?}");
        assert!(r.end() <= SEED_BYTES, "{name}: {r:?} past end of digest");
        for b in r.offset..r.end() {
            assert!(!used[b], "{name}: byte {b} claimed twice");
            used[b] = true;
        }
    }
    assert!(used.iter().any(|u| !u), "{name}: no spare bytes left");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_stable_and_hex_is_64_chars() {
        let a = Seed::derive(&[&1u32, &2u32, &3u32]);
        let b = Seed::derive(&[&1u32, &2u32, &3u32]);
        assert_eq!(a, b);
        assert_eq!(a.hex().len(), 64);
        assert!(a.hex().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn delimiter_separates_fields() {
        // "1|23" and "12|3" must not collide.
        let a = Seed::derive(&[&1u32, &23u32]);
        let b = Seed::derive(&[&12u32, &3u32]);
        assert_ne!(a, b);
    }

    #[test]
    fn known_digest_of_empty_key() {
        // SHA-256 of the empty string.
        let s = Seed::derive(&[]);
        assert_eq!(
            s.hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn extract_reads_big_endian() {
        let s = Seed::derive(&[]);
        // First two bytes of the empty digest are 0xe3 0xb0.
        assert_eq!(s.extract(ByteRange::new(0, 1), 256), 0xe3);
        assert_eq!(s.extract(ByteRange::new(0, 2), u64::MAX), 0xe3b0);
        assert_eq!(s.extract(ByteRange::new(0, 2), 100), 0xe3b0 % 100);
    }

    #[test]
    fn extract_unit_stays_in_band() {
        for i in 0..500u32 {
            let s = Seed::derive(&[&"unit", &i]);
            let u = s.extract_unit(ByteRange::new(0, 2));
            assert!((-1.0..=1.0).contains(&u));
        }
    }

    #[test]
    fn weighted_pick_respects_thresholds() {
        let cumulative = [70, 90, 98, 100];
        let mut counts = [0usize; 4];
        for i in 0..20_000u32 {
            let s = Seed::derive(&[&"weighted", &i]);
            counts[s.extract_weighted(ByteRange::new(0, 4), &cumulative)] += 1;
        }
        let share = |n: usize| n as f64 / 20_000.0;
        assert!((share(counts[0]) - 0.70).abs() < 0.02);
        assert!((share(counts[1]) - 0.20).abs() < 0.02);
        assert!((share(counts[2]) - 0.08).abs() < 0.015);
        assert!((share(counts[3]) - 0.02).abs() < 0.01);
    }

    #[test]
    fn child_seeds_differ_by_index() {
        let parent = Seed::derive(&[&"parent"]);
        assert_ne!(parent.child("planet", 0), parent.child("planet", 1));
        assert_eq!(parent.child("planet", 4), parent.child("planet", 4));
    }
}
