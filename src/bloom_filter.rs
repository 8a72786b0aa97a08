//! Bloom filter implementation for efficient set membership testing.
//!
//! Fronts the Component KB's negation index so a hot condition-matching
//! loop can reject a non-negated `(operator, args)` lookup without hashing
//! the full argument vector twice.
//!
//! # Properties
//!
//! - No false negatives: if `might_contain` returns `false`, the element is
//!   definitely not in the set.
//! - Possible false positives: if `might_contain` returns `true`, the
//!   element might or might not be in the set — callers still consult the
//!   authoritative `HashSet` before trusting a positive.
//! - Space efficient: ~10 bits per element for a 1% false-positive rate.
//!
//! # Example
//!
//! ```
//! use sys2_core::bloom_filter::BloomFilter;
//!
//! let mut filter = BloomFilter::new(10_000, 0.01);
//! filter.insert(&"isA:Socrates");
//! assert!(filter.might_contain(&"isA:Socrates"));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// A Bloom filter for efficient probabilistic set membership testing.
///
/// Uses double hashing to derive `k` hash values from two base hashes:
/// `h_i(x) = h1(x) + i * h2(x) mod m`. The bit array is stored as a vector
/// of `u64` words, `ceil(m / 64)` of them.
#[derive(Clone, Debug)]
pub struct BloomFilter {
    bits: Vec<u64>,
    num_bits: usize,
    num_hashes: u32,
    len: usize,
}

impl BloomFilter {
    /// Size a filter for `expected_items` elements at `false_positive_rate`
    /// (0 < rate < 1). Uses the standard optimal-`m`/optimal-`k` formulas.
    pub fn new(expected_items: usize, false_positive_rate: f64) -> Self {
        let expected_items = expected_items.max(1);
        let m = optimal_num_bits(expected_items, false_positive_rate);
        let k = optimal_num_hashes(m, expected_items);
        let words = m.div_ceil(64);
        BloomFilter {
            bits: vec![0u64; words],
            num_bits: words * 64,
            num_hashes: k,
            len: 0,
        }
    }

    pub fn insert<T: Hash>(&mut self, item: &T) {
        let (h1, h2) = self.base_hashes(item);
        for i in 0..self.num_hashes as u64 {
            let bit = self.index_for(h1, h2, i);
            self.set_bit(bit);
        }
        self.len += 1;
    }

    pub fn might_contain<T: Hash>(&self, item: &T) -> bool {
        let (h1, h2) = self.base_hashes(item);
        (0..self.num_hashes as u64).all(|i| self.bit_is_set(self.index_for(h1, h2, i)))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.bits.iter_mut().for_each(|w| *w = 0);
        self.len = 0;
    }

    fn base_hashes<T: Hash>(&self, item: &T) -> (u64, u64) {
        let mut h1_hasher = DefaultHasher::new();
        item.hash(&mut h1_hasher);
        let h1 = h1_hasher.finish();

        let mut h2_hasher = DefaultHasher::new();
        h1.hash(&mut h2_hasher);
        item.hash(&mut h2_hasher);
        let h2 = h2_hasher.finish();

        (h1, h2)
    }

    fn index_for(&self, h1: u64, h2: u64, i: u64) -> usize {
        (h1.wrapping_add(i.wrapping_mul(h2)) % self.num_bits as u64) as usize
    }

    fn set_bit(&mut self, bit: usize) {
        self.bits[bit / 64] |= 1u64 << (bit % 64);
    }

    fn bit_is_set(&self, bit: usize) -> bool {
        self.bits[bit / 64] & (1u64 << (bit % 64)) != 0
    }
}

fn optimal_num_bits(n: usize, p: f64) -> usize {
    let n = n as f64;
    let m = -(n * p.ln()) / (std::f64::consts::LN_2 * std::f64::consts::LN_2);
    (m.ceil() as usize).max(64)
}

fn optimal_num_hashes(m: usize, n: usize) -> u32 {
    let k = (m as f64 / n as f64) * std::f64::consts::LN_2;
    (k.round() as u32).clamp(1, 16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserted_items_are_always_found() {
        let mut filter = BloomFilter::new(1000, 0.01);
        for i in 0..1000 {
            filter.insert(&format!("item-{i}"));
        }
        for i in 0..1000 {
            assert!(filter.might_contain(&format!("item-{i}")));
        }
    }

    #[test]
    fn false_positive_rate_is_roughly_bounded() {
        let mut filter = BloomFilter::new(1000, 0.01);
        for i in 0..1000 {
            filter.insert(&format!("item-{i}"));
        }
        let false_positives = (1000..11_000)
            .filter(|i| filter.might_contain(&format!("item-{i}")))
            .count();
        assert!(
            (false_positives as f64 / 10_000.0) < 0.05,
            "false positive rate too high: {false_positives}/10000"
        );
    }

    #[test]
    fn clear_resets_membership() {
        let mut filter = BloomFilter::new(100, 0.01);
        filter.insert(&"x");
        assert!(filter.might_contain(&"x"));
        filter.clear();
        assert_eq!(filter.len(), 0);
    }
}
