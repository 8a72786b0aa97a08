//! Dense-packed binary vectors: the unit of representation for L0.
//!
//! A `Vector` is `geometry` bits, stored as `geometry / 32` packed `u32`
//! words, tagged with the strategy that produced it so mismatched algebra
//! never silently compiles away. No operation mutates
//! a `Vector` in place; every algebra method returns a fresh one.

use serde::{Deserialize, Serialize};

use crate::error::{SysError, SysResult};

/// A fixed-length packed-bit vector plus the identity of the strategy that
/// produced it. Two vectors are "compatible" iff `strategy_id` and
/// `geometry` match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vector {
    pub(crate) strategy_id: String,
    pub(crate) geometry: u32,
    pub(crate) words: Vec<u32>,
}

impl Vector {
    /// Build a vector from strategy id, geometry, and packed words.
    /// `geometry` must be divisible by 32 and `words.len()` must equal
    /// `geometry / 32`.
    pub fn from_words(strategy_id: impl Into<String>, geometry: u32, words: Vec<u32>) -> SysResult<Self> {
        if geometry == 0 || geometry % 32 != 0 {
            return Err(SysError::BadGeometry { geometry });
        }
        let expected = (geometry / 32) as usize;
        if words.len() != expected {
            return Err(SysError::internal(format!(
                "word count {} does not match geometry {} (expected {expected} words)",
                words.len(),
                geometry
            )));
        }
        Ok(Vector {
            strategy_id: strategy_id.into(),
            geometry,
            words,
        })
    }

    pub fn zero(strategy_id: impl Into<String>, geometry: u32) -> SysResult<Self> {
        if geometry == 0 || geometry % 32 != 0 {
            return Err(SysError::BadGeometry { geometry });
        }
        let words = vec![0u32; (geometry / 32) as usize];
        Ok(Vector {
            strategy_id: strategy_id.into(),
            geometry,
            words,
        })
    }

    pub fn strategy_id(&self) -> &str {
        &self.strategy_id
    }

    pub fn geometry(&self) -> u32 {
        self.geometry
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Number of set bits.
    pub fn popcount(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    fn assert_compatible(&self, other: &Vector) -> SysResult<()> {
        if self.strategy_id != other.strategy_id || self.geometry != other.geometry {
            return Err(SysError::incompatible(format!(
                "({}, {}) vs ({}, {})",
                self.strategy_id, self.geometry, other.strategy_id, other.geometry
            )));
        }
        Ok(())
    }

    /// XOR bind. Commutative, associative, self-inverse: `bind(bind(a,b),b) == a`.
    pub fn xor_bind(&self, other: &Vector) -> SysResult<Vector> {
        self.assert_compatible(other)?;
        let words = self
            .words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| a ^ b)
            .collect();
        Vector::from_words(self.strategy_id.clone(), self.geometry, words)
    }

    /// Bitwise AND (used by majority-vote bundling and by `isOrthogonal`).
    pub fn and(&self, other: &Vector) -> SysResult<Vector> {
        self.assert_compatible(other)?;
        let words = self
            .words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| a & b)
            .collect();
        Vector::from_words(self.strategy_id.clone(), self.geometry, words)
    }

    /// Bitwise NOT.
    pub fn not(&self) -> SysResult<Vector> {
        let words = self.words.iter().map(|w| !w).collect();
        Vector::from_words(self.strategy_id.clone(), self.geometry, words)
    }

    /// Hamming similarity in `[0, 1]`: fraction of bits that agree.
    /// `similarity(v, v) == 1.0` exactly; `similarity(a, b) == similarity(b, a)`.
    pub fn similarity(&self, other: &Vector) -> SysResult<f64> {
        self.assert_compatible(other)?;
        let agree: u32 = self
            .words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| (!(a ^ b)).count_ones())
            .sum();
        Ok(f64::from(agree) / f64::from(self.geometry))
    }

    /// Hamming distance (count of differing bits).
    pub fn hamming_distance(&self, other: &Vector) -> SysResult<u32> {
        self.assert_compatible(other)?;
        Ok(self
            .words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum())
    }

    /// `true` when similarity is within `tolerance` of 0.5 (quasi-orthogonal).
    pub fn is_orthogonal(&self, other: &Vector, tolerance: f64) -> SysResult<bool> {
        let sim = self.similarity(other)?;
        Ok((sim - 0.5).abs() <= tolerance)
    }

    /// Extend this vector from its current geometry to `new_geometry`
    /// (must be a multiple of the original). The stamping pattern repeats
    /// so that algebra performed on the clone at the new geometry and then
    /// truncated back agrees with the original (the extension invariant).
    pub fn extend_to(&self, new_geometry: u32) -> SysResult<Vector> {
        if new_geometry % 32 != 0 || new_geometry < self.geometry || new_geometry % self.geometry != 0 {
            return Err(SysError::BadGeometry {
                geometry: new_geometry,
            });
        }
        let repeats = (new_geometry / self.geometry) as usize;
        let mut words = Vec::with_capacity(self.words.len() * repeats);
        for _ in 0..repeats {
            words.extend_from_slice(&self.words);
        }
        Vector::from_words(self.strategy_id.clone(), new_geometry, words)
    }

    pub fn equals(&self, other: &Vector) -> bool {
        self.strategy_id == other.strategy_id && self.geometry == other.geometry && self.words == other.words
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

/// Majority-vote bundle of `vs`, with `tie_breaker` deciding 50/50 bit ties
/// (defaults to `0` when `None`, matching the dense-binary baseline).
/// Preserves similarity to each input.
pub fn bundle_majority(vs: &[Vector], tie_breaker: Option<&Vector>) -> SysResult<Vector> {
    let first = vs
        .first()
        .ok_or_else(|| SysError::internal("bundle() requires at least one vector"))?;
    for v in &vs[1..] {
        first.assert_compatible(v)?;
    }
    let n_words = first.words.len();
    let threshold = vs.len() as u32;
    let mut words = vec![0u32; n_words];
    for bit in 0..(first.geometry as usize) {
        let word_idx = bit / 32;
        let bit_idx = bit % 32;
        let mut ones = 0u32;
        for v in vs {
            if (v.words[word_idx] >> bit_idx) & 1 == 1 {
                ones += 1;
            }
        }
        let set = match (2 * ones).cmp(&threshold) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => match tie_breaker {
                Some(tb) => (tb.words[word_idx] >> bit_idx) & 1 == 1,
                None => false,
            },
        };
        if set {
            words[word_idx] |= 1 << bit_idx;
        }
    }
    Vector::from_words(first.strategy_id.clone(), first.geometry, words)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(strategy: &str, geometry: u32, pattern: u32) -> Vector {
        Vector::from_words(strategy, geometry, vec![pattern; (geometry / 32) as usize]).unwrap()
    }

    #[test]
    fn similarity_self_is_one() {
        let a = v("s", 64, 0xDEADBEEF);
        assert_eq!(a.similarity(&a).unwrap(), 1.0);
    }

    #[test]
    fn similarity_is_symmetric() {
        let a = v("s", 64, 0xDEADBEEF);
        let b = v("s", 64, 0x1234_5678);
        assert_eq!(a.similarity(&b).unwrap(), b.similarity(&a).unwrap());
    }

    #[test]
    fn bind_is_self_inverse() {
        let a = v("s", 64, 0xAAAAAAAA);
        let b = v("s", 64, 0x5555_5555);
        let bound = a.xor_bind(&b).unwrap();
        let recovered = bound.xor_bind(&b).unwrap();
        assert!(recovered.equals(&a));
    }

    #[test]
    fn bind_is_commutative() {
        let a = v("s", 64, 0xAAAAAAAA);
        let b = v("s", 64, 0x5555_5555);
        assert!(a.xor_bind(&b).unwrap().equals(&b.xor_bind(&a).unwrap()));
    }

    #[test]
    fn mismatched_geometry_fails_loudly() {
        let a = v("s", 64, 1);
        let b = v("s", 32, 1);
        assert!(matches!(
            a.xor_bind(&b),
            Err(SysError::IncompatibleVectors { .. })
        ));
    }

    #[test]
    fn mismatched_strategy_fails_loudly() {
        let a = v("s1", 32, 1);
        let b = v("s2", 32, 1);
        assert!(matches!(
            a.similarity(&b),
            Err(SysError::IncompatibleVectors { .. })
        ));
    }

    #[test]
    fn bad_geometry_rejected_at_construction() {
        assert!(matches!(
            Vector::zero("s", 31),
            Err(SysError::BadGeometry { geometry: 31 })
        ));
    }

    #[test]
    fn bundle_preserves_similarity_to_inputs() {
        // Three vectors that mostly agree should bundle to something closer
        // to each of them than to a random fourth vector.
        let a = v("s", 320, 0b1111_0000_1111_0000_1111_0000_1111_0000u32.wrapping_mul(1));
        let b = v("s", 320, a.words[0] ^ 0b0000_0001);
        let c = v("s", 320, a.words[0] ^ 0b0000_0010);
        let bundled = bundle_majority(&[a.clone(), b, c], None).unwrap();
        assert!(bundled.similarity(&a).unwrap() >= 0.6);
    }

    #[test]
    fn extend_then_truncate_matches_original_bits() {
        let a = v("s", 64, 0xCAFEBABE);
        let extended = a.extend_to(128).unwrap();
        assert_eq!(&extended.words[0..2], &a.words[..]);
        assert_eq!(&extended.words[2..4], &a.words[..]);
    }
}
