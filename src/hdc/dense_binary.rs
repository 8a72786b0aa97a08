//! The dense-binary XOR strategy — the baseline instantiation every
//! session registers by default.
//!
//! Atom construction is "ASCII stamping": a seeded PRNG fills the vector,
//! then the name's bytes are tiled across the words and XORed in. The seed
//! is a stable hash (SHA-256, truncated) of `theoryId ":" name`, so the
//! construction is referentially transparent per strategy/name/geometry and
//! portable across platforms — unlike `DefaultHasher`, which is only
//! stable within one build.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crate::error::{SysError, SysResult};
use crate::hdc::strategy::Strategy;
use crate::hdc::vector::{bundle_majority, Vector};

pub const STRATEGY_ID: &str = "dense-binary";

#[derive(Debug, Default)]
pub struct DenseBinaryStrategy;

impl DenseBinaryStrategy {
    pub fn new() -> Self {
        DenseBinaryStrategy
    }

    fn stable_seed(theory_id: &str, name: &str) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(theory_id.as_bytes());
        hasher.update(b":");
        hasher.update(name.as_bytes());
        let digest = hasher.finalize();
        u64::from_le_bytes(digest[0..8].try_into().expect("sha256 digest >= 8 bytes"))
    }
}

impl Strategy for DenseBinaryStrategy {
    fn id(&self) -> &str {
        STRATEGY_ID
    }

    fn create_zero(&self, geometry: u32) -> SysResult<Vector> {
        Vector::zero(STRATEGY_ID, geometry)
    }

    fn create_random(&self, geometry: u32, seed: Option<u64>) -> SysResult<Vector> {
        if geometry == 0 || geometry % 32 != 0 {
            return Err(SysError::BadGeometry { geometry });
        }
        let mut rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        let n_words = (geometry / 32) as usize;
        let words = (0..n_words).map(|_| rng.next_u32()).collect();
        Vector::from_words(STRATEGY_ID, geometry, words)
    }

    fn create_from_name(&self, name: &str, theory_id: &str, geometry: u32) -> SysResult<Vector> {
        if geometry == 0 || geometry % 32 != 0 {
            return Err(SysError::BadGeometry { geometry });
        }
        let seed = Self::stable_seed(theory_id, name);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let n_words = (geometry / 32) as usize;
        let mut words: Vec<u32> = (0..n_words).map(|_| rng.next_u32()).collect();

        let name_bytes = name.as_bytes();
        if !name_bytes.is_empty() {
            for (i, word) in words.iter_mut().enumerate() {
                let stamp = u32::from_le_bytes(std::array::from_fn(|b| {
                    name_bytes[(4 * i + b) % name_bytes.len()]
                }));
                *word ^= stamp;
            }
        }

        Vector::from_words(STRATEGY_ID, geometry, words)
    }

    fn bind(&self, a: &Vector, b: &Vector) -> SysResult<Vector> {
        a.xor_bind(b)
    }

    fn bind_all(&self, vs: &[Vector]) -> SysResult<Vector> {
        let mut iter = vs.iter();
        let first = iter
            .next()
            .ok_or_else(|| SysError::internal("bind_all() requires at least one vector"))?;
        let mut acc = first.clone();
        for v in iter {
            acc = acc.xor_bind(v)?;
        }
        Ok(acc)
    }

    fn bundle(&self, vs: &[Vector], tie_breaker: Option<&Vector>) -> SysResult<Vector> {
        bundle_majority(vs, tie_breaker)
    }

    fn unbind(&self, composite: &Vector, component: &Vector) -> SysResult<Vector> {
        // XOR is self-inverse: unbind == bind.
        composite.xor_bind(component)
    }

    fn similarity(&self, a: &Vector, b: &Vector) -> SysResult<f64> {
        a.similarity(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_from_name_is_deterministic() {
        let s = DenseBinaryStrategy::new();
        let a = s.create_from_name("Socrates", "Theory1", 256).unwrap();
        let b = s.create_from_name("Socrates", "Theory1", 256).unwrap();
        assert!(a.equals(&b));
    }

    #[test]
    fn same_name_different_theory_is_quasi_orthogonal() {
        let s = DenseBinaryStrategy::new();
        let a = s.create_from_name("Socrates", "Theory1", 8192).unwrap();
        let b = s.create_from_name("Socrates", "Theory2", 8192).unwrap();
        let sim = a.similarity(&b).unwrap();
        assert!((sim - 0.5).abs() < 0.05, "similarity {sim} too far from 0.5");
    }

    #[test]
    fn random_vectors_concentrate_near_half_similarity() {
        let s = DenseBinaryStrategy::new();
        let a = s.create_random(16_384, Some(1)).unwrap();
        let b = s.create_random(16_384, Some(2)).unwrap();
        let sim = s.similarity(&a, &b).unwrap();
        assert!((sim - 0.5).abs() < 3.0 / (16_384f64).sqrt() + 0.02);
    }

    #[test]
    fn unbind_recovers_component() {
        let s = DenseBinaryStrategy::new();
        let a = s.create_from_name("Dog", "T", 1024).unwrap();
        let b = s.create_from_name("Mammal", "T", 1024).unwrap();
        let bound = s.bind(&a, &b).unwrap();
        let recovered = s.unbind(&bound, &b).unwrap();
        assert!(recovered.equals(&a));
    }

    #[test]
    fn bundle_of_three_preserves_similarity() {
        let s = DenseBinaryStrategy::new();
        let a = s.create_from_name("a", "T", 8192).unwrap();
        let b = s.create_from_name("b", "T", 8192).unwrap();
        let c = s.create_from_name("c", "T", 8192).unwrap();
        let bundled = s.bundle(&[a.clone(), b, c], None).unwrap();
        assert!(s.similarity(&bundled, &a).unwrap() >= 0.55);
    }
}
