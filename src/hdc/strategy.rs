//! The `Strategy` contract and its registry.
//!
//! A strategy supplies the factories and algebra for one vector
//! representation. Strategies with per-session mutable state (e.g. an atom
//! dictionary) implement `create_instance`; the `HdcContext` is required to
//! call it and use the returned instance for the session's entire lifetime,
//! moving from global strategy state to per-session instances.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::SysResult;
use crate::hdc::vector::Vector;

/// Parameters passed to `Strategy::create_instance`.
pub struct InstanceParams {
    pub strategy_id: String,
    pub geometry: u32,
}

/// The uniform contract every HDC strategy exposes.
pub trait Strategy: Send + Sync {
    fn id(&self) -> &str;

    fn create_zero(&self, geometry: u32) -> SysResult<Vector>;
    fn create_random(&self, geometry: u32, seed: Option<u64>) -> SysResult<Vector>;
    fn create_from_name(&self, name: &str, theory_id: &str, geometry: u32) -> SysResult<Vector>;

    fn bind(&self, a: &Vector, b: &Vector) -> SysResult<Vector>;
    fn bind_all(&self, vs: &[Vector]) -> SysResult<Vector>;
    fn bundle(&self, vs: &[Vector], tie_breaker: Option<&Vector>) -> SysResult<Vector>;
    fn unbind(&self, composite: &Vector, component: &Vector) -> SysResult<Vector>;
    fn similarity(&self, a: &Vector, b: &Vector) -> SysResult<f64>;
    fn distance(&self, a: &Vector, b: &Vector) -> SysResult<f64> {
        Ok(1.0 - self.similarity(a, b)?)
    }
    fn is_orthogonal(&self, a: &Vector, b: &Vector, tolerance: f64) -> SysResult<bool> {
        Ok((self.similarity(a, b)? - 0.5).abs() <= tolerance)
    }

    /// Rank vocabulary candidates by similarity to `query`, returning the
    /// top `k` (highest first), ties broken by insertion order.
    fn top_k_similar(
        &self,
        query: &Vector,
        candidates: &mut dyn Iterator<Item = (String, Vector)>,
        k: usize,
    ) -> SysResult<Vec<(String, f64)>> {
        let mut scored = Vec::new();
        for (name, v) in candidates {
            scored.push((name, self.similarity(query, &v)?));
        }
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    /// Hook for strategies with per-session mutable state. The default
    /// (stateless) implementation returns `None`, signalling the registry's
    /// shared instance should be used directly.
    fn create_instance(&self, _params: &InstanceParams) -> Option<Arc<dyn Strategy>> {
        None
    }
}

/// Process-wide registry of strategy factories. The only piece of global
/// state the core keeps — the registry holds factories, not session vectors.
pub struct StrategyRegistry {
    factories: RwLock<HashMap<String, Arc<dyn Strategy>>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        StrategyRegistry {
            factories: RwLock::new(HashMap::new()),
        }
    }

    pub fn register(&self, strategy: Arc<dyn Strategy>) {
        self.factories
            .write()
            .expect("strategy registry lock poisoned")
            .insert(strategy.id().to_string(), strategy);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Strategy>> {
        self.factories
            .read()
            .expect("strategy registry lock poisoned")
            .get(id)
            .cloned()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
