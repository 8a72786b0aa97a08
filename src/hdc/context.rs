//! `HdcContext` — the per-session handle binding a strategy instance and a
//! default geometry.
//!
//! At construction, if the chosen strategy's `create_instance` hook returns
//! `Some`, the context uses that per-session instance for its entire
//! lifetime; otherwise it shares the registry's stateless instance. Every
//! algebra method below forwards to the bound instance with `geometry`
//! defaulted when the caller omits it.

use std::sync::Arc;

use crate::error::SysResult;
use crate::hdc::strategy::{InstanceParams, Strategy, StrategyRegistry};
use crate::hdc::vector::Vector;

pub struct HdcContext {
    strategy_id: String,
    geometry: u32,
    instance: Arc<dyn Strategy>,
}

impl HdcContext {
    /// Resolve `strategy_id` against `registry` and bind an instance for
    /// the session's lifetime.
    pub fn new(registry: &StrategyRegistry, strategy_id: &str, geometry: u32) -> SysResult<Self> {
        let shared = registry.get(strategy_id).ok_or_else(|| {
            crate::error::SysError::internal(format!("unregistered strategy: {strategy_id}"))
        })?;
        let params = InstanceParams {
            strategy_id: strategy_id.to_string(),
            geometry,
        };
        let instance = shared.create_instance(&params).unwrap_or(shared);
        Ok(HdcContext {
            strategy_id: strategy_id.to_string(),
            geometry,
            instance,
        })
    }

    pub fn strategy_id(&self) -> &str {
        &self.strategy_id
    }

    pub fn geometry(&self) -> u32 {
        self.geometry
    }

    pub fn create_zero(&self, geometry: Option<u32>) -> SysResult<Vector> {
        self.instance.create_zero(geometry.unwrap_or(self.geometry))
    }

    pub fn create_random(&self, geometry: Option<u32>, seed: Option<u64>) -> SysResult<Vector> {
        self.instance
            .create_random(geometry.unwrap_or(self.geometry), seed)
    }

    pub fn create_from_name(&self, name: &str, theory_id: &str, geometry: Option<u32>) -> SysResult<Vector> {
        self.instance
            .create_from_name(name, theory_id, geometry.unwrap_or(self.geometry))
    }

    pub fn bind(&self, a: &Vector, b: &Vector) -> SysResult<Vector> {
        self.instance.bind(a, b)
    }

    pub fn bind_all(&self, vs: &[Vector]) -> SysResult<Vector> {
        self.instance.bind_all(vs)
    }

    pub fn bundle(&self, vs: &[Vector], tie_breaker: Option<&Vector>) -> SysResult<Vector> {
        self.instance.bundle(vs, tie_breaker)
    }

    pub fn unbind(&self, composite: &Vector, component: &Vector) -> SysResult<Vector> {
        self.instance.unbind(composite, component)
    }

    pub fn similarity(&self, a: &Vector, b: &Vector) -> SysResult<f64> {
        self.instance.similarity(a, b)
    }

    pub fn distance(&self, a: &Vector, b: &Vector) -> SysResult<f64> {
        self.instance.distance(a, b)
    }

    pub fn is_orthogonal(&self, a: &Vector, b: &Vector, tolerance: f64) -> SysResult<bool> {
        self.instance.is_orthogonal(a, b, tolerance)
    }

    pub fn top_k_similar(
        &self,
        query: &Vector,
        candidates: &mut dyn Iterator<Item = (String, Vector)>,
        k: usize,
    ) -> SysResult<Vec<(String, f64)>> {
        self.instance.top_k_similar(query, candidates, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hdc::dense_binary::DenseBinaryStrategy;
    use std::sync::Arc;

    fn registry() -> StrategyRegistry {
        let r = StrategyRegistry::new();
        r.register(Arc::new(DenseBinaryStrategy::new()));
        r
    }

    #[test]
    fn default_geometry_applied_when_omitted() {
        let reg = registry();
        let ctx = HdcContext::new(&reg, "dense-binary", 1024).unwrap();
        let v = ctx.create_zero(None).unwrap();
        assert_eq!(v.geometry(), 1024);
    }

    #[test]
    fn explicit_geometry_overrides_default() {
        let reg = registry();
        let ctx = HdcContext::new(&reg, "dense-binary", 1024).unwrap();
        let v = ctx.create_zero(Some(256)).unwrap();
        assert_eq!(v.geometry(), 256);
    }

    #[test]
    fn unregistered_strategy_errors() {
        let reg = registry();
        assert!(HdcContext::new(&reg, "nope", 1024).is_err());
    }
}
