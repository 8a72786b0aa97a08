//! Versioned (de)serialization for vectors and whole knowledge bases:
//! `{strategyId, version, geometry, count, facts: [...]}`.
//!
//! The core only produces and consumes this shape; on-disk layout, WAL, and
//! snapshot formats belong to an external collaborator. `bincode` backs the
//! dense word payload because vectors are fixed-width and binary.

use serde::{Deserialize, Serialize};

use crate::error::{SysError, SysResult};
use crate::hdc::vector::Vector;

pub const FORMAT_VERSION: u32 = 1;

/// Wire shape for a single serialized vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedVector {
    pub strategy_id: String,
    pub version: u32,
    pub geometry: u32,
    pub words: Vec<u32>,
}

pub fn serialize_vector(v: &Vector) -> SerializedVector {
    SerializedVector {
        strategy_id: v.strategy_id().to_string(),
        version: FORMAT_VERSION,
        geometry: v.geometry(),
        words: v.words().to_vec(),
    }
}

pub fn deserialize_vector(wire: &SerializedVector) -> SysResult<Vector> {
    if wire.version != FORMAT_VERSION {
        return Err(SysError::internal(format!(
            "unsupported vector format version {}",
            wire.version
        )));
    }
    Vector::from_words(wire.strategy_id.clone(), wire.geometry, wire.words.clone())
}

/// Opaque on-the-wire bytes for a single vector, via `bincode`.
pub fn to_bytes(v: &Vector) -> SysResult<Vec<u8>> {
    bincode::serialize(&serialize_vector(v))
        .map_err(|e| SysError::internal(format!("vector serialize failed: {e}")))
}

pub fn from_bytes(bytes: &[u8]) -> SysResult<Vector> {
    let wire: SerializedVector =
        bincode::deserialize(bytes).map_err(|e| SysError::internal(format!("vector deserialize failed: {e}")))?;
    deserialize_vector(&wire)
}

/// Wire shape for one exported fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedFact {
    pub id: u64,
    pub name: Option<String>,
    pub operator: String,
    pub args: Vec<String>,
    pub negated: bool,
    pub vector: SerializedVector,
}

/// Wire shape for a whole Component KB export:
/// `{strategyId, version, geometry, count, facts: [...]}`. Rules are not
/// part of this shape — only `facts` is part of the documented
/// persistence format, and the core's persistence surface is opaque and
/// external.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedKb {
    pub strategy_id: String,
    pub version: u32,
    pub geometry: u32,
    pub count: usize,
    pub facts: Vec<SerializedFact>,
}

/// `strategy.serializeKB(facts)`: export every live fact
/// in a `ComponentKb` to the versioned wire shape.
pub fn serialize_kb(strategy_id: &str, geometry: u32, kb: &crate::kb::ComponentKb) -> SerializedKb {
    let facts: Vec<SerializedFact> = kb
        .facts()
        .map(|f| SerializedFact {
            id: f.id,
            name: f.name.clone(),
            operator: f.operator.clone(),
            args: f.args.clone(),
            negated: f.negated,
            vector: serialize_vector(&f.vector),
        })
        .collect();
    SerializedKb {
        strategy_id: strategy_id.to_string(),
        version: FORMAT_VERSION,
        geometry,
        count: facts.len(),
        facts,
    }
}

/// `strategy.deserializeKB(obj)`: rebuild a `ComponentKb`
/// from a prior `serialize_kb` export, preserving fact ids so any proof
/// trail recorded before the round trip still resolves.
pub fn deserialize_kb(wire: &SerializedKb) -> SysResult<crate::kb::ComponentKb> {
    if wire.version != FORMAT_VERSION {
        return Err(SysError::internal(format!("unsupported KB format version {}", wire.version)));
    }
    let mut kb = crate::kb::ComponentKb::new();
    let mut facts = wire.facts.clone();
    facts.sort_by_key(|f| f.id);
    for f in facts {
        let vector = deserialize_vector(&f.vector)?;
        kb.restore_fact(f.id, f.name, f.operator, f.args, vector, f.negated);
    }
    Ok(kb)
}
