//! # HDC Vector & Strategy (L0) and HDC Context (L1)
//!
//! Bit-packed vectors, a pluggable algebra contract, the dense-binary XOR
//! baseline, and the per-session context that binds a strategy instance to
//! a default geometry.

pub mod context;
pub mod dense_binary;
pub mod serialize;
pub mod strategy;
pub mod vector;

pub use context::HdcContext;
pub use dense_binary::DenseBinaryStrategy;
pub use serialize::{deserialize_kb, serialize_kb, SerializedFact, SerializedKb, SerializedVector};
pub use strategy::{InstanceParams, Strategy, StrategyRegistry};
pub use vector::{bundle_majority, Vector};
