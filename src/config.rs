//! Session configuration.
//!
//! `SessionOptions` is the programmatic construction surface: library
//! defaults always suffice, so `Session::new` never reads the
//! environment on its own. `Config` is the optional file/env-driven loader,
//! following the same hierarchical pattern used elsewhere in this stack:
//! `config.toml` → `config.local.toml` → environment variables,
//! prefixed `SYS2_` and split on `__` for nested keys (`SYS2_HDC_STRATEGY`
//! and `SYS2_GEOMETRY` among them).

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

/// Default geometry (bits).
pub const DEFAULT_GEOMETRY: u32 = 32_768;
/// Default reasoning timeout.
pub const DEFAULT_TIMEOUT_MS: u32 = 2_000;
/// Default recursion / proof depth bound.
pub const DEFAULT_MAX_DEPTH: u32 = 16;
/// Default transitive-closure BFS depth bound.
pub const DEFAULT_TRANSITIVE_DEPTH: u32 = 10;
/// Number of reserved position atoms preloaded at startup.
pub const CORE_POSITION_COUNT: usize = 20;

/// Which vector algebra a session binds to. `DenseBinary` is the baseline
/// XOR strategy every session registers by default; additional variants are free to
/// register themselves with the `StrategyRegistry` (see `hdc::strategy`)
/// without this enum growing, by using `StrategyKind::Named`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    DenseBinary,
    /// Any registered strategy looked up by id at runtime.
    Named(String),
}

impl StrategyKind {
    pub fn id(&self) -> &str {
        match self {
            StrategyKind::DenseBinary => "dense-binary",
            StrategyKind::Named(s) => s.as_str(),
        }
    }
}

impl Default for StrategyKind {
    fn default() -> Self {
        StrategyKind::DenseBinary
    }
}

/// Which family of candidates the query engine consults first when both a
/// symbolic and a holographic path could answer a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningPriority {
    Symbolic,
    Holographic,
}

impl Default for ReasoningPriority {
    fn default() -> Self {
        ReasoningPriority::Symbolic
    }
}

/// Selects which declared-operator "pack" the Vocabulary preloads at
/// startup. The packs themselves are an external
/// collaborator; the core only needs to know which profile name to ask for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReasoningProfile {
    /// Preload a theory-specific operator pack (the common case).
    TheoryDriven,
    /// Preload nothing beyond the reserved core operators.
    Bare,
}

impl Default for ReasoningProfile {
    fn default() -> Self {
        ReasoningProfile::TheoryDriven
    }
}

/// Construction options for a `Session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    pub strategy: StrategyKind,
    pub geometry: u32,
    pub auto_load_core: bool,
    pub closed_world_assumption: bool,
    pub reject_contradictions: bool,
    pub reasoning_priority: ReasoningPriority,
    pub reasoning_timeout_ms: u32,
    pub max_proof_depth: u32,
    pub reasoning_profile: ReasoningProfile,
    /// When true, `learn` promotes an operator outside the catalog to a
    /// declared relation of arity matching its first occurrence instead of
    /// rejecting the statement.
    pub auto_declare_unknown_operators: bool,
    /// BFS depth bound for the transitive reasoner.
    pub transitive_depth: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            strategy: StrategyKind::default(),
            geometry: DEFAULT_GEOMETRY,
            auto_load_core: true,
            closed_world_assumption: true,
            reject_contradictions: false,
            reasoning_priority: ReasoningPriority::default(),
            reasoning_timeout_ms: DEFAULT_TIMEOUT_MS,
            max_proof_depth: DEFAULT_MAX_DEPTH,
            reasoning_profile: ReasoningProfile::default(),
            auto_declare_unknown_operators: false,
            transitive_depth: DEFAULT_TRANSITIVE_DEPTH,
        }
    }
}

impl SessionOptions {
    /// Load options by merging library defaults with the `SYS2_*`
    /// environment variables. Never touches disk.
    pub fn from_env() -> Result<Self, figment::Error> {
        Figment::from(figment::providers::Serialized::defaults(
            SessionOptions::default(),
        ))
        .merge(Env::prefixed("SYS2_").split("__"))
        .extract()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Whole-process configuration: session defaults plus logging. Optional —
/// a caller that just wants `SessionOptions::default()` never needs this.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionOptions,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Merge `config.toml` → `config.local.toml` → `SYS2_*` env vars.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("config.toml"))
            .merge(Toml::file("config.local.toml"))
            .merge(Env::prefixed("SYS2_").split("__"))
            .extract()
    }

    pub fn from_file(path: &str) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("SYS2_").split("__"))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_options_match_spec() {
        let opts = SessionOptions::default();
        assert_eq!(opts.geometry, 32_768);
        assert!(opts.closed_world_assumption);
        assert!(!opts.reject_contradictions);
        assert_eq!(opts.reasoning_timeout_ms, 2_000);
        assert_eq!(opts.max_proof_depth, 16);
        assert_eq!(opts.strategy, StrategyKind::DenseBinary);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("[session]"));
        let reloaded: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reloaded.session.geometry, config.session.geometry);
    }
}
