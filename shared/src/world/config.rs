//! # `EngineConfig` – tuning knobs for one engine instance
//!
//! Cloned into every `Engine` on construction; the engine never mutates it.

#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// *Number of walks after which the path cache is dropped wholesale.*
    /// Paths of entities that are no longer reachable stay cached until the
    /// next reset, so a `Delete` descriptor can still locate an entity that
    /// was removed this tick. Must be at least 1.
    pub path_cache_reset_interval: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path_cache_reset_interval: 100,
        }
    }
}
