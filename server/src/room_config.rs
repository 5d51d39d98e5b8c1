use std::default::Default;

use tickstate_shared::EngineConfig;

/// Contains Config properties which will be used by a Room
#[derive(Clone, Debug)]
pub struct RoomConfig {
    /// Maximum number of actions waiting for the next tick. Submitting
    /// beyond it fails instead of blocking the submitter.
    pub inbound_capacity: usize,
    /// Number of frames buffered for one client. A client whose buffer is
    /// full when a frame is published gets disconnected.
    pub outbound_capacity: usize,
    /// Used to configure the Room's engine
    pub engine: EngineConfig,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            inbound_capacity: 264,
            outbound_capacity: 32,
            engine: EngineConfig::default(),
        }
    }
}
