use thiserror::Error;

use crate::ClientKey;

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("Inbound action queue is full")]
    InboundFull,
    #[error("Inbound action queue is closed")]
    InboundClosed,
    #[error("No client with key {0:?} is connected to this room")]
    UnknownClient(ClientKey),
    #[error("Failed to encode tree: {0}")]
    Encode(#[from] serde_json::Error),
}
