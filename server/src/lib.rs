//! # Tickstate Server
//! Drives one [`Engine`](tickstate_shared::Engine) per room: drains queued
//! actions, publishes each tick's diff to connected clients, commits, and
//! answers newly connected clients with a full snapshot.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use tickstate_shared::{
        Engine, EngineConfig, Entity, EntityId, Kind, OperationKind, Schema, Tree,
    };
}

mod client;
mod error;
mod room;
mod room_config;

pub use client::ClientKey;
pub use error::RoomError;
pub use room::{Actions, Room, TickReport};
pub use room_config::RoomConfig;
