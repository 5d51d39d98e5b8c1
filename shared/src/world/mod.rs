mod config;
mod engine;
mod handle;
mod id_generator;
mod lifecycle;
mod reference;

pub(crate) mod record;
pub(crate) mod store;

pub use config::EngineConfig;
pub use engine::Engine;
pub use handle::EntityHandle;
pub use id_generator::{Entity, EntityId, IdGenerator};
pub use record::OperationKind;

#[cfg(test)]
pub(crate) mod tests;
