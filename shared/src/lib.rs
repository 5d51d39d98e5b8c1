//! # Tickstate Shared
//! The per-room entity engine: a schema-driven entity graph with per-tick
//! Patch/State transactions, cascading lifecycle, shared and union references
//! and the incremental tree assembly that turns one tick of changes into a
//! client-syncable diff.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod schema;
mod tree;
mod world;

pub use schema::{
    FieldDef, FieldId, FieldKind, Kind, OwnedField, OwnedListField, RefField, RefListField,
    Schema, SchemaError, TypeDef, UnionField, UnionListField, Value, ValueField, ValueKind,
    ValueListField,
};
pub use tree::{
    Element, FieldValue, Path, PathSegment, PathTracker, Reference, ReferencedDataStatus, Tree,
};
pub use world::{
    Engine, EngineConfig, Entity, EntityHandle, EntityId, IdGenerator, OperationKind,
};
