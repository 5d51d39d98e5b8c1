use std::fmt;

use serde::Serialize;

use crate::Kind;

/// Identifier of an entity, unique across every kind of one engine.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Reserved "points at nothing" value; never handed out by the generator
    pub const UNSET: EntityId = EntityId(0);

    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }

    pub fn is_unset(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind and ID of one entity. Every engine operation is addressed by this key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Entity {
    pub kind: Kind,
    pub id: EntityId,
}

impl Entity {
    pub fn new(kind: Kind, id: EntityId) -> Self {
        Self { kind, id }
    }

    /// The deleted stub returned by mutators that refused to act
    pub fn stub(kind: Kind) -> Self {
        Self {
            kind,
            id: EntityId::UNSET,
        }
    }

    pub fn is_stub(&self) -> bool {
        self.id.is_unset()
    }
}

/// Monotonic counter shared by every kind, reference object and union container.
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn generate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
