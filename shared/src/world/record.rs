use serde::Serialize;

use crate::{Entity, EntityId, Kind, Value};

/// Pending or last-applied effect on a stored record.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationKind {
    Update,
    Delete,
    Unchanged,
}

/// Storage of one declared field. Child, reference and container slots hold
/// [`EntityId::UNSET`] when empty.
#[derive(Clone, PartialEq, Debug)]
pub(crate) enum Slot {
    Value(Value),
    Values(Vec<Value>),
    Owned(EntityId),
    OwnedList(Vec<EntityId>),
    /// ID of the reference object backing a shared field
    Ref(EntityId),
    RefList(Vec<EntityId>),
    /// ID of the union container backing a union field
    Union(EntityId),
    UnionList(Vec<EntityId>),
}

impl Slot {
    /// IDs held by a single slot or list slot, in order
    pub fn ids(&self) -> &[EntityId] {
        match self {
            Slot::Owned(id) | Slot::Ref(id) | Slot::Union(id) => {
                if id.is_unset() {
                    &[]
                } else {
                    std::slice::from_ref(id)
                }
            }
            Slot::OwnedList(ids) | Slot::RefList(ids) | Slot::UnionList(ids) => ids,
            Slot::Value(_) | Slot::Values(_) => &[],
        }
    }
}

/// Core record of one entity.
#[derive(Clone, PartialEq, Debug)]
pub(crate) struct Record {
    pub id: EntityId,
    pub kind: Kind,
    pub operation: OperationKind,
    pub has_parent: bool,
    pub slots: Vec<Slot>,
}

impl Record {
    /// What every lookup of a missing entity resolves to
    pub fn stub(kind: Kind) -> Self {
        Self {
            id: EntityId::UNSET,
            kind,
            operation: OperationKind::Delete,
            has_parent: false,
            slots: Vec::new(),
        }
    }

    pub fn entity(&self) -> Entity {
        Entity::new(self.kind, self.id)
    }

    pub fn is_deleted(&self) -> bool {
        self.operation == OperationKind::Delete
    }

    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Slot> {
        self.slots.get_mut(index)
    }
}

/// Edge object behind a shared field: `parent` owns the edge, `target` does not
/// belong to it.
#[derive(Clone, PartialEq, Debug)]
pub(crate) struct ReferenceRecord {
    pub id: EntityId,
    pub operation: OperationKind,
    pub parent: Entity,
    pub field: usize,
    pub target: Entity,
}

/// Container behind a union field. One slot per candidate kind, at most one
/// of them (the `active` one) is meaningful.
#[derive(Clone, PartialEq, Debug)]
pub(crate) struct UnionRecord {
    pub id: EntityId,
    pub operation: OperationKind,
    pub parent: Entity,
    pub field: usize,
    pub active: Option<Kind>,
    pub slots: Vec<(Kind, EntityId)>,
}

impl UnionRecord {
    pub fn occupant(&self) -> Option<Entity> {
        let active = self.active?;
        self.slots
            .iter()
            .find(|(kind, id)| *kind == active && !id.is_unset())
            .map(|(kind, id)| Entity::new(*kind, *id))
    }
}

/// Shared behaviour of everything the store folds on commit.
pub(crate) trait Stored: Clone {
    fn id(&self) -> EntityId;
    fn operation(&self) -> OperationKind;
    fn set_operation(&mut self, operation: OperationKind);
}

macro_rules! impl_stored {
    ($($record:ty),*) => {
        $(
            impl Stored for $record {
                fn id(&self) -> EntityId {
                    self.id
                }

                fn operation(&self) -> OperationKind {
                    self.operation
                }

                fn set_operation(&mut self, operation: OperationKind) {
                    self.operation = operation;
                }
            }
        )*
    };
}

impl_stored!(Record, ReferenceRecord, UnionRecord);
