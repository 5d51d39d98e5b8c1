use crate::{
    Entity, EntityId, Kind, OwnedField, OwnedListField, RefField, RefListField, UnionField,
    UnionListField, Value, ValueField, ValueListField,
};

use super::{
    record::{OperationKind, Record, Slot},
    store::EntityStore,
};

/// Read-only view of one entity. Resolves every field through Patch first,
/// then State; a missing entity reads as deleted with empty fields.
pub struct EntityHandle<'e> {
    store: &'e EntityStore,
    entity: Entity,
    record: Option<&'e Record>,
}

impl<'e> EntityHandle<'e> {
    pub(crate) fn new(store: &'e EntityStore, entity: Entity) -> Self {
        Self {
            store,
            entity,
            record: store.record(&entity),
        }
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn id(&self) -> EntityId {
        self.entity.id
    }

    pub fn kind(&self) -> Kind {
        self.entity.kind
    }

    pub fn operation(&self) -> OperationKind {
        self.record
            .map(|record| record.operation)
            .unwrap_or(OperationKind::Delete)
    }

    pub fn exists(&self) -> bool {
        self.operation() != OperationKind::Delete
    }

    pub fn has_parent(&self) -> bool {
        self.record.is_some_and(|record| record.has_parent)
    }

    fn slot(&self, owner: Kind, index: usize) -> Option<&'e Slot> {
        if owner != self.entity.kind {
            return None;
        }
        self.record?.slot(index)
    }

    pub fn value(&self, field: ValueField) -> Option<&'e Value> {
        match self.slot(field.owner(), field.id.index)? {
            Slot::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn values(&self, field: ValueListField) -> &'e [Value] {
        match self.slot(field.owner(), field.id.index) {
            Some(Slot::Values(values)) => values,
            _ => &[],
        }
    }

    pub fn child(&self, field: OwnedField) -> Option<Entity> {
        match self.slot(field.owner(), field.id.index)? {
            Slot::Owned(id) if !id.is_unset() => Some(Entity::new(field.child, *id)),
            _ => None,
        }
    }

    pub fn children(&self, field: OwnedListField) -> Vec<Entity> {
        match self.slot(field.owner(), field.id.index) {
            Some(Slot::OwnedList(ids)) => ids
                .iter()
                .map(|id| Entity::new(field.child, *id))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Target of a shared field, `None` while unset
    pub fn target(&self, field: RefField) -> Option<Entity> {
        match self.slot(field.owner(), field.id.index)? {
            Slot::Ref(ref_id) => self.resolve_reference(ref_id),
            _ => None,
        }
    }

    pub fn targets(&self, field: RefListField) -> Vec<Entity> {
        match self.slot(field.owner(), field.id.index) {
            Some(Slot::RefList(ref_ids)) => ref_ids
                .iter()
                .filter_map(|ref_id| self.resolve_reference(ref_id))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn variant(&self, field: UnionField) -> Option<Entity> {
        match self.slot(field.owner(), field.id.index)? {
            Slot::Union(container_id) => self.resolve_union(container_id),
            _ => None,
        }
    }

    pub fn variants(&self, field: UnionListField) -> Vec<Entity> {
        match self.slot(field.owner(), field.id.index) {
            Some(Slot::UnionList(container_ids)) => container_ids
                .iter()
                .filter_map(|container_id| self.resolve_union(container_id))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn resolve_reference(&self, ref_id: &EntityId) -> Option<Entity> {
        if ref_id.is_unset() {
            return None;
        }
        self.store
            .reference(ref_id)
            .filter(|reference| reference.operation != OperationKind::Delete)
            .map(|reference| reference.target)
    }

    fn resolve_union(&self, container_id: &EntityId) -> Option<Entity> {
        if container_id.is_unset() {
            return None;
        }
        self.store
            .union(container_id)
            .filter(|container| container.operation != OperationKind::Delete)
            .and_then(|container| container.occupant())
    }
}
