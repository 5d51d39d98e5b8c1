use log::warn;

use crate::{
    Entity, EntityId, FieldId, FieldKind, Kind, OwnedListField, RefField, RefListField, UnionField,
    UnionListField, Value, ValueField, ValueListField,
};

use super::{
    engine::Engine,
    record::{OperationKind, ReferenceRecord, Slot},
};

impl Engine {
    // Scalars

    pub fn set_value(&mut self, field: ValueField, id: EntityId, value: impl Into<Value>) {
        let value = value.into();
        if value.kind() != field.value_kind {
            warn!(
                "Engine: Rejected {:?} for {:?} field of {}",
                value, field.value_kind, field.owner()
            );
            return;
        }
        let Some(mut record) = self.live_record(Entity::new(field.owner(), id)) else {
            return;
        };
        match record.slot_mut(field.id.index) {
            Some(Slot::Value(current)) => *current = value,
            _ => return,
        }
        self.touch(record);
    }

    pub fn add_values<I>(&mut self, field: ValueListField, id: EntityId, values: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let mut accepted = Vec::new();
        for value in values.into_iter().map(Into::into) {
            if value.kind() == field.value_kind {
                accepted.push(value);
            } else {
                warn!(
                    "Engine: Rejected {:?} for {:?} list of {}",
                    value, field.value_kind, field.owner()
                );
            }
        }
        if accepted.is_empty() {
            return;
        }
        let Some(mut record) = self.live_record(Entity::new(field.owner(), id)) else {
            return;
        };
        match record.slot_mut(field.id.index) {
            Some(Slot::Values(current)) => current.extend(accepted),
            _ => return,
        }
        self.touch(record);
    }

    /// Removes every occurrence of the given values. Leaves the owner
    /// untouched when none of them is present.
    pub fn remove_values(&mut self, field: ValueListField, id: EntityId, values: &[Value]) {
        let Some(mut record) = self.live_record(Entity::new(field.owner(), id)) else {
            return;
        };
        match record.slot_mut(field.id.index) {
            Some(Slot::Values(current)) => {
                let before = current.len();
                current.retain(|value| !values.contains(value));
                if current.len() == before {
                    return;
                }
            }
            _ => return,
        }
        self.touch(record);
    }

    // Owned lists

    /// Appends a newly created child to an owned list. Returns a stub when the
    /// owner is deleted.
    pub fn add_child(&mut self, field: OwnedListField, id: EntityId) -> Entity {
        let Some(mut record) = self.live_record(Entity::new(field.owner(), id)) else {
            return Entity::stub(field.child);
        };
        if !matches!(record.slot(field.id.index), Some(Slot::OwnedList(_))) {
            return Entity::stub(field.child);
        }
        let child = self.create_with(field.child, true);
        if let Some(Slot::OwnedList(ids)) = record.slot_mut(field.id.index) {
            ids.push(child.id);
        }
        self.touch(record);
        child
    }

    /// Deletes the listed children and drops them from the owner's list
    pub fn remove_children(&mut self, field: OwnedListField, id: EntityId, children: &[EntityId]) {
        let Some(mut record) = self.live_record(Entity::new(field.owner(), id)) else {
            return;
        };
        let Some(Slot::OwnedList(ids)) = record.slot(field.id.index) else {
            return;
        };
        let (removed, kept): (Vec<EntityId>, Vec<EntityId>) =
            ids.iter().partition(|child| children.contains(*child));
        if removed.is_empty() {
            return;
        }
        for child in removed {
            self.delete_entity(Entity::new(field.child, child));
        }
        record.slots[field.id.index] = Slot::OwnedList(kept);
        self.touch(record);
    }

    // Shared references

    /// Points a shared field at `target`, replacing any previous edge.
    pub fn set_ref(&mut self, field: RefField, id: EntityId, target: Entity) {
        let owner = Entity::new(field.owner(), id);
        let Some(mut record) = self.live_record(owner) else {
            return;
        };
        if !self.accepts_target(field.id, target) {
            return;
        }
        let Some(Slot::Ref(current)) = record.slot(field.id.index).cloned() else {
            return;
        };
        if !current.is_unset() {
            let unchanged = self
                .store
                .reference(&current)
                .is_some_and(|reference| {
                    reference.operation != OperationKind::Delete && reference.target == target
                });
            if unchanged {
                return;
            }
            self.delete_reference(current);
        }
        let ref_id = self.create_reference(owner, field.id.index, target);
        record.slots[field.id.index] = Slot::Ref(ref_id);
        self.touch(record);
    }

    pub fn unset_ref(&mut self, field: RefField, id: EntityId) {
        self.unset_ref_slot(Entity::new(field.owner(), id), field.id.index);
    }

    pub(crate) fn unset_ref_slot(&mut self, owner: Entity, index: usize) {
        let Some(mut record) = self.live_record(owner) else {
            return;
        };
        let Some(Slot::Ref(current)) = record.slot(index).cloned() else {
            return;
        };
        if current.is_unset() {
            return;
        }
        self.delete_reference(current);
        record.slots[index] = Slot::Ref(EntityId::UNSET);
        self.touch(record);
    }

    pub fn add_ref(&mut self, field: RefListField, id: EntityId, target: Entity) {
        let owner = Entity::new(field.owner(), id);
        let Some(mut record) = self.live_record(owner) else {
            return;
        };
        if !self.accepts_target(field.id, target) {
            return;
        }
        if !matches!(record.slot(field.id.index), Some(Slot::RefList(_))) {
            return;
        }
        let ref_id = self.create_reference(owner, field.id.index, target);
        if let Some(Slot::RefList(ids)) = record.slot_mut(field.id.index) {
            ids.push(ref_id);
        }
        self.touch(record);
    }

    /// Drops every edge of the list that points at one of `targets`
    pub fn remove_refs(&mut self, field: RefListField, id: EntityId, targets: &[EntityId]) {
        self.remove_ref_entries(Entity::new(field.owner(), id), field.id.index, |reference| {
            targets.contains(&reference.target.id)
        });
    }

    pub(crate) fn remove_ref_entries<F>(&mut self, owner: Entity, index: usize, matches: F)
    where
        F: Fn(&ReferenceRecord) -> bool,
    {
        let Some(mut record) = self.live_record(owner) else {
            return;
        };
        let Some(Slot::RefList(ids)) = record.slot(index) else {
            return;
        };
        let (removed, kept): (Vec<EntityId>, Vec<EntityId>) = ids.iter().partition(|ref_id| {
            self.store
                .reference(*ref_id)
                .is_some_and(|reference| matches(reference))
        });
        if removed.is_empty() {
            return;
        }
        for ref_id in removed {
            self.delete_reference(ref_id);
        }
        record.slots[index] = Slot::RefList(kept);
        self.touch(record);
    }

    fn accepts_target(&self, field: FieldId, target: Entity) -> bool {
        if !self.is_candidate(field, target.kind) {
            warn!(
                "Engine: {} is not a target candidate of field {} on {}",
                target.kind, field.index, field.owner
            );
            return false;
        }
        self.store.is_live(&target)
    }

    // Unions

    /// Replaces the occupant of a union field with a new entity of `kind`.
    /// The previous occupant is deleted.
    pub fn set_variant(&mut self, field: UnionField, id: EntityId, kind: Kind) -> Entity {
        let owner = Entity::new(field.owner(), id);
        let Some(mut record) = self.live_record(owner) else {
            return Entity::stub(kind);
        };
        if !self.is_candidate(field.id, kind) {
            warn!("Engine: {} is not a union candidate of {}", kind, field.owner());
            return Entity::stub(kind);
        }
        let Some(Slot::Union(container_id)) = record.slot(field.id.index).cloned() else {
            return Entity::stub(kind);
        };

        let live_container = self
            .store
            .union(&container_id)
            .filter(|container| container.operation != OperationKind::Delete)
            .cloned();
        let Some(mut container) = live_container else {
            let Some(FieldKind::Union(candidates)) = self.field_kind(field.id) else {
                return Entity::stub(kind);
            };
            let (container_id, child) = self.create_union(owner, field.id.index, &candidates, Some(kind));
            record.slots[field.id.index] = Slot::Union(container_id);
            self.touch(record);
            return child.unwrap_or(Entity::stub(kind));
        };

        if let Some(previous) = container.occupant() {
            self.delete_entity(previous);
        }
        let child = self.create_with(kind, true);
        for (candidate, slot) in container.slots.iter_mut() {
            *slot = if *candidate == kind {
                child.id
            } else {
                EntityId::UNSET
            };
        }
        container.active = Some(kind);
        container.operation = OperationKind::Update;
        self.store.write_union(container);
        child
    }

    /// Appends a new union member of `kind` to the owner's list
    pub fn add_variant(&mut self, field: UnionListField, id: EntityId, kind: Kind) -> Entity {
        let owner = Entity::new(field.owner(), id);
        let Some(mut record) = self.live_record(owner) else {
            return Entity::stub(kind);
        };
        let Some(FieldKind::UnionList(candidates)) = self.field_kind(field.id) else {
            return Entity::stub(kind);
        };
        if !candidates.contains(&kind) {
            warn!("Engine: {} is not a union candidate of {}", kind, field.owner());
            return Entity::stub(kind);
        }
        if !matches!(record.slot(field.id.index), Some(Slot::UnionList(_))) {
            return Entity::stub(kind);
        }
        let (container_id, child) = self.create_union(owner, field.id.index, &candidates, Some(kind));
        if let Some(Slot::UnionList(ids)) = record.slot_mut(field.id.index) {
            ids.push(container_id);
        }
        self.touch(record);
        child.unwrap_or(Entity::stub(kind))
    }

    /// Deletes the listed members together with their containers
    pub fn remove_variants(&mut self, field: UnionListField, id: EntityId, members: &[EntityId]) {
        let Some(mut record) = self.live_record(Entity::new(field.owner(), id)) else {
            return;
        };
        let Some(Slot::UnionList(ids)) = record.slot(field.id.index) else {
            return;
        };
        let (removed, kept): (Vec<EntityId>, Vec<EntityId>) = ids.iter().partition(|container_id| {
            self.store
                .union(*container_id)
                .and_then(|container| container.occupant())
                .is_some_and(|occupant| members.contains(&occupant.id))
        });
        if removed.is_empty() {
            return;
        }
        for container_id in removed {
            self.delete_union(container_id, true);
        }
        record.slots[field.id.index] = Slot::UnionList(kept);
        self.touch(record);
    }
}
