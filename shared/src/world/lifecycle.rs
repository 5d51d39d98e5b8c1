use log::{debug, warn};

use crate::{Entity, EntityId, FieldKind, Kind};

use super::{
    engine::Engine,
    record::{OperationKind, Record, ReferenceRecord, Slot, UnionRecord},
};

impl Engine {
    /// Creates a root entity of `kind`, together with every owned single
    /// child and a default occupant for every union field.
    pub fn create(&mut self, kind: Kind) -> Entity {
        self.create_with(kind, false)
    }

    pub(crate) fn create_with(&mut self, kind: Kind, has_parent: bool) -> Entity {
        let Some(type_def) = self.schema.type_def(kind) else {
            warn!("Engine: Cannot create {}, kind is not declared in the schema", kind);
            return Entity::stub(kind);
        };
        let fields: Vec<FieldKind> = type_def.fields.iter().map(|def| def.kind.clone()).collect();

        let entity = Entity::new(kind, self.ids.generate());
        let mut slots = Vec::with_capacity(fields.len());
        for (index, field) in fields.iter().enumerate() {
            let slot = match field {
                FieldKind::Value(value_kind) => Slot::Value(value_kind.default_value()),
                FieldKind::ValueList(_) => Slot::Values(Vec::new()),
                FieldKind::Owned(child) => Slot::Owned(self.create_with(*child, true).id),
                FieldKind::OwnedList(_) => Slot::OwnedList(Vec::new()),
                FieldKind::Shared(_) => Slot::Ref(EntityId::UNSET),
                FieldKind::SharedList(_) => Slot::RefList(Vec::new()),
                FieldKind::Union(candidates) => {
                    let (container_id, _) =
                        self.create_union(entity, index, candidates, candidates.first().copied());
                    Slot::Union(container_id)
                }
                FieldKind::UnionList(_) => Slot::UnionList(Vec::new()),
            };
            slots.push(slot);
        }

        debug!("Engine: Created {} {} (has_parent: {})", kind, entity.id, has_parent);
        self.store.write(Record {
            id: entity.id,
            kind,
            operation: OperationKind::Update,
            has_parent,
            slots,
        });
        entity
    }

    /// Creates a union container owned by `parent`, optionally with a fresh
    /// occupant of kind `occupant`.
    pub(crate) fn create_union(
        &mut self,
        parent: Entity,
        field: usize,
        candidates: &[Kind],
        occupant: Option<Kind>,
    ) -> (EntityId, Option<Entity>) {
        let id = self.ids.generate();
        let mut slots: Vec<(Kind, EntityId)> = candidates
            .iter()
            .map(|kind| (*kind, EntityId::UNSET))
            .collect();

        let mut active = None;
        let mut child = None;
        if let Some(kind) = occupant {
            let created = self.create_with(kind, true);
            if let Some(slot) = slots.iter_mut().find(|(candidate, _)| *candidate == kind) {
                slot.1 = created.id;
                active = Some(kind);
                child = Some(created);
            }
        }

        self.store.write_union(UnionRecord {
            id,
            operation: OperationKind::Update,
            parent,
            field,
            active,
            slots,
        });
        (id, child)
    }

    pub(crate) fn create_reference(&mut self, parent: Entity, field: usize, target: Entity) -> EntityId {
        let id = self.ids.generate();
        self.store.write_reference(ReferenceRecord {
            id,
            operation: OperationKind::Update,
            parent,
            field,
            target,
        });
        id
    }

    /// Deletes a root entity and everything it owns. Owned entities
    /// (`has_parent`) are left untouched: only their owner's cascade removes
    /// them.
    pub fn delete(&mut self, entity: Entity) {
        let Some(record) = self.store.record(&entity) else {
            return;
        };
        if record.is_deleted() {
            return;
        }
        if record.has_parent {
            warn!(
                "Engine: {} {} is owned and can only be deleted through its owner",
                entity.kind, entity.id
            );
            return;
        }
        self.delete_entity(entity);
    }

    pub(crate) fn delete_entity(&mut self, entity: Entity) {
        let Some(record) = self.live_record(entity) else {
            return;
        };
        let Some(type_def) = self.schema.type_def(entity.kind) else {
            return;
        };
        let fields: Vec<FieldKind> = type_def.fields.iter().map(|def| def.kind.clone()).collect();

        // owned children
        for (slot, field) in record.slots.iter().zip(fields.iter()) {
            match (slot, field) {
                (Slot::Owned(id), FieldKind::Owned(child)) => {
                    if !id.is_unset() {
                        self.delete_entity(Entity::new(*child, *id));
                    }
                }
                (Slot::OwnedList(ids), FieldKind::OwnedList(child)) => {
                    for id in ids {
                        self.delete_entity(Entity::new(*child, *id));
                    }
                }
                (Slot::Union(id), _) => self.delete_union(*id, true),
                (Slot::UnionList(ids), _) => {
                    for id in ids {
                        self.delete_union(*id, true);
                    }
                }
                _ => {}
            }
        }

        // edges this entity owns
        for slot in &record.slots {
            match slot {
                Slot::Ref(id) => self.delete_reference(*id),
                Slot::RefList(ids) => {
                    for id in ids {
                        self.delete_reference(*id);
                    }
                }
                _ => {}
            }
        }

        self.dereference(entity);

        let latest = self.store.record(&entity).cloned().unwrap_or(record);
        debug!("Engine: Deleted {} {}", entity.kind, entity.id);
        self.store.remove(latest);
    }

    pub(crate) fn delete_reference(&mut self, id: EntityId) {
        if id.is_unset() {
            return;
        }
        let Some(reference) = self.store.reference(&id).cloned() else {
            return;
        };
        if reference.operation == OperationKind::Delete {
            return;
        }
        self.store.remove_reference(reference);
    }

    pub(crate) fn delete_union(&mut self, id: EntityId, delete_child: bool) {
        if id.is_unset() {
            return;
        }
        let Some(container) = self.store.union(&id).cloned() else {
            return;
        };
        if container.operation == OperationKind::Delete {
            return;
        }
        if delete_child {
            if let Some(occupant) = container.occupant() {
                self.delete_entity(occupant);
            }
        }
        self.store.remove_union(container);
    }

    /// Clears every live edge pointing at `target`: single fields are unset,
    /// list fields drop the entry.
    fn dereference(&mut self, target: Entity) {
        let edges: Vec<ReferenceRecord> = self
            .store
            .references()
            .live()
            .filter(|reference| reference.target == target)
            .cloned()
            .collect();
        if edges.is_empty() {
            return;
        }
        debug!(
            "Engine: Dereferencing {} edges pointing at {} {}",
            edges.len(),
            target.kind,
            target.id
        );

        for edge in edges {
            match self.live_record(edge.parent).and_then(|parent| parent.slot(edge.field).cloned()) {
                Some(Slot::Ref(current)) if current == edge.id => {
                    self.unset_ref_slot(edge.parent, edge.field)
                }
                Some(Slot::RefList(_)) => {
                    self.remove_ref_entries(edge.parent, edge.field, |reference| reference.id == edge.id)
                }
                _ => self.delete_reference(edge.id),
            }
        }
    }
}
