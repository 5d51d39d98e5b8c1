use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::{Entity, EntityId, Kind, Schema};

use super::record::{OperationKind, Record, ReferenceRecord, Slot, Stored, UnionRecord};

// Table

/// Committed (`state`) and pending (`patch`) records of one type.
pub(crate) struct Table<R: Stored> {
    state: BTreeMap<EntityId, R>,
    patch: BTreeMap<EntityId, R>,
}

impl<R: Stored> Table<R> {
    pub fn new() -> Self {
        Self {
            state: BTreeMap::new(),
            patch: BTreeMap::new(),
        }
    }

    /// Patch first, then State
    pub fn get(&self, id: &EntityId) -> Option<&R> {
        self.patch.get(id).or_else(|| self.state.get(id))
    }

    pub fn patch_get(&self, id: &EntityId) -> Option<&R> {
        self.patch.get(id)
    }

    pub fn state_get(&self, id: &EntityId) -> Option<&R> {
        self.state.get(id)
    }

    pub fn in_patch(&self, id: &EntityId) -> bool {
        self.patch.contains_key(id)
    }

    pub fn in_state(&self, id: &EntityId) -> bool {
        self.state.contains_key(id)
    }

    /// Inserts or overwrites the pending record
    pub fn write(&mut self, record: R) {
        self.patch.insert(record.id(), record);
    }

    pub fn purge(&mut self, id: &EntityId) {
        self.patch.remove(id);
    }

    pub fn patch_iter(&self) -> impl Iterator<Item = &R> {
        self.patch.values()
    }

    pub fn state_iter(&self) -> impl Iterator<Item = &R> {
        self.state.values()
    }

    /// Current records that are not tombstoned: Patch entries first, then
    /// State entries Patch does not shadow
    pub fn live(&self) -> impl Iterator<Item = &R> {
        let from_patch = self
            .patch
            .values()
            .filter(|record| record.operation() != OperationKind::Delete);
        let from_state = self
            .state
            .values()
            .filter(move |record| !self.patch.contains_key(&record.id()));
        from_patch.chain(from_state)
    }

    pub fn patch_len(&self) -> usize {
        self.patch.len()
    }

    #[cfg(test)]
    pub fn state_len(&self) -> usize {
        self.state.len()
    }

    fn commit(&mut self) {
        for (id, mut record) in std::mem::take(&mut self.patch) {
            if record.operation() == OperationKind::Delete {
                self.state.remove(&id);
            } else {
                record.set_operation(OperationKind::Unchanged);
                self.state.insert(id, record);
            }
        }
    }
}

impl<R: Stored> Default for Table<R> {
    fn default() -> Self {
        Self::new()
    }
}

// EntityStore

/// One [`Table`] per declared kind, plus the tables of reference objects and
/// union containers.
pub(crate) struct EntityStore {
    entities: HashMap<Kind, Table<Record>>,
    references: Table<ReferenceRecord>,
    unions: Table<UnionRecord>,
}

impl EntityStore {
    pub fn new(schema: &Schema) -> Self {
        Self {
            entities: schema.kinds().map(|kind| (kind, Table::new())).collect(),
            references: Table::new(),
            unions: Table::new(),
        }
    }

    pub fn entities(&self, kind: Kind) -> Option<&Table<Record>> {
        self.entities.get(&kind)
    }

    pub fn references(&self) -> &Table<ReferenceRecord> {
        &self.references
    }

    pub fn unions(&self) -> &Table<UnionRecord> {
        &self.unions
    }

    pub fn record(&self, entity: &Entity) -> Option<&Record> {
        self.entities.get(&entity.kind)?.get(&entity.id)
    }

    pub fn patch_record(&self, entity: &Entity) -> Option<&Record> {
        self.entities.get(&entity.kind)?.patch_get(&entity.id)
    }

    pub fn state_record(&self, entity: &Entity) -> Option<&Record> {
        self.entities.get(&entity.kind)?.state_get(&entity.id)
    }

    /// Total lookup: a missing entity resolves to a `Delete` stub.
    pub fn get(&self, entity: &Entity) -> Record {
        self.record(entity)
            .cloned()
            .unwrap_or_else(|| Record::stub(entity.kind))
    }

    /// Whether the entity resolves to a live (non-tombstoned) record
    pub fn is_live(&self, entity: &Entity) -> bool {
        self.record(entity).is_some_and(|record| !record.is_deleted())
    }

    pub fn write(&mut self, record: Record) {
        match self.entities.get_mut(&record.kind) {
            Some(table) => table.write(record),
            None => panic!("EntityStore: Kind {} is not declared in the schema!", record.kind),
        }
    }

    /// Tombstones an entity that exists in State, otherwise purges it from Patch
    pub fn remove(&mut self, mut record: Record) {
        let entity = record.entity();
        let Some(table) = self.entities.get_mut(&entity.kind) else {
            return;
        };
        if table.in_state(&entity.id) {
            record.operation = OperationKind::Delete;
            table.write(record);
        } else {
            table.purge(&entity.id);
        }
    }

    pub fn reference(&self, id: &EntityId) -> Option<&ReferenceRecord> {
        self.references.get(id)
    }

    pub fn write_reference(&mut self, reference: ReferenceRecord) {
        self.references.write(reference);
    }

    pub fn remove_reference(&mut self, mut reference: ReferenceRecord) {
        if self.references.in_state(&reference.id) {
            reference.operation = OperationKind::Delete;
            self.references.write(reference);
        } else {
            self.references.purge(&reference.id);
        }
    }

    pub fn union(&self, id: &EntityId) -> Option<&UnionRecord> {
        self.unions.get(id)
    }

    pub fn write_union(&mut self, container: UnionRecord) {
        self.unions.write(container);
    }

    pub fn remove_union(&mut self, mut container: UnionRecord) {
        if self.unions.in_state(&container.id) {
            container.operation = OperationKind::Delete;
            self.unions.write(container);
        } else {
            self.unions.purge(&container.id);
        }
    }

    /// IDs held by one slot across both layers: State order first, then the
    /// IDs only Patch holds, in Patch order.
    pub fn merged_ids(&self, entity: &Entity, index: usize) -> Vec<EntityId> {
        let state_ids = self
            .state_record(entity)
            .and_then(|record| record.slot(index))
            .map(Slot::ids)
            .unwrap_or(&[]);
        let patch_ids = self
            .patch_record(entity)
            .and_then(|record| record.slot(index))
            .map(Slot::ids)
            .unwrap_or(&[]);

        let mut ids = state_ids.to_vec();
        ids.extend(patch_ids.iter().filter(|id| !state_ids.contains(id)));
        ids
    }

    /// Folds Patch into State and clears Patch.
    pub fn commit(&mut self) {
        let pending: usize = self
            .entities
            .values()
            .map(Table::patch_len)
            .sum::<usize>()
            + self.references.patch_len()
            + self.unions.patch_len();
        debug!("EntityStore: Committing {} pending records", pending);

        for table in self.entities.values_mut() {
            table.commit();
        }
        self.references.commit();
        self.unions.commit();
    }

    /// True when nothing is pending
    pub fn is_clean(&self) -> bool {
        self.entities.values().all(|table| table.patch_len() == 0)
            && self.references.patch_len() == 0
            && self.unions.patch_len() == 0
    }
}
