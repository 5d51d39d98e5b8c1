use std::collections::HashSet;

use log::{debug, trace, warn};

use crate::{
    world::{
        record::{OperationKind, Record, ReferenceRecord, Slot},
        store::EntityStore,
    },
    Entity, EntityId, FieldKind, Schema,
};

use super::{
    dirty::DirtyTracker,
    path::PathTracker,
    tree::{Element, FieldValue, Reference, ReferencedDataStatus, Tree},
};

/// Builds the per-tick [`Tree`] from Patch and State.
///
/// Whether an entity changed this tick is answered by one [`DirtyTracker`]
/// per assembly, so clean subtrees and unchanged edges cost a lookup.
/// Elements are only built for what is emitted. Embedding a reference target
/// chases it with a visited set, created lazily on the first chase, so cyclic
/// graphs terminate.
pub(crate) struct TreeAssembler<'a> {
    schema: &'a Schema,
    store: &'a EntityStore,
    paths: &'a PathTracker,
    dirty: DirtyTracker<'a>,
    built: usize,
}

impl<'a> TreeAssembler<'a> {
    pub fn new(schema: &'a Schema, store: &'a EntityStore, paths: &'a PathTracker) -> Self {
        Self {
            schema,
            store,
            paths,
            dirty: DirtyTracker::new(schema, store),
            built: 0,
        }
    }

    /// Number of elements built so far, embedded ones included
    pub fn built(&self) -> usize {
        self.built
    }

    /// Assembles Patch roots, then State roots that did not make it into the
    /// tree yet, each in schema order and ascending ID.
    pub fn assemble(&mut self, force_include_all: bool) -> Tree {
        let mut tree = Tree::new();
        let schema = self.schema;
        let store = self.store;

        for kind in schema.kinds() {
            let Some(table) = store.entities(kind) else {
                continue;
            };
            for record in table.patch_iter().filter(|record| !record.has_parent) {
                let entity = record.entity();
                if let Some(element) = self.assemble_entity(entity, None, force_include_all) {
                    tree.insert(element);
                }
            }
        }

        for kind in schema.kinds() {
            let Some(table) = store.entities(kind) else {
                continue;
            };
            for record in table.state_iter().filter(|record| !record.has_parent) {
                let entity = record.entity();
                if tree.contains(&entity) {
                    continue;
                }
                if let Some(element) = self.assemble_entity(entity, None, force_include_all) {
                    tree.insert(element);
                }
            }
        }

        debug!(
            "TreeAssembler: Assembled {} top-level elements from {} built (force: {})",
            tree.len(),
            self.built,
            force_include_all
        );
        tree
    }

    /// Element of one entity, or `None` when it stays out of the tree.
    fn assemble_entity(
        &mut self,
        entity: Entity,
        mut visited: Option<&mut HashSet<Entity>>,
        force: bool,
    ) -> Option<Element> {
        if let Some(visited) = visited.as_deref_mut() {
            if !visited.insert(entity) {
                return None;
            }
        }
        let schema = self.schema;
        let store = self.store;
        let record = store.record(&entity)?;
        if record.is_deleted() {
            if force {
                return None;
            }
            // identity only, the client drops the whole subtree
            self.built += 1;
            return Some(Element::new(entity, OperationKind::Delete));
        }
        if !force && !self.dirty.is_dirty(entity) {
            trace!("TreeAssembler: {} {} unchanged", entity.kind, entity.id);
            return None;
        }
        let type_def = schema.type_def(entity.kind)?;

        self.built += 1;
        let emit_scalars = force || store.patch_record(&entity).is_some();
        let mut element = Element::new(entity, record.operation);

        for (index, field) in type_def.fields.iter().enumerate() {
            let value = match (&field.kind, record.slot(index)) {
                (FieldKind::Value(_), Some(Slot::Value(value))) => {
                    emit_scalars.then(|| FieldValue::Value(value.clone()))
                }
                (FieldKind::ValueList(_), Some(Slot::Values(values))) => {
                    emit_scalars.then(|| FieldValue::Values(values.clone()))
                }
                (FieldKind::Owned(child), Some(Slot::Owned(id))) if !id.is_unset() => self
                    .assemble_entity(Entity::new(*child, *id), visited.as_deref_mut(), force)
                    .map(|child| FieldValue::Element(Box::new(child))),
                (FieldKind::OwnedList(child), _) => {
                    let mut elements = Vec::new();
                    for id in store.merged_ids(&entity, index) {
                        let child = Entity::new(*child, id);
                        let element = self.assemble_entity(child, visited.as_deref_mut(), force);
                        elements.extend(element);
                    }
                    (!elements.is_empty()).then_some(FieldValue::Elements(elements))
                }
                (FieldKind::Shared(_), _) => self
                    .assemble_ref(record, index, visited.as_deref_mut(), force)
                    .map(FieldValue::Reference),
                (FieldKind::SharedList(_), _) => {
                    let mut references = Vec::new();
                    for ref_id in store.merged_ids(&entity, index) {
                        let reference =
                            self.assemble_list_ref(ref_id, visited.as_deref_mut(), force);
                        references.extend(reference);
                    }
                    (!references.is_empty()).then_some(FieldValue::References(references))
                }
                (FieldKind::Union(_), Some(Slot::Union(container_id))) => self
                    .occupant(*container_id, force)
                    .and_then(|occupant| {
                        self.assemble_entity(occupant, visited.as_deref_mut(), force)
                    })
                    .map(|occupant| FieldValue::Element(Box::new(occupant))),
                (FieldKind::UnionList(_), _) => {
                    let mut elements = Vec::new();
                    for container_id in store.merged_ids(&entity, index) {
                        let Some(occupant) = self.occupant(container_id, force) else {
                            continue;
                        };
                        let element = self.assemble_entity(occupant, visited.as_deref_mut(), force);
                        elements.extend(element);
                    }
                    (!elements.is_empty()).then_some(FieldValue::Elements(elements))
                }
                _ => None,
            };
            if let Some(value) = value {
                element.fields.insert(field.name, value);
            }
        }

        trace!("TreeAssembler: {} {} assembled", entity.kind, entity.id);
        Some(element)
    }

    /// Single shared field: compares the edge held in State with the current
    /// one.
    fn assemble_ref(
        &mut self,
        owner: &Record,
        index: usize,
        visited: Option<&mut HashSet<Entity>>,
        force: bool,
    ) -> Option<Reference> {
        let store = self.store;
        let previous = store
            .state_record(&owner.entity())
            .and_then(|record| ref_slot(record, index));
        let current = ref_slot(owner, index);

        match (previous, current) {
            (None, None) => None,
            _ if force => {
                let reference = self.live_reference(current?)?;
                Some(self.forced_edge(reference, visited))
            }
            (None, Some(current)) => {
                let target = store.reference(&current)?.target;
                let status = self.status(target);
                let element = self.chase(target, visited, true);
                Some(self.describe(OperationKind::Update, target, status, element))
            }
            (Some(previous), None) => {
                let target = store.reference(&previous)?.target;
                let status = self.status(target);
                Some(self.describe(OperationKind::Delete, target, status, None))
            }
            (Some(previous), Some(current)) if previous != current => {
                let target = store.reference(&current)?.target;
                let status = self.status(target);
                let element = match status {
                    ReferencedDataStatus::Modified => self.chase(target, visited, false),
                    ReferencedDataStatus::Unchanged => None,
                };
                Some(self.describe(OperationKind::Update, target, status, element))
            }
            (Some(_), Some(current)) => {
                let reference = store.reference(&current)?;
                self.modified_edge(reference)
            }
        }
    }

    /// One entry of a shared list, identified by its reference object.
    fn assemble_list_ref(
        &mut self,
        ref_id: EntityId,
        visited: Option<&mut HashSet<Entity>>,
        force: bool,
    ) -> Option<Reference> {
        if force {
            let reference = self.live_reference(ref_id)?;
            return Some(self.forced_edge(reference, visited));
        }

        let store = self.store;
        let reference = store.reference(&ref_id)?;
        if !store.references().in_patch(&ref_id) {
            return self.modified_edge(reference);
        }

        let status = self.status(reference.target);
        let element = match reference.operation {
            OperationKind::Update => self.chase(reference.target, visited, true),
            _ => None,
        };
        Some(self.describe(reference.operation, reference.target, status, element))
    }

    fn forced_edge(
        &mut self,
        reference: &ReferenceRecord,
        visited: Option<&mut HashSet<Entity>>,
    ) -> Reference {
        let status = self.status(reference.target);
        let element = self.chase(reference.target, visited, true);
        self.describe(reference.operation, reference.target, status, element)
    }

    /// Edge unchanged this tick: only reported when its target changed
    fn modified_edge(&mut self, reference: &ReferenceRecord) -> Option<Reference> {
        if !self.dirty.is_dirty(reference.target) {
            return None;
        }
        Some(self.describe(
            OperationKind::Unchanged,
            reference.target,
            ReferencedDataStatus::Modified,
            None,
        ))
    }

    fn status(&mut self, target: Entity) -> ReferencedDataStatus {
        if self.dirty.is_dirty(target) {
            ReferencedDataStatus::Modified
        } else {
            ReferencedDataStatus::Unchanged
        }
    }

    /// Element of a reference target, for embedding in the descriptor
    fn chase(
        &mut self,
        target: Entity,
        visited: Option<&mut HashSet<Entity>>,
        force: bool,
    ) -> Option<Box<Element>> {
        let element = match visited {
            Some(visited) => self.assemble_entity(target, Some(visited), force),
            None => {
                let mut fresh = HashSet::new();
                self.assemble_entity(target, Some(&mut fresh), force)
            }
        };
        element.map(Box::new)
    }

    fn describe(
        &self,
        operation_kind: OperationKind,
        target: Entity,
        referenced_data_status: ReferencedDataStatus,
        element: Option<Box<Element>>,
    ) -> Reference {
        let element_path = match self.paths.get(&target) {
            Some(path) => path.to_json_path(),
            None => {
                warn!(
                    "TreeAssembler: No path cached for {} {}, describing it at the root",
                    target.kind, target.id
                );
                "$".to_string()
            }
        };
        Reference {
            operation_kind,
            id: target.id,
            element_kind: target.kind,
            referenced_data_status,
            element_path,
            element,
        }
    }

    fn live_reference(&self, ref_id: EntityId) -> Option<&'a ReferenceRecord> {
        self.store
            .reference(&ref_id)
            .filter(|reference| reference.operation != OperationKind::Delete)
    }

    /// Active member of a union container. Forced assembly skips removed
    /// containers.
    fn occupant(&self, container_id: EntityId, force: bool) -> Option<Entity> {
        let container = self.store.union(&container_id)?;
        if force && container.operation == OperationKind::Delete {
            return None;
        }
        container.occupant()
    }
}

fn ref_slot(record: &Record, index: usize) -> Option<EntityId> {
    match record.slot(index)? {
        Slot::Ref(id) if !id.is_unset() => Some(*id),
        _ => None,
    }
}
