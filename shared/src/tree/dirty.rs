use std::collections::{HashMap, HashSet};

use crate::{
    world::{record::Slot, store::EntityStore},
    Entity, EntityId, FieldKind, Schema,
};

/// Per-assembly memo of "this entity, or anything it reaches, changed this
/// tick".
///
/// An entity is dirty when it is in Patch or when one of its owned children,
/// union occupants or reference targets is dirty. Reference graphs may be
/// cyclic, so entities are resolved one strongly connected component at a
/// time: every member of a cycle shares the same answer, and each entity and
/// edge is visited once per assembly.
pub(crate) struct DirtyTracker<'a> {
    schema: &'a Schema,
    store: &'a EntityStore,
    dirty: HashMap<Entity, bool>,
    index: HashMap<Entity, usize>,
    low_link: HashMap<Entity, usize>,
    reaches: HashMap<Entity, bool>,
    stack: Vec<Entity>,
    on_stack: HashSet<Entity>,
    next_index: usize,
}

impl<'a> DirtyTracker<'a> {
    pub fn new(schema: &'a Schema, store: &'a EntityStore) -> Self {
        Self {
            schema,
            store,
            dirty: HashMap::new(),
            index: HashMap::new(),
            low_link: HashMap::new(),
            reaches: HashMap::new(),
            stack: Vec::new(),
            on_stack: HashSet::new(),
            next_index: 0,
        }
    }

    pub fn is_dirty(&mut self, entity: Entity) -> bool {
        if let Some(dirty) = self.dirty.get(&entity) {
            return *dirty;
        }
        self.visit(entity);
        self.dirty.get(&entity).copied().unwrap_or(false)
    }

    fn visit(&mut self, entity: Entity) {
        let index = self.next_index;
        self.next_index += 1;
        self.index.insert(entity, index);
        self.low_link.insert(entity, index);
        self.stack.push(entity);
        self.on_stack.insert(entity);

        let mut reaches = self.store.patch_record(&entity).is_some();
        if !reaches {
            for next in self.successors(entity) {
                if !self.index.contains_key(&next) {
                    self.visit(next);
                    match self.dirty.get(&next).copied() {
                        Some(dirty) => reaches |= dirty,
                        None => {
                            let candidate = self.low_link[&next];
                            self.lower(entity, candidate);
                        }
                    }
                } else if self.on_stack.contains(&next) {
                    let candidate = self.index[&next];
                    self.lower(entity, candidate);
                } else {
                    reaches |= self.dirty.get(&next).copied().unwrap_or(false);
                }
                // a dirty entity stays dirty whatever else it reaches
                if reaches {
                    break;
                }
            }
        }
        self.reaches.insert(entity, reaches);

        if self.low_link[&entity] != index {
            return;
        }
        let mut component = Vec::new();
        while let Some(member) = self.stack.pop() {
            self.on_stack.remove(&member);
            component.push(member);
            if member == entity {
                break;
            }
        }
        let dirty = component
            .iter()
            .any(|member| self.reaches.get(member).copied().unwrap_or(false));
        for member in component {
            self.dirty.insert(member, dirty);
        }
    }

    fn lower(&mut self, entity: Entity, candidate: usize) {
        if let Some(low_link) = self.low_link.get_mut(&entity) {
            *low_link = (*low_link).min(candidate);
        }
    }

    /// Entities the assembler may descend into from `entity`: owned
    /// children, union occupants and reference targets, across both layers.
    fn successors(&self, entity: Entity) -> Vec<Entity> {
        let Some(record) = self.store.record(&entity) else {
            return Vec::new();
        };
        let Some(type_def) = self.schema.type_def(entity.kind) else {
            return Vec::new();
        };

        let mut successors = Vec::new();
        for (index, field) in type_def.fields.iter().enumerate() {
            match (&field.kind, record.slot(index)) {
                (FieldKind::Owned(child), Some(Slot::Owned(id))) if !id.is_unset() => {
                    successors.push(Entity::new(*child, *id));
                }
                (FieldKind::OwnedList(child), _) => successors.extend(
                    self.store
                        .merged_ids(&entity, index)
                        .into_iter()
                        .map(|id| Entity::new(*child, id)),
                ),
                (FieldKind::Shared(_), Some(Slot::Ref(ref_id))) if !ref_id.is_unset() => {
                    if let Some(reference) = self.store.reference(ref_id) {
                        successors.push(reference.target);
                    }
                }
                (FieldKind::SharedList(_), _) => successors.extend(
                    self.store
                        .merged_ids(&entity, index)
                        .iter()
                        .filter_map(|ref_id| self.store.reference(ref_id))
                        .map(|reference| reference.target),
                ),
                (FieldKind::Union(_), Some(Slot::Union(container_id))) => {
                    if let Some(occupant) = self.occupant(container_id) {
                        successors.push(occupant);
                    }
                }
                (FieldKind::UnionList(_), _) => successors.extend(
                    self.store
                        .merged_ids(&entity, index)
                        .iter()
                        .filter_map(|container_id| self.occupant(container_id)),
                ),
                _ => {}
            }
        }
        successors
    }

    fn occupant(&self, container_id: &EntityId) -> Option<Entity> {
        self.store
            .union(container_id)
            .and_then(|container| container.occupant())
    }
}
