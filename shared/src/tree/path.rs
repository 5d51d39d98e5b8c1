use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use log::debug;

use crate::{
    world::{record::Slot, store::EntityStore, EngineConfig},
    Entity, EntityId, FieldKind, Schema,
};

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum PathSegment {
    /// A kind name (first segment) or a field name
    Field(&'static str),
    /// ID of the root entity
    Id(EntityId),
    /// Position inside a list field
    Index(usize),
}

/// Route from a root entity down its ownership edges.
#[derive(Clone, Default, PartialEq, Eq, Hash, Debug)]
pub struct Path(Vec<PathSegment>);

impl Path {
    pub fn root(entity: Entity) -> Self {
        Self(vec![
            PathSegment::Field(entity.kind.name()),
            PathSegment::Id(entity.id),
        ])
    }

    pub fn field(&self, name: &'static str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Field(name));
        Self(segments)
    }

    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Renders the path as `$.player.12.items[0]`
    pub fn to_json_path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Id(id) => write!(f, ".{}", id)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Cache of the path of every entity reachable through ownership edges.
///
/// Rebuilt top-down by every [`PathTracker::walk`]; paths of entities that
/// stopped being reachable survive until the cache is reset every
/// `path_cache_reset_interval` walks.
pub struct PathTracker {
    paths: HashMap<Entity, Path>,
    walks: usize,
    reset_interval: usize,
}

impl PathTracker {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            paths: HashMap::new(),
            walks: 0,
            reset_interval: config.path_cache_reset_interval.max(1),
        }
    }

    pub fn get(&self, entity: &Entity) -> Option<&Path> {
        self.paths.get(entity)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Walks Patch roots, then State roots not reached yet, each in schema
    /// order and ascending ID. The first path an entity is reached by during
    /// a walk is the one it keeps.
    pub(crate) fn walk(&mut self, schema: &Schema, store: &EntityStore) {
        if self.walks >= self.reset_interval {
            debug!("PathTracker: Resetting {} cached paths", self.paths.len());
            self.paths.clear();
            self.walks = 0;
        }

        let mut walked = HashSet::new();
        for kind in schema.kinds() {
            let Some(table) = store.entities(kind) else {
                continue;
            };
            for record in table.patch_iter().filter(|record| !record.has_parent) {
                let root = record.entity();
                self.walk_entity(schema, store, root, Path::root(root), &mut walked);
            }
        }
        for kind in schema.kinds() {
            let Some(table) = store.entities(kind) else {
                continue;
            };
            for record in table.state_iter().filter(|record| !record.has_parent) {
                let root = record.entity();
                if !walked.contains(&root) {
                    self.walk_entity(schema, store, root, Path::root(root), &mut walked);
                }
            }
        }

        self.walks += 1;
    }

    fn walk_entity(
        &mut self,
        schema: &Schema,
        store: &EntityStore,
        entity: Entity,
        path: Path,
        walked: &mut HashSet<Entity>,
    ) {
        if !walked.insert(entity) {
            return;
        }
        let Some(record) = store.record(&entity) else {
            return;
        };
        let Some(type_def) = schema.type_def(entity.kind) else {
            return;
        };
        self.paths.insert(entity, path.clone());

        for (index, field) in type_def.fields.iter().enumerate() {
            match (&field.kind, record.slot(index)) {
                (FieldKind::Owned(child), Some(Slot::Owned(id))) if !id.is_unset() => {
                    let child = Entity::new(*child, *id);
                    self.walk_entity(schema, store, child, path.field(field.name), walked);
                }
                (FieldKind::OwnedList(child), _) => {
                    for (position, id) in store.merged_ids(&entity, index).into_iter().enumerate() {
                        let child = Entity::new(*child, id);
                        let child_path = path.field(field.name).index(position);
                        self.walk_entity(schema, store, child, child_path, walked);
                    }
                }
                (FieldKind::Union(_), Some(Slot::Union(container_id))) => {
                    let occupant = store
                        .union(container_id)
                        .and_then(|container| container.occupant());
                    if let Some(occupant) = occupant {
                        self.walk_entity(schema, store, occupant, path.field(field.name), walked);
                    }
                }
                (FieldKind::UnionList(_), _) => {
                    for (position, container_id) in
                        store.merged_ids(&entity, index).into_iter().enumerate()
                    {
                        let occupant = store
                            .union(&container_id)
                            .and_then(|container| container.occupant());
                        if let Some(occupant) = occupant {
                            let member_path = path.field(field.name).index(position);
                            self.walk_entity(schema, store, occupant, member_path, walked);
                        }
                    }
                }
                _ => {}
            }
        }
    }
}
