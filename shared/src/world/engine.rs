use log::debug;

use crate::{
    tree::{PathTracker, Tree, TreeAssembler},
    Entity, EntityId, FieldId, FieldKind, Kind, Schema,
};

use super::{
    config::EngineConfig,
    handle::EntityHandle,
    id_generator::IdGenerator,
    record::{OperationKind, Record},
    store::EntityStore,
};

/// One room's worth of entity state.
///
/// Every mutator is total: operations on deleted or unknown entities do
/// nothing, lookups of them resolve to a `Delete` stub. The per-tick sequence
/// is `walk()`, `assemble(false)`, `commit()`.
pub struct Engine {
    pub(crate) schema: Schema,
    config: EngineConfig,
    pub(crate) ids: IdGenerator,
    pub(crate) store: EntityStore,
    paths: PathTracker,
}

impl Engine {
    pub fn new(schema: Schema) -> Self {
        Self::with_config(schema, EngineConfig::default())
    }

    pub fn with_config(schema: Schema, config: EngineConfig) -> Self {
        let store = EntityStore::new(&schema);
        let paths = PathTracker::new(&config);
        Self {
            schema,
            config,
            ids: IdGenerator::new(),
            store,
            paths,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn paths(&self) -> &PathTracker {
        &self.paths
    }

    pub fn generate_id(&mut self) -> EntityId {
        self.ids.generate()
    }

    pub fn handle(&self, entity: Entity) -> EntityHandle<'_> {
        EntityHandle::new(&self.store, entity)
    }

    /// Live entities of one kind, ascending ID
    pub fn entities(&self, kind: Kind) -> Vec<Entity> {
        let Some(table) = self.store.entities(kind) else {
            return Vec::new();
        };
        let mut entities: Vec<Entity> = table.live().map(Record::entity).collect();
        entities.sort();
        entities
    }

    /// Recomputes the path of every reachable entity.
    pub fn walk(&mut self) {
        self.paths.walk(&self.schema, &self.store);
    }

    /// Builds the diff of Patch against State, or a full snapshot when
    /// `force_include_all` is set. Reads only; call before [`Engine::commit`].
    pub fn assemble(&self, force_include_all: bool) -> Tree {
        TreeAssembler::new(&self.schema, &self.store, &self.paths).assemble(force_include_all)
    }

    /// True when nothing is pending in Patch
    pub fn is_clean(&self) -> bool {
        self.store.is_clean()
    }

    /// Folds Patch into State. Run once per tick, after assembly.
    pub fn commit(&mut self) {
        self.store.commit();
    }

    // Internal helpers

    /// Current record of a live entity, cloned for modification
    pub(crate) fn live_record(&self, entity: Entity) -> Option<Record> {
        Some(self.store.get(&entity)).filter(|record| !record.is_deleted())
    }

    /// Marks a record updated and writes it to Patch
    pub(crate) fn touch(&mut self, mut record: Record) {
        record.operation = OperationKind::Update;
        debug!("Engine: Updated {} {}", record.kind, record.id);
        self.store.write(record);
    }

    pub(crate) fn field_kind(&self, field: FieldId) -> Option<FieldKind> {
        self.schema.field_def(field).map(|def| def.kind.clone())
    }

    pub(crate) fn is_candidate(&self, field: FieldId, kind: Kind) -> bool {
        self.schema
            .field_def(field)
            .is_some_and(|def| def.kind.candidates().contains(&kind))
    }
}
