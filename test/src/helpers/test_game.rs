use tickstate_shared::{Engine, EngineConfig, Tree};

use crate::game::{schema, Fields};

/// An engine over the game schema plus its resolved field handles
pub struct TestGame {
    pub engine: Engine,
    pub fields: Fields,
}

impl TestGame {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let schema = schema();
        let fields = Fields::resolve(&schema).expect("game schema resolves");
        Self {
            engine: Engine::with_config(schema, config),
            fields,
        }
    }

    /// Walks and assembles the pending diff, leaving Patch in place
    pub fn diff(&mut self) -> Tree {
        self.engine.walk();
        self.engine.assemble(false)
    }

    /// One full tick: walk, assemble, commit
    pub fn tick(&mut self) -> Tree {
        let tree = self.diff();
        self.engine.commit();
        tree
    }

    pub fn snapshot(&mut self) -> Tree {
        self.engine.walk();
        self.engine.assemble(true)
    }
}

impl Default for TestGame {
    fn default() -> Self {
        Self::new()
    }
}
