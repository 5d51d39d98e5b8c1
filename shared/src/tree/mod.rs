mod assembler;
mod dirty;
mod path;
mod tree;

pub(crate) use assembler::TreeAssembler;
pub use path::{Path, PathSegment, PathTracker};
pub use tree::{Element, FieldValue, Reference, ReferencedDataStatus, Tree};
