use thiserror::Error;

use super::kind::Kind;

/// Errors raised while building a schema or resolving field handles from it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Schema is locked and cannot be modified
    #[error("Schema is already locked and cannot be modified. Schema.lock() has been called and no further types can be added")]
    AlreadyLocked,

    /// The same kind was declared twice
    #[error("Kind {kind} is already declared in this schema")]
    DuplicateKind { kind: Kind },

    /// Lookup of a kind that was never declared
    #[error("Kind {kind} is not declared in this schema")]
    UnknownKind { kind: Kind },

    /// Lookup of a field name the kind does not declare
    #[error("Kind {kind} has no field named '{field}'")]
    UnknownField { kind: Kind, field: String },

    /// The field exists but has a different field kind than the handle requested
    #[error("Field '{field}' of {kind} is a {actual} field, not a {expected} field")]
    FieldKindMismatch {
        kind: Kind,
        field: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
}
