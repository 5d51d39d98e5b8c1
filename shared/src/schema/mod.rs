mod error;
mod fields;
mod kind;
mod schema;
mod type_def;

pub use error::SchemaError;
pub use fields::{
    FieldId, OwnedField, OwnedListField, RefField, RefListField, UnionField, UnionListField,
    ValueField, ValueListField,
};
pub use kind::{Kind, Value, ValueKind};
pub use schema::Schema;
pub use type_def::{FieldDef, FieldKind, TypeDef};
