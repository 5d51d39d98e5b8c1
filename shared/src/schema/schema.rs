use std::collections::HashMap;

use super::{
    error::SchemaError,
    fields::{
        FieldId, OwnedField, OwnedListField, RefField, RefListField, UnionField,
        UnionListField, ValueField, ValueListField,
    },
    kind::Kind,
    type_def::{FieldDef, FieldKind, TypeDef},
};

/// The fixed type table an [`Engine`](crate::Engine) is parameterized by.
///
/// Built once through a builder, then shared by every engine:
///
/// ```
/// use tickstate_shared::{Kind, Schema, TypeDef, ValueKind};
///
/// const POSITION: Kind = Kind::new("position");
/// const PLAYER: Kind = Kind::new("player");
///
/// let schema = Schema::builder()
///     .add_type(TypeDef::new(POSITION).value("x", ValueKind::Float))
///     .add_type(TypeDef::new(PLAYER).owned("position", POSITION))
///     .build();
///
/// assert!(schema.owned_field(PLAYER, "position").is_ok());
/// ```
#[derive(Clone, Default, Debug)]
pub struct Schema {
    types: Vec<TypeDef>,
    index: HashMap<Kind, usize>,
    locked: bool,
}

impl Schema {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_type(&mut self, type_def: TypeDef) -> &mut Self {
        self.check_lock();
        if self.index.contains_key(&type_def.kind) {
            panic!("Schema: Kind {} cannot be declared more than once!", type_def.kind);
        }
        self.index.insert(type_def.kind, self.types.len());
        self.types.push(type_def);
        self
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    /// Checks if schema is locked, panics if it is
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Schema already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }

    // Non-panicking builder methods

    pub fn try_add_type(&mut self, type_def: TypeDef) -> Result<&mut Self, SchemaError> {
        self.try_check_lock()?;
        if self.index.contains_key(&type_def.kind) {
            return Err(SchemaError::DuplicateKind {
                kind: type_def.kind,
            });
        }
        self.index.insert(type_def.kind, self.types.len());
        self.types.push(type_def);
        Ok(self)
    }

    pub fn try_lock(&mut self) -> Result<(), SchemaError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn try_check_lock(&self) -> Result<(), SchemaError> {
        if self.locked {
            Err(SchemaError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    // Lookups

    /// Declared kinds, in declaration order
    pub fn kinds(&self) -> impl Iterator<Item = Kind> + '_ {
        self.types.iter().map(|type_def| type_def.kind)
    }

    pub fn type_def(&self, kind: Kind) -> Option<&TypeDef> {
        self.index.get(&kind).map(|index| &self.types[*index])
    }

    pub fn try_type_def(&self, kind: Kind) -> Result<&TypeDef, SchemaError> {
        self.type_def(kind)
            .ok_or(SchemaError::UnknownKind { kind })
    }

    pub fn field_def(&self, field: FieldId) -> Option<&FieldDef> {
        self.type_def(field.owner)?.fields.get(field.index)
    }

    fn resolve(&self, kind: Kind, name: &str) -> Result<(FieldId, &FieldDef), SchemaError> {
        let type_def = self.try_type_def(kind)?;
        let index = type_def
            .field_index(name)
            .ok_or_else(|| SchemaError::UnknownField {
                kind,
                field: name.to_string(),
            })?;
        Ok((FieldId { owner: kind, index }, &type_def.fields[index]))
    }

    fn mismatch(kind: Kind, def: &FieldDef, expected: &'static str) -> SchemaError {
        SchemaError::FieldKindMismatch {
            kind,
            field: def.name,
            expected,
            actual: def.kind.name(),
        }
    }

    pub fn value_field(&self, kind: Kind, name: &str) -> Result<ValueField, SchemaError> {
        let (id, def) = self.resolve(kind, name)?;
        match def.kind {
            FieldKind::Value(value_kind) => Ok(ValueField { id, value_kind }),
            _ => Err(Self::mismatch(kind, def, "Value")),
        }
    }

    pub fn value_list_field(&self, kind: Kind, name: &str) -> Result<ValueListField, SchemaError> {
        let (id, def) = self.resolve(kind, name)?;
        match def.kind {
            FieldKind::ValueList(value_kind) => Ok(ValueListField { id, value_kind }),
            _ => Err(Self::mismatch(kind, def, "ValueList")),
        }
    }

    pub fn owned_field(&self, kind: Kind, name: &str) -> Result<OwnedField, SchemaError> {
        let (id, def) = self.resolve(kind, name)?;
        match def.kind {
            FieldKind::Owned(child) => Ok(OwnedField { id, child }),
            _ => Err(Self::mismatch(kind, def, "Owned")),
        }
    }

    pub fn owned_list_field(&self, kind: Kind, name: &str) -> Result<OwnedListField, SchemaError> {
        let (id, def) = self.resolve(kind, name)?;
        match def.kind {
            FieldKind::OwnedList(child) => Ok(OwnedListField { id, child }),
            _ => Err(Self::mismatch(kind, def, "OwnedList")),
        }
    }

    pub fn ref_field(&self, kind: Kind, name: &str) -> Result<RefField, SchemaError> {
        let (id, def) = self.resolve(kind, name)?;
        match def.kind {
            FieldKind::Shared(_) => Ok(RefField { id }),
            _ => Err(Self::mismatch(kind, def, "Shared")),
        }
    }

    pub fn ref_list_field(&self, kind: Kind, name: &str) -> Result<RefListField, SchemaError> {
        let (id, def) = self.resolve(kind, name)?;
        match def.kind {
            FieldKind::SharedList(_) => Ok(RefListField { id }),
            _ => Err(Self::mismatch(kind, def, "SharedList")),
        }
    }

    pub fn union_field(&self, kind: Kind, name: &str) -> Result<UnionField, SchemaError> {
        let (id, def) = self.resolve(kind, name)?;
        match def.kind {
            FieldKind::Union(_) => Ok(UnionField { id }),
            _ => Err(Self::mismatch(kind, def, "Union")),
        }
    }

    pub fn union_list_field(&self, kind: Kind, name: &str) -> Result<UnionListField, SchemaError> {
        let (id, def) = self.resolve(kind, name)?;
        match def.kind {
            FieldKind::UnionList(_) => Ok(UnionListField { id }),
            _ => Err(Self::mismatch(kind, def, "UnionList")),
        }
    }
}
