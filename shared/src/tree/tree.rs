use std::collections::BTreeMap;

use serde::Serialize;

use crate::{world::OperationKind, Entity, EntityId, Kind, Value};

/// Whether the target of an unchanged edge changed this tick.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReferencedDataStatus {
    Modified,
    Unchanged,
}

/// Assembled value of one entity. Only the fields that made it into the diff
/// are present.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: EntityId,
    pub element_kind: Kind,
    pub operation_kind: OperationKind,
    #[serde(flatten)]
    pub fields: BTreeMap<&'static str, FieldValue>,
}

impl Element {
    pub fn new(entity: Entity, operation_kind: OperationKind) -> Self {
        Self {
            id: entity.id,
            element_kind: entity.kind,
            operation_kind,
            fields: BTreeMap::new(),
        }
    }

    pub fn entity(&self) -> Entity {
        Entity::new(self.element_kind, self.id)
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.field(name)? {
            FieldValue::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn values(&self, name: &str) -> Option<&[Value]> {
        match self.field(name)? {
            FieldValue::Values(values) => Some(values),
            _ => None,
        }
    }

    /// Nested owned child or union occupant
    pub fn element(&self, name: &str) -> Option<&Element> {
        match self.field(name)? {
            FieldValue::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn elements(&self, name: &str) -> &[Element] {
        match self.field(name) {
            Some(FieldValue::Elements(elements)) => elements,
            _ => &[],
        }
    }

    pub fn reference(&self, name: &str) -> Option<&Reference> {
        match self.field(name)? {
            FieldValue::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    pub fn references(&self, name: &str) -> &[Reference] {
        match self.field(name) {
            Some(FieldValue::References(references)) => references,
            _ => &[],
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Value(Value),
    Values(Vec<Value>),
    Element(Box<Element>),
    Elements(Vec<Element>),
    Reference(Reference),
    References(Vec<Reference>),
}

/// Descriptor of a shared edge. `id` and `element_kind` identify the target;
/// `element` is only present when the target's value is embedded.
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub operation_kind: OperationKind,
    pub id: EntityId,
    pub element_kind: Kind,
    pub referenced_data_status: ReferencedDataStatus,
    pub element_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<Box<Element>>,
}

impl Reference {
    pub fn target(&self) -> Entity {
        Entity::new(self.element_kind, self.id)
    }
}

/// Output of one assembly: top-level elements by kind, then by ID.
#[derive(Clone, Default, PartialEq, Debug, Serialize)]
#[serde(transparent)]
pub struct Tree {
    kinds: BTreeMap<Kind, BTreeMap<EntityId, Element>>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity: &Entity) -> Option<&Element> {
        self.kinds.get(&entity.kind)?.get(&entity.id)
    }

    pub fn contains(&self, entity: &Entity) -> bool {
        self.get(entity).is_some()
    }

    pub fn insert(&mut self, element: Element) {
        self.kinds
            .entry(element.element_kind)
            .or_default()
            .insert(element.id, element);
    }

    /// Top-level elements of one kind, ascending ID
    pub fn kind(&self, kind: Kind) -> impl Iterator<Item = &Element> {
        self.kinds.get(&kind).into_iter().flat_map(BTreeMap::values)
    }

    pub fn kinds(&self) -> impl Iterator<Item = Kind> + '_ {
        self.kinds.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.kinds.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
