use super::kind::{Kind, ValueKind};

/// The closed set of field behaviours the engine knows how to store, cascade,
/// dereference and assemble.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FieldKind {
    /// A scalar
    Value(ValueKind),
    /// An ordered list of scalars
    ValueList(ValueKind),
    /// An exclusively owned child, created together with its owner
    Owned(Kind),
    /// An ordered list of exclusively owned children
    OwnedList(Kind),
    /// A non-owning edge to one entity of any of the candidate kinds
    Shared(Vec<Kind>),
    /// An ordered list of non-owning edges
    SharedList(Vec<Kind>),
    /// An owned child whose kind is one of the candidates
    Union(Vec<Kind>),
    /// An ordered list of owned children, each one of the candidates
    UnionList(Vec<Kind>),
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Value(_) => "Value",
            FieldKind::ValueList(_) => "ValueList",
            FieldKind::Owned(_) => "Owned",
            FieldKind::OwnedList(_) => "OwnedList",
            FieldKind::Shared(_) => "Shared",
            FieldKind::SharedList(_) => "SharedList",
            FieldKind::Union(_) => "Union",
            FieldKind::UnionList(_) => "UnionList",
        }
    }

    /// Kinds of entity this field can point at, empty for scalar fields.
    pub fn candidates(&self) -> &[Kind] {
        match self {
            FieldKind::Value(_) | FieldKind::ValueList(_) => &[],
            FieldKind::Owned(kind) | FieldKind::OwnedList(kind) => std::slice::from_ref(kind),
            FieldKind::Shared(kinds)
            | FieldKind::SharedList(kinds)
            | FieldKind::Union(kinds)
            | FieldKind::UnionList(kinds) => kinds,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Declaration of one entity type: its name and its ordered fields.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TypeDef {
    pub kind: Kind,
    pub fields: Vec<FieldDef>,
}

impl TypeDef {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldDef { name, kind });
        self
    }

    pub fn value(self, name: &'static str, kind: ValueKind) -> Self {
        self.field(name, FieldKind::Value(kind))
    }

    pub fn value_list(self, name: &'static str, kind: ValueKind) -> Self {
        self.field(name, FieldKind::ValueList(kind))
    }

    pub fn owned(self, name: &'static str, child: Kind) -> Self {
        self.field(name, FieldKind::Owned(child))
    }

    pub fn owned_list(self, name: &'static str, child: Kind) -> Self {
        self.field(name, FieldKind::OwnedList(child))
    }

    pub fn shared(self, name: &'static str, targets: &[Kind]) -> Self {
        self.field(name, FieldKind::Shared(targets.to_vec()))
    }

    pub fn shared_list(self, name: &'static str, targets: &[Kind]) -> Self {
        self.field(name, FieldKind::SharedList(targets.to_vec()))
    }

    pub fn union(self, name: &'static str, candidates: &[Kind]) -> Self {
        self.field(name, FieldKind::Union(candidates.to_vec()))
    }

    pub fn union_list(self, name: &'static str, candidates: &[Kind]) -> Self {
        self.field(name, FieldKind::UnionList(candidates.to_vec()))
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }
}
