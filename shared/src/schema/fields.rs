use super::kind::{Kind, ValueKind};

/// Position of a field inside the declaration of its owning kind.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FieldId {
    pub owner: Kind,
    pub index: usize,
}

macro_rules! field_handle {
    ($(#[$meta:meta])* $name:ident { $($extra:ident: $extra_ty:ty),* }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Debug)]
        pub struct $name {
            pub(crate) id: FieldId,
            $(pub(crate) $extra: $extra_ty,)*
        }

        impl $name {
            pub fn id(&self) -> FieldId {
                self.id
            }

            pub fn owner(&self) -> Kind {
                self.id.owner
            }
        }
    };
}

field_handle!(
    /// Handle to a scalar field
    ValueField { value_kind: ValueKind }
);
field_handle!(
    /// Handle to a list-of-scalars field
    ValueListField { value_kind: ValueKind }
);
field_handle!(
    /// Handle to an owned single child
    OwnedField { child: Kind }
);
field_handle!(
    /// Handle to an owned child list
    OwnedListField { child: Kind }
);
field_handle!(
    /// Handle to a shared single reference
    RefField {}
);
field_handle!(
    /// Handle to a shared reference list
    RefListField {}
);
field_handle!(
    /// Handle to an owned union
    UnionField {}
);
field_handle!(
    /// Handle to an owned union list
    UnionListField {}
);

impl ValueField {
    pub fn value_kind(&self) -> ValueKind {
        self.value_kind
    }
}

impl ValueListField {
    pub fn value_kind(&self) -> ValueKind {
        self.value_kind
    }
}

impl OwnedField {
    pub fn child(&self) -> Kind {
        self.child
    }
}

impl OwnedListField {
    pub fn child(&self) -> Kind {
        self.child
    }
}
