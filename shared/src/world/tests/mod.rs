#![cfg(test)]


use crate::{
    Engine, Kind, OwnedField, OwnedListField, RefField, RefListField, Schema, TypeDef,
    UnionField, UnionListField, ValueField, ValueKind, ValueListField,
};

pub(crate) const POSITION: Kind = Kind::new("position");
pub(crate) const ITEM: Kind = Kind::new("item");
pub(crate) const PLAYER: Kind = Kind::new("player");
pub(crate) const ZONE: Kind = Kind::new("zone");

pub(crate) fn schema() -> Schema {
    Schema::builder()
        .add_type(
            TypeDef::new(ZONE)
                .owned_list("players", PLAYER)
                .value_list("tags", ValueKind::Text),
        )
        .add_type(
            TypeDef::new(PLAYER)
                .owned("position", POSITION)
                .owned_list("items", ITEM)
                .shared("target", &[PLAYER, ITEM])
                .shared_list("friends", &[PLAYER])
                .union("origin", &[POSITION, ITEM])
                .union_list("pets", &[ITEM, POSITION]),
        )
        .add_type(
            TypeDef::new(ITEM)
                .value("name", ValueKind::Text)
                .shared("boundTo", &[PLAYER]),
        )
        .add_type(
            TypeDef::new(POSITION)
                .value("x", ValueKind::Float)
                .value("y", ValueKind::Float),
        )
        .build()
}

pub(crate) struct Fields {
    pub players: OwnedListField,
    pub tags: ValueListField,
    pub position: OwnedField,
    pub items: OwnedListField,
    pub target: RefField,
    pub friends: RefListField,
    pub origin: UnionField,
    pub pets: UnionListField,
    pub name: ValueField,
    pub bound_to: RefField,
    pub x: ValueField,
    pub y: ValueField,
}

impl Fields {
    pub fn resolve(schema: &Schema) -> Self {
        Self {
            players: schema.owned_list_field(ZONE, "players").unwrap(),
            tags: schema.value_list_field(ZONE, "tags").unwrap(),
            position: schema.owned_field(PLAYER, "position").unwrap(),
            items: schema.owned_list_field(PLAYER, "items").unwrap(),
            target: schema.ref_field(PLAYER, "target").unwrap(),
            friends: schema.ref_list_field(PLAYER, "friends").unwrap(),
            origin: schema.union_field(PLAYER, "origin").unwrap(),
            pets: schema.union_list_field(PLAYER, "pets").unwrap(),
            name: schema.value_field(ITEM, "name").unwrap(),
            bound_to: schema.ref_field(ITEM, "boundTo").unwrap(),
            x: schema.value_field(POSITION, "x").unwrap(),
            y: schema.value_field(POSITION, "y").unwrap(),
        }
    }
}

pub(crate) fn setup() -> (Engine, Fields) {
    let schema = schema();
    let fields = Fields::resolve(&schema);
    (Engine::new(schema), fields)
}
