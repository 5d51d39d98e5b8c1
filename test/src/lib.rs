
pub use actions::{GameAction, GameActions};
pub use game::{
    schema, Fields, EQUIPMENT_SET, GEAR_SCORE, ITEM, PLAYER, POSITION, ZONE, ZONE_ITEM,
};
pub use helpers::*;
