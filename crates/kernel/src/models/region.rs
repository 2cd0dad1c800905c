//! Sales regions grouping provinces and event locations.

use serde::{Deserialize, Serialize};

use crate::table::{Entity, EntitySchema, ObjectType, ScalarType};

pub const REGION_STATUSES: &[&str] = &["ACTIVE", "INACTIVE"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct Region {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub status: String,
}

impl Entity for Region {
    const OBJECT_TYPE: ObjectType = ObjectType::Region;
    type Id = i64;

    fn schema() -> EntitySchema {
        EntitySchema::new()
            .field("code", ScalarType::Text)
            .field("name", ScalarType::Text)
            .field("status", ScalarType::Enum(REGION_STATUSES))
            .to_many("provinces", ObjectType::Province, "region_id")
            .to_many("locations", ObjectType::EventLocation, "region_id")
    }
}
