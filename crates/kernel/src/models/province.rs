//! Provinces within a region.

use serde::{Deserialize, Serialize};

use crate::table::{Entity, EntitySchema, ObjectType, ScalarType};

#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct Province {
    pub id: i64,
    pub region_id: i64,
    pub code: String,
    pub name: String,
}

impl Entity for Province {
    const OBJECT_TYPE: ObjectType = ObjectType::Province;
    type Id = i64;

    fn schema() -> EntitySchema {
        EntitySchema::new()
            .field("code", ScalarType::Text)
            .field("name", ScalarType::Text)
            .to_one("region", ObjectType::Region)
            .to_many("locations", ObjectType::EventLocation, "province_id")
            .to_many("participants", ObjectType::Participant, "province_id")
    }
}
