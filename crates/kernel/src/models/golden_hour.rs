//! Golden hours: time windows with boosted win odds at a location.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::table::{Entity, EntitySchema, ObjectType, ScalarType};

#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct GoldenHour {
    pub id: i64,
    pub event_location_id: i64,
    pub reward_id: Option<i64>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Probability multiplier applied inside the window.
    pub multiplier: f64,
    pub is_active: bool,
}

impl Entity for GoldenHour {
    const OBJECT_TYPE: ObjectType = ObjectType::GoldenHour;
    type Id = i64;

    fn schema() -> EntitySchema {
        EntitySchema::new()
            .field("startTime", ScalarType::Timestamp)
            .field("endTime", ScalarType::Timestamp)
            .field("multiplier", ScalarType::Decimal)
            .field_as("active", "is_active", ScalarType::Boolean)
            .to_one("eventLocation", ObjectType::EventLocation)
            .to_one("reward", ObjectType::Reward)
    }
}
