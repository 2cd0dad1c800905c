//! Event locations: the physical venues where an event runs.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::table::{Entity, EntitySchema, ObjectType, ScalarType};

pub const LOCATION_STATUSES: &[&str] = &["ACTIVE", "INACTIVE"];

/// A venue taking part in an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventLocation {
    pub id: i64,

    pub event_id: i64,

    pub region_id: i64,

    pub province_id: Option<i64>,

    pub name: String,

    pub address: Option<String>,

    /// One of [`LOCATION_STATUSES`].
    pub status: String,

    /// Overrides the event's daily allowance when set.
    pub max_spin_per_day: Option<i32>,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    pub created_at: NaiveDateTime,
}

impl Entity for EventLocation {
    const OBJECT_TYPE: ObjectType = ObjectType::EventLocation;
    type Id = i64;

    fn schema() -> EntitySchema {
        EntitySchema::new()
            .alias("location")
            .alias("locations")
            .field("name", ScalarType::Text)
            .field("address", ScalarType::Text)
            .field("status", ScalarType::Enum(LOCATION_STATUSES))
            .field("maxSpinPerDay", ScalarType::Integer)
            .field("latitude", ScalarType::Decimal)
            .field("longitude", ScalarType::Decimal)
            .field("createdAt", ScalarType::Timestamp)
            .to_one("event", ObjectType::Event)
            .to_one("region", ObjectType::Region)
            .to_one("province", ObjectType::Province)
            .to_many("participants", ObjectType::ParticipantEvent, "event_location_id")
            .to_many("goldenHours", ObjectType::GoldenHour, "event_location_id")
    }
}
