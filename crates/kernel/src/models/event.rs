//! Lucky draw events (campaigns).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::table::{Entity, EntitySchema, ObjectType, ScalarType};

/// Lifecycle states of an event.
pub const EVENT_STATUSES: &[&str] = &["DRAFT", "ACTIVE", "PAUSED", "FINISHED"];

/// A promotional campaign running at one or more locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: i64,

    /// Short business code, unique per campaign.
    pub code: String,

    pub name: String,

    pub description: Option<String>,

    /// First day participants can spin.
    pub start_date: NaiveDate,

    /// Last day participants can spin (inclusive).
    pub end_date: NaiveDate,

    /// One of [`EVENT_STATUSES`].
    pub status: String,

    /// Default daily spin allowance per participant.
    pub max_spin_per_day: i32,

    pub created_at: NaiveDateTime,
}

impl Entity for Event {
    const OBJECT_TYPE: ObjectType = ObjectType::Event;
    type Id = i64;

    fn schema() -> EntitySchema {
        EntitySchema::new()
            .alias("campaign")
            .field("code", ScalarType::Text)
            .field("name", ScalarType::Text)
            .field("description", ScalarType::Text)
            .field("startDate", ScalarType::Date)
            .field("endDate", ScalarType::Date)
            .field("status", ScalarType::Enum(EVENT_STATUSES))
            .field("maxSpinPerDay", ScalarType::Integer)
            .field("createdAt", ScalarType::Timestamp)
            .to_many("locations", ObjectType::EventLocation, "event_id")
            .to_many("rewards", ObjectType::Reward, "event_id")
            .to_many("participants", ObjectType::ParticipantEvent, "event_id")
    }
}
