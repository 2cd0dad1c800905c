//! Participant enrollment in an event at a specific location.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::table::{Entity, EntitySchema, ObjectType, ScalarType};

/// Link between a participant and an event, carrying the spin allowance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct ParticipantEvent {
    pub id: i64,
    pub participant_id: i64,
    pub event_id: i64,
    pub event_location_id: i64,
    pub spins_remaining: i32,
    pub total_spins: i32,
    pub joined_at: NaiveDateTime,
}

impl Entity for ParticipantEvent {
    const OBJECT_TYPE: ObjectType = ObjectType::ParticipantEvent;
    type Id = i64;

    fn schema() -> EntitySchema {
        EntitySchema::new()
            .alias("enrollment")
            .field("spinsRemaining", ScalarType::Integer)
            .field("totalSpins", ScalarType::Integer)
            .field("joinedAt", ScalarType::Timestamp)
            .to_one("participant", ObjectType::Participant)
            .to_one("event", ObjectType::Event)
            .to_one("eventLocation", ObjectType::EventLocation)
            .to_many("spins", ObjectType::SpinHistory, "participant_event_id")
    }
}
