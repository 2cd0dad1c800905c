//! Registered participants (customers who spin).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::table::{Entity, EntitySchema, ObjectType, ScalarType};

pub const GENDERS: &[&str] = &["MALE", "FEMALE", "OTHER"];

pub const PARTICIPANT_STATUSES: &[&str] = &["ACTIVE", "BLOCKED"];

/// A customer registered for one or more events.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct Participant {
    pub id: i64,

    pub province_id: Option<i64>,

    pub full_name: String,

    /// Normalized phone number; the natural key used at the counter.
    pub phone: String,

    pub email: Option<String>,

    /// One of [`GENDERS`].
    pub gender: Option<String>,

    pub birth_date: Option<NaiveDate>,

    /// One of [`PARTICIPANT_STATUSES`].
    pub status: String,

    pub created_at: NaiveDateTime,
}

impl Entity for Participant {
    const OBJECT_TYPE: ObjectType = ObjectType::Participant;
    type Id = i64;

    fn schema() -> EntitySchema {
        EntitySchema::new()
            .alias("customer")
            .field("fullName", ScalarType::Text)
            .field("phone", ScalarType::Text)
            .field("email", ScalarType::Text)
            .field("gender", ScalarType::Enum(GENDERS))
            .field("birthDate", ScalarType::Date)
            .field("status", ScalarType::Enum(PARTICIPANT_STATUSES))
            .field("createdAt", ScalarType::Timestamp)
            .to_one("province", ObjectType::Province)
            .to_many("events", ObjectType::ParticipantEvent, "participant_id")
    }
}
