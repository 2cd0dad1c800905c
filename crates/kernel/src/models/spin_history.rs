//! Spin history: one record per wheel spin.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::table::{Entity, EntitySchema, ObjectType, ScalarType};

pub const SPIN_STATUSES: &[&str] = &["PENDING", "CLAIMED", "EXPIRED"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct SpinHistory {
    pub id: i64,

    pub participant_event_id: i64,

    /// Reward won; `None` on a losing spin.
    pub reward_id: Option<i64>,

    pub spin_time: NaiveDateTime,

    pub is_win: bool,

    /// Claim state of a winning spin, one of [`SPIN_STATUSES`].
    pub status: String,
}

impl Entity for SpinHistory {
    const OBJECT_TYPE: ObjectType = ObjectType::SpinHistory;
    type Id = i64;

    fn schema() -> EntitySchema {
        // Legacy table name is singular.
        EntitySchema::new()
            .table("spin_history")
            .alias("spins")
            .field("spinTime", ScalarType::Timestamp)
            .field_as("win", "is_win", ScalarType::Boolean)
            .field("status", ScalarType::Enum(SPIN_STATUSES))
            .to_one("participantEvent", ObjectType::ParticipantEvent)
            .to_one("reward", ObjectType::Reward)
    }
}
