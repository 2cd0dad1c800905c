//! Rewards (prizes) offered by an event.

use serde::{Deserialize, Serialize};

use crate::table::{Entity, EntitySchema, ObjectType, ScalarType};

pub const REWARD_STATUSES: &[&str] = &["ACTIVE", "INACTIVE", "OUT_OF_STOCK"];

/// A prize that can be won on a spin.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reward {
    pub id: i64,

    pub event_id: i64,

    pub code: String,

    pub name: String,

    pub description: Option<String>,

    /// Monetary value of the prize.
    pub value: f64,

    /// Initial stock.
    pub quantity: i32,

    pub quantity_remaining: i32,

    /// Win probability in `[0, 1]`.
    pub probability: f64,

    /// One of [`REWARD_STATUSES`].
    pub status: String,
}

impl Entity for Reward {
    const OBJECT_TYPE: ObjectType = ObjectType::Reward;
    type Id = i64;

    fn schema() -> EntitySchema {
        EntitySchema::new()
            .alias("prize")
            .field("code", ScalarType::Text)
            .field("name", ScalarType::Text)
            .field("description", ScalarType::Text)
            .field("value", ScalarType::Decimal)
            .field("quantity", ScalarType::Integer)
            .field("quantityRemaining", ScalarType::Integer)
            .field("probability", ScalarType::Decimal)
            .field("status", ScalarType::Enum(REWARD_STATUSES))
            .to_one("event", ObjectType::Event)
            .to_many("spins", ObjectType::SpinHistory, "reward_id")
    }
}
