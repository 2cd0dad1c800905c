//! Object type tags naming the lucky draw entity kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::FetchError;

/// Tag identifying a domain entity kind at the request boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectType {
    Event,
    EventLocation,
    Region,
    Province,
    Participant,
    ParticipantEvent,
    Reward,
    SpinHistory,
    GoldenHour,
}

impl ObjectType {
    /// Every known tag, in declaration order.
    pub const ALL: [ObjectType; 9] = [
        ObjectType::Event,
        ObjectType::EventLocation,
        ObjectType::Region,
        ObjectType::Province,
        ObjectType::Participant,
        ObjectType::ParticipantEvent,
        ObjectType::Reward,
        ObjectType::SpinHistory,
        ObjectType::GoldenHour,
    ];

    /// Wire name of the tag (`EVENT_LOCATION`).
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Event => "EVENT",
            ObjectType::EventLocation => "EVENT_LOCATION",
            ObjectType::Region => "REGION",
            ObjectType::Province => "PROVINCE",
            ObjectType::Participant => "PARTICIPANT",
            ObjectType::ParticipantEvent => "PARTICIPANT_EVENT",
            ObjectType::Reward => "REWARD",
            ObjectType::SpinHistory => "SPIN_HISTORY",
            ObjectType::GoldenHour => "GOLDEN_HOUR",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = FetchError;

    /// Parse a wire tag. Matching is exact: legacy spellings go through
    /// [`TypeRegistry::resolve_by_legacy_name`](super::TypeRegistry::resolve_by_legacy_name).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FetchError::UnknownObjectType(s.to_string()))
    }
}
