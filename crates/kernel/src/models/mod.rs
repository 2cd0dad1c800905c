//! Lucky draw entity models and the registry built from them.

pub mod event;
pub mod event_location;
pub mod golden_hour;
pub mod participant;
pub mod participant_event;
pub mod province;
pub mod region;
pub mod reward;
pub mod spin_history;

pub use event::Event;
pub use event_location::EventLocation;
pub use golden_hour::GoldenHour;
pub use participant::Participant;
pub use participant_event::ParticipantEvent;
pub use province::Province;
pub use region::Region;
pub use reward::Reward;
pub use spin_history::SpinHistory;

use anyhow::{Context, Result};

use crate::table::{ObjectType, TypeRegistry};

/// Build the type registry for every lucky draw entity.
pub fn registry() -> Result<TypeRegistry> {
    TypeRegistry::builder()
        .register::<Event>()
        .register::<EventLocation>()
        .register::<Region>()
        .register::<Province>()
        .register::<Participant>()
        .register::<ParticipantEvent>()
        .register::<Reward>()
        .register::<SpinHistory>()
        .register::<GoldenHour>()
        .search_path(ObjectType::Event, ObjectType::Region, "locations.region")
        .search_path(ObjectType::Event, ObjectType::Province, "locations.province")
        .search_path(ObjectType::Event, ObjectType::Participant, "participants.participant")
        .search_path(ObjectType::Participant, ObjectType::Event, "events.event")
        .search_path(ObjectType::Region, ObjectType::Event, "locations.event")
        .build()
        .context("invalid lucky draw entity metadata")
}
