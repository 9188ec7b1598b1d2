//! Mapping between domain entities and transport models.
//!
//! Entity to model is a field-by-field projection; the only derived field is
//! `CampModel::venue`, taken from the camp's location. The reverse direction
//! only ever writes `location.venue_name`, so the rest of a stored address
//! survives an update.

use codecamp_camps::camp::MIN_LENGTH_DAYS;
use codecamp_camps::{Camp, Location, Speaker, Talk};
use codecamp_core::DomainResult;

use crate::app::dto::{CampModel, CampRequest, SpeakerModel, TalkModel};

/// Map an optional source; absent stays absent.
pub fn map_one<S, T: From<S>>(source: Option<S>) -> Option<T> {
    source.map(T::from)
}

/// Map an optional collection; absent becomes empty.
pub fn map_many<S, T: From<S>>(source: Option<Vec<S>>) -> Vec<T> {
    source.into_iter().flatten().map(T::from).collect()
}

impl From<Speaker> for SpeakerModel {
    fn from(speaker: Speaker) -> Self {
        Self {
            speaker_id: speaker.id.map(i32::from).unwrap_or_default(),
            first_name: speaker.first_name,
            last_name: speaker.last_name,
            middle_name: speaker.middle_name,
            company: speaker.company,
            company_url: speaker.company_url,
            blog_url: speaker.blog_url,
            twitter: speaker.twitter,
            git_hub: speaker.github,
        }
    }
}

impl From<Talk> for TalkModel {
    fn from(talk: Talk) -> Self {
        Self {
            talk_id: talk.id.map(i32::from).unwrap_or_default(),
            title: talk.title,
            r#abstract: talk.r#abstract,
            level: talk.level,
            speaker: map_one(talk.speaker),
        }
    }
}

impl From<Camp> for CampModel {
    fn from(camp: Camp) -> Self {
        let loaded = camp.talks.is_some();
        Self {
            name: camp.name,
            moniker: camp.moniker,
            event_date: camp.event_date,
            length: camp.length,
            venue: camp.location.venue_name,
            talks: loaded.then(|| map_many(camp.talks)),
        }
    }
}

impl CampRequest {
    /// Build a new, unpersisted camp. Moniker, name and event date are required.
    pub fn into_camp(self) -> DomainResult<Camp> {
        let event_date = self.event_date;
        let camp = Camp::new(
            self.moniker.unwrap_or_default(),
            self.name.unwrap_or_default(),
            event_date.unwrap_or_default(),
        )
        .with_length(self.length.unwrap_or(MIN_LENGTH_DAYS))
        .with_location(self.venue.map(Location::venue).unwrap_or_default());

        let mut errors = camp.field_errors();
        if event_date.is_none() {
            errors.add("eventDate", "EventDate is required");
        }
        errors.into_result().map(|()| camp)
    }

    /// Merge the fields present in the request onto an existing camp.
    ///
    /// Nothing is written when the merged camp would be invalid.
    pub fn apply_to(self, camp: &mut Camp) -> DomainResult<()> {
        let mut merged = camp.clone();
        if let Some(moniker) = self.moniker {
            merged.moniker = moniker;
        }
        if let Some(name) = self.name {
            merged.name = name;
        }
        if let Some(event_date) = self.event_date {
            merged.event_date = event_date;
        }
        if let Some(length) = self.length {
            merged.length = length;
        }
        if let Some(venue) = self.venue {
            merged.location.venue_name = Some(venue);
        }

        merged.validate()?;
        *camp = merged;
        Ok(())
    }
}
