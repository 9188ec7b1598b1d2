use chrono::NaiveDate;

use codecamp_core::{CampId, DomainResult, Entity, ValidationErrors, ValueObject};

use crate::moniker::validate_moniker;
use crate::talk::Talk;

pub const MAX_NAME_LEN: usize = 100;
pub const MIN_LENGTH_DAYS: i32 = 1;
pub const MAX_LENGTH_DAYS: i32 = 100;

/// Venue of a camp. Embedded in the camp; it has no identity of its own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub venue_name: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub city_town: Option<String>,
    pub state_province: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl Location {
    pub fn venue(name: impl Into<String>) -> Self {
        Self {
            venue_name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl ValueObject for Location {}

/// A scheduled event, addressed externally by its unique moniker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Camp {
    pub id: Option<CampId>,
    pub moniker: String,
    pub name: String,
    pub event_date: NaiveDate,
    /// Duration in days.
    pub length: i32,
    pub location: Location,
    /// `None` when the camp was loaded shallow (without its talks).
    pub talks: Option<Vec<Talk>>,
}

impl Camp {
    pub fn new(moniker: impl Into<String>, name: impl Into<String>, event_date: NaiveDate) -> Self {
        Self {
            id: None,
            moniker: moniker.into(),
            name: name.into(),
            event_date,
            length: MIN_LENGTH_DAYS,
            location: Location::default(),
            talks: None,
        }
    }

    pub fn with_length(mut self, length: i32) -> Self {
        self.length = length;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn with_talks(mut self, talks: Vec<Talk>) -> Self {
        self.talks = Some(talks);
        self
    }

    /// Talks that were loaded with the camp (empty for a shallow load).
    pub fn talks(&self) -> &[Talk] {
        self.talks.as_deref().unwrap_or_default()
    }

    /// Field rules every stored camp satisfies, keyed by wire field name.
    pub fn field_errors(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        validate_moniker(&self.moniker, &mut errors);
        validate_name(&self.name, &mut errors);
        validate_length(self.length, &mut errors);
        errors
    }

    pub fn validate(&self) -> DomainResult<()> {
        self.field_errors().into_result()
    }
}

impl Entity for Camp {
    type Id = CampId;

    fn id(&self) -> Option<CampId> {
        self.id
    }
}

fn validate_name(name: &str, errors: &mut ValidationErrors) {
    if name.trim().is_empty() {
        errors.add("name", "Name is required");
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.add("name", format!("Name must be at most {MAX_NAME_LEN} characters"));
    }
}

fn validate_length(length: i32, errors: &mut ValidationErrors) {
    if !(MIN_LENGTH_DAYS..=MAX_LENGTH_DAYS).contains(&length) {
        errors.add(
            "length",
            format!("Length must be between {MIN_LENGTH_DAYS} and {MAX_LENGTH_DAYS} days"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codecamp_core::DomainError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_camp_defaults_to_one_day_shallow_and_unpersisted() {
        let camp = Camp::new("ATL2019", "Atlanta Code Camp 2019", date(2019, 10, 17));
        assert_eq!(camp.length, 1);
        assert!(camp.talks.is_none());
        assert!(camp.talks().is_empty());
        assert!(!camp.is_persisted());
        assert!(camp.validate().is_ok());
    }

    #[test]
    fn validate_reports_every_failing_field() {
        let camp = Camp::new("", "  ", date(2019, 10, 17)).with_length(0);
        let err = camp.validate().unwrap_err();
        let DomainError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.get("moniker").is_some());
        assert!(errors.get("name").is_some());
        assert!(errors.get("length").is_some());
    }

    #[test]
    fn name_longer_than_limit_is_rejected() {
        let camp = Camp::new("X", "n".repeat(MAX_NAME_LEN + 1), date(2019, 1, 1));
        assert!(camp.validate().is_err());
    }

    #[test]
    fn location_venue_only_sets_venue_name() {
        let location = Location::venue("Atlanta Convention Center");
        assert_eq!(location.venue_name.as_deref(), Some("Atlanta Convention Center"));
        assert!(location.address1.is_none());
        assert!(location.country.is_none());
    }
}
