//! Sample data for a fresh store.

use std::sync::Arc;

use chrono::NaiveDate;

use codecamp_camps::{Camp, Location, Speaker, Talk};

use crate::camp_store::CampStore;
use crate::repository::{CampRepository, RepositoryError};

/// Insert the sample camps when the store holds no camps at all.
///
/// Returns `true` when data was written. Safe to call on every startup.
#[tracing::instrument(skip(store), err)]
pub async fn seed_sample_data(store: Arc<dyn CampStore>) -> Result<bool, RepositoryError> {
    let mut repository = CampRepository::new(store);
    if !repository.get_all_camps(false).await?.is_empty() {
        tracing::debug!("store already holds camps, skipping sample data");
        return Ok(false);
    }

    for camp in sample_camps() {
        repository.add_camp(camp);
    }
    let seeded = repository.save_changes().await?;
    tracing::info!(seeded, "sample data loaded");
    Ok(seeded)
}

/// The sample camps, unpersisted.
pub fn sample_camps() -> Vec<Camp> {
    vec![atlanta(), new_york()]
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn atlanta() -> Camp {
    let shawn = Speaker {
        first_name: "Shawn".into(),
        last_name: "Wildermuth".into(),
        blog_url: Some("http://wildermuth.com".into()),
        company: Some("Wilder Minds LLC".into()),
        company_url: Some("http://wilderminds.com".into()),
        github: Some("shawnwildermuth".into()),
        twitter: Some("shawnwildermuth".into()),
        ..Speaker::default()
    };
    let resa = Speaker {
        first_name: "Resa".into(),
        last_name: "Wildermuth".into(),
        blog_url: Some("http://shawnandresa.com".into()),
        company: Some("Wilder Minds LLC".into()),
        company_url: Some("http://wilderminds.com".into()),
        github: Some("resawildermuth".into()),
        twitter: Some("resawildermuth".into()),
        ..Speaker::default()
    };

    Camp::new("ATL2018", "Atlanta Code Camp", date(2018, 10, 18))
        .with_length(1)
        .with_location(Location {
            venue_name: Some("Atlanta Convention Center".into()),
            address1: Some("123 Main Street".into()),
            city_town: Some("Atlanta".into()),
            state_province: Some("GA".into()),
            postal_code: Some("12345".into()),
            country: Some("USA".into()),
            ..Location::default()
        })
        .with_talks(vec![
            Talk::new(
                "Entity Framework From Scratch",
                "Entity Framework from scratch in an hour. Probably cover it all",
                100,
                shawn,
            ),
            Talk::new(
                "Writing Sample Data Made Easy",
                "Thinking of good sample data examples is tiring.",
                200,
                resa,
            ),
        ])
}

fn new_york() -> Camp {
    let speaker = Speaker {
        first_name: "Dana".into(),
        last_name: "Okafor".into(),
        company: Some("Harbor Labs".into()),
        company_url: Some("http://harborlabs.example".into()),
        twitter: Some("danaokafor".into()),
        ..Speaker::default()
    };

    Camp::new("NYC2019", "New York Code Camp", date(2019, 5, 11))
        .with_length(2)
        .with_location(Location {
            venue_name: Some("Javits Center".into()),
            address1: Some("429 11th Avenue".into()),
            city_town: Some("New York".into()),
            state_province: Some("NY".into()),
            postal_code: Some("10001".into()),
            country: Some("USA".into()),
            ..Location::default()
        })
        .with_talks(vec![Talk::new(
            "Async Rust in Practice",
            "Pools, transactions and cancellation without the tears.",
            300,
            speaker,
        )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camp_store::InMemoryCampStore;

    #[test]
    fn sample_camps_are_valid() {
        for camp in sample_camps() {
            camp.validate().unwrap();
        }
    }

    #[tokio::test]
    async fn seeds_only_an_empty_store() {
        let store: Arc<dyn CampStore> = Arc::new(InMemoryCampStore::new());

        assert!(seed_sample_data(store.clone()).await.unwrap());
        assert!(!seed_sample_data(store.clone()).await.unwrap());

        let repository = CampRepository::new(store);
        let camps = repository.get_all_camps(true).await.unwrap();
        assert_eq!(camps.len(), 2);

        let atl = repository.get_camp("ATL2018", true).await.unwrap().unwrap();
        assert_eq!(atl.talks().len(), 2);
        assert_eq!(atl.location.city_town.as_deref(), Some("Atlanta"));
    }

    #[tokio::test]
    async fn sample_camps_fall_on_different_dates() {
        let store: Arc<dyn CampStore> = Arc::new(InMemoryCampStore::new());
        seed_sample_data(store.clone()).await.unwrap();

        let repository = CampRepository::new(store);
        let on_date = repository
            .get_all_camps_by_event_date(date(2018, 10, 18), false)
            .await
            .unwrap();
        assert_eq!(on_date.len(), 1);
        assert_eq!(on_date[0].moniker, "ATL2018");
    }
}
