//! Per-request unit of work over a shared `CampStore`.
//!
//! Queries go straight to the store. Mutations are staged in the repository and
//! only reach the store on `save_changes`, which commits them in one
//! transaction. A repository is created for each request and never shared.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use codecamp_camps::{Camp, Talk};
use codecamp_core::{Entity, TalkId};

use crate::camp_store::{CampQuery, CampStore, StagedChange, StoreError};

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Update/delete was staged for a camp that has never been committed.
    #[error("camp '{0}' has not been persisted")]
    Unpersisted(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct CampRepository {
    store: Arc<dyn CampStore>,
    staged: Vec<StagedChange>,
}

impl CampRepository {
    pub fn new(store: Arc<dyn CampStore>) -> Self {
        Self {
            store,
            staged: Vec::new(),
        }
    }

    /// All camps ordered by id; `include_talks` loads talks and their speakers.
    pub async fn get_all_camps(&self, include_talks: bool) -> Result<Vec<Camp>, RepositoryError> {
        Ok(self.store.query_camps(&CampQuery::all(include_talks)).await?)
    }

    /// The camp with exactly this (case-sensitive) moniker.
    pub async fn get_camp(&self, moniker: &str, include_talks: bool) -> Result<Option<Camp>, RepositoryError> {
        let camps = self
            .store
            .query_camps(&CampQuery::by_moniker(moniker, include_talks))
            .await?;
        Ok(camps.into_iter().next())
    }

    /// Camps taking place on exactly `date`.
    pub async fn get_all_camps_by_event_date(
        &self,
        date: NaiveDate,
        include_talks: bool,
    ) -> Result<Vec<Camp>, RepositoryError> {
        Ok(self
            .store
            .query_camps(&CampQuery::by_event_date(date, include_talks))
            .await?)
    }

    /// A talk of the camp with `moniker`; `None` when either does not exist.
    pub async fn get_talk_by_moniker(&self, moniker: &str, talk_id: TalkId) -> Result<Option<Talk>, RepositoryError> {
        Ok(self.store.find_talk(moniker, talk_id).await?)
    }

    /// Stage insertion of a new camp (and any talks attached to it).
    pub fn add_camp(&mut self, camp: Camp) {
        self.stage(StagedChange::Insert(camp));
    }

    /// Stage the current state of a persisted camp, after mutating it in place.
    pub fn update_camp(&mut self, camp: Camp) -> Result<(), RepositoryError> {
        if !camp.is_persisted() {
            return Err(RepositoryError::Unpersisted(camp.moniker));
        }
        self.stage(StagedChange::Update(camp));
        Ok(())
    }

    /// Stage deletion of a persisted camp together with its talks.
    pub fn delete_camp(&mut self, camp: Camp) -> Result<(), RepositoryError> {
        if !camp.is_persisted() {
            return Err(RepositoryError::Unpersisted(camp.moniker));
        }
        self.stage(StagedChange::Delete(camp));
        Ok(())
    }

    fn stage(&mut self, change: StagedChange) {
        tracing::debug!(kind = change.kind(), moniker = %change.camp().moniker, "staging change");
        self.staged.push(change);
    }

    pub fn has_changes(&self) -> bool {
        !self.staged.is_empty()
    }

    /// Commit every staged change in one transaction.
    ///
    /// Returns whether at least one row was affected. Store failures are
    /// returned as errors, never as `false`. Staged changes are consumed by the
    /// attempt either way.
    pub async fn save_changes(&mut self) -> Result<bool, RepositoryError> {
        let changes = std::mem::take(&mut self.staged);
        let count = changes.len();
        let affected = self.store.commit(changes).await?;
        tracing::debug!(changes = count, rows_affected = affected, "committed staged changes");
        Ok(affected > 0)
    }
}

impl core::fmt::Debug for CampRepository {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CampRepository")
            .field("staged", &self.staged)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camp_store::InMemoryCampStore;
    use codecamp_camps::{Location, Speaker};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn repo(store: &Arc<InMemoryCampStore>) -> CampRepository {
        CampRepository::new(store.clone())
    }

    fn atl2018() -> Camp {
        Camp::new("ATL2018", "Atlanta Code Camp", date(2018, 10, 18))
            .with_location(Location::venue("Atlanta Convention Center"))
            .with_talks(vec![Talk::new(
                "Entity Framework From Scratch",
                "Entity Framework from scratch in an hour.",
                100,
                Speaker::new("Shawn", "Wildermuth"),
            )])
    }

    #[tokio::test]
    async fn add_is_not_visible_until_saved() {
        let store = Arc::new(InMemoryCampStore::new());
        let mut r = repo(&store);

        r.add_camp(atl2018());
        assert!(r.has_changes());
        assert!(r.get_camp("ATL2018", false).await.unwrap().is_none());

        assert!(r.save_changes().await.unwrap());
        assert!(!r.has_changes());
        assert!(r.get_camp("ATL2018", false).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn save_without_changes_reports_false() {
        let store = Arc::new(InMemoryCampStore::new());
        let mut r = repo(&store);
        assert!(!r.save_changes().await.unwrap());
    }

    #[tokio::test]
    async fn moniker_lookup_is_case_sensitive() {
        let store = Arc::new(InMemoryCampStore::new());
        let mut r = repo(&store);
        r.add_camp(atl2018());
        r.save_changes().await.unwrap();

        assert!(r.get_camp("atl2018", false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn staging_update_or_delete_requires_persisted_camp() {
        let store = Arc::new(InMemoryCampStore::new());
        let mut r = repo(&store);

        assert!(matches!(r.update_camp(atl2018()), Err(RepositoryError::Unpersisted(_))));
        assert!(matches!(r.delete_camp(atl2018()), Err(RepositoryError::Unpersisted(_))));
        assert!(!r.has_changes());
    }

    #[tokio::test]
    async fn update_mutates_in_place_and_keeps_talks() {
        let store = Arc::new(InMemoryCampStore::new());
        let mut r = repo(&store);
        r.add_camp(atl2018());
        r.save_changes().await.unwrap();

        let mut camp = r.get_camp("ATL2018", false).await.unwrap().unwrap();
        camp.name = "Atlanta Code Camp (renamed)".to_string();
        r.update_camp(camp).unwrap();
        assert!(r.save_changes().await.unwrap());

        let camp = r.get_camp("ATL2018", true).await.unwrap().unwrap();
        assert_eq!(camp.name, "Atlanta Code Camp (renamed)");
        assert_eq!(camp.talks().len(), 1);
    }

    #[tokio::test]
    async fn delete_cascades_to_talks() {
        let store = Arc::new(InMemoryCampStore::new());
        let mut r = repo(&store);
        r.add_camp(atl2018());
        r.save_changes().await.unwrap();

        let camp = r.get_camp("ATL2018", true).await.unwrap().unwrap();
        let talk_id = camp.talks()[0].id.unwrap();
        assert!(r.get_talk_by_moniker("ATL2018", talk_id).await.unwrap().is_some());

        r.delete_camp(camp).unwrap();
        assert!(r.save_changes().await.unwrap());

        assert!(r.get_camp("ATL2018", false).await.unwrap().is_none());
        assert!(r.get_talk_by_moniker("ATL2018", talk_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_commit_is_an_error_not_false() {
        let store = Arc::new(InMemoryCampStore::new());
        let mut r = repo(&store);
        r.add_camp(atl2018());
        r.add_camp(atl2018());

        let err = r.save_changes().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Store(StoreError::UniqueViolation(_))));
        assert!(r.get_all_camps(false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn repositories_do_not_share_staged_changes() {
        let store = Arc::new(InMemoryCampStore::new());
        let mut first = repo(&store);
        let mut second = repo(&store);

        first.add_camp(atl2018());
        assert!(!second.has_changes());
        assert!(!second.save_changes().await.unwrap());
        assert!(first.save_changes().await.unwrap());
    }
}
