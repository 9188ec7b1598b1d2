use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use codecamp_camps::{Camp, Talk};
use codecamp_core::TalkId;

/// Which camps a query selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampFilter {
    All,
    /// Exact, case-sensitive moniker match.
    Moniker(String),
    /// Exact event date match.
    EventDate(NaiveDate),
}

/// A camp query: selection + load depth.
///
/// A shallow query returns camps with `talks == None`; a deep one attaches
/// every talk (ordered by id) with its speaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampQuery {
    pub filter: CampFilter,
    pub include_talks: bool,
}

impl CampQuery {
    pub fn all(include_talks: bool) -> Self {
        Self {
            filter: CampFilter::All,
            include_talks,
        }
    }

    pub fn by_moniker(moniker: impl Into<String>, include_talks: bool) -> Self {
        Self {
            filter: CampFilter::Moniker(moniker.into()),
            include_talks,
        }
    }

    pub fn by_event_date(date: NaiveDate, include_talks: bool) -> Self {
        Self {
            filter: CampFilter::EventDate(date),
            include_talks,
        }
    }
}

/// A mutation waiting for the next commit.
///
/// - `Insert` stores the camp, its talks, and any talk speaker without an id.
/// - `Update` overwrites the camp's scalar fields and location (talks are untouched).
/// - `Delete` removes the camp's talks, then the camp. Speakers survive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedChange {
    Insert(Camp),
    Update(Camp),
    Delete(Camp),
}

impl StagedChange {
    pub fn kind(&self) -> &'static str {
        match self {
            StagedChange::Insert(_) => "insert",
            StagedChange::Update(_) => "update",
            StagedChange::Delete(_) => "delete",
        }
    }

    pub fn camp(&self) -> &Camp {
        match self {
            StagedChange::Insert(c) | StagedChange::Update(c) | StagedChange::Delete(c) => c,
        }
    }
}

/// Camp store operation error.
///
/// These are **infrastructure errors**; business validation happens before
/// anything reaches the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint (the camp moniker) rejected the commit.
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// An update/delete referenced a camp that was never persisted.
    #[error("entity is not persisted: {0}")]
    NotPersisted(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("migration failed: {0}")]
    Migration(String),
}

/// Shared, thread-safe camp storage.
#[async_trait::async_trait]
pub trait CampStore: Send + Sync {
    /// Camps matching the query, ordered by id.
    async fn query_camps(&self, query: &CampQuery) -> Result<Vec<Camp>, StoreError>;

    /// A talk (with speaker) of the camp with the given moniker.
    async fn find_talk(&self, moniker: &str, talk_id: TalkId) -> Result<Option<Talk>, StoreError>;

    /// Apply all changes in one transaction and return the number of rows affected.
    ///
    /// Either every change is applied or none is.
    async fn commit(&self, changes: Vec<StagedChange>) -> Result<u64, StoreError>;
}

#[async_trait::async_trait]
impl<S> CampStore for Arc<S>
where
    S: CampStore + ?Sized,
{
    async fn query_camps(&self, query: &CampQuery) -> Result<Vec<Camp>, StoreError> {
        (**self).query_camps(query).await
    }

    async fn find_talk(&self, moniker: &str, talk_id: TalkId) -> Result<Option<Talk>, StoreError> {
        (**self).find_talk(moniker, talk_id).await
    }

    async fn commit(&self, changes: Vec<StagedChange>) -> Result<u64, StoreError> {
        (**self).commit(changes).await
    }
}
