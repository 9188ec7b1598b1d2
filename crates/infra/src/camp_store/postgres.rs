//! Postgres-backed camp store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `UniqueViolation` | Moniker already used by another camp |
//! | Database (other) | Any other | `Database` | FK/check violations, other database errors |
//! | PoolClosed | N/A | `Database` | Connection pool was closed |
//! | Other | N/A | `Database` | Network errors, connection failures, etc. |
//!
//! ## Thread Safety
//!
//! `PostgresCampStore` is `Send + Sync`; the SQLx pool handles connection
//! management. Every commit runs in a single transaction.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::{instrument, Span};

use codecamp_camps::{Camp, Location, Speaker, Talk};
use codecamp_core::{CampId, SpeakerId, TalkId};

use super::r#trait::{CampFilter, CampQuery, CampStore, StagedChange, StoreError};

const TALK_COLUMNS: &str = r#"
    t.talk_id,
    t.camp_id,
    t.title,
    t.abstract,
    t.level,
    s.speaker_id,
    s.first_name,
    s.last_name,
    s.middle_name,
    s.company,
    s.company_url,
    s.blog_url,
    s.twitter,
    s.github
"#;

/// Postgres-backed camp store.
///
/// Owned talks are deleted explicitly before their camp; the schema carries no
/// cascading foreign keys.
#[derive(Debug, Clone)]
pub struct PostgresCampStore {
    pool: Arc<PgPool>,
}

impl PostgresCampStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Load camps matching the query, ordered by `camp_id`.
    #[instrument(skip(self), fields(filter = ?query.filter, include_talks = query.include_talks), err)]
    pub async fn load_camps(&self, query: &CampQuery) -> Result<Vec<Camp>, StoreError> {
        let (moniker, event_date): (Option<&str>, Option<NaiveDate>) = match &query.filter {
            CampFilter::All => (None, None),
            CampFilter::Moniker(m) => (Some(m.as_str()), None),
            CampFilter::EventDate(d) => (None, Some(*d)),
        };

        let rows = sqlx::query(
            r#"
            SELECT
                camp_id,
                moniker,
                name,
                event_date,
                length,
                venue_name,
                address1,
                address2,
                address3,
                city_town,
                state_province,
                postal_code,
                country
            FROM camps
            WHERE ($1::text IS NULL OR moniker = $1)
                AND ($2::date IS NULL OR event_date = $2)
            ORDER BY camp_id ASC
            "#,
        )
        .bind(moniker)
        .bind(event_date)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_camps", e))?;

        let mut camps = Vec::with_capacity(rows.len());
        for row in rows {
            let camp = CampRow::from_row(&row)
                .map_err(|e| StoreError::Database(format!("failed to read camp row: {e}")))?;
            camps.push(Camp::from(camp));
        }

        if query.include_talks && !camps.is_empty() {
            let ids: Vec<i32> = camps.iter().filter_map(|c| c.id.map(i32::from)).collect();
            let mut talks = self.load_talks(&ids).await?;
            for camp in &mut camps {
                let owned = camp.id.and_then(|id| talks.remove(&id)).unwrap_or_default();
                camp.talks = Some(owned);
            }
        }

        Ok(camps)
    }

    async fn load_talks(&self, camp_ids: &[i32]) -> Result<HashMap<CampId, Vec<Talk>>, StoreError> {
        let sql = format!(
            r#"
            SELECT {TALK_COLUMNS}
            FROM talks t
            JOIN speakers s ON s.speaker_id = t.speaker_id
            WHERE t.camp_id = ANY($1)
            ORDER BY t.talk_id ASC
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(camp_ids)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_talks", e))?;

        let mut by_camp: HashMap<CampId, Vec<Talk>> = HashMap::new();
        for row in rows {
            let talk = TalkRow::from_row(&row)
                .map_err(|e| StoreError::Database(format!("failed to read talk row: {e}")))?;
            by_camp
                .entry(CampId::new(talk.camp_id))
                .or_default()
                .push(talk.into());
        }
        Ok(by_camp)
    }

    /// Load one talk (with speaker) of the camp identified by `moniker`.
    #[instrument(skip(self), fields(moniker = %moniker, talk_id = %talk_id), err)]
    pub async fn load_talk(&self, moniker: &str, talk_id: TalkId) -> Result<Option<Talk>, StoreError> {
        let sql = format!(
            r#"
            SELECT {TALK_COLUMNS}
            FROM talks t
            JOIN camps c ON c.camp_id = t.camp_id
            JOIN speakers s ON s.speaker_id = t.speaker_id
            WHERE c.moniker = $1 AND t.talk_id = $2
            "#
        );

        let row = sqlx::query(&sql)
            .bind(moniker)
            .bind(talk_id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_talk", e))?;

        match row {
            Some(row) => {
                let talk = TalkRow::from_row(&row)
                    .map_err(|e| StoreError::Database(format!("failed to read talk row: {e}")))?;
                Ok(Some(talk.into()))
            }
            None => Ok(None),
        }
    }

    /// Apply staged changes in one transaction.
    #[instrument(
        skip(self, changes),
        fields(change_count = changes.len(), rows_affected = tracing::field::Empty),
        err
    )]
    pub async fn apply_changes(&self, changes: Vec<StagedChange>) -> Result<u64, StoreError> {
        if changes.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let mut affected = 0;
        for change in changes {
            affected += match change {
                StagedChange::Insert(camp) => insert_camp(&mut tx, camp).await?,
                StagedChange::Update(camp) => update_camp(&mut tx, &camp).await?,
                StagedChange::Delete(camp) => delete_camp(&mut tx, &camp).await?,
            };
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Span::current().record("rows_affected", affected);
        Ok(affected)
    }
}

async fn insert_camp(tx: &mut Transaction<'_, Postgres>, mut camp: Camp) -> Result<u64, StoreError> {
    let talks = camp.talks.take().unwrap_or_default();
    let loc = &camp.location;

    let camp_id: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO camps (
            moniker,
            name,
            event_date,
            length,
            venue_name,
            address1,
            address2,
            address3,
            city_town,
            state_province,
            postal_code,
            country
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING camp_id
        "#,
    )
    .bind(&camp.moniker)
    .bind(&camp.name)
    .bind(camp.event_date)
    .bind(camp.length)
    .bind(&loc.venue_name)
    .bind(&loc.address1)
    .bind(&loc.address2)
    .bind(&loc.address3)
    .bind(&loc.city_town)
    .bind(&loc.state_province)
    .bind(&loc.postal_code)
    .bind(&loc.country)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_camp", e))?;

    let mut affected = 1;
    for talk in talks {
        let speaker = talk.speaker.as_ref().ok_or_else(|| {
            StoreError::Database(format!("talk '{}' has no speaker", talk.title))
        })?;

        let speaker_id = match speaker.id {
            Some(id) => id.get(),
            None => {
                affected += 1;
                insert_speaker(tx, speaker).await?
            }
        };

        sqlx::query(
            r#"
            INSERT INTO talks (camp_id, speaker_id, title, abstract, level)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(camp_id)
        .bind(speaker_id)
        .bind(&talk.title)
        .bind(&talk.r#abstract)
        .bind(talk.level)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("insert_talk", e))?;
        affected += 1;
    }

    Ok(affected)
}

async fn insert_speaker(tx: &mut Transaction<'_, Postgres>, speaker: &Speaker) -> Result<i32, StoreError> {
    sqlx::query_scalar(
        r#"
        INSERT INTO speakers (
            first_name,
            last_name,
            middle_name,
            company,
            company_url,
            blog_url,
            twitter,
            github
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING speaker_id
        "#,
    )
    .bind(&speaker.first_name)
    .bind(&speaker.last_name)
    .bind(&speaker.middle_name)
    .bind(&speaker.company)
    .bind(&speaker.company_url)
    .bind(&speaker.blog_url)
    .bind(&speaker.twitter)
    .bind(&speaker.github)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("insert_speaker", e))
}

async fn update_camp(tx: &mut Transaction<'_, Postgres>, camp: &Camp) -> Result<u64, StoreError> {
    let id = persisted_id(camp)?;
    let loc = &camp.location;

    let result = sqlx::query(
        r#"
        UPDATE camps SET
            moniker = $2,
            name = $3,
            event_date = $4,
            length = $5,
            venue_name = $6,
            address1 = $7,
            address2 = $8,
            address3 = $9,
            city_town = $10,
            state_province = $11,
            postal_code = $12,
            country = $13
        WHERE camp_id = $1
        "#,
    )
    .bind(id)
    .bind(&camp.moniker)
    .bind(&camp.name)
    .bind(camp.event_date)
    .bind(camp.length)
    .bind(&loc.venue_name)
    .bind(&loc.address1)
    .bind(&loc.address2)
    .bind(&loc.address3)
    .bind(&loc.city_town)
    .bind(&loc.state_province)
    .bind(&loc.postal_code)
    .bind(&loc.country)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("update_camp", e))?;

    Ok(result.rows_affected())
}

async fn delete_camp(tx: &mut Transaction<'_, Postgres>, camp: &Camp) -> Result<u64, StoreError> {
    let id = persisted_id(camp)?;

    let talks = sqlx::query("DELETE FROM talks WHERE camp_id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("delete_talks", e))?;

    let camps = sqlx::query("DELETE FROM camps WHERE camp_id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("delete_camp", e))?;

    Ok(talks.rows_affected() + camps.rows_affected())
}

fn persisted_id(camp: &Camp) -> Result<i32, StoreError> {
    camp.id
        .map(i32::from)
        .ok_or_else(|| StoreError::NotPersisted(format!("camp '{}'", camp.moniker)))
}

#[async_trait::async_trait]
impl CampStore for PostgresCampStore {
    async fn query_camps(&self, query: &CampQuery) -> Result<Vec<Camp>, StoreError> {
        self.load_camps(query).await
    }

    async fn find_talk(&self, moniker: &str, talk_id: TalkId) -> Result<Option<Talk>, StoreError> {
        self.load_talk(moniker, talk_id).await
    }

    async fn commit(&self, changes: Vec<StagedChange>) -> Result<u64, StoreError> {
        self.apply_changes(changes).await
    }
}

/// Map SQLx errors to StoreError.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => StoreError::UniqueViolation(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Database(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}

// SQLx row types

#[derive(Debug)]
struct CampRow {
    camp_id: i32,
    moniker: String,
    name: String,
    event_date: NaiveDate,
    length: i32,
    venue_name: Option<String>,
    address1: Option<String>,
    address2: Option<String>,
    address3: Option<String>,
    city_town: Option<String>,
    state_province: Option<String>,
    postal_code: Option<String>,
    country: Option<String>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for CampRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(CampRow {
            camp_id: row.try_get("camp_id")?,
            moniker: row.try_get("moniker")?,
            name: row.try_get("name")?,
            event_date: row.try_get("event_date")?,
            length: row.try_get("length")?,
            venue_name: row.try_get("venue_name")?,
            address1: row.try_get("address1")?,
            address2: row.try_get("address2")?,
            address3: row.try_get("address3")?,
            city_town: row.try_get("city_town")?,
            state_province: row.try_get("state_province")?,
            postal_code: row.try_get("postal_code")?,
            country: row.try_get("country")?,
        })
    }
}

impl From<CampRow> for Camp {
    fn from(row: CampRow) -> Self {
        Camp {
            id: Some(CampId::new(row.camp_id)),
            moniker: row.moniker,
            name: row.name,
            event_date: row.event_date,
            length: row.length,
            location: Location {
                venue_name: row.venue_name,
                address1: row.address1,
                address2: row.address2,
                address3: row.address3,
                city_town: row.city_town,
                state_province: row.state_province,
                postal_code: row.postal_code,
                country: row.country,
            },
            talks: None,
        }
    }
}

#[derive(Debug)]
struct TalkRow {
    talk_id: i32,
    camp_id: i32,
    title: String,
    r#abstract: String,
    level: i32,
    speaker_id: i32,
    first_name: String,
    last_name: String,
    middle_name: Option<String>,
    company: Option<String>,
    company_url: Option<String>,
    blog_url: Option<String>,
    twitter: Option<String>,
    github: Option<String>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for TalkRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(TalkRow {
            talk_id: row.try_get("talk_id")?,
            camp_id: row.try_get("camp_id")?,
            title: row.try_get("title")?,
            r#abstract: row.try_get("abstract")?,
            level: row.try_get("level")?,
            speaker_id: row.try_get("speaker_id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            middle_name: row.try_get("middle_name")?,
            company: row.try_get("company")?,
            company_url: row.try_get("company_url")?,
            blog_url: row.try_get("blog_url")?,
            twitter: row.try_get("twitter")?,
            github: row.try_get("github")?,
        })
    }
}

impl From<TalkRow> for Talk {
    fn from(row: TalkRow) -> Self {
        Talk {
            id: Some(TalkId::new(row.talk_id)),
            camp_id: Some(CampId::new(row.camp_id)),
            title: row.title,
            r#abstract: row.r#abstract,
            level: row.level,
            speaker: Some(Speaker {
                id: Some(SpeakerId::new(row.speaker_id)),
                first_name: row.first_name,
                last_name: row.last_name,
                middle_name: row.middle_name,
                company: row.company,
                company_url: row.company_url,
                blog_url: row.blog_url,
                twitter: row.twitter,
                github: row.github,
            }),
        }
    }
}
