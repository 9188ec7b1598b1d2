use std::collections::BTreeMap;
use std::sync::RwLock;

use codecamp_camps::{Camp, Speaker, Talk};
use codecamp_core::{CampId, SpeakerId, TalkId};

use super::r#trait::{CampFilter, CampQuery, CampStore, StagedChange, StoreError};

#[derive(Debug, Clone)]
struct TalkRow {
    camp_id: CampId,
    speaker_id: SpeakerId,
    title: String,
    r#abstract: String,
    level: i32,
}

#[derive(Debug, Clone, Default)]
struct Tables {
    /// Camps are stored shallow (`talks == None`).
    camps: BTreeMap<CampId, Camp>,
    talks: BTreeMap<TalkId, TalkRow>,
    speakers: BTreeMap<SpeakerId, Speaker>,
    last_camp_id: i32,
    last_talk_id: i32,
    last_speaker_id: i32,
}

impl Tables {
    fn moniker_taken(&self, moniker: &str, except: Option<CampId>) -> bool {
        self.camps
            .iter()
            .any(|(id, c)| c.moniker == moniker && Some(*id) != except)
    }

    fn talk(&self, id: TalkId, row: &TalkRow) -> Talk {
        Talk {
            id: Some(id),
            camp_id: Some(row.camp_id),
            title: row.title.clone(),
            r#abstract: row.r#abstract.clone(),
            level: row.level,
            speaker: self.speakers.get(&row.speaker_id).cloned(),
        }
    }

    fn talks_of(&self, camp_id: CampId) -> Vec<Talk> {
        self.talks
            .iter()
            .filter(|(_, row)| row.camp_id == camp_id)
            .map(|(id, row)| self.talk(*id, row))
            .collect()
    }

    fn speaker_id_for(&mut self, speaker: &Speaker) -> (SpeakerId, u64) {
        if let Some(id) = speaker.id {
            if self.speakers.contains_key(&id) {
                return (id, 0);
            }
        }
        self.last_speaker_id += 1;
        let id = SpeakerId::new(self.last_speaker_id);
        let mut stored = speaker.clone();
        stored.id = Some(id);
        self.speakers.insert(id, stored);
        (id, 1)
    }

    fn apply(&mut self, change: StagedChange) -> Result<u64, StoreError> {
        match change {
            StagedChange::Insert(camp) => self.insert(camp),
            StagedChange::Update(camp) => self.update(camp),
            StagedChange::Delete(camp) => self.delete(camp),
        }
    }

    fn insert(&mut self, mut camp: Camp) -> Result<u64, StoreError> {
        if self.moniker_taken(&camp.moniker, None) {
            return Err(StoreError::UniqueViolation(format!(
                "moniker '{}' already exists",
                camp.moniker
            )));
        }

        self.last_camp_id += 1;
        let camp_id = CampId::new(self.last_camp_id);
        let talks = camp.talks.take().unwrap_or_default();
        camp.id = Some(camp_id);
        self.camps.insert(camp_id, camp);

        let mut affected = 1;
        for talk in talks {
            let Some(speaker) = talk.speaker.as_ref() else {
                return Err(StoreError::Database(format!(
                    "talk '{}' has no speaker",
                    talk.title
                )));
            };
            let (speaker_id, inserted) = self.speaker_id_for(speaker);
            affected += inserted;

            self.last_talk_id += 1;
            self.talks.insert(
                TalkId::new(self.last_talk_id),
                TalkRow {
                    camp_id,
                    speaker_id,
                    title: talk.title,
                    r#abstract: talk.r#abstract,
                    level: talk.level,
                },
            );
            affected += 1;
        }
        Ok(affected)
    }

    fn update(&mut self, camp: Camp) -> Result<u64, StoreError> {
        let id = camp
            .id
            .ok_or_else(|| StoreError::NotPersisted(format!("camp '{}'", camp.moniker)))?;
        if !self.camps.contains_key(&id) {
            return Ok(0);
        }
        if self.moniker_taken(&camp.moniker, Some(id)) {
            return Err(StoreError::UniqueViolation(format!(
                "moniker '{}' already exists",
                camp.moniker
            )));
        }
        self.camps.insert(id, Camp { talks: None, ..camp });
        Ok(1)
    }

    fn delete(&mut self, camp: Camp) -> Result<u64, StoreError> {
        let id = camp
            .id
            .ok_or_else(|| StoreError::NotPersisted(format!("camp '{}'", camp.moniker)))?;
        let before = self.talks.len();
        self.talks.retain(|_, row| row.camp_id != id);
        let mut affected = (before - self.talks.len()) as u64;
        if self.camps.remove(&id).is_some() {
            affected += 1;
        }
        Ok(affected)
    }
}

/// In-memory camp store.
///
/// Intended for tests/dev. Commits are applied to a copy of the tables and
/// swapped in only when every change succeeded.
#[derive(Debug, Default)]
pub struct InMemoryCampStore {
    tables: RwLock<Tables>,
}

impl InMemoryCampStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> StoreError {
    StoreError::Database("lock poisoned".to_string())
}

#[async_trait::async_trait]
impl CampStore for InMemoryCampStore {
    async fn query_camps(&self, query: &CampQuery) -> Result<Vec<Camp>, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;

        let camps = tables
            .camps
            .values()
            .filter(|c| match &query.filter {
                CampFilter::All => true,
                CampFilter::Moniker(m) => c.moniker == *m,
                CampFilter::EventDate(d) => c.event_date == *d,
            })
            .map(|c| {
                let mut camp = c.clone();
                if query.include_talks {
                    if let Some(id) = camp.id {
                        camp.talks = Some(tables.talks_of(id));
                    }
                }
                camp
            })
            .collect();

        Ok(camps)
    }

    async fn find_talk(&self, moniker: &str, talk_id: TalkId) -> Result<Option<Talk>, StoreError> {
        let tables = self.tables.read().map_err(|_| poisoned())?;

        let Some(camp_id) = tables
            .camps
            .iter()
            .find(|(_, c)| c.moniker == moniker)
            .map(|(id, _)| *id)
        else {
            return Ok(None);
        };

        Ok(tables
            .talks
            .get(&talk_id)
            .filter(|row| row.camp_id == camp_id)
            .map(|row| tables.talk(talk_id, row)))
    }

    async fn commit(&self, changes: Vec<StagedChange>) -> Result<u64, StoreError> {
        if changes.is_empty() {
            return Ok(0);
        }

        let mut tables = self.tables.write().map_err(|_| poisoned())?;
        let mut working = tables.clone();

        let mut affected = 0;
        for change in changes {
            affected += working.apply(change)?;
        }

        *tables = working;
        Ok(affected)
    }
}
