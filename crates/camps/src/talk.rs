use codecamp_core::{CampId, Entity, TalkId};

use crate::speaker::Speaker;

/// A presentation scheduled within a camp.
///
/// `speaker` is `None` only when the talk was loaded without its speaker; a
/// stored talk always references one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Talk {
    pub id: Option<TalkId>,
    pub camp_id: Option<CampId>,
    pub title: String,
    pub r#abstract: String,
    /// Audience tier, e.g. 100 (introductory) or 200.
    pub level: i32,
    pub speaker: Option<Speaker>,
}

impl Talk {
    pub fn new(title: impl Into<String>, r#abstract: impl Into<String>, level: i32, speaker: Speaker) -> Self {
        Self {
            id: None,
            camp_id: None,
            title: title.into(),
            r#abstract: r#abstract.into(),
            level,
            speaker: Some(speaker),
        }
    }
}

impl Entity for Talk {
    type Id = TalkId;

    fn id(&self) -> Option<TalkId> {
        self.id
    }
}
