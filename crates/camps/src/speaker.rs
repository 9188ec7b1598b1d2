use codecamp_core::{Entity, SpeakerId};

/// A person presenting talks. Speakers are referenced by talks but not owned
/// by them: deleting a camp leaves its speakers in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Speaker {
    pub id: Option<SpeakerId>,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub company: Option<String>,
    pub company_url: Option<String>,
    pub blog_url: Option<String>,
    pub twitter: Option<String>,
    pub github: Option<String>,
}

impl Speaker {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }
}

impl Entity for Speaker {
    type Id = SpeakerId;

    fn id(&self) -> Option<SpeakerId> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_speaker_is_not_persisted() {
        assert!(!Speaker::new("Resa", "Wildermuth").is_persisted());
    }
}
