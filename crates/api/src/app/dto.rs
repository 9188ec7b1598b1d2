use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

// -------------------------
// Response models
// -------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampModel {
    pub name: String,
    pub moniker: String,
    pub event_date: NaiveDate,
    pub length: i32,
    pub venue: Option<String>,
    /// Only present when talks were requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub talks: Option<Vec<TalkModel>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TalkModel {
    pub talk_id: i32,
    pub title: String,
    pub r#abstract: String,
    pub level: i32,
    pub speaker: Option<SpeakerModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerModel {
    pub speaker_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub company: Option<String>,
    pub company_url: Option<String>,
    pub blog_url: Option<String>,
    pub twitter: Option<String>,
    pub git_hub: Option<String>,
}

// -------------------------
// Request DTOs
// -------------------------

/// Body of camp create and update requests.
///
/// Every field is optional at the wire level: create requires some of them,
/// update only touches the ones present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampRequest {
    pub name: Option<String>,
    pub moniker: Option<String>,
    #[serde(default, deserialize_with = "deserialize_event_date")]
    pub event_date: Option<NaiveDate>,
    pub length: Option<i32>,
    pub venue: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct IncludeTalksQuery {
    #[serde(rename = "includeTalks", default, deserialize_with = "deserialize_flag")]
    pub include_talks: bool,
}

// -------------------------
// Path parameters
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CampPath {
    pub moniker: String,
}

#[derive(Debug, Deserialize)]
pub struct EventDatePath {
    pub event_date: String,
}

#[derive(Debug, Deserialize)]
pub struct TalkPath {
    pub moniker: String,
    pub talk_id: String,
}

/// Accept a plain date (`2018-10-18`) or a date-time (`2018-10-18T00:00:00`);
/// the time part is dropped.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .ok()
}

fn deserialize_event_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.map(|raw| {
        parse_event_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid eventDate '{raw}'")))
    })
    .transpose()
}

/// `true`/`false` in any letter case, as query strings are written by hand.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(serde::de::Error::custom(format!("expected true or false, got '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_date_accepts_date_and_datetime() {
        let expected = NaiveDate::from_ymd_opt(2018, 10, 18);
        assert_eq!(parse_event_date("2018-10-18"), expected);
        assert_eq!(parse_event_date("2018-10-18T00:00:00"), expected);
        assert_eq!(parse_event_date("2018-10-18T09:30:00.000"), expected);
        assert_eq!(parse_event_date("18/10/2018"), None);
        assert_eq!(parse_event_date("2018-02-30"), None);
    }

    #[test]
    fn request_reads_camel_case_and_tolerates_missing_fields() {
        let req: CampRequest = serde_json::from_str(r#"{"name":"Atlanta Code Camp","eventDate":"2019-10-17"}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("Atlanta Code Camp"));
        assert_eq!(req.event_date, NaiveDate::from_ymd_opt(2019, 10, 17));
        assert!(req.moniker.is_none());
        assert!(req.length.is_none());
    }

    #[test]
    fn request_rejects_malformed_dates() {
        let err = serde_json::from_str::<CampRequest>(r#"{"eventDate":"soon"}"#).unwrap_err();
        assert!(err.to_string().contains("invalid eventDate"));
    }

    #[test]
    fn include_talks_ignores_letter_case() {
        let read = |v: &str| serde_json::from_value::<IncludeTalksQuery>(serde_json::json!({ "includeTalks": v }));
        assert!(read("True").unwrap().include_talks);
        assert!(read("TRUE").unwrap().include_talks);
        assert!(!read("False").unwrap().include_talks);
        assert!(read("yes").is_err());
        assert!(!serde_json::from_str::<IncludeTalksQuery>("{}").unwrap().include_talks);
    }

    #[test]
    fn camp_model_omits_unloaded_talks() {
        let model = CampModel {
            name: "Atlanta Code Camp".into(),
            moniker: "ATL2018".into(),
            event_date: NaiveDate::from_ymd_opt(2018, 10, 18).unwrap(),
            length: 1,
            venue: Some("Atlanta Convention Center".into()),
            talks: None,
        };
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["eventDate"], "2018-10-18");
        assert!(json.get("talks").is_none());

        let json = serde_json::to_value(CampModel {
            talks: Some(Vec::new()),
            ..model
        })
        .unwrap();
        assert_eq!(json["talks"], serde_json::json!([]));
    }

    #[test]
    fn speaker_model_uses_github_casing() {
        let json = serde_json::to_value(SpeakerModel {
            speaker_id: 1,
            first_name: "Shawn".into(),
            last_name: "Wildermuth".into(),
            middle_name: None,
            company: None,
            company_url: None,
            blog_url: None,
            twitter: None,
            git_hub: Some("shawnwildermuth".into()),
        })
        .unwrap();
        assert_eq!(json["gitHub"], "shawnwildermuth");
        assert_eq!(json["firstName"], "Shawn");
    }
}
