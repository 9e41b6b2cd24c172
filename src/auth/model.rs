//! User records and signup drafts
//!
//! Wire format is camelCase JSON so records stored by one adapter can be
//! read back by any other without loss.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// A registered account.
///
/// `birthday` and `gender` hold the text the draft carried: registration
/// does not validate, so they may be malformed. Use [`UserRecord::birthday_date`]
/// and [`UserRecord::gender_kind`] for typed access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
    pub birthday: String,
    pub gender: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn birthday_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(&self.birthday)
    }

    pub fn gender_kind(&self) -> Option<Gender> {
        self.gender.parse().ok()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Caller-supplied signup input, not yet validated.
///
/// Missing JSON fields deserialize to empty strings, and an empty string
/// counts as absent everywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupDraft {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub birthday: String,
    pub gender: String,
}

impl SignupDraft {
    /// Trims the name and username fields the way the signup form does
    /// before validating. Passwords, birthday and gender are left untouched.
    pub fn normalized(&self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            username: self.username.trim().to_string(),
            ..self.clone()
        }
    }
}

/// Gender choices offered at signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
            Gender::PreferNotToSay => "prefer-not-to-say",
        }
    }

    /// Human-facing label shown on the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
            Gender::PreferNotToSay => "Prefer not to say",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown gender: {0}")]
pub struct UnknownGender(pub String);

impl FromStr for Gender {
    type Err = UnknownGender;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            "prefer-not-to-say" => Ok(Gender::PreferNotToSay),
            _ => Err(UnknownGender(s.to_string())),
        }
    }
}

/// Renders a timestamp the way `Date.prototype.toISOString` does:
/// millisecond precision with a `Z` suffix.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(ts))
}

/// Parses a `YYYY-MM-DD` date, or takes the UTC date of an RFC 3339 timestamp.
pub fn parse_calendar_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|ts| ts.with_timezone(&Utc).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_record() -> UserRecord {
        UserRecord {
            id: "8f14e45f-ceea-4e7a-9b1c-2f1f3a6d0c11".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            username: "johndoe".to_string(),
            password: "password123".to_string(),
            birthday: "1990-01-01".to_string(),
            gender: "male".to_string(),
            created_at: Utc.with_ymd_and_hms(2023, 1, 15, 10, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_record_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["firstName"], "John");
        assert_eq!(json["lastName"], "Doe");
        assert_eq!(json["createdAt"], "2023-01-15T10:30:00.000Z");
        assert!(json.get("first_name").is_none());
    }

    #[test]
    fn test_record_json_is_stable_across_reload() {
        let first = serde_json::to_string(&sample_record()).unwrap();
        let reloaded: UserRecord = serde_json::from_str(&first).unwrap();
        assert_eq!(reloaded, sample_record());
        assert_eq!(serde_json::to_string(&reloaded).unwrap(), first);
    }

    #[test]
    fn test_iso_timestamps_keep_their_text() {
        for text in ["2024-03-01T08:15:30.000Z", "2024-03-01T08:15:30.250Z"] {
            let json = format!(
                r#"{{"id":"123","firstName":"John","lastName":"Doe","username":"johndoe","password":"password123","birthday":"1990-01-01","gender":"male","createdAt":"{text}"}}"#
            );
            let record: UserRecord = serde_json::from_str(&json).unwrap();
            assert_eq!(serde_json::to_string(&record).unwrap(), json);
        }
    }

    #[test]
    fn test_draft_missing_fields_default_to_empty() {
        let draft: SignupDraft = serde_json::from_str(r#"{"username":"jd"}"#).unwrap();
        assert_eq!(draft.username, "jd");
        assert_eq!(draft.first_name, "");
        assert_eq!(draft.confirm_password, "");
    }

    #[test]
    fn test_normalized_trims_names_only() {
        let draft = SignupDraft {
            first_name: "  Jane ".into(),
            last_name: " Doe".into(),
            username: " janedoe ".into(),
            password: " secret ".into(),
            confirm_password: " secret ".into(),
            birthday: "1995-05-15".into(),
            gender: "female".into(),
        };
        let normalized = draft.normalized();
        assert_eq!(normalized.first_name, "Jane");
        assert_eq!(normalized.last_name, "Doe");
        assert_eq!(normalized.username, "janedoe");
        assert_eq!(normalized.password, " secret ");
    }

    #[test]
    fn test_gender_parsing_and_labels() {
        assert_eq!("prefer-not-to-say".parse::<Gender>(), Ok(Gender::PreferNotToSay));
        assert_eq!(Gender::PreferNotToSay.label(), "Prefer not to say");
        assert_eq!(Gender::Female.to_string(), "female");
        assert!("Male".parse::<Gender>().is_err());
    }

    #[test]
    fn test_typed_accessors_tolerate_malformed_values() {
        let mut record = sample_record();
        assert_eq!(record.birthday_date(), NaiveDate::from_ymd_opt(1990, 1, 1));
        assert_eq!(record.gender_kind(), Some(Gender::Male));

        record.birthday = "not a date".into();
        record.gender = "robot".into();
        assert_eq!(record.birthday_date(), None);
        assert_eq!(record.gender_kind(), None);
    }

    #[test]
    fn test_parse_calendar_date_accepts_timestamps() {
        assert_eq!(
            parse_calendar_date("2023-01-15T10:30:00.000Z"),
            NaiveDate::from_ymd_opt(2023, 1, 15)
        );
        assert_eq!(parse_calendar_date(""), None);
    }
}
