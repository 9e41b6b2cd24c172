//! Signup and signin validation
//!
//! Every signup rule is evaluated and every violation is collected, so
//! callers can report all bad fields at once. Signin stops at the first
//! missing field. An empty [`ValidationErrors`] means the input is
//! acceptable.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Serialize;

use super::model::{Gender, SignupDraft, parse_calendar_date};

/// Youngest age, in whole calendar years, allowed to sign up.
pub const MIN_SIGNUP_AGE: i32 = 13;
pub const MIN_NAME_LENGTH: usize = 2;
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MIN_PASSWORD_LENGTH: usize = 6;

static USERNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+$").expect("valid username pattern")
});

/// Draft fields that can carry a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FirstName,
    LastName,
    Username,
    Password,
    ConfirmPassword,
    Birthday,
    Gender,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Username => "username",
            Field::Password => "password",
            Field::ConfirmPassword => "confirmPassword",
            Field::Birthday => "birthday",
            Field::Gender => "gender",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-addressed violation messages. Serializes as a JSON object keyed
/// by camelCase field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Records a violation, replacing any earlier message for the field.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}

/// Whole calendar years between the two dates, ignoring month and day.
///
/// Someone born on 31 December is counted a year old on 1 January.
pub fn age_in_years(birth: NaiveDate, today: NaiveDate) -> i32 {
    today.year() - birth.year()
}

/// Applies the signup rules to `draft`, using `today` for the age check.
///
/// Pure: does not consult the store, so username uniqueness is not
/// checked here (see `CredentialStore::validate_signup`).
pub fn validate_signup(draft: &SignupDraft, today: NaiveDate) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if draft.first_name.trim().chars().count() < MIN_NAME_LENGTH {
        errors.insert(
            Field::FirstName,
            "First name must be at least 2 characters",
        );
    }

    if draft.last_name.trim().chars().count() < MIN_NAME_LENGTH {
        errors.insert(Field::LastName, "Last name must be at least 2 characters");
    }

    if draft.username.trim().chars().count() < MIN_USERNAME_LENGTH {
        errors.insert(Field::Username, "Username must be at least 3 characters");
    } else if !USERNAME_PATTERN.is_match(&draft.username) {
        errors.insert(
            Field::Username,
            "Username can only contain letters, numbers, and underscores",
        );
    }

    if draft.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.insert(Field::Password, "Password must be at least 6 characters");
    }

    if draft.password != draft.confirm_password {
        errors.insert(Field::ConfirmPassword, "Passwords do not match");
    }

    if draft.birthday.is_empty() {
        errors.insert(Field::Birthday, "Birthday is required");
    } else {
        match parse_calendar_date(&draft.birthday) {
            Some(birth) if age_in_years(birth, today) < MIN_SIGNUP_AGE => {
                errors.insert(Field::Birthday, "You must be at least 13 years old");
            }
            Some(_) => {}
            None => errors.insert(Field::Birthday, "Birthday must be a valid date"),
        }
    }

    if draft.gender.is_empty() || draft.gender.parse::<Gender>().is_err() {
        errors.insert(Field::Gender, "Please select a gender");
    }

    errors
}

/// Presence checks the signin form runs before attempting a login.
///
/// Reports at most one field: a missing username hides a missing password.
pub fn validate_signin(username: &str, password: &str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if username.trim().is_empty() {
        errors.insert(Field::Username, "Username is required");
    } else if password.is_empty() {
        errors.insert(Field::Password, "Password is required");
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    fn valid_draft() -> SignupDraft {
        SignupDraft {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            username: "jane_doe".into(),
            password: "password456".into(),
            confirm_password: "password456".into(),
            birthday: "1995-05-15".into(),
            gender: "female".into(),
        }
    }

    #[test]
    fn test_valid_draft_has_no_errors() {
        assert!(validate_signup(&valid_draft(), today()).is_empty());
    }

    #[test]
    fn test_every_violated_field_is_reported() {
        let draft = SignupDraft {
            first_name: "J".into(),
            last_name: "".into(),
            username: "jd".into(),
            password: "pass".into(),
            confirm_password: "pass1".into(),
            birthday: "".into(),
            gender: "".into(),
        };

        let errors = validate_signup(&draft, today());

        assert_eq!(errors.len(), 7);
        assert_eq!(
            errors.get(Field::FirstName),
            Some("First name must be at least 2 characters")
        );
        assert_eq!(
            errors.get(Field::LastName),
            Some("Last name must be at least 2 characters")
        );
        assert_eq!(
            errors.get(Field::Username),
            Some("Username must be at least 3 characters")
        );
        assert_eq!(
            errors.get(Field::Password),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(
            errors.get(Field::ConfirmPassword),
            Some("Passwords do not match")
        );
        assert_eq!(errors.get(Field::Birthday), Some("Birthday is required"));
        assert_eq!(errors.get(Field::Gender), Some("Please select a gender"));
    }

    #[rstest]
    #[case("ab", Some("Username must be at least 3 characters"))]
    #[case("  ab  ", Some("Username must be at least 3 characters"))]
    #[case("john doe", Some("Username can only contain letters, numbers, and underscores"))]
    #[case("john-doe", Some("Username can only contain letters, numbers, and underscores"))]
    #[case(" john", Some("Username can only contain letters, numbers, and underscores"))]
    #[case("John_Doe_99", None)]
    fn test_username_rules(#[case] username: &str, #[case] expected: Option<&str>) {
        let draft = SignupDraft {
            username: username.into(),
            ..valid_draft()
        };
        assert_eq!(validate_signup(&draft, today()).get(Field::Username), expected);
    }

    #[rstest]
    #[case("  J  ", true)]
    #[case("Jo", false)]
    #[case("Éa", false)]
    fn test_first_name_counts_trimmed_characters(#[case] name: &str, #[case] rejected: bool) {
        let draft = SignupDraft {
            first_name: name.into(),
            ..valid_draft()
        };
        assert_eq!(
            validate_signup(&draft, today()).contains(Field::FirstName),
            rejected
        );
    }

    #[test]
    fn test_password_is_not_trimmed() {
        let draft = SignupDraft {
            password: "     a".into(),
            confirm_password: "     a".into(),
            ..valid_draft()
        };
        assert!(validate_signup(&draft, today()).is_empty());
    }

    #[test]
    fn test_ten_year_old_is_rejected() {
        let draft = SignupDraft {
            birthday: "2016-06-15".into(),
            ..valid_draft()
        };
        assert_eq!(
            validate_signup(&draft, today()).get(Field::Birthday),
            Some("You must be at least 13 years old")
        );
    }

    #[test]
    fn test_thirteen_years_to_the_day_is_accepted() {
        let draft = SignupDraft {
            birthday: "2013-06-15".into(),
            ..valid_draft()
        };
        assert!(!validate_signup(&draft, today()).contains(Field::Birthday));
    }

    #[test]
    fn test_age_ignores_month_and_day() {
        // Still twelve by the calendar, thirteen by year subtraction.
        let draft = SignupDraft {
            birthday: "2013-12-31".into(),
            ..valid_draft()
        };
        assert!(!validate_signup(&draft, today()).contains(Field::Birthday));
        assert_eq!(
            age_in_years(
                NaiveDate::from_ymd_opt(2013, 12, 31).unwrap(),
                NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
            ),
            13
        );
    }

    #[test]
    fn test_unparseable_birthday() {
        let draft = SignupDraft {
            birthday: "15/05/1995".into(),
            ..valid_draft()
        };
        assert_eq!(
            validate_signup(&draft, today()).get(Field::Birthday),
            Some("Birthday must be a valid date")
        );
    }

    #[test]
    fn test_blank_birthday_is_not_a_valid_date() {
        let draft = SignupDraft {
            birthday: "   ".into(),
            ..valid_draft()
        };
        assert_eq!(
            validate_signup(&draft, today()).get(Field::Birthday),
            Some("Birthday must be a valid date")
        );
    }

    #[test]
    fn test_unknown_gender_is_rejected() {
        let draft = SignupDraft {
            gender: "robot".into(),
            ..valid_draft()
        };
        assert_eq!(
            validate_signup(&draft, today()).get(Field::Gender),
            Some("Please select a gender")
        );
    }

    #[test]
    fn test_validation_is_deterministic() {
        let draft = SignupDraft {
            first_name: "J".into(),
            ..valid_draft()
        };
        assert_eq!(
            validate_signup(&draft, today()),
            validate_signup(&draft, today())
        );
    }

    #[test]
    fn test_errors_serialize_with_field_names() {
        let mut errors = ValidationErrors::new();
        errors.insert(Field::ConfirmPassword, "Passwords do not match");
        assert_eq!(
            serde_json::to_string(&errors).unwrap(),
            r#"{"confirmPassword":"Passwords do not match"}"#
        );
    }

    #[rstest]
    #[case("   ", "", Field::Username, "Username is required")]
    #[case("", "password123", Field::Username, "Username is required")]
    #[case("johndoe", "", Field::Password, "Password is required")]
    fn test_signin_reports_first_missing_field(
        #[case] username: &str,
        #[case] password: &str,
        #[case] field: Field,
        #[case] message: &str,
    ) {
        let errors = validate_signin(username, password);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(field), Some(message));
    }

    #[test]
    fn test_signin_accepts_padded_password() {
        assert!(validate_signin("johndoe", "x").is_empty());
        assert!(validate_signin("johndoe", "  ").is_empty());
    }
}
