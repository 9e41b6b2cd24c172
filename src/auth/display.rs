//! Dashboard presentation helpers

use chrono::Datelike;
use serde::Serialize;

use super::model::{UserRecord, parse_calendar_date};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Long calendar form, e.g. "January 15, 2023".
pub fn format_date<D: Datelike>(date: &D) -> String {
    let month = MONTH_NAMES
        .get(date.month0() as usize)
        .copied()
        .unwrap_or_default();
    format!("{month} {}, {}", date.day(), date.year())
}

/// Formats a stored date or timestamp string. `None` when it does not parse.
pub fn format_display_date(input: &str) -> Option<String> {
    parse_calendar_date(input).map(|date| format_date(&date))
}

/// Uppercased first letters of first and last name, e.g. "JD".
pub fn initials(record: &UserRecord) -> String {
    record
        .first_name
        .chars()
        .take(1)
        .chain(record.last_name.chars().take(1))
        .flat_map(char::to_uppercase)
        .collect()
}

/// What the dashboard shows for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub welcome: String,
    pub initials: String,
    pub full_name: String,
    pub handle: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub gender: String,
    pub birthday: Option<String>,
    pub member_since: String,
}

impl ProfileView {
    pub fn from_record(record: &UserRecord) -> Self {
        // Unknown values are shown capitalised, as entered.
        let gender = match record.gender_kind() {
            Some(kind) => kind.label().to_string(),
            None => capitalize_first(&record.gender),
        };

        Self {
            welcome: format!("Welcome, {}!", record.first_name),
            initials: initials(record),
            full_name: record.full_name(),
            handle: format!("@{}", record.username),
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            username: record.username.clone(),
            gender,
            birthday: format_display_date(&record.birthday),
            member_since: format_date(&record.created_at),
        }
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
