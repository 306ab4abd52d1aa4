use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const MAX_NAME_LEN: usize = 100;

pub type HabitId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekdays,
    Weekends,
    Weekly,
    Custom,
}

impl Frequency {
    pub fn label(self) -> &'static str {
        match self {
            Frequency::Daily => "Every day",
            Frequency::Weekdays => "Weekdays",
            Frequency::Weekends => "Weekends",
            Frequency::Weekly => "Once a week",
            Frequency::Custom => "Custom schedule",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub frequency: Frequency,
    /// Scheduled weekdays; only populated for `Frequency::Custom`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_days: Vec<Weekday>,
    pub created_at: DateTime<Utc>,
}

/// One day's completion record for a habit. At most one per `(habit_id, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitLogEntry {
    pub habit_id: HabitId,
    pub date: NaiveDate,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HabitStats {
    pub completion_rate: u8,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub next_id: HabitId,
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub logs: Vec<HabitLogEntry>,
}

#[derive(Debug, Deserialize)]
pub struct NewHabit {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub frequency: Frequency,
    #[serde(default)]
    pub custom_days: Vec<Weekday>,
}

#[derive(Debug, Deserialize)]
pub struct LogUpdateRequest {
    pub completed: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogRangeQuery {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct StatsQuery {
    #[serde(default)]
    pub view: Option<String>,
    #[serde(default)]
    pub today: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: HabitId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HabitStatsResponse {
    pub habit_id: HabitId,
    pub name: String,
    pub frequency: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(flatten)]
    pub stats: HabitStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidDate {
    pub input: String,
}

impl fmt::Display for InvalidDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid date '{}', expected YYYY-MM-DD", self.input)
    }
}

impl std::error::Error for InvalidDate {}

pub fn parse_date(input: &str) -> Result<NaiveDate, InvalidDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| InvalidDate {
        input: input.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_days() {
        let date = parse_date("2023-01-05").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 1, 5).unwrap());
    }

    #[test]
    fn parse_date_rejects_malformed_input() {
        assert!(parse_date("2023-13-01").is_err());
        assert!(parse_date("01/05/2023").is_err());
        assert!(parse_date("2023-01-05T10:00:00").is_err());
        let err = parse_date("yesterday").unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn frequency_serializes_lowercase() {
        let json = serde_json::to_string(&Frequency::Weekdays).unwrap();
        assert_eq!(json, "\"weekdays\"");
        let parsed: Frequency = serde_json::from_str("\"weekly\"").unwrap();
        assert_eq!(parsed.label(), "Once a week");
    }

    #[test]
    fn new_habit_reads_custom_days() {
        let raw = r#"{"name":"Gym","frequency":"custom","custom_days":["Mon","Wed","Fri"]}"#;
        let habit: NewHabit = serde_json::from_str(raw).unwrap();
        assert_eq!(habit.custom_days, vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]);

        let plain: NewHabit = serde_json::from_str(r#"{"name":"Walk","frequency":"daily"}"#).unwrap();
        assert!(plain.custom_days.is_empty());
    }

    #[test]
    fn log_entry_rejects_non_boolean_completion() {
        let raw = r#"{"habit_id":1,"date":"2023-01-05","completed":"yes"}"#;
        assert!(serde_json::from_str::<HabitLogEntry>(raw).is_err());
    }
}
