use crate::id::{HabitId, generate_id};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::ops::RangeInclusive;

pub const ALLOWED_MONTH_LENGTHS: RangeInclusive<u32> = 28..=31;
pub const DEFAULT_MONTH_LENGTH: u32 = 30;
pub const DEFAULT_SEED_TITLE: &str = "November";
pub const RESET_TITLE: &str = "New Month";
pub const FALLBACK_TITLE: &str = "My Month";
pub const UNTITLED_HABIT: &str = "Untitled habit";

const SEED_HABITS: [&str; 8] = [
    "Wake up at 05:00",
    "Gym",
    "Reading / Learning",
    "Day Planning",
    "Budget Tracking",
    "Project Work",
    "No Alcohol",
    "Social Media Detox",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitRecord {
    pub id: HabitId,
    pub name: String,
    pub goal: u32,
    pub checks: Vec<bool>,
}

impl HabitRecord {
    /// A fresh habit aiming for every day of the month.
    pub fn new(name: impl Into<String>, month_length: u32) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            goal: month_length,
            checks: vec![false; month_length as usize],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthState {
    pub month_name: String,
    pub month_length: u32,
    pub habits: Vec<HabitRecord>,
}

impl MonthState {
    pub fn seeded() -> Self {
        Self {
            month_name: DEFAULT_SEED_TITLE.to_string(),
            month_length: DEFAULT_MONTH_LENGTH,
            habits: SEED_HABITS
                .iter()
                .map(|name| HabitRecord::new(*name, DEFAULT_MONTH_LENGTH))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            month_name: RESET_TITLE.to_string(),
            month_length: DEFAULT_MONTH_LENGTH,
            habits: Vec::new(),
        }
    }
}

/// Outgoing month document, as accepted by `POST /months/save`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthDocument {
    pub year: i32,
    pub month: u32,
    pub month_length: u32,
    pub title: String,
    pub habits: Vec<HabitDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitDocument {
    pub name: String,
    pub goal: u32,
    pub checks: Vec<bool>,
}

/// Month document as returned by `GET /months/{year}/{month}`. Every field is
/// optional, and a field of the wrong shape reads as absent instead of failing
/// the whole document; missing pieces are filled in during reconciliation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteMonth {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub month_length: Option<u32>,
    #[serde(default, deserialize_with = "lenient_habits")]
    pub habits: Option<Vec<RemoteHabit>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteHabit {
    #[serde(default, rename = "_id", deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub goal: Option<u32>,
    #[serde(default, deserialize_with = "lenient_checks")]
    pub checks: Option<Vec<bool>>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// Entries that are not habit objects are skipped.
fn lenient_habits<'de, D>(deserializer: D) -> Result<Option<Vec<RemoteHabit>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

// Anything but an array is absent; entries other than `true` read as unchecked.
fn lenient_checks<'de, D>(deserializer: D) -> Result<Option<Vec<bool>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .iter()
                .map(|item| item.as_bool().unwrap_or(false))
                .collect(),
        )),
        _ => Ok(None),
    }
}

impl From<MonthDocument> for RemoteMonth {
    fn from(document: MonthDocument) -> Self {
        Self {
            title: Some(document.title),
            month_length: Some(document.month_length),
            habits: Some(
                document
                    .habits
                    .into_iter()
                    .map(|habit| RemoteHabit {
                        id: None,
                        name: Some(habit.name),
                        goal: Some(habit.goal),
                        checks: Some(habit.checks),
                    })
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HabitProgress {
    pub id: HabitId,
    pub name: String,
    pub goal: u32,
    pub actual: u32,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthStats {
    pub habit_count: usize,
    pub completed_checks: u32,
    pub overall_percent: f64,
    pub daily_done: Vec<u32>,
    pub daily_percent: Vec<f64>,
    pub habits: Vec<HabitProgress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SaveStatus {
    Idle,
    Pending,
    Saving,
    Saved,
    Failed { message: String },
}

#[derive(Debug, Serialize)]
pub struct MonthView {
    pub month: MonthState,
    pub stats: MonthStats,
    pub changed: bool,
    pub save_status: SaveStatus,
}

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub day: i64,
    pub value: bool,
}

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub goal: i64,
}

#[derive(Debug, Deserialize)]
pub struct LengthRequest {
    pub length: i64,
}
