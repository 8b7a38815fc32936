//! Mapping between the remote month document and the in-memory month.
//!
//! Outgoing documents never carry habit ids; the remote service owns its own.
//! Incoming documents are normalised rather than rejected: after
//! [`from_wire_format`] every habit has exactly `month_length` checks and a
//! goal inside `[0, month_length]`.

use crate::id::{HabitId, generate_id};
use crate::models::{
    ALLOWED_MONTH_LENGTHS, HabitDocument, HabitRecord, MonthDocument, MonthState, RemoteHabit,
    RemoteMonth, UNTITLED_HABIT,
};
use chrono::{Datelike, Local, NaiveDate};
use std::fmt;

/// Calendar key of a month document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.year, self.month)
    }
}

pub fn to_wire_format(state: &MonthState, key: MonthKey) -> MonthDocument {
    MonthDocument {
        year: key.year,
        month: key.month,
        month_length: state.month_length,
        title: state.month_name.clone(),
        habits: state
            .habits
            .iter()
            .map(|habit| HabitDocument {
                name: habit.name.clone(),
                goal: habit.goal,
                checks: habit.checks.clone(),
            })
            .collect(),
    }
}

/// Rebuilds a month from a remote document. A missing title or an absent or
/// unsupported length keeps the fallback value.
pub fn from_wire_format(
    document: RemoteMonth,
    fallback_title: &str,
    fallback_length: u32,
) -> MonthState {
    let month_name = document
        .title
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| fallback_title.to_string());
    let month_length = document
        .month_length
        .filter(|length| ALLOWED_MONTH_LENGTHS.contains(length))
        .unwrap_or(fallback_length);
    let habits = document
        .habits
        .unwrap_or_default()
        .into_iter()
        .map(|habit| habit_from_wire(habit, month_length))
        .collect();

    MonthState {
        month_name,
        month_length,
        habits,
    }
}

fn habit_from_wire(habit: RemoteHabit, month_length: u32) -> HabitRecord {
    let id = habit
        .id
        .filter(|id| !id.is_empty())
        .map(HabitId::new)
        .unwrap_or_else(generate_id);
    let name = habit
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| UNTITLED_HABIT.to_string());
    let goal = habit.goal.unwrap_or(month_length).min(month_length);
    let mut checks = habit.checks.unwrap_or_default();
    checks.resize(month_length as usize, false);

    HabitRecord {
        id,
        name,
        goal,
        checks,
    }
}
