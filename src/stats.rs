use crate::models::{HabitProgress, HabitRecord, MonthState, MonthStats};

// Rounding policy: per-habit and overall percentages keep one decimal,
// daily percentages are whole numbers. Halves round away from zero.
const HABIT_DECIMALS: i32 = 1;
const OVERALL_DECIMALS: i32 = 1;
const DAILY_DECIMALS: i32 = 0;

pub fn build_stats(state: &MonthState) -> MonthStats {
    let daily_done = daily_done_counts(state);
    let daily_percent = (0..state.month_length as usize)
        .map(|day| daily_progress_percent(state, day))
        .collect();
    let habits = state
        .habits
        .iter()
        .map(|habit| HabitProgress {
            id: habit.id.clone(),
            name: habit.name.clone(),
            goal: habit.goal,
            actual: habit_actual(habit),
            percent: habit_progress_percent(habit, state.month_length),
        })
        .collect();

    MonthStats {
        habit_count: state.habits.len(),
        completed_checks: total_checked(state),
        overall_percent: overall_progress_percent(state),
        daily_done,
        daily_percent,
        habits,
    }
}

/// Number of habits checked on each day of the month.
pub fn daily_done_counts(state: &MonthState) -> Vec<u32> {
    let mut counts = vec![0u32; state.month_length as usize];
    for habit in &state.habits {
        for (day, checked) in habit.checks.iter().enumerate() {
            if *checked {
                if let Some(count) = counts.get_mut(day) {
                    *count += 1;
                }
            }
        }
    }
    counts
}

pub fn daily_progress_percent(state: &MonthState, day: usize) -> f64 {
    let habit_count = state.habits.len();
    if habit_count == 0 {
        return 0.0;
    }
    let done = state
        .habits
        .iter()
        .filter(|habit| habit.checks.get(day).copied().unwrap_or(false))
        .count();
    round_to(done as f64 / habit_count as f64 * 100.0, DAILY_DECIMALS)
}

pub fn overall_progress_percent(state: &MonthState) -> f64 {
    let possible = state.habits.len() as u64 * u64::from(state.month_length);
    if possible == 0 {
        return 0.0;
    }
    let done = u64::from(total_checked(state));
    round_to(done as f64 / possible as f64 * 100.0, OVERALL_DECIMALS)
}

pub fn habit_actual(habit: &HabitRecord) -> u32 {
    habit.checks.iter().filter(|checked| **checked).count() as u32
}

pub fn habit_progress_percent(habit: &HabitRecord, month_length: u32) -> f64 {
    let denominator = if habit.goal > 0 {
        habit.goal
    } else if month_length > 0 {
        month_length
    } else {
        1
    };
    let percent = (habit_actual(habit) as f64 / f64::from(denominator) * 100.0).min(100.0);
    round_to(percent, HABIT_DECIMALS)
}

fn total_checked(state: &MonthState) -> u32 {
    state.habits.iter().map(habit_actual).sum()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::HabitId;

    fn habit(name: &str, goal: u32, checks: Vec<bool>) -> HabitRecord {
        HabitRecord {
            id: HabitId::new(name),
            name: name.to_string(),
            goal,
            checks,
        }
    }

    fn month(length: u32, habits: Vec<HabitRecord>) -> MonthState {
        MonthState {
            month_name: "Test".to_string(),
            month_length: length,
            habits,
        }
    }

    fn checks(done: usize, length: usize) -> Vec<bool> {
        (0..length).map(|day| day < done).collect()
    }

    #[test]
    fn habit_progress_against_goal() {
        let gym = habit("gym", 20, checks(10, 30));
        assert_eq!(habit_actual(&gym), 10);
        assert_eq!(habit_progress_percent(&gym, 30), 50.0);
    }

    #[test]
    fn habit_progress_is_capped_at_hundred() {
        let gym = habit("gym", 5, checks(12, 30));
        assert_eq!(habit_progress_percent(&gym, 30), 100.0);
    }

    #[test]
    fn zero_goal_falls_back_to_month_length() {
        let gym = habit("gym", 0, checks(15, 30));
        assert_eq!(habit_progress_percent(&gym, 30), 50.0);
        let empty = habit("empty", 0, Vec::new());
        assert_eq!(habit_progress_percent(&empty, 0), 0.0);
    }

    #[test]
    fn empty_month_has_zero_progress() {
        let state = month(30, Vec::new());
        assert_eq!(daily_done_counts(&state), vec![0; 30]);
        assert_eq!(daily_progress_percent(&state, 0), 0.0);
        assert_eq!(overall_progress_percent(&state), 0.0);
        let stats = build_stats(&state);
        assert!(stats.daily_percent.iter().all(|p| *p == 0.0));
        assert_eq!(stats.overall_percent, 0.0);
    }

    #[test]
    fn daily_counts_and_percentages() {
        let state = month(
            28,
            vec![
                habit("a", 28, checks(2, 28)),
                habit("b", 28, checks(1, 28)),
                habit("c", 28, checks(0, 28)),
            ],
        );
        let counts = daily_done_counts(&state);
        assert_eq!(counts.len(), 28);
        assert_eq!(&counts[..3], &[2, 1, 0]);
        assert_eq!(daily_progress_percent(&state, 0), 67.0);
        assert_eq!(daily_progress_percent(&state, 1), 33.0);
        assert_eq!(daily_progress_percent(&state, 99), 0.0);
    }

    #[test]
    fn overall_progress_rounds_to_one_decimal() {
        let state = month(30, vec![habit("a", 30, checks(1, 30)), habit("b", 30, checks(0, 30))]);
        // 1 / 60 = 1.666..%
        assert_eq!(overall_progress_percent(&state), 1.7);
    }

    #[test]
    fn build_stats_summarises_month() {
        let state = month(30, vec![habit("a", 20, checks(10, 30)), habit("b", 30, checks(30, 30))]);
        let stats = build_stats(&state);
        assert_eq!(stats.habit_count, 2);
        assert_eq!(stats.completed_checks, 40);
        assert_eq!(stats.daily_done.len(), 30);
        assert_eq!(stats.daily_percent[0], 100.0);
        assert_eq!(stats.daily_percent[29], 50.0);
        assert_eq!(stats.habits[0].percent, 50.0);
        assert_eq!(stats.habits[1].actual, 30);
        assert_eq!(stats.overall_percent, 66.7);
    }
}
