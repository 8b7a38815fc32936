use crate::id::HabitId;
use crate::models::{ALLOWED_MONTH_LENGTHS, FALLBACK_TITLE, HabitRecord, MonthState};

/// Owned, in-memory month model.
///
/// Every mutating operation returns `true` when the model changed. Invalid
/// input (blank names, unknown ids, out-of-range days or lengths) is ignored
/// and reported as `false`; nothing here fails or persists on its own.
#[derive(Debug, Clone)]
pub struct HabitStore {
    state: MonthState,
}

impl Default for HabitStore {
    fn default() -> Self {
        Self::new(MonthState::seeded())
    }
}

impl HabitStore {
    pub fn new(state: MonthState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &MonthState {
        &self.state
    }

    /// Wholesale replacement, used when a loaded month is rehydrated.
    pub fn replace(&mut self, state: MonthState) {
        self.state = state;
    }

    pub fn add_habit(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.state
            .habits
            .push(HabitRecord::new(name, self.state.month_length));
        true
    }

    pub fn rename_habit(&mut self, id: &HabitId, new_name: &str) -> bool {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return false;
        }
        match self.habit_mut(id) {
            Some(habit) if habit.name != new_name => {
                habit.name = new_name.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn delete_habit(&mut self, id: &HabitId) -> bool {
        let before = self.state.habits.len();
        self.state.habits.retain(|habit| &habit.id != id);
        self.state.habits.len() != before
    }

    pub fn set_check(&mut self, id: &HabitId, day: usize, value: bool) -> bool {
        if day >= self.state.month_length as usize {
            return false;
        }
        let Some(habit) = self.habit_mut(id) else {
            return false;
        };
        match habit.checks.get_mut(day) {
            Some(check) if *check != value => {
                *check = value;
                true
            }
            _ => false,
        }
    }

    pub fn set_goal(&mut self, id: &HabitId, value: i64) -> bool {
        let goal = value.clamp(0, i64::from(self.state.month_length)) as u32;
        match self.habit_mut(id) {
            Some(habit) if habit.goal != goal => {
                habit.goal = goal;
                true
            }
            _ => false,
        }
    }

    pub fn rename_month(&mut self, title: &str) -> bool {
        let title = match title.trim() {
            "" => FALLBACK_TITLE,
            trimmed => trimmed,
        };
        if self.state.month_name == title {
            return false;
        }
        self.state.month_name = title.to_string();
        true
    }

    /// Resizes every habit's checks and clamps goals down to `new_length`.
    ///
    /// The resized habit list is built aside and swapped in as a whole, so
    /// no caller can observe a half-resized month.
    pub fn set_month_length(&mut self, new_length: u32) -> bool {
        if !ALLOWED_MONTH_LENGTHS.contains(&new_length) || new_length == self.state.month_length {
            return false;
        }
        let resized = self
            .state
            .habits
            .iter()
            .map(|habit| {
                let mut habit = habit.clone();
                habit.checks.resize(new_length as usize, false);
                habit.goal = habit.goal.min(new_length);
                habit
            })
            .collect();
        self.state.habits = resized;
        self.state.month_length = new_length;
        true
    }

    /// "New month": every check cleared, habits and goals kept.
    pub fn clear_all_checks(&mut self) -> bool {
        let mut changed = false;
        for habit in &mut self.state.habits {
            if habit.checks.iter().any(|check| *check) {
                habit.checks.fill(false);
                changed = true;
            }
        }
        changed
    }

    pub fn reset_all(&mut self) -> bool {
        self.state = MonthState::empty();
        true
    }

    fn habit_mut(&mut self, id: &HabitId) -> Option<&mut HabitRecord> {
        self.state.habits.iter_mut().find(|habit| &habit.id == id)
    }
}
