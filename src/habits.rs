use crate::logs::value_kind_for;
use crate::models::{generate_id, Habit, HabitPayload};
use crate::storage::{self, Store};

pub const DEFAULT_CATEGORY: &str = "Morning Routine";

pub fn habits(store: &Store, uid: &str) -> Vec<Habit> {
    store.get_json_or(&storage::habits_key(uid), Vec::new())
}

pub fn save(store: &mut Store, uid: &str, habits: &[Habit]) {
    store.set_json(&storage::habits_key(uid), &habits);
}

/// Merge into the habit matching `payload.id`, or create a new one. A
/// payload without a title or time is silently dropped.
pub fn upsert(store: &mut Store, uid: &str, payload: HabitPayload) -> Option<Habit> {
    let title = payload.title.as_deref().filter(|t| !t.is_empty())?;
    let time = payload.time.as_deref().filter(|t| !t.is_empty())?;

    let mut all = habits(store, uid);
    let habit = match payload
        .id
        .as_deref()
        .and_then(|id| all.iter_mut().find(|h| h.id == id))
    {
        Some(existing) => {
            existing.title = title.to_string();
            existing.time = time.to_string();
            if let Some(category) = payload.category {
                existing.category = category;
            }
            if let Some(description) = payload.description {
                existing.description = description;
            }
            if let Some(frequency) = payload.frequency {
                existing.frequency = Some(frequency);
            }
            if let Some(enabled) = payload.enabled {
                existing.enabled = enabled;
            }
            existing.requires_value = value_kind_for(&existing.category).is_some();
            existing.clone()
        }
        None => {
            let category = payload
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
            let habit = Habit {
                id: generate_id(),
                title: title.to_string(),
                time: time.to_string(),
                requires_value: value_kind_for(&category).is_some(),
                category,
                description: payload.description.unwrap_or_default(),
                frequency: Some(payload.frequency.unwrap_or_else(|| (0..=6).collect())),
                enabled: payload.enabled.unwrap_or(true),
            };
            all.push(habit.clone());
            habit
        }
    };

    save(store, uid, &all);
    Some(habit)
}

pub fn delete(store: &mut Store, uid: &str, id: &str) {
    let mut all = habits(store, uid);
    all.retain(|h| h.id != id);
    save(store, uid, &all);
}

/// Today's schedule: habits whose frequency is absent or empty (every day)
/// or contains `weekday` (0 = Sunday), ordered by their HH:MM time.
pub fn todays_habits(habits: &[Habit], weekday: u8) -> Vec<Habit> {
    let mut scheduled: Vec<Habit> = habits
        .iter()
        .filter(|h| {
            h.frequency
                .as_ref()
                .is_none_or(|f| f.is_empty() || f.contains(&weekday))
        })
        .cloned()
        .collect();
    scheduled.sort_by(|a, b| a.time.cmp(&b.time));
    scheduled
}
