use crate::errors::DomainError;
use crate::models::{DailyLog, HabitStatus};
use crate::storage::{self, Store};
use chrono::Local;

/// The logical day is the *local* calendar date; a UTC-derived day shifts
/// evening entries onto the wrong side of midnight.
pub fn today_string() -> String {
    Local::now().date_naive().to_string()
}

/// Categories whose habits log timed sessions instead of a plain toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Study,
    Sleep,
}

pub fn value_kind_for(category: &str) -> Option<ValueKind> {
    if category.eq_ignore_ascii_case("education") {
        Some(ValueKind::Study)
    } else if category.eq_ignore_ascii_case("sleep") {
        Some(ValueKind::Sleep)
    } else {
        None
    }
}

/// `Ok(None)` means a zero-length entry: valid input, nothing to record.
pub fn validate_session(
    kind: ValueKind,
    hours: i64,
    minutes: i64,
) -> Result<Option<u32>, DomainError> {
    if hours < 0 || minutes < 0 {
        return Err(DomainError::InvalidDuration(
            "durations must not be negative".to_string(),
        ));
    }

    match kind {
        ValueKind::Study => {
            let total = hours * 60 + minutes;
            if total > 60 {
                return Err(DomainError::InvalidDuration(
                    "maximum study session is 60 minutes; log longer work as multiple sessions"
                        .to_string(),
                ));
            }
            Ok((total > 0).then_some(total as u32))
        }
        ValueKind::Sleep => {
            if minutes >= 60 {
                return Err(DomainError::InvalidDuration(
                    "minutes must be below 60".to_string(),
                ));
            }
            let total = hours * 60 + minutes;
            if total > 720 {
                return Err(DomainError::InvalidDuration(
                    "sleep time cannot exceed 12 hours".to_string(),
                ));
            }
            Ok((total > 0).then_some(total as u32))
        }
    }
}

pub fn logs(store: &Store, uid: &str) -> Vec<DailyLog> {
    store.get_json_or(&storage::logs_key(uid), Vec::new())
}

pub fn save(store: &mut Store, uid: &str, logs: &[DailyLog]) {
    store.set_json(&storage::logs_key(uid), &logs);
}

pub fn logs_for_date<'a>(logs: &'a [DailyLog], date: &'a str) -> impl Iterator<Item = &'a DailyLog> {
    logs.iter().filter(move |l| l.date == date)
}

/// A log carrying an id is a session and appends; one without is a toggle
/// and replaces whatever the (habit, day) pair already held.
pub fn record(store: &mut Store, uid: &str, log: DailyLog) {
    let mut all = logs(store, uid);
    if log.id.is_none() {
        all.retain(|l| !(l.habit_id == log.habit_id && l.date == log.date));
    }
    all.push(log);
    save(store, uid, &all);
}

/// Unknown ids are ignored; the session may have been deleted elsewhere.
pub fn update_value(store: &mut Store, uid: &str, log_id: &str, value: u32) {
    let mut all = logs(store, uid);
    if let Some(log) = all.iter_mut().find(|l| l.id.as_deref() == Some(log_id)) {
        log.value = Some(value);
        save(store, uid, &all);
    }
}

/// Deletes one session by `log_id`, or every log for the (habit, day) pair.
pub fn clear(store: &mut Store, uid: &str, habit_id: &str, date: &str, log_id: Option<&str>) {
    let mut all = logs(store, uid);
    match log_id {
        Some(log_id) => all.retain(|l| l.id.as_deref() != Some(log_id)),
        None => all.retain(|l| !(l.habit_id == habit_id && l.date == date)),
    }
    save(store, uid, &all);
}

// --- Read-side derivation ---

/// Any completed log wins, otherwise the surviving toggle log's status,
/// otherwise pending.
pub fn derived_status(day_logs: &[&DailyLog], habit_id: &str) -> HabitStatus {
    let mut fallback = HabitStatus::Pending;
    for log in day_logs.iter().filter(|l| l.habit_id == habit_id) {
        if log.status == HabitStatus::Completed {
            return HabitStatus::Completed;
        }
        fallback = log.status;
    }
    fallback
}

pub fn completed_sessions<'a>(day_logs: &[&'a DailyLog], habit_id: &str) -> Vec<&'a DailyLog> {
    day_logs
        .iter()
        .filter(|l| l.habit_id == habit_id && l.status == HabitStatus::Completed)
        .copied()
        .collect()
}

pub fn completed_total(day_logs: &[&DailyLog], habit_id: &str) -> u32 {
    completed_sessions(day_logs, habit_id)
        .iter()
        .map(|l| l.value.unwrap_or(0))
        .sum()
}
