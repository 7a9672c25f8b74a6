use crate::habits::todays_habits;
use crate::logs::{completed_total, logs_for_date};
use crate::models::{
    ActivityEntry, DailyLog, DashboardResponse, DurationPoint, Habit, HabitStatus, WeeklyPoint,
};
use chrono::{Datelike, Duration, Local, NaiveDate};
use std::collections::HashSet;

const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Habits counted against today's completion: scheduled and not disabled.
pub fn scheduled_for(habits: &[Habit], weekday: u8) -> Vec<Habit> {
    todays_habits(habits, weekday)
        .into_iter()
        .filter(|h| h.enabled)
        .collect()
}

/// Daily completion percentage. Each habit counts at most once no matter
/// how many session logs it produced, and skipped habits leave both sides
/// of the ratio.
pub fn daily_progress(scheduled: &[Habit], day_logs: &[&DailyLog]) -> (u32, usize, usize) {
    let scheduled_ids: HashSet<&str> = scheduled.iter().map(|h| h.id.as_str()).collect();

    let completed: HashSet<&str> = day_logs
        .iter()
        .filter(|l| l.status == HabitStatus::Completed && scheduled_ids.contains(l.habit_id.as_str()))
        .map(|l| l.habit_id.as_str())
        .collect();
    let skipped: HashSet<&str> = day_logs
        .iter()
        .filter(|l| l.status == HabitStatus::Skipped && scheduled_ids.contains(l.habit_id.as_str()))
        .filter(|l| !completed.contains(l.habit_id.as_str()))
        .map(|l| l.habit_id.as_str())
        .collect();

    let denominator = scheduled.len().saturating_sub(skipped.len());
    let percent = if denominator > 0 {
        ((completed.len() as f64 / denominator as f64) * 100.0).round() as u32
    } else {
        0
    };
    (percent, completed.len(), skipped.len())
}

/// Distinct-completed counts for the trailing 7 calendar days, today last.
pub fn weekly_consistency_at(today: NaiveDate, logs: &[DailyLog]) -> Vec<WeeklyPoint> {
    let mut series = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let date = (today - Duration::days(offset)).to_string();
        let distinct: HashSet<&str> = logs_for_date(logs, &date)
            .filter(|l| l.status == HabitStatus::Completed)
            .map(|l| l.habit_id.as_str())
            .collect();
        let completed = distinct.len() as u32;
        series.push(WeeklyPoint { date, completed });
    }
    series
}

/// Today's time totals per duration-tracked habit; zero totals are omitted.
pub fn duration_totals(habits: &[Habit], day_logs: &[&DailyLog]) -> Vec<DurationPoint> {
    habits
        .iter()
        .filter(|h| h.requires_value)
        .filter_map(|h| {
            let minutes = completed_total(day_logs, &h.id);
            (minutes > 0).then(|| DurationPoint {
                title: h.title.clone(),
                minutes,
            })
        })
        .collect()
}

/// Today's completed and skipped events, newest first, capped for display.
pub fn recent_activity(habits: &[Habit], day_logs: &[&DailyLog]) -> Vec<ActivityEntry> {
    let mut events: Vec<&DailyLog> = day_logs
        .iter()
        .copied()
        .filter(|l| l.status != HabitStatus::Pending)
        .collect();
    events.sort_by_key(|l| std::cmp::Reverse(l.timestamp));

    events
        .into_iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|l| ActivityEntry {
            timestamp: l.timestamp,
            habit_title: habits
                .iter()
                .find(|h| h.id == l.habit_id)
                .map(|h| h.title.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            status: l.status,
            value: l.value,
        })
        .collect()
}

pub fn dashboard(habits: &[Habit], logs: &[DailyLog]) -> DashboardResponse {
    dashboard_at(Local::now().date_naive(), habits, logs)
}

pub fn dashboard_at(today: NaiveDate, habits: &[Habit], logs: &[DailyLog]) -> DashboardResponse {
    let date = today.to_string();
    let weekday = today.weekday().num_days_from_sunday() as u8;
    let day_logs: Vec<&DailyLog> = logs_for_date(logs, &date).collect();

    let scheduled = scheduled_for(habits, weekday);
    let (progress_percent, distinct_completed, distinct_skipped) =
        daily_progress(&scheduled, &day_logs);

    DashboardResponse {
        progress_percent,
        scheduled_count: scheduled.len(),
        distinct_completed,
        distinct_skipped,
        weekly: weekly_consistency_at(today, logs),
        durations: duration_totals(habits, &day_logs),
        recent: recent_activity(habits, &day_logs),
        date,
    }
}
