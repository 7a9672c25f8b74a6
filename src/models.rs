use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    #[default]
    Password,
    Google,
    Apple,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub auth_type: AuthType,
    // Stored as plaintext.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum HabitStatus {
    #[default]
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "COMPLETED")]
    Completed,
    #[serde(rename = "SKIPPED")]
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub title: String,
    /// Zero-padded HH:MM; lexicographic order is chronological order.
    pub time: String,
    /// Category *name*, not a foreign key; the cascades in categories.rs
    /// keep it in sync.
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Weekday indices 0 (Sunday) through 6; absent or empty means every day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Vec<u8>>,
    pub enabled: bool,
    /// True when a day may hold many timed session logs instead of one
    /// toggle log. Re-derived from the category on every write.
    #[serde(default)]
    pub requires_value: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    /// Present only on session logs; toggle logs are keyed by
    /// (habitId, date) alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// YYYY-MM-DD, local calendar day.
    pub date: String,
    pub habit_id: String,
    pub status: HabitStatus,
    /// Unix milliseconds.
    pub timestamp: i64,
    /// Session duration in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubItemDef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDef {
    pub id: String,
    pub name: String,
    pub items: Vec<SubItemDef>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub notifications: bool,
}

// --- Request payloads ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub auth_type: AuthType,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
}

/// Upsert payload: `id` present merges into the existing habit, absent
/// creates a new one. Missing title or time makes the whole call a no-op.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub frequency: Option<Vec<u8>>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogActionRequest {
    pub habit_id: String,
    pub status: HabitStatus,
    #[serde(default)]
    pub hours: Option<i64>,
    #[serde(default)]
    pub minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLogRequest {
    #[serde(default)]
    pub hours: Option<i64>,
    #[serde(default)]
    pub minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearLogsRequest {
    pub habit_id: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub log_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamePayload {
    pub name: String,
}

// --- Response payloads ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: Option<User>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayHabit {
    #[serde(flatten)]
    pub habit: Habit,
    pub status: HabitStatus,
    pub logged_value: u32,
    pub sessions: Vec<DailyLog>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayResponse {
    pub date: String,
    pub progress_percent: u32,
    pub habits: Vec<TodayHabit>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub timestamp: i64,
    pub habit_title: String,
    pub status: HabitStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryDay {
    pub date: String,
    pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPoint {
    pub date: String,
    pub completed: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationPoint {
    pub title: String,
    pub minutes: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub timestamp: i64,
    pub habit_title: String,
    pub status: HabitStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub date: String,
    pub progress_percent: u32,
    pub scheduled_count: usize,
    pub distinct_completed: usize,
    pub distinct_skipped: usize,
    pub weekly: Vec<WeeklyPoint>,
    pub durations: Vec<DurationPoint>,
    pub recent: Vec<ActivityEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub quote: String,
    pub author: String,
}
