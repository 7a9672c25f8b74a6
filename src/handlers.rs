use crate::errors::{AppError, DomainError};
use crate::models::{
    generate_id, CategoryDef, ClearLogsRequest, DailyLog, Habit, HabitPayload, HabitStatus,
    HistoryDay, HistoryEntry, LogActionRequest, LoginRequest, NamePayload, Quote, RegisterRequest,
    SessionResponse, Settings, TodayHabit, TodayResponse,
    UpdateLogRequest, User,
};
use crate::state::AppState;
use crate::storage::{self, Store};
use crate::{categories, habits, logs, quotes, stats, users};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, Local, Utc};

// --- Auth ---

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<User>, AppError> {
    if payload.name.trim().is_empty() || payload.email.trim().is_empty() {
        return Err(AppError::bad_request("name and email are required"));
    }

    let mut store = state.store.lock().await;
    let user = users::register(
        &mut store,
        payload.name.trim(),
        payload.email.trim(),
        payload.password,
        payload.auth_type,
    )?;
    users::login(&mut store, &user.id);
    store.flush().await;
    Ok(Json(user))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<User>, AppError> {
    let mut store = state.store.lock().await;
    let user = users::authenticate(&mut store, &payload.email, payload.password.as_deref())?;
    users::login(&mut store, &user.id);
    store.flush().await;
    Ok(Json(user))
}

pub async fn logout(State(state): State<AppState>) -> StatusCode {
    let mut store = state.store.lock().await;
    users::logout(&mut store);
    store.flush().await;
    StatusCode::NO_CONTENT
}

pub async fn session(State(state): State<AppState>) -> Json<SessionResponse> {
    let mut store = state.store.lock().await;
    Json(SessionResponse {
        user: users::current_user(&mut store),
    })
}

pub async fn delete_account(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;
    users::delete_account(&mut store, &uid);
    store.flush().await;
    Ok(StatusCode::NO_CONTENT)
}

// --- Habit registry ---

pub async fn list_habits(State(state): State<AppState>) -> Result<Json<Vec<Habit>>, AppError> {
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;
    Ok(Json(habits::habits(&store, &uid)))
}

pub async fn upsert_habit(
    State(state): State<AppState>,
    Json(payload): Json<HabitPayload>,
) -> Result<Json<Option<Habit>>, AppError> {
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;
    let habit = habits::upsert(&mut store, &uid, payload);
    store.flush().await;
    Ok(Json(habit))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;
    habits::delete(&mut store, &uid, &id);
    store.flush().await;
    Ok(StatusCode::NO_CONTENT)
}

// --- Today view & daily logs ---

/// Today's schedule with each habit's derived status and session totals,
/// assembled once here for both the GET and the post-action response.
fn build_today(store: &Store, uid: &str) -> TodayResponse {
    let today = Local::now().date_naive();
    let date = today.to_string();
    let weekday = today.weekday().num_days_from_sunday() as u8;

    let all = habits::habits(store, uid);
    let all_logs = logs::logs(store, uid);
    let day_logs: Vec<&DailyLog> = logs::logs_for_date(&all_logs, &date).collect();

    let (progress_percent, _, _) =
        stats::daily_progress(&stats::scheduled_for(&all, weekday), &day_logs);

    let habits = habits::todays_habits(&all, weekday)
        .into_iter()
        .map(|habit| {
            let status = logs::derived_status(&day_logs, &habit.id);
            let logged_value = logs::completed_total(&day_logs, &habit.id);
            let sessions = if habit.requires_value {
                logs::completed_sessions(&day_logs, &habit.id)
                    .into_iter()
                    .cloned()
                    .collect()
            } else {
                Vec::new()
            };
            TodayHabit {
                habit,
                status,
                logged_value,
                sessions,
            }
        })
        .collect();

    TodayResponse {
        date,
        progress_percent,
        habits,
    }
}

pub async fn today(State(state): State<AppState>) -> Result<Json<TodayResponse>, AppError> {
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;
    Ok(Json(build_today(&store, &uid)))
}

pub async fn log_action(
    State(state): State<AppState>,
    Json(payload): Json<LogActionRequest>,
) -> Result<Json<TodayResponse>, AppError> {
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;
    let date = logs::today_string();

    match payload.status {
        // "Undo": drop everything the habit logged today.
        HabitStatus::Pending => {
            logs::clear(&mut store, &uid, &payload.habit_id, &date, None);
        }
        status => {
            let habit = habits::habits(&store, &uid)
                .into_iter()
                .find(|h| h.id == payload.habit_id)
                .ok_or(DomainError::HabitNotFound)?;

            if habit.requires_value && status == HabitStatus::Completed {
                let kind = logs::value_kind_for(&habit.category)
                    .unwrap_or(logs::ValueKind::Study);
                let value = logs::validate_session(
                    kind,
                    payload.hours.unwrap_or(0),
                    payload.minutes.unwrap_or(0),
                )?;
                // A zero-length entry is valid input but no session.
                if let Some(value) = value {
                    logs::record(
                        &mut store,
                        &uid,
                        DailyLog {
                            id: Some(generate_id()),
                            date: date.clone(),
                            habit_id: payload.habit_id,
                            status,
                            timestamp: Utc::now().timestamp_millis(),
                            value: Some(value),
                        },
                    );
                }
            } else {
                logs::record(
                    &mut store,
                    &uid,
                    DailyLog {
                        id: None,
                        date: date.clone(),
                        habit_id: payload.habit_id,
                        status,
                        timestamp: Utc::now().timestamp_millis(),
                        value: None,
                    },
                );
            }
        }
    }

    store.flush().await;
    Ok(Json(build_today(&store, &uid)))
}

pub async fn update_log(
    State(state): State<AppState>,
    Path(log_id): Path<String>,
    Json(payload): Json<UpdateLogRequest>,
) -> Result<Json<TodayResponse>, AppError> {
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;

    // Editing an already-deleted session is not an error; validation
    // still applies when the session exists.
    let target = logs::logs(&store, &uid)
        .into_iter()
        .find(|l| l.id.as_deref() == Some(log_id.as_str()));
    if let Some(target) = target {
        let kind = habits::habits(&store, &uid)
            .into_iter()
            .find(|h| h.id == target.habit_id)
            .and_then(|h| logs::value_kind_for(&h.category))
            .unwrap_or(logs::ValueKind::Study);
        let value = logs::validate_session(
            kind,
            payload.hours.unwrap_or(0),
            payload.minutes.unwrap_or(0),
        )?;
        if let Some(value) = value {
            logs::update_value(&mut store, &uid, &log_id, value);
        }
    }

    store.flush().await;
    Ok(Json(build_today(&store, &uid)))
}

pub async fn clear_logs(
    State(state): State<AppState>,
    Json(payload): Json<ClearLogsRequest>,
) -> Result<Json<TodayResponse>, AppError> {
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;
    let date = payload.date.unwrap_or_else(logs::today_string);
    logs::clear(
        &mut store,
        &uid,
        &payload.habit_id,
        &date,
        payload.log_id.as_deref(),
    );
    store.flush().await;
    Ok(Json(build_today(&store, &uid)))
}

// --- History & dashboard ---

pub async fn history(State(state): State<AppState>) -> Result<Json<Vec<HistoryDay>>, AppError> {
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;

    let registry = habits::habits(&store, &uid);
    let mut all_logs = logs::logs(&store, &uid);
    all_logs.sort_by_key(|l| std::cmp::Reverse(l.timestamp));

    // Group by day, newest day first; ordering within a day is already
    // newest-first from the sort above.
    let mut days: Vec<HistoryDay> = Vec::new();
    for log in all_logs {
        let entry = HistoryEntry {
            timestamp: log.timestamp,
            habit_title: registry
                .iter()
                .find(|h| h.id == log.habit_id)
                .map(|h| h.title.clone())
                .unwrap_or_else(|| "Unknown Habit".to_string()),
            status: log.status,
            value: log.value,
        };
        match days.iter().position(|d| d.date == log.date) {
            Some(idx) => days[idx].entries.push(entry),
            None => days.push(HistoryDay {
                date: log.date,
                entries: vec![entry],
            }),
        }
    }
    days.sort_by(|a, b| b.date.cmp(&a.date));

    Ok(Json(days))
}

pub async fn dashboard(
    State(state): State<AppState>,
) -> Result<Json<crate::models::DashboardResponse>, AppError> {
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;
    let registry = habits::habits(&store, &uid);
    let all_logs = logs::logs(&store, &uid);
    Ok(Json(stats::dashboard(&registry, &all_logs)))
}

// --- Settings ---

pub async fn get_settings(State(state): State<AppState>) -> Result<Json<Settings>, AppError> {
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;
    Ok(Json(store.get_json_or(
        &storage::settings_key(&uid),
        Settings::default(),
    )))
}

pub async fn put_settings(
    State(state): State<AppState>,
    Json(payload): Json<Settings>,
) -> Result<Json<Settings>, AppError> {
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;
    store.set_json(&storage::settings_key(&uid), &payload);
    store.flush().await;
    Ok(Json(payload))
}

// --- Category catalog ---

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryDef>>, AppError> {
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;
    let list = categories::categories(&mut store, &uid);
    store.flush().await;
    Ok(Json(list))
}

pub async fn add_category(
    State(state): State<AppState>,
    Json(payload): Json<NamePayload>,
) -> Result<Json<CategoryDef>, AppError> {
    let name = non_empty_name(&payload)?;
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;
    let category = categories::add_category(&mut store, &uid, name)?;
    store.flush().await;
    Ok(Json(category))
}

pub async fn rename_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<NamePayload>,
) -> Result<Json<Vec<CategoryDef>>, AppError> {
    let name = non_empty_name(&payload)?;
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;
    categories::update_category(&mut store, &uid, &id, name)?;
    let list = categories::categories(&mut store, &uid);
    store.flush().await;
    Ok(Json(list))
}

pub async fn remove_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<CategoryDef>>, AppError> {
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;
    categories::delete_category(&mut store, &uid, &id)?;
    let list = categories::categories(&mut store, &uid);
    store.flush().await;
    Ok(Json(list))
}

pub async fn add_sub_item(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    Json(payload): Json<NamePayload>,
) -> Result<Json<Vec<CategoryDef>>, AppError> {
    let name = non_empty_name(&payload)?;
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;
    categories::add_sub_item(&mut store, &uid, &category_id, name);
    let list = categories::categories(&mut store, &uid);
    store.flush().await;
    Ok(Json(list))
}

pub async fn rename_sub_item(
    State(state): State<AppState>,
    Path((category_id, item_id)): Path<(String, String)>,
    Json(payload): Json<NamePayload>,
) -> Result<Json<Vec<CategoryDef>>, AppError> {
    let name = non_empty_name(&payload)?;
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;
    categories::update_sub_item(&mut store, &uid, &category_id, &item_id, name);
    let list = categories::categories(&mut store, &uid);
    store.flush().await;
    Ok(Json(list))
}

pub async fn remove_sub_item(
    State(state): State<AppState>,
    Path((category_id, item_id)): Path<(String, String)>,
) -> Result<Json<Vec<CategoryDef>>, AppError> {
    let mut store = state.store.lock().await;
    let uid = users::require_session(&mut store)?;
    categories::delete_sub_item(&mut store, &uid, &category_id, &item_id);
    let list = categories::categories(&mut store, &uid);
    store.flush().await;
    Ok(Json(list))
}

fn non_empty_name(payload: &NamePayload) -> Result<&str, AppError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("name must not be empty"));
    }
    Ok(name)
}

// --- Quote ---

pub async fn quote(State(state): State<AppState>) -> Json<Quote> {
    let context = quotes::QuoteContext::current();
    Json(
        quotes::fetch_motivational_quote(&state.http, state.quote_api_key.as_deref(), context)
            .await,
    )
}
