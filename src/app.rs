use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/session", get(handlers::session))
        .route("/api/account", delete(handlers::delete_account))
        .route("/api/habits", get(handlers::list_habits).post(handlers::upsert_habit))
        .route("/api/habits/:id", delete(handlers::delete_habit))
        .route("/api/today", get(handlers::today))
        .route("/api/logs", post(handlers::log_action).delete(handlers::clear_logs))
        .route("/api/logs/:id", patch(handlers::update_log))
        .route("/api/history", get(handlers::history))
        .route("/api/dashboard", get(handlers::dashboard))
        .route("/api/settings", get(handlers::get_settings).put(handlers::put_settings))
        .route(
            "/api/categories",
            get(handlers::list_categories).post(handlers::add_category),
        )
        .route(
            "/api/categories/:id",
            put(handlers::rename_category).delete(handlers::remove_category),
        )
        .route("/api/categories/:id/items", post(handlers::add_sub_item))
        .route(
            "/api/categories/:id/items/:item_id",
            put(handlers::rename_sub_item).delete(handlers::remove_sub_item),
        )
        .route("/api/quote", get(handlers::quote))
        .with_state(state)
}
