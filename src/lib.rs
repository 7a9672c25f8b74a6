pub mod app;
pub mod categories;
pub mod errors;
pub mod habits;
pub mod handlers;
pub mod logs;
pub mod models;
pub mod quotes;
pub mod state;
pub mod stats;
pub mod storage;
pub mod users;

pub use app::router;
pub use state::AppState;
pub use storage::{resolve_data_path, Store};
