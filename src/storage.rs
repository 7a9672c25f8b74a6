use serde::{de::DeserializeOwned, Serialize};
use std::{collections::BTreeMap, env, path::PathBuf};
use tokio::fs;
use tracing::{error, warn};

pub const USERS_KEY: &str = "lc_users";
pub const CURRENT_USER_KEY: &str = "lc_current_user_id";

// Un-prefixed keys from before profiles existed; migrated once in users.rs.
pub const LEGACY_HABITS_KEY: &str = "lifestyle_coach_habits";
pub const LEGACY_LOGS_KEY: &str = "lifestyle_coach_logs";
pub const LEGACY_SETTINGS_KEY: &str = "lifestyle_coach_settings";

pub fn habits_key(uid: &str) -> String {
    format!("lc_{uid}_habits")
}

pub fn logs_key(uid: &str) -> String {
    format!("lc_{uid}_logs")
}

pub fn settings_key(uid: &str) -> String {
    format!("lc_{uid}_settings")
}

pub fn categories_key(uid: &str) -> String {
    format!("lc_{uid}_categories")
}

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/state.json"))
}

/// String key-value store backed by one JSON file. Reads never fail: a
/// missing or unreadable file is an empty store, an unknown key is `None`.
#[derive(Debug, Default)]
pub struct Store {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl Store {
    /// No backing file; flush is a no-op.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub async fn load(path: PathBuf) -> Self {
        let entries = match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(err) => {
                    error!("failed to parse data file: {err}");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                error!("failed to read data file: {err}");
                BTreeMap::new()
            }
        };

        Self {
            path: Some(path),
            entries,
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    pub fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Parses the value under `key`, falling back on absence or corrupt JSON.
    pub fn get_json_or<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        match self.get(key) {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(err) => {
                    warn!("discarding corrupt value under {key}: {err}");
                    fallback
                }
            },
            None => fallback,
        }
    }

    pub fn set_json<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set(key, raw),
            Err(err) => warn!("failed to encode value for {key}: {err}"),
        }
    }

    /// Best-effort persistence; failures are logged and swallowed, and the
    /// store keeps operating in memory.
    pub async fn flush(&self) {
        let Some(path) = &self.path else {
            return;
        };

        let payload = match serde_json::to_vec_pretty(&self.entries) {
            Ok(payload) => payload,
            Err(err) => {
                error!("failed to encode data file: {err}");
                return;
            }
        };

        if let Err(err) = fs::write(path, payload).await {
            error!("failed to write data file: {err}");
        }
    }
}
