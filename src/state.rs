use crate::storage::Store;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<Store>>,
    pub http: reqwest::Client,
    pub quote_api_key: Option<String>,
}

impl AppState {
    pub fn new(store: Store, quote_api_key: Option<String>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            http: reqwest::Client::new(),
            quote_api_key,
        }
    }
}
