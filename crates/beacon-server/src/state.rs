use crate::config::ServerConfig;
use beacon_storage::NotificationStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn NotificationStore>,
    pub start_time: DateTime<Utc>,
    pub config: Arc<ServerConfig>,
}
