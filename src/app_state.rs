use std::sync::Arc;

use crate::config::Config;
use crate::notifications::NotificationSink;
use crate::scheduling::{Backend, RetryPolicy};

/// Shared handler state, generic over the storage backend.
#[derive(Clone)]
pub struct AppState<B> {
    pub backend: B,
    pub notifier: Arc<dyn NotificationSink>,
    pub retry: RetryPolicy,
    pub slot_interval_minutes: i64,
    pub app_name: String,
}

impl<B: Backend> AppState<B> {
    pub fn new(backend: B, notifier: Arc<dyn NotificationSink>, config: &Config) -> Self {
        Self {
            backend,
            notifier,
            retry: config.booking.retry_policy(),
            slot_interval_minutes: config.booking.slot_interval_minutes,
            app_name: config.app.name.clone(),
        }
    }
}
