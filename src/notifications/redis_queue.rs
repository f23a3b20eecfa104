use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, info};

use super::{NotificationError, NotificationEvent, NotificationSink};

/// Redis list used as a FIFO: producers `LPUSH`, the worker `BRPOP`s.
#[derive(Clone)]
pub struct RedisNotificationQueue {
    manager: ConnectionManager,
    queue: String,
}

impl RedisNotificationQueue {
    pub async fn connect(url: &str, queue: impl Into<String>) -> Result<Self, NotificationError> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        let queue = queue.into();
        info!(queue = %queue, "Connected to notification queue");
        Ok(Self { manager, queue })
    }

    pub fn queue_name(&self) -> &str {
        &self.queue
    }

    /// Blocks up to `timeout` for the next event. `None` on timeout.
    pub async fn pop(&self, timeout: Duration) -> Result<Option<NotificationEvent>, NotificationError> {
        let mut conn = self.manager.clone();
        let popped: Option<(String, String)> =
            conn.brpop(&self.queue, timeout.as_secs_f64()).await?;

        match popped {
            Some((_, body)) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl NotificationSink for RedisNotificationQueue {
    async fn enqueue(&self, event: NotificationEvent) -> Result<(), NotificationError> {
        let body = serde_json::to_string(&event)?;
        let mut conn = self.manager.clone();
        let _: i64 = conn.lpush(&self.queue, body).await?;
        debug!(queue = %self.queue, event = %event.name, "Notification enqueued");
        Ok(())
    }
}
