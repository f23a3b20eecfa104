//! Drains the notification queue and logs every event it receives.

use std::time::Duration;

use anyhow::Context;
use dotenv::dotenv;
use tracing::{error, info, warn};

use scheduling_api::config::RedisConfig;
use scheduling_api::notifications::RedisNotificationQueue;
use scheduling_api::telemetry::{init_telemetry, TelemetryConfig};

const POLL_TIMEOUT: Duration = Duration::from_secs(5);
const ERROR_BACKOFF: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let telemetry = init_telemetry(TelemetryConfig {
        service_name: "notification-worker".to_string(),
        ..TelemetryConfig::default()
    })
    .await?;

    let redis = RedisConfig::from_env().context("REDIS_URL must be set for the notification worker")?;
    let queue = RedisNotificationQueue::connect(&redis.url, redis.queue.clone())
        .await
        .context("Failed to connect to the notification queue")?;

    info!(queue = %queue.queue_name(), "Notification worker started");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received, stopping worker");
                break;
            }
            popped = queue.pop(POLL_TIMEOUT) => match popped {
                Ok(Some(event)) => {
                    info!(
                        event = %event.name,
                        payload = %event.payload,
                        enqueued_at = %event.enqueued_at,
                        "Notification event received"
                    );
                }
                Ok(None) => {}
                Err(e) => {
                    error!(error = %e, "Failed to read from notification queue");
                    warn!("Retrying in {:?}", ERROR_BACKOFF);
                    tokio::time::sleep(ERROR_BACKOFF).await;
                }
            }
        }
    }

    telemetry.shutdown().await?;
    Ok(())
}
