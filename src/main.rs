use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::signal;
use tracing::{info, warn};

use scheduling_api::app::create_router;
use scheduling_api::app_state::AppState;
use scheduling_api::config::Config;
use scheduling_api::db::{self, postgres::PgBackend};
use scheduling_api::notifications::{LogNotificationSink, NotificationSink, RedisNotificationQueue};
use scheduling_api::telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    let telemetry = init_telemetry(TelemetryConfig::for_service("scheduling-api", &config)).await?;

    let pool = db::init_pool(&config.database).await?;
    let backend = PgBackend::new(pool);

    let notifier: Arc<dyn NotificationSink> = match &config.redis {
        Some(redis) => Arc::new(
            RedisNotificationQueue::connect(&redis.url, redis.queue.clone())
                .await
                .context("Failed to connect to the notification queue")?,
        ),
        None => {
            warn!("REDIS_URL not set, notifications will only be logged");
            Arc::new(LogNotificationSink)
        }
    };

    let app = create_router(AppState::new(backend, notifier, &config));

    let addr = config.server_addr();
    info!(
        "{} ({}) listening on {}",
        config.app.name,
        config.app.environment.as_str(),
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Failed to serve application")?;

    telemetry.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
