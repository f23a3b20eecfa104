use anyhow::{Context, Result};
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, Resource};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::Config;

static OTLP_EXPORT_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Telemetry configuration structure
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub service_version: String,
    pub environment: String,
    pub otlp_endpoint: Option<String>,
    pub enable_tracing: bool,
    pub export_timeout: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: env!("CARGO_PKG_NAME").to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
            otlp_endpoint: std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok(),
            enable_tracing: std::env::var("OTEL_TRACES_ENABLED")
                .map(|v| v.parse().unwrap_or(true))
                .unwrap_or(true),
            export_timeout: Duration::from_secs(30),
        }
    }
}

impl TelemetryConfig {
    pub fn for_service(service_name: &str, config: &Config) -> Self {
        Self {
            service_name: service_name.to_string(),
            environment: config.app.environment.as_str().to_string(),
            ..Self::default()
        }
    }
}

/// Telemetry handles for graceful shutdown
pub struct TelemetryHandles {
    otlp_enabled: bool,
}

impl TelemetryHandles {
    /// Flush pending spans and shut the exporters down
    pub async fn shutdown(self) -> Result<()> {
        if self.otlp_enabled {
            info!("Shutting down telemetry providers...");
            global::shutdown_tracer_provider();
            OTLP_EXPORT_ACTIVE.store(false, Ordering::SeqCst);
        }
        info!("Telemetry shutdown completed");
        Ok(())
    }
}

/// Install the log subscriber, then the OTLP trace pipeline when an
/// endpoint is configured.
pub async fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryHandles> {
    setup_tracing_subscriber()?;

    info!(
        "Initializing telemetry for service: {} v{} in environment: {}",
        config.service_name, config.service_version, config.environment
    );

    let resource = create_resource(&config);

    let otlp_enabled = if config.enable_tracing {
        init_tracing(&config, &resource)?
    } else {
        false
    };
    OTLP_EXPORT_ACTIVE.store(otlp_enabled, Ordering::SeqCst);

    info!("Telemetry initialization completed successfully");
    Ok(TelemetryHandles { otlp_enabled })
}

fn create_resource(config: &TelemetryConfig) -> Resource {
    Resource::new(vec![
        KeyValue::new("service.name", config.service_name.clone()),
        KeyValue::new("service.version", config.service_version.clone()),
        KeyValue::new("deployment.environment", config.environment.clone()),
    ])
}

/// Returns whether an exporter was installed.
fn init_tracing(config: &TelemetryConfig, resource: &Resource) -> Result<bool> {
    let Some(endpoint) = &config.otlp_endpoint else {
        info!("No OTLP endpoint configured, using console-only tracing");
        return Ok(false);
    };

    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint)
                .with_timeout(config.export_timeout),
        )
        .with_trace_config(
            opentelemetry_sdk::trace::config()
                .with_resource(resource.clone())
                .with_sampler(opentelemetry_sdk::trace::Sampler::AlwaysOn),
        )
        .install_batch(runtime::Tokio)
        .context("Failed to initialize OTLP tracer")?;

    info!(endpoint = %endpoint, "Distributed tracing initialized with OTLP exporter");
    Ok(true)
}

fn setup_tracing_subscriber() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("{}=debug,tower_http=info", env!("CARGO_CRATE_NAME")).into());

    Registry::default()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}

/// Health check for telemetry components
pub fn telemetry_health_check() -> HashMap<String, bool> {
    let mut health = HashMap::new();
    health.insert("log_subscriber".to_string(), true);
    health.insert(
        "otlp_exporter".to_string(),
        OTLP_EXPORT_ACTIVE.load(Ordering::SeqCst),
    );
    health
}
