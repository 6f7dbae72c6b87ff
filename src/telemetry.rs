use std::sync::OnceLock;

use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{MetricExporter, SpanExporter};
use opentelemetry_sdk::{metrics::SdkMeterProvider, trace::SdkTracerProvider, Resource};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_opentelemetry::MetricsLayer;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::Layer;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter};

/// OTLP export is enabled only when this is set
const OTLP_ENDPOINT_VAR: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

/// Directory for a daily-rotated log file, when set
const LOG_DIR_VAR: &str = "CATALOG_LOG_DIR";

fn get_resource() -> Resource {
    static RESOURCE: OnceLock<Resource> = OnceLock::new();
    RESOURCE
        .get_or_init(|| Resource::builder().with_service_name("catalog").build())
        .clone()
}

fn init_traces() -> Option<SdkTracerProvider> {
    match SpanExporter::builder().with_http().build() {
        Ok(exporter) => Some(
            SdkTracerProvider::builder()
                .with_batch_exporter(exporter)
                .with_resource(get_resource())
                .build(),
        ),
        Err(err) => {
            eprintln!("Failed to create trace exporter: {err}");
            None
        }
    }
}

fn init_metrics() -> Option<SdkMeterProvider> {
    match MetricExporter::builder().with_http().build() {
        Ok(exporter) => Some(
            SdkMeterProvider::builder()
                .with_periodic_exporter(exporter)
                .with_resource(get_resource())
                .build(),
        ),
        Err(err) => {
            eprintln!("Failed to create metric exporter: {err}");
            None
        }
    }
}

// Initialize tracing-subscriber and return a guard that flushes exporters and the log file on drop
pub fn init_tracing_subscriber() -> OtelGuard {
    let otlp_enabled = std::env::var_os(OTLP_ENDPOINT_VAR).is_some();
    let (tracer_provider, meter_provider) = if otlp_enabled {
        (init_traces(), init_metrics())
    } else {
        (None, None)
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_default_env());

    let (file_layer, file_guard) = match std::env::var_os(LOG_DIR_VAR) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "catalog.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(EnvFilter::from_default_env());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let trace_layer = tracer_provider
        .as_ref()
        .map(|provider| OpenTelemetryLayer::new(provider.tracer("catalog")));
    let metrics_layer = meter_provider
        .as_ref()
        .map(|provider| MetricsLayer::new(provider.clone()));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(metrics_layer)
        .with(trace_layer)
        .init();

    OtelGuard {
        tracer_provider,
        meter_provider,
        _file_guard: file_guard,
    }
}

pub struct OtelGuard {
    tracer_provider: Option<SdkTracerProvider>,
    meter_provider: Option<SdkMeterProvider>,
    _file_guard: Option<WorkerGuard>,
}

impl Drop for OtelGuard {
    fn drop(&mut self) {
        if let Some(tracer) = self.tracer_provider.take() {
            if let Err(err) = tracer.shutdown() {
                eprintln!("{err:?}");
            }
        }
        if let Some(meter) = self.meter_provider.take() {
            if let Err(err) = meter.shutdown() {
                eprintln!("{err:?}");
            }
        }
    }
}
