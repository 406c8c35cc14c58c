//! # Payments Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Initialize the repository adapter
//! - Register providers and event listeners
//! - Start the reconcile worker
//! - Start the HTTP server

mod config;

use std::sync::Arc;
use std::time::Duration;

use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use payment_providers::simulated_providers;
use payments_hex::{
    AuditLogListener, EmailNotificationListener, EventBus, PaymentService, ProviderRegistry,
    ReconcileWorker, WebhookListener,
    inbound::{HttpServer, RateLimiterState},
};
use payments_repo::build_repo;

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // Use gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("payments-service"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // OpenTelemetry export only when a collector is configured
    let (telemetry, otel_provider) = if std::env::var_os("OTEL_EXPORTER_OTLP_ENDPOINT").is_some() {
        let (otel_tracer, otel_provider) = init_tracer()?;
        (
            Some(tracing_opentelemetry::layer().with_tracer(otel_tracer)),
            Some(otel_provider),
        )
    } else {
        (None, None)
    };

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,payments_app=debug,payments_hex=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry)
        .init();

    // Load configuration
    let config = config::Config::from_env()?;

    tracing::info!("Starting payments server on port {}", config.port);
    tracing::info!(
        stripe = %config.providers.stripe,
        paypal = %config.providers.paypal,
        timeout_ms = config.provider_timeout.as_millis() as u64,
        "Provider simulation configured"
    );

    // Build repository (handles connection and migration)
    let repo = build_repo(&config.database_url).await?;

    // Providers are registered once; duplicates abort startup
    let registry = ProviderRegistry::new(simulated_providers(&config.providers))?;
    tracing::info!("Registered providers: {:?}", registry.names());

    // Event bus and listeners
    let bus = EventBus::new();
    bus.subscribe_all(Arc::new(AuditLogListener));
    bus.subscribe_all(Arc::new(EmailNotificationListener));
    if let Some(url) = &config.webhook_url {
        tracing::info!("Delivering payment events to {}", url);
        bus.subscribe_all(Arc::new(WebhookListener::new(
            url.clone(),
            Duration::from_secs(10),
        )?));
    }

    // Create the payment service
    let service = Arc::new(
        PaymentService::new(repo, registry, bus).with_provider_timeout(config.provider_timeout),
    );

    // Sweep dangling PENDING payments in the background
    let worker = ReconcileWorker::new(
        service.clone(),
        config.reconcile_interval,
        config.pending_grace,
    );
    let worker_handle = tokio::spawn(worker.run());

    // Create and run the HTTP server
    let limiter = RateLimiterState::new(config.rate_limit_per_minute, Duration::from_secs(60))
        .with_trusted_proxies(config.trusted_proxies.iter().copied());
    let server = HttpServer::with_rate_limiter(service, limiter);
    let addr = format!("0.0.0.0:{}", config.port);

    let result = server.run(&addr).await;

    worker_handle.abort();

    // Ensure traces are flushed before exit
    if let Some(provider) = otel_provider {
        let _ = provider.shutdown();
    }
    result
}
