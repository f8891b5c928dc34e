//! # Catalog Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Build the rate fetcher, cache and price assembler
//! - Create the catalog service over the in-memory repository
//! - Start the HTTP server

mod config;

use std::sync::Arc;

use anyhow::Context;
use opentelemetry::global;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace as sdktrace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_hex::{CatalogService, inbound::HttpServer};
use catalog_repo::InMemoryRepo;
use config::{Config, LogFormat};
use exchange_rates::{HttpRateFetcher, PriceAssembler, RateCache, log_cache_events};

fn init_tracer() -> anyhow::Result<(sdktrace::Tracer, sdktrace::SdkTracerProvider)> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    // gRPC exporter with batch processing (non-blocking)
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .context("failed to create OTLP span exporter")?;

    let provider = sdktrace::SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .build();

    global::set_tracer_provider(provider.clone());

    use opentelemetry::trace::TracerProvider as _;
    Ok((provider.tracer("catalog-service"), provider))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    // OpenTelemetry export only when a collector is configured
    let otel = if std::env::var_os("OTEL_EXPORTER_OTLP_ENDPOINT").is_some() {
        Some(init_tracer()?)
    } else {
        None
    };
    let telemetry = otel
        .as_ref()
        .map(|(tracer, _)| tracing_opentelemetry::layer().with_tracer(tracer.clone()));

    let json = config.log_format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,catalog_app=debug,catalog_hex=debug,exchange_rates=debug".into()
            }),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .with(telemetry)
        .init();

    tracing::info!("Starting catalog server on port {}", config.port);
    tracing::info!(
        base = %config.base_currency,
        display = ?config.display_currencies,
        ttl_secs = config.cache.ttl.as_secs(),
        serve_stale = config.cache.serve_stale_on_error,
        "Exchange rate settings"
    );
    if config.api_keys.is_empty() {
        tracing::warn!("CATALOG_API_KEYS is empty; every /api request will be rejected");
    }

    // Rates pipeline
    let fetcher = HttpRateFetcher::new(
        config.rates_api_url.clone(),
        config.base_currency.clone(),
        config.rates_timeout,
    )?;
    let cache = RateCache::with_config(Arc::new(fetcher), config.cache.clone());
    tokio::spawn(log_cache_events(cache.subscribe()));
    let assembler = PriceAssembler::new(
        cache,
        config.base_currency.clone(),
        config.display_currencies.clone(),
    );

    // Create the catalog service
    let service = CatalogService::new(InMemoryRepo::new(), assembler);

    // Create and run the HTTP server
    let server = HttpServer::new(service, config.api_keys);
    let addr = format!("0.0.0.0:{}", config.port);

    server.run(&addr).await?;

    // Ensure traces are flushed before exit
    if let Some((_, provider)) = otel {
        let _ = provider.shutdown();
    }
    Ok(())
}
