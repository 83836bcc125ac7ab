//! Demo workload for the instrumented catalog.
//!
//! Seeds the store, runs the usual mix of lookups, updates and expected
//! failures, then prints the metrics snapshot and the finished spans the
//! run produced.

use std::sync::Arc;

use anyhow::Result;
use env_logger::Env;

use shoptrace_catalog::{CatalogError, NewProduct, ProductPatch, ProductService};
use shoptrace_core::{MemorySink, TelemetryContext};

const ENV_SHOPTRACE_LOGLEVEL: &str = "SHOPTRACE_LOGLEVEL";

fn main() -> Result<()> {
    let _ = env_logger::try_init_from_env(Env::new().filter(ENV_SHOPTRACE_LOGLEVEL));

    let sink = Arc::new(MemorySink::new());
    let telemetry = Arc::new(TelemetryContext::new(sink));
    let service = ProductService::new(telemetry.clone())?;

    seed_catalog(&service)?;
    simulate_lookups(&service)?;
    simulate_failures(&service);

    let snapshot = telemetry.snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    println!();
    println!("finished spans:");
    for span in telemetry.flush() {
        let duration_us = span
            .duration()
            .map(|d| d.as_micros() as u64)
            .unwrap_or_default();
        println!(
            "  {:<20} trace={} span={} parent={} status={:?} duration_us={duration_us}",
            span.name,
            span.trace_id,
            span.span_id,
            span.parent_id.map_or("-".to_string(), |id| id.to_string()),
            span.status,
        );
    }
    Ok(())
}

fn seed_catalog(service: &ProductService) -> Result<()> {
    for (name, price, category) in [
        ("Laptop", 1200, "Electronics"),
        ("Smartphone", 800, "Electronics"),
        ("Coffee Mug", 12, "Kitchen"),
    ] {
        let product = service.create(NewProduct::new(name, price, category))?;
        log::info!("seeded product {} with id {}", product.name, product.id);
    }
    Ok(())
}

fn simulate_lookups(service: &ProductService) -> Result<()> {
    let products = service.get_all()?;
    log::info!("catalog holds {} products", products.len());

    service.get_by_id(1)?;
    service.patch(
        2,
        ProductPatch {
            price: Some(750),
            ..ProductPatch::default()
        },
    )?;
    service.delete(3)?;
    Ok(())
}

// Failures the snapshot is expected to show as error/not_found series.
fn simulate_failures(service: &ProductService) {
    match service.create(NewProduct::new("", 40, "Kitchen")) {
        Err(CatalogError::Validation(reason)) => log::warn!("rejected product: {reason}"),
        other => log::warn!("unexpected outcome for invalid product: {other:?}"),
    }
    if let Err(e) = service.get_by_id(99) {
        log::warn!("lookup failed as expected: {e}");
    }
}
