// Catalog operations observed through the telemetry they emit: span
// statuses and tags, operation counters, and the price histogram.

use std::sync::Arc;

use anyhow::Result;
use shoptrace_catalog::{CatalogError, NewProduct, ProductPatch, ProductService};
use shoptrace_core::{MemorySink, SpanSink, SpanStatus, TelemetryContext};
use shoptrace_proto::prelude::{MetricsSnapshot, TagValue};

fn service() -> (Arc<MemorySink>, Arc<TelemetryContext>, ProductService) {
    let sink = Arc::new(MemorySink::new());
    let telemetry = Arc::new(TelemetryContext::new(sink.clone()));
    let service = ProductService::new(telemetry.clone()).unwrap();
    (sink, telemetry, service)
}

fn counter_series(snapshot: &MetricsSnapshot, name: &str, needle: &[(&str, &str)]) -> Option<u64> {
    let counter = snapshot.counters.iter().find(|c| c.name == name)?;
    counter
        .series
        .iter()
        .find(|s| {
            needle
                .iter()
                .all(|(k, v)| s.tags.contains(&(k.to_string(), v.to_string())))
        })
        .map(|s| s.value)
}

#[test]
fn test_get_all_tags_span_with_product_count() -> Result<()> {
    let (sink, _telemetry, service) = service();
    service.create(NewProduct::new("Laptop", 1200, "Electronics"))?;
    service.create(NewProduct::new("Smartphone", 800, "Electronics"))?;
    service.create(NewProduct::new("Coffee Mug", 12, "Kitchen"))?;
    sink.drain();

    let products = service.get_all()?;
    assert_eq!(products.len(), 3);

    let spans = sink.drain();
    assert_eq!(spans.len(), 1);
    let span = &spans[0];
    assert_eq!(span.name, "product.get_all");
    assert_eq!(span.status, SpanStatus::Ok);
    assert_eq!(span.tag_value("product.count"), Some(&TagValue::I64(3)));
    assert_eq!(span.tag_value("category.count"), Some(&TagValue::I64(2)));
    Ok(())
}

#[test]
fn test_create_with_empty_name_fails_and_marks_span() {
    let (sink, telemetry, service) = service();

    let result = service.create(NewProduct::new("", 40, "Kitchen"));
    assert_eq!(
        result,
        Err(CatalogError::Validation("empty name".to_string()))
    );

    let spans = sink.drain();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].name, "product.create");
    assert_eq!(spans[0].status, SpanStatus::Error);
    assert_eq!(spans[0].error.as_deref(), Some("empty name"));

    let snapshot = telemetry.snapshot();
    assert_eq!(
        counter_series(
            &snapshot,
            "product_operations_total",
            &[("operation", "create"), ("status", "error")],
        ),
        Some(1)
    );
}

#[test]
fn test_create_assigns_id_and_records_price() -> Result<()> {
    let (sink, telemetry, service) = service();

    let product = service.create(NewProduct::new("Laptop", 1200, "Electronics"))?;
    assert_eq!(product.id, 1);

    let spans = sink.drain();
    let span = &spans[0];
    assert_eq!(span.status, SpanStatus::Ok);
    assert_eq!(span.tag_value("product.id"), Some(&TagValue::I64(1)));
    assert_eq!(
        span.tag_value("product.name"),
        Some(&TagValue::Text("Laptop".to_string()))
    );

    let snapshot = telemetry.snapshot();
    let histogram = snapshot
        .histograms
        .iter()
        .find(|h| h.name == "product_price_distribution")
        .unwrap();
    assert_eq!(histogram.count, 1);
    assert_eq!(histogram.sum, 1200.0);
    assert_eq!(histogram.unit.as_deref(), Some("currency"));
    Ok(())
}

#[test]
fn test_get_by_id_miss_counts_not_found() {
    let (sink, telemetry, service) = service();

    let result = service.get_by_id(99);
    assert_eq!(result, Err(CatalogError::NotFound { id: 99 }));

    let spans = sink.drain();
    assert_eq!(spans[0].status, SpanStatus::Error);
    assert_eq!(spans[0].error.as_deref(), Some("product not found: 99"));

    let snapshot = telemetry.snapshot();
    assert_eq!(
        counter_series(
            &snapshot,
            "database_operations_total",
            &[("operation", "findById"), ("status", "not_found")],
        ),
        Some(1)
    );
}

#[test]
fn test_patch_nests_the_lookup_span() -> Result<()> {
    let (sink, _telemetry, service) = service();
    let product = service.create(NewProduct::new("Smartphone", 800, "Electronics"))?;
    sink.drain();

    let patched = service.patch(
        product.id,
        ProductPatch {
            price: Some(750),
            ..ProductPatch::default()
        },
    )?;
    assert_eq!(patched.price, 750);
    assert_eq!(patched.name, "Smartphone");

    let spans = sink.drain();
    assert_eq!(spans.len(), 2, "Patch wraps a nested lookup");
    let lookup = spans.iter().find(|s| s.name == "product.get_by_id").unwrap();
    let patch = spans.iter().find(|s| s.name == "product.patch").unwrap();
    assert_eq!(lookup.parent_id, Some(patch.span_id));
    assert_eq!(lookup.trace_id, patch.trace_id);
    assert_eq!(patch.tag_value("product.updated"), Some(&TagValue::Bool(true)));
    Ok(())
}

#[test]
fn test_patch_with_nothing_to_apply_keeps_product() -> Result<()> {
    let (sink, _telemetry, service) = service();
    let product = service.create(NewProduct::new("Laptop", 1200, "Electronics"))?;
    sink.drain();

    let unchanged = service.patch(product.id, ProductPatch::default())?;
    assert_eq!(unchanged, product);

    let spans = sink.drain();
    let patch = spans.iter().find(|s| s.name == "product.patch").unwrap();
    assert_eq!(
        patch.tag_value("product.updated"),
        Some(&TagValue::Bool(false))
    );
    Ok(())
}

#[test]
fn test_patch_missing_product_propagates_not_found() {
    let (sink, _telemetry, service) = service();

    let result = service.patch(7, ProductPatch::default());
    assert_eq!(result, Err(CatalogError::NotFound { id: 7 }));

    let spans = sink.drain();
    let patch = spans.iter().find(|s| s.name == "product.patch").unwrap();
    assert_eq!(patch.status, SpanStatus::Error);
    assert_eq!(patch.error.as_deref(), Some("product not found: 7"));
}

#[test]
fn test_update_replaces_existing_product() -> Result<()> {
    let (_sink, _telemetry, service) = service();
    let product = service.create(NewProduct::new("Laptop", 1200, "Electronics"))?;

    let updated = service.update(
        product.id,
        NewProduct::new("Laptop Pro", 1500, "Electronics"),
    )?;
    assert_eq!(updated.id, product.id);
    assert_eq!(updated.name, "Laptop Pro");
    assert_eq!(service.get_by_id(product.id)?.price, 1500);
    Ok(())
}

#[test]
fn test_update_missing_product_fails() {
    let (_sink, _telemetry, service) = service();
    let result = service.update(42, NewProduct::new("Ghost", 1, "x"));
    assert_eq!(result, Err(CatalogError::NotFound { id: 42 }));
}

#[test]
fn test_delete_then_lookup_fails() -> Result<()> {
    let (_sink, telemetry, service) = service();
    let product = service.create(NewProduct::new("Coffee Mug", 12, "Kitchen"))?;

    service.delete(product.id)?;
    assert_eq!(
        service.get_by_id(product.id),
        Err(CatalogError::NotFound { id: product.id })
    );
    assert_eq!(
        service.delete(product.id),
        Err(CatalogError::NotFound { id: product.id })
    );

    let snapshot = telemetry.snapshot();
    assert_eq!(
        counter_series(
            &snapshot,
            "database_operations_total",
            &[("operation", "deleteById"), ("status", "success")],
        ),
        Some(1)
    );
    assert_eq!(
        counter_series(
            &snapshot,
            "database_operations_total",
            &[("operation", "deleteById"), ("status", "not_found")],
        ),
        Some(1)
    );
    Ok(())
}

#[test]
fn test_every_operation_is_span_wrapped() -> Result<()> {
    let (sink, _telemetry, service) = service();

    let product = service.create(NewProduct::new("Laptop", 1200, "Electronics"))?;
    service.get_all()?;
    service.get_by_id(product.id)?;
    service.update(product.id, NewProduct::new("Laptop", 1100, "Electronics"))?;
    service.patch(
        product.id,
        ProductPatch {
            category: Some("Computers".to_string()),
            ..ProductPatch::default()
        },
    )?;
    service.delete(product.id)?;

    let names: Vec<String> = sink.drain().into_iter().map(|s| s.name).collect();
    for expected in [
        "product.create",
        "product.get_all",
        "product.get_by_id",
        "product.update",
        "product.patch",
        "product.delete",
    ] {
        assert!(
            names.contains(&expected.to_string()),
            "missing span for {expected}"
        );
    }
    Ok(())
}
