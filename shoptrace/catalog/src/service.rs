//! The instrumented product service.
//!
//! Every operation runs inside a span scope, tags the ambient span with
//! domain attributes, and feeds the operation counters and the price
//! histogram. Telemetry is best-effort throughout: the `Result` a caller
//! sees is exactly what the operation produced.

use std::collections::BTreeSet;
use std::sync::Arc;

use shoptrace_core::{tag, CounterHandle, HistogramHandle, TelemetryContext, TelemetryError};

use crate::error::CatalogError;
use crate::model::{NewProduct, Product, ProductPatch};
use crate::store::ProductStore;

fn validate(req: &NewProduct) -> Result<(), CatalogError> {
    if req.name.trim().is_empty() {
        return Err(CatalogError::Validation("empty name".to_string()));
    }
    if req.price < 0 {
        return Err(CatalogError::Validation("negative price".to_string()));
    }
    Ok(())
}

pub struct ProductService {
    store: ProductStore,
    telemetry: Arc<TelemetryContext>,
    ops_counter: CounterHandle,
    db_counter: CounterHandle,
    price_histogram: HistogramHandle,
}

impl ProductService {
    /// Builds the service and registers its instruments.
    ///
    /// Fails only on instrument kind collisions, i.e. misconfiguration at
    /// startup; nothing after construction returns a telemetry error.
    pub fn new(telemetry: Arc<TelemetryContext>) -> Result<Self, TelemetryError> {
        let ops_counter = telemetry.register_counter(
            "product_operations_total",
            "Total number of product operations",
        )?;
        let db_counter = telemetry.register_counter(
            "database_operations_total",
            "Total number of database operations",
        )?;
        let price_histogram = telemetry.register_histogram(
            "product_price_distribution",
            "Distribution of product prices",
            "currency",
        )?;
        log::info!("catalog telemetry instruments initialized");

        Ok(ProductService {
            store: ProductStore::new(),
            telemetry,
            ops_counter,
            db_counter,
            price_histogram,
        })
    }

    /// Lists every product.
    pub fn get_all(&self) -> Result<Vec<Product>, CatalogError> {
        self.telemetry.scope("product.get_all").run(|_span| {
            log::info!("retrieving all products");
            tag("operation", "get_all_products");

            self.record_database_operation("findAll", "started");
            let products = self.store.find_all();
            self.record_database_operation("findAll", "success");
            self.record_product_operation("get_all", "all_categories", "success");

            let category_count = products
                .iter()
                .map(|p| p.category.as_str())
                .collect::<BTreeSet<_>>()
                .len();
            tag("product.count", products.len() as i64);
            tag("category.count", category_count as i64);

            log::info!(
                "retrieved {} products across {category_count} categories",
                products.len()
            );
            Ok(products)
        })
    }

    /// Looks up one product by id.
    pub fn get_by_id(&self, id: u32) -> Result<Product, CatalogError> {
        self.telemetry.scope("product.get_by_id").run(|_span| {
            log::info!("retrieving product {id}");
            tag("operation", "get_by_id");
            tag("product.id", id as i64);

            self.record_database_operation("findById", "started");
            match self.store.find_by_id(id) {
                Some(product) => {
                    self.record_database_operation("findById", "success");
                    self.record_product_operation("get_by_id", &product.category, "success");
                    self.tag_product(
                        Some(product.id),
                        Some(&product.name),
                        Some(product.price),
                        Some(&product.category),
                    );
                    log::info!(
                        "retrieved product {} (category {}, price {})",
                        product.name,
                        product.category,
                        product.price
                    );
                    Ok(product)
                }
                None => {
                    self.record_database_operation("findById", "not_found");
                    self.record_product_operation("get_by_id", "unknown", "not_found");
                    log::warn!("product not found: {id}");
                    Err(CatalogError::NotFound { id })
                }
            }
        })
    }

    /// Validates and stores a new product.
    pub fn create(&self, req: NewProduct) -> Result<Product, CatalogError> {
        self.telemetry.scope("product.create").run(|_span| {
            if let Err(e) = validate(&req) {
                self.record_product_operation("create", &req.category, "error");
                return Err(e);
            }
            log::info!(
                "adding product {} (category {}, price {})",
                req.name,
                req.category,
                req.price
            );
            tag("operation", "add_product");
            self.tag_product(None, Some(&req.name), Some(req.price), Some(&req.category));

            self.record_database_operation("save", "started");
            let saved = self.store.save(Product {
                id: 0,
                name: req.name,
                price: req.price,
                category: req.category,
            });
            self.record_database_operation("save", "success");
            self.record_product_operation("create", &saved.category, "success");
            self.record_product_price(saved.price, &saved.category);

            tag("product.id", saved.id as i64);
            log::info!("added product {} with id {}", saved.name, saved.id);
            Ok(saved)
        })
    }

    /// Fully replaces an existing product.
    pub fn update(&self, id: u32, req: NewProduct) -> Result<Product, CatalogError> {
        self.telemetry.scope("product.update").run(|_span| {
            log::info!("updating product {id} to name {}", req.name);
            tag("operation", "update_product");
            tag("product.id", id as i64);

            if let Err(e) = validate(&req) {
                self.record_product_operation("update", &req.category, "error");
                return Err(e);
            }
            if !self.store.contains(id) {
                self.record_product_operation("update", "unknown", "not_found");
                log::warn!("product not found for update: {id}");
                return Err(CatalogError::NotFound { id });
            }

            self.record_database_operation("save", "started");
            let updated = self.store.save(Product {
                id,
                name: req.name,
                price: req.price,
                category: req.category,
            });
            self.record_database_operation("save", "success");
            self.record_product_operation("update", &updated.category, "success");

            log::info!("updated product {id}");
            Ok(updated)
        })
    }

    /// Applies the set fields of a patch to an existing product.
    ///
    /// Looks the product up through [`get_by_id`](Self::get_by_id), so a
    /// nested lookup span appears under the patch span.
    pub fn patch(&self, id: u32, updates: ProductPatch) -> Result<Product, CatalogError> {
        self.telemetry.scope("product.patch").run(|_span| {
            log::info!("partially updating product {id}");
            tag("operation", "patch_product");
            tag("product.id", id as i64);

            let mut existing = self.get_by_id(id)?;
            let mut changed = false;
            if let Some(name) = updates.name.filter(|n| !n.trim().is_empty()) {
                existing.name = name;
                changed = true;
            }
            if let Some(price) = updates.price.filter(|p| *p > 0) {
                existing.price = price;
                changed = true;
            }
            if let Some(category) = updates.category.filter(|c| !c.trim().is_empty()) {
                existing.category = category;
                changed = true;
            }
            tag("product.updated", changed);

            if !changed {
                log::info!("no updates applied to product {id}");
                return Ok(existing);
            }

            self.record_database_operation("save", "started");
            let saved = self.store.save(existing);
            self.record_database_operation("save", "success");
            self.record_product_operation("patch", &saved.category, "success");
            log::info!("partially updated product {id}");
            Ok(saved)
        })
    }

    /// Deletes a product by id.
    pub fn delete(&self, id: u32) -> Result<(), CatalogError> {
        self.telemetry.scope("product.delete").run(|_span| {
            log::info!("deleting product {id}");
            tag("operation", "delete_product");
            tag("product.id", id as i64);

            self.record_database_operation("deleteById", "started");
            match self.store.remove(id) {
                Some(removed) => {
                    self.record_database_operation("deleteById", "success");
                    self.record_product_operation("delete", &removed.category, "success");
                    log::info!("deleted product {id}");
                    Ok(())
                }
                None => {
                    self.record_database_operation("deleteById", "not_found");
                    self.record_product_operation("delete", "unknown", "not_found");
                    log::warn!("product not found for delete: {id}");
                    Err(CatalogError::NotFound { id })
                }
            }
        })
    }

    fn record_product_operation(&self, operation: &str, category: &str, status: &str) {
        let category = if category.is_empty() { "unknown" } else { category };
        self.telemetry.increment(
            &self.ops_counter,
            1,
            &[
                ("operation", operation),
                ("category", category),
                ("status", status),
            ],
        );
    }

    fn record_database_operation(&self, operation: &str, status: &str) {
        self.telemetry.increment(
            &self.db_counter,
            1,
            &[("operation", operation), ("status", status)],
        );
    }

    fn record_product_price(&self, price: i64, category: &str) {
        let category = if category.is_empty() { "unknown" } else { category };
        self.telemetry
            .record(&self.price_histogram, price as f64, &[("category", category)]);
    }

    fn tag_product(
        &self,
        id: Option<u32>,
        name: Option<&str>,
        price: Option<i64>,
        category: Option<&str>,
    ) {
        if let Some(id) = id {
            tag("product.id", id as i64);
        }
        if let Some(name) = name {
            tag("product.name", name);
        }
        if let Some(price) = price {
            tag("product.price", price);
        }
        if let Some(category) = category {
            tag("category", category);
        }
    }
}
