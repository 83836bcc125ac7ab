use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::RwLock;

use crate::model::Product;

/// In-memory product store, keyed by integer id.
///
/// Stands in for a conventional relational table; callers treat it as a
/// key-value-by-id collection and nothing more.
#[derive(Debug)]
pub struct ProductStore {
    items: RwLock<BTreeMap<u32, Product>>,
    next_id: AtomicU32,
}

impl ProductStore {
    pub fn new() -> Self {
        ProductStore {
            items: RwLock::new(BTreeMap::new()),
            next_id: AtomicU32::new(1),
        }
    }

    /// All products in id order.
    pub fn find_all(&self) -> Vec<Product> {
        self.items.read().unwrap().values().cloned().collect()
    }

    pub fn find_by_id(&self, id: u32) -> Option<Product> {
        self.items.read().unwrap().get(&id).cloned()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.items.read().unwrap().contains_key(&id)
    }

    /// Inserts or replaces a product, assigning an id to id-0 entries.
    /// Returns the stored value.
    pub fn save(&self, mut product: Product) -> Product {
        if product.id == 0 {
            product.id = self.next_id.fetch_add(1, Ordering::Relaxed);
        }
        self.items
            .write()
            .unwrap()
            .insert(product.id, product.clone());
        product
    }

    pub fn remove(&self, id: u32) -> Option<Product> {
        self.items.write().unwrap().remove(&id)
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().unwrap().is_empty()
    }
}

impl Default for ProductStore {
    fn default() -> Self {
        ProductStore::new()
    }
}
