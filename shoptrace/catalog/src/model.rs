use serde::{Deserialize, Serialize};

/// A catalog entry. `id` 0 means not yet stored; the store assigns the real
/// id on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    /// Price in minor currency units.
    pub price: i64,
    pub category: String,
}

/// Input for creating or fully replacing a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    pub category: String,
}

impl NewProduct {
    pub fn new<N: Into<String>, C: Into<String>>(name: N, price: i64, category: C) -> Self {
        NewProduct {
            name: name.into(),
            price,
            category: category.into(),
        }
    }
}

/// Partial update; unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub category: Option<String>,
}
