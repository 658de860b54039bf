//! Input shapes accepted by the product operations.

use crate::store::ProductPatch;

/// Fields for a new product. Optional fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub count: i64,
    pub weight_per_item: f64,
    pub price_per_item: f64,
    pub is_active: Option<bool>,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Partial update of a product. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    pub count: Option<i64>,
    pub is_active: Option<bool>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub weight_per_item: Option<f64>,
    pub price_per_item: Option<f64>,
    pub description: Option<String>,
}

impl ProductUpdate {
    /// Whether no field was supplied.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<ProductUpdate> for ProductPatch {
    fn from(update: ProductUpdate) -> Self {
        Self {
            is_active: update.is_active,
            image: update.image,
            name: update.name,
            count: update.count,
            weight_per_item: update.weight_per_item,
            price_per_item: update.price_per_item,
            description: update.description,
            history: None,
        }
    }
}
