//! Store - repository traits over the document store and their `SeaORM` implementations.
//!
//! The services only see [`ProductRepository`] and [`HistoryRepository`]. Each call is
//! an independent round trip; nothing here holds a transaction open across calls.

mod history;
mod products;

pub use history::SeaOrmHistoryRepository;
pub use products::SeaOrmProductRepository;

use crate::{
    entities::{HistoryLinks, ProductHistoryModel, ProductModel},
    errors::Result,
};
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

/// Largest `LIMIT`/`OFFSET` the SQLite binder accepts.
const MAX_ROWS: u64 = i64::MAX as u64;

/// Clamps a pagination value into the range the store can bind.
pub(crate) const fn bounded(value: u64) -> u64 {
    if value > MAX_ROWS { MAX_ROWS } else { value }
}

/// Partial product document. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub is_active: Option<bool>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub count: Option<i64>,
    pub weight_per_item: Option<f64>,
    pub price_per_item: Option<f64>,
    pub description: Option<String>,
    pub history: Option<HistoryLinks>,
}

impl ProductPatch {
    /// Whether the patch sets no field at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[automock]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Looks a product up by its exact (normalized) name.
    async fn find_by_name(&self, name: &str) -> Result<Option<ProductModel>>;

    /// Looks a product up by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductModel>>;

    /// Inserts a new product. A name collision fails with `DuplicateName`.
    async fn create(&self, product: ProductModel) -> Result<ProductModel>;

    /// Applies `patch` to the product and returns the updated document.
    async fn update_by_id(&self, id: Uuid, patch: ProductPatch) -> Result<ProductModel>;

    /// Removes the product, returning its last state, or `None` if it did not exist.
    async fn delete_by_id(&self, id: Uuid) -> Result<Option<ProductModel>>;

    /// Up to `limit` products after skipping `skip`, in store order.
    async fn find(&self, limit: u64, skip: u64) -> Result<Vec<ProductModel>>;
}

#[automock]
#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Inserts one history record.
    async fn create(&self, record: ProductHistoryModel) -> Result<ProductHistoryModel>;

    /// Looks a history record up by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductHistoryModel>>;

    /// Up to `limit` records after skipping `skip`, in store order.
    async fn find(&self, limit: u64, skip: u64) -> Result<Vec<ProductHistoryModel>>;

    /// Deletes every record whose id is in `ids`, returning how many were removed.
    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64>;
}
