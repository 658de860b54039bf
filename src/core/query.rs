//! Read-only product and history queries.

use crate::{
    core::validation::parse_id,
    entities::{ProductHistoryModel, ProductModel},
    errors::{Error, Result},
    store::{HistoryRepository, ProductRepository},
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Paginated listings and single-product lookup.
#[derive(Clone)]
pub struct ProductQueryService {
    products: Arc<dyn ProductRepository>,
    history: Arc<dyn HistoryRepository>,
}

impl ProductQueryService {
    pub fn new(products: Arc<dyn ProductRepository>, history: Arc<dyn HistoryRepository>) -> Self {
        Self { products, history }
    }

    /// Lists up to `limit` products after skipping `offset`.
    ///
    /// A zero `limit` yields an empty list. Otherwise an empty page fails with
    /// `EmptyResult`.
    #[instrument(skip(self))]
    pub async fn get_all_products(&self, limit: u64, offset: u64) -> Result<Vec<ProductModel>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let products = self.products.find(limit, offset).await?;
        debug!("Fetched {} products", products.len());
        non_empty(products)
    }

    /// Lists up to `limit` history records after skipping `offset`.
    ///
    /// Same empty-page rules as [`Self::get_all_products`].
    #[instrument(skip(self))]
    pub async fn get_all_products_history(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<ProductHistoryModel>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let records = self.history.find(limit, offset).await?;
        debug!("Fetched {} history records", records.len());
        non_empty(records)
    }

    /// Fetches one product by id.
    ///
    /// # Errors
    /// `InvalidId` for a malformed id, `NotFound` if it does not exist.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: &str) -> Result<ProductModel> {
        let id = parse_id(id)?;
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(Error::product_not_found)
    }
}

fn non_empty<T>(items: Vec<T>) -> Result<Vec<T>> {
    if items.is_empty() {
        return Err(Error::EmptyResult);
    }
    Ok(items)
}
