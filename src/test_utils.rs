//! Shared test utilities for the product service.
//!
//! This module provides helpers for setting up in-memory test databases, wiring
//! the services against them with a frozen clock, and building sample products.

use crate::{
    clock::FixedClock,
    core::{HistoryRecorder, NewProduct, ProductMutationService, ProductQueryService},
    entities::{HistoryLinks, ProductHistoryModel, ProductModel},
    errors::{Error, Result},
    store::{HistoryRepository, ProductRepository, SeaOrmHistoryRepository, SeaOrmProductRepository},
    upload::{ImageUploader, MockImageUploader},
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

/// Installs a test-friendly tracing subscriber. Safe to call more than once.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    init_test_tracing();
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// The instant every test clock is frozen at. Whole seconds so it survives
/// storage unchanged.
pub fn test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 30, 13, 22, 20)
        .single()
        .unwrap_or_default()
}

/// A stored-product document with sensible defaults.
///
/// # Defaults
/// * `count`: 1
/// * `weight_per_item`: 0.435
/// * `price_per_item`: 236
/// * `is_active`: false
/// * empty image, description and history
pub fn sample_product(name: &str) -> ProductModel {
    ProductModel {
        id: Uuid::new_v4(),
        name: name.to_string(),
        is_active: false,
        image: String::new(),
        count: 1,
        weight_per_item: 0.435,
        price_per_item: 236.0,
        description: String::new(),
        history: HistoryLinks::default(),
    }
}

/// Input for adding the lamp used throughout the tests (name not yet normalized).
pub fn lamp() -> NewProduct {
    NewProduct {
        name: "lamp".to_string(),
        count: 1,
        weight_per_item: 0.435,
        price_per_item: 236.0,
        is_active: None,
        image: None,
        description: None,
    }
}

/// A recorder over a fresh database, plus the repository it writes to.
pub async fn setup_recorder() -> Result<(HistoryRecorder, SeaOrmHistoryRepository)> {
    let db = setup_test_db().await?;
    let history = SeaOrmHistoryRepository::new(db);
    let recorder = HistoryRecorder::new(
        Arc::new(history.clone()),
        Arc::new(FixedClock(test_time())),
    );
    Ok((recorder, history))
}

/// Mutation service over mocked collaborators and a frozen clock.
pub fn mocked_services(
    products: impl ProductRepository + 'static,
    history: impl HistoryRepository + 'static,
    uploader: impl ImageUploader + 'static,
) -> ProductMutationService {
    let history: Arc<dyn HistoryRepository> = Arc::new(history);
    let recorder = HistoryRecorder::new(Arc::clone(&history), Arc::new(FixedClock(test_time())));
    ProductMutationService::new(Arc::new(products), history, recorder, Arc::new(uploader))
}

/// Both services wired to one in-memory database.
pub struct TestServices {
    pub mutations: ProductMutationService,
    pub queries: ProductQueryService,
    /// Direct handle on the history table for assertions
    pub history: SeaOrmHistoryRepository,
}

impl TestServices {
    /// Services with an uploader that must never be called.
    pub async fn new() -> Result<Self> {
        Self::with_uploader(MockImageUploader::new()).await
    }

    pub async fn with_uploader(uploader: MockImageUploader) -> Result<Self> {
        let db = setup_test_db().await?;
        let products: Arc<dyn ProductRepository> =
            Arc::new(SeaOrmProductRepository::new(db.clone()));
        let history = SeaOrmHistoryRepository::new(db);
        let shared_history: Arc<dyn HistoryRepository> = Arc::new(history.clone());
        let recorder =
            HistoryRecorder::new(Arc::clone(&shared_history), Arc::new(FixedClock(test_time())));

        Ok(Self {
            mutations: ProductMutationService::new(
                Arc::clone(&products),
                Arc::clone(&shared_history),
                recorder,
                Arc::new(uploader),
            ),
            queries: ProductQueryService::new(products, shared_history),
            history,
        })
    }

    /// Loads the `index`-th history record linked from `product`.
    pub async fn history_record(
        &self,
        product: &ProductModel,
        index: usize,
    ) -> Result<ProductHistoryModel> {
        let missing = || Error::NotFound {
            message: format!("No history link {index} on product {}", product.id),
        };
        let link = product.history.0.get(index).ok_or_else(missing)?;
        self.history
            .find_by_id(link.product_history)
            .await?
            .ok_or_else(missing)
    }

    /// Total number of stored history records.
    pub async fn history_count(&self) -> Result<usize> {
        Ok(self.history.find(1000, 0).await?.len())
    }
}
