//! App Context

use std::{path::Path, sync::Arc};

use sea_orm::DatabaseConnection;
use tracing::{debug, info};

use crate::{
    clock::{Clock, SystemClock},
    config::{AppConfig, database},
    core::{HistoryRecorder, ProductMutationService, ProductQueryService},
    errors::Result,
    store::{HistoryRepository, ProductRepository, SeaOrmHistoryRepository, SeaOrmProductRepository},
    upload::{HttpImageUploader, ImageUploader},
};

/// The wired services, shared by every request.
#[derive(Clone)]
pub struct AppContext {
    pub mutations: Arc<ProductMutationService>,
    pub queries: Arc<ProductQueryService>,
}

impl AppContext {
    /// Wires the services over an existing connection.
    pub fn from_connection(
        db: DatabaseConnection,
        uploader: Arc<dyn ImageUploader>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let products: Arc<dyn ProductRepository> =
            Arc::new(SeaOrmProductRepository::new(db.clone()));
        let history: Arc<dyn HistoryRepository> = Arc::new(SeaOrmHistoryRepository::new(db));
        let recorder = HistoryRecorder::new(Arc::clone(&history), clock);

        Self {
            mutations: Arc::new(ProductMutationService::new(
                Arc::clone(&products),
                Arc::clone(&history),
                recorder,
                uploader,
            )),
            queries: Arc::new(ProductQueryService::new(products, history)),
        }
    }

    /// Build application context from loaded settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be opened or prepared, or the
    /// upload client cannot be built.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let url = database::get_database_url(config.database_url.as_deref());
        ensure_sqlite_dir(&url).await?;

        let db = database::create_connection(&url).await?;
        database::create_tables(&db).await?;
        info!("Database ready.");

        let uploader = HttpImageUploader::new(config.uploader_config())?;
        Ok(Self::from_connection(
            db,
            Arc::new(uploader),
            Arc::new(SystemClock),
        ))
    }
}

/// Creates the parent directory of a file-backed `SQLite` URL.
async fn ensure_sqlite_dir(url: &str) -> Result<()> {
    let Some(path) = url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        debug!("Ensuring database directory {}", parent.display());
        tokio::fs::create_dir_all(parent).await?;
    }
    Ok(())
}
