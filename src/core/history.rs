//! History recording - persists one immutable record per change event.

use crate::{
    clock::Clock,
    entities::{HistoryKind, HistoryLink, ProductHistoryModel},
    errors::Result,
    store::HistoryRepository,
};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Writes history records stamped by the injected clock.
#[derive(Clone)]
pub struct HistoryRecorder {
    repository: Arc<dyn HistoryRepository>,
    clock: Arc<dyn Clock>,
}

impl HistoryRecorder {
    pub fn new(repository: Arc<dyn HistoryRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Persists a record of `kind` with narrative `change`.
    ///
    /// No validation is applied to either argument. Store failures propagate.
    #[instrument(skip(self))]
    pub async fn record(&self, kind: HistoryKind, change: String) -> Result<ProductHistoryModel> {
        let record = ProductHistoryModel {
            id: Uuid::new_v4(),
            date: self.clock.now(),
            kind,
            change,
        };

        let created = self.repository.create(record).await?;
        debug!("Recorded history {} ({:?})", created.id, created.kind);
        Ok(created)
    }
}

impl From<&ProductHistoryModel> for HistoryLink {
    fn from(record: &ProductHistoryModel) -> Self {
        Self {
            date: record.date,
            product_history: record.id,
        }
    }
}
