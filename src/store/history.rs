use crate::{
    entities::{ProductHistory, ProductHistoryModel, product_history},
    errors::Result,
    store::{HistoryRepository, bounded},
};
use async_trait::async_trait;
use sea_orm::{QuerySelect, Set, prelude::*};
use tracing::debug;

/// [`HistoryRepository`] backed by a `SeaORM` connection.
#[derive(Debug, Clone)]
pub struct SeaOrmHistoryRepository {
    db: DatabaseConnection,
}

impl SeaOrmHistoryRepository {
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HistoryRepository for SeaOrmHistoryRepository {
    async fn create(&self, record: ProductHistoryModel) -> Result<ProductHistoryModel> {
        product_history::ActiveModel {
            id: Set(record.id),
            date: Set(record.date),
            kind: Set(record.kind),
            change: Set(record.change),
        }
        .insert(&self.db)
        .await
        .map_err(Into::into)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductHistoryModel>> {
        ProductHistory::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn find(&self, limit: u64, skip: u64) -> Result<Vec<ProductHistoryModel>> {
        ProductHistory::find()
            .offset(bounded(skip))
            .limit(bounded(limit))
            .all(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = ProductHistory::delete_many()
            .filter(product_history::Column::Id.is_in(ids.iter().copied()))
            .exec(&self.db)
            .await?;

        debug!(
            "Deleted {} of {} history records",
            result.rows_affected,
            ids.len()
        );
        Ok(result.rows_affected)
    }
}
