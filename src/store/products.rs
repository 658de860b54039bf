use crate::{
    entities::{Product, ProductModel, product},
    errors::{Error, Result},
    store::{ProductPatch, ProductRepository, bounded},
};
use async_trait::async_trait;
use sea_orm::{QuerySelect, Set, prelude::*};
use tracing::{debug, trace};

/// [`ProductRepository`] backed by a `SeaORM` connection.
#[derive(Debug, Clone)]
pub struct SeaOrmProductRepository {
    db: DatabaseConnection,
}

impl SeaOrmProductRepository {
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for SeaOrmProductRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<ProductModel>> {
        Product::find()
            .filter(product::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductModel>> {
        Product::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(Into::into)
    }

    async fn create(&self, product: ProductModel) -> Result<ProductModel> {
        let name = product.name.clone();
        let record = product::ActiveModel {
            id: Set(product.id),
            name: Set(product.name),
            is_active: Set(product.is_active),
            image: Set(product.image),
            count: Set(product.count),
            weight_per_item: Set(product.weight_per_item),
            price_per_item: Set(product.price_per_item),
            description: Set(product.description),
            history: Set(product.history),
        };

        record
            .insert(&self.db)
            .await
            .map_err(|e| Error::from_product_write(e, &name))
    }

    async fn update_by_id(&self, id: Uuid, patch: ProductPatch) -> Result<ProductModel> {
        let existing = Product::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(Error::product_not_found)?;

        if patch.is_empty() {
            trace!("Empty patch for product {}, nothing to write", id);
            return Ok(existing);
        }

        let name = patch.name.clone().unwrap_or_else(|| existing.name.clone());
        let mut product: product::ActiveModel = existing.into();

        if let Some(is_active) = patch.is_active {
            product.is_active = Set(is_active);
        }
        if let Some(image) = patch.image {
            product.image = Set(image);
        }
        if let Some(new_name) = patch.name {
            product.name = Set(new_name);
        }
        if let Some(count) = patch.count {
            product.count = Set(count);
        }
        if let Some(weight) = patch.weight_per_item {
            product.weight_per_item = Set(weight);
        }
        if let Some(price) = patch.price_per_item {
            product.price_per_item = Set(price);
        }
        if let Some(description) = patch.description {
            product.description = Set(description);
        }
        if let Some(history) = patch.history {
            product.history = Set(history);
        }

        product
            .update(&self.db)
            .await
            .map_err(|e| Error::from_product_write(e, &name))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<ProductModel>> {
        let Some(existing) = Product::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let result = Product::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            // Removed by a concurrent writer between the read and the delete.
            debug!("Product {} vanished before delete", id);
            return Ok(None);
        }

        Ok(Some(existing))
    }

    async fn find(&self, limit: u64, skip: u64) -> Result<Vec<ProductModel>> {
        Product::find()
            .offset(bounded(skip))
            .limit(bounded(limit))
            .all(&self.db)
            .await
            .map_err(Into::into)
    }
}
