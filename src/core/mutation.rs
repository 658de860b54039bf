//! Product mutations - add, update and delete with history tracking.
//!
//! Every operation is a sequence of independent store calls (read, diff, write
//! history, write product). Nothing is held across them, so two concurrent
//! requests can interleave; name collisions are caught by the unique index on
//! write and surface as `DuplicateName`. A history record written just before a
//! failed product write is left behind.

use crate::{
    core::{
        diff::{check_before_image, diff_product},
        history::HistoryRecorder,
        input::{NewProduct, ProductUpdate},
        validation::{normalize_name, parse_id, validate_new_product, validate_update},
    },
    entities::{HistoryKind, HistoryLink, HistoryLinks, ProductModel},
    errors::{Error, Result},
    store::{HistoryRepository, ProductPatch, ProductRepository},
    upload::ImageUploader,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Orchestrates product writes and their history.
#[derive(Clone)]
pub struct ProductMutationService {
    products: Arc<dyn ProductRepository>,
    history: Arc<dyn HistoryRepository>,
    recorder: HistoryRecorder,
    uploader: Arc<dyn ImageUploader>,
}

impl ProductMutationService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        history: Arc<dyn HistoryRepository>,
        recorder: HistoryRecorder,
        uploader: Arc<dyn ImageUploader>,
    ) -> Self {
        Self {
            products,
            history,
            recorder,
            uploader,
        }
    }

    /// Creates a product with a single "Add product" history entry.
    ///
    /// # Errors
    /// - `Validation` if a field breaks the input rules
    /// - `DuplicateName` if the normalized name is taken
    /// - `Upload` if the image cannot be uploaded
    /// - `Storage` if the store fails
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn add_product(&self, new: NewProduct) -> Result<ProductModel> {
        validate_new_product(&new)?;
        let name = normalize_name(&new.name);

        if self.products.find_by_name(&name).await?.is_some() {
            warn!("Rejected duplicate product name '{}'", name);
            return Err(Error::DuplicateName { name });
        }

        let image = self.resolve_image(new.image).await?;

        let record = self
            .recorder
            .record(HistoryKind::AddProduct, format!("Product {name}"))
            .await?;

        let product = ProductModel {
            id: Uuid::new_v4(),
            name,
            is_active: new.is_active.unwrap_or(false),
            image: image.unwrap_or_default(),
            count: new.count,
            weight_per_item: new.weight_per_item,
            price_per_item: new.price_per_item,
            description: new.description.unwrap_or_default(),
            history: HistoryLinks(vec![HistoryLink::from(&record)]),
        };

        let created = self.products.create(product).await?;
        info!("Added product '{}' (ID: {})", created.name, created.id);
        Ok(created)
    }

    /// Applies a partial update and appends one history entry describing it.
    ///
    /// When `count` is supplied only the count change is narrated, while the
    /// other supplied fields are still written.
    ///
    /// # Errors
    /// - `InvalidId` for a malformed id, `Validation` for a bad field
    /// - `NotFound` if the product does not exist
    /// - `NoOpField` if a supplied field equals its stored value
    /// - `DuplicateName` if a new name belongs to another product
    /// - `Upload` or `Storage` on collaborator failure
    #[instrument(skip(self, update))]
    pub async fn update_product(&self, id: &str, update: ProductUpdate) -> Result<ProductModel> {
        let id = parse_id(id)?;
        validate_update(&update)?;

        let prior = self
            .products
            .find_by_id(id)
            .await?
            .ok_or_else(Error::product_not_found)?;

        if update.is_empty() {
            debug!("Empty update for product {}, nothing to record", id);
            return Ok(prior);
        }

        check_before_image(&prior, &update)?;
        let update = ProductUpdate {
            name: update.name.as_deref().map(normalize_name),
            image: self.resolve_image(update.image).await?,
            ..update
        };

        let diff = diff_product(&prior, &update)?;
        debug!("Diff for product {}: {:?}", id, diff);

        if let Some(name) = update.name.as_deref() {
            self.ensure_name_free(id, &prior.name, name).await?;
        }

        let mut patch = ProductPatch::from(update);
        if let (Some(kind), Some(narrative)) = (diff.history_kind(), diff.narrative()) {
            let record = self.recorder.record(kind, narrative).await?;
            patch.history = Some(prior.history.appended(HistoryLink::from(&record)));
        }

        let updated = self.products.update_by_id(id, patch).await?;
        info!(
            "Updated product '{}' (ID: {}), {} history entries",
            updated.name,
            updated.id,
            updated.history.len()
        );
        Ok(updated)
    }

    /// Deletes a product together with its history, then records a final
    /// unlinked "Delete" entry.
    ///
    /// # Errors
    /// - `InvalidId` for a malformed id
    /// - `NotFound` if the product does not exist
    /// - `Storage` if the store fails
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &str) -> Result<ProductModel> {
        let id = parse_id(id)?;

        let deleted = self
            .products
            .delete_by_id(id)
            .await?
            .ok_or_else(Error::product_not_found)?;

        let removed = self
            .history
            .delete_many(&deleted.history.record_ids())
            .await?;
        debug!(
            "Removed {} history records of product {}",
            removed, deleted.id
        );

        self.recorder
            .record(HistoryKind::Delete, format!("Product {}.", deleted.name))
            .await?;

        info!("Deleted product '{}' (ID: {})", deleted.name, deleted.id);
        Ok(deleted)
    }

    async fn resolve_image(&self, image: Option<String>) -> Result<Option<String>> {
        match image {
            Some(source) if !source.is_empty() => Ok(Some(self.uploader.upload(&source).await?)),
            other => Ok(other),
        }
    }

    async fn ensure_name_free(&self, id: Uuid, current: &str, name: &str) -> Result<()> {
        if name == current {
            return Ok(());
        }
        match self.products.find_by_name(name).await? {
            Some(other) if other.id != id => {
                warn!("Rejected rename of {} to taken name '{}'", id, name);
                Err(Error::DuplicateName {
                    name: name.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::entities::ProductHistoryModel;
    use crate::store::{MockHistoryRepository, MockProductRepository};
    use crate::test_utils::*;
    use crate::upload::MockImageUploader;
    use sea_orm::DbErr;

    #[tokio::test]
    async fn test_add_product_normalizes_name_and_records_history() -> Result<()> {
        let ctx = TestServices::new().await?;

        let product = ctx.mutations.add_product(lamp()).await?;

        assert_eq!(product.name, "Lamp");
        assert!(!product.is_active);
        assert_eq!(product.image, "");
        assert_eq!(product.description, "");
        assert_eq!(product.history.len(), 1);

        let record = ctx.history_record(&product, 0).await?;
        assert_eq!(record.kind, HistoryKind::AddProduct);
        assert_eq!(record.change, "Product Lamp");
        assert_eq!(record.date, test_time());
        Ok(())
    }

    #[tokio::test]
    async fn test_add_product_duplicate_name() -> Result<()> {
        let ctx = TestServices::new().await?;
        ctx.mutations.add_product(lamp()).await?;

        let result = ctx
            .mutations
            .add_product(NewProduct {
                name: "Lamp".to_string(),
                ..lamp()
            })
            .await;

        assert!(
            matches!(result, Err(Error::DuplicateName { ref name }) if name == "Lamp"),
            "expected DuplicateName, got {result:?}"
        );
        assert_eq!(ctx.history_count().await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_product_validation_touches_no_store() {
        let services = mocked_services(
            MockProductRepository::new(),
            MockHistoryRepository::new(),
            MockImageUploader::new(),
        );

        let result = services
            .add_product(NewProduct {
                price_per_item: 1.999,
                ..lamp()
            })
            .await;

        assert!(matches!(
            result,
            Err(Error::Validation { ref field, .. }) if field == "pricePerItem"
        ));
    }

    #[tokio::test]
    async fn test_add_product_uploads_image() -> Result<()> {
        let mut uploader = MockImageUploader::new();
        uploader
            .expect_upload()
            .withf(|source| source == "./lamp.png")
            .times(1)
            .returning(|_| Ok("https://cdn.example.com/lamp.png".to_string()));
        let ctx = TestServices::with_uploader(uploader).await?;

        let product = ctx
            .mutations
            .add_product(NewProduct {
                image: Some("./lamp.png".to_string()),
                ..lamp()
            })
            .await?;

        assert_eq!(product.image, "https://cdn.example.com/lamp.png");
        Ok(())
    }

    #[tokio::test]
    async fn test_add_product_upload_failure_propagates() -> Result<()> {
        let mut uploader = MockImageUploader::new();
        uploader.expect_upload().returning(|_| {
            Err(Error::Upload {
                message: "timeout".to_string(),
            })
        });
        let ctx = TestServices::with_uploader(uploader).await?;

        let result = ctx
            .mutations
            .add_product(NewProduct {
                image: Some("./lamp.png".to_string()),
                ..lamp()
            })
            .await;

        assert!(matches!(result, Err(Error::Upload { .. })));
        assert_eq!(ctx.history_count().await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_product_write_conflict_maps_to_duplicate() {
        let mut products = MockProductRepository::new();
        products.expect_find_by_name().returning(|_| Ok(None));
        products.expect_create().returning(|p| {
            Err(Error::DuplicateName {
                name: p.name.clone(),
            })
        });
        let mut history = MockHistoryRepository::new();
        history.expect_create().times(1).returning(Ok);

        let services = mocked_services(products, history, MockImageUploader::new());
        let result = services.add_product(lamp()).await;

        assert!(matches!(result, Err(Error::DuplicateName { .. })));
    }

    #[tokio::test]
    async fn test_lamp_walkthrough() -> Result<()> {
        let ctx = TestServices::new().await?;
        let product = ctx.mutations.add_product(lamp()).await?;
        let id = product.id.to_string();

        let price = ProductUpdate {
            price_per_item: Some(550.8),
            ..Default::default()
        };
        let updated = ctx.mutations.update_product(&id, price.clone()).await?;
        assert_eq!(updated.price_per_item, 550.8);
        assert_eq!(updated.history.len(), 2);

        let record = ctx.history_record(&updated, 1).await?;
        assert_eq!(record.kind, HistoryKind::EditInfo);
        assert!(
            record
                .change
                .contains("changed 'pricePerItem' from 236 to 550.8"),
            "unexpected narrative: {}",
            record.change
        );

        let again = ctx.mutations.update_product(&id, price).await;
        assert!(
            matches!(again, Err(Error::NoOpField { ref field }) if field == "pricePerItem"),
            "expected NoOpField, got {again:?}"
        );
        assert_eq!(ctx.history_count().await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_count_applies_other_fields_silently() -> Result<()> {
        let ctx = TestServices::new().await?;
        let product = ctx.mutations.add_product(lamp()).await?;

        let updated = ctx
            .mutations
            .update_product(
                &product.id.to_string(),
                ProductUpdate {
                    count: Some(5),
                    description: Some("Brass".to_string()),
                    ..Default::default()
                },
            )
            .await?;

        assert_eq!(updated.count, 5);
        assert_eq!(updated.description, "Brass");
        assert_eq!(updated.history.len(), 2);

        let record = ctx.history_record(&updated, 1).await?;
        assert_eq!(record.kind, HistoryKind::EditCount);
        assert_eq!(record.change, "Product Lamp changed count from 1 to 5.");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_with_no_fields_writes_no_history() -> Result<()> {
        let ctx = TestServices::new().await?;
        let product = ctx.mutations.add_product(lamp()).await?;

        let updated = ctx
            .mutations
            .update_product(&product.id.to_string(), ProductUpdate::default())
            .await?;

        assert_eq!(updated, product);
        assert_eq!(ctx.history_count().await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_normalizes_name_before_diffing() -> Result<()> {
        let ctx = TestServices::new().await?;
        let product = ctx.mutations.add_product(lamp()).await?;

        let result = ctx
            .mutations
            .update_product(
                &product.id.to_string(),
                ProductUpdate {
                    name: Some("lamp".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(Error::NoOpField { ref field }) if field == "name"));
        Ok(())
    }

    #[tokio::test]
    async fn test_unchanged_is_active_rejected_before_upload() -> Result<()> {
        let mut uploader = MockImageUploader::new();
        uploader.expect_upload().returning(|_| {
            Err(Error::Upload {
                message: "down".to_string(),
            })
        });
        let ctx = TestServices::with_uploader(uploader).await?;
        let product = ctx.mutations.add_product(lamp()).await?;

        let result = ctx
            .mutations
            .update_product(
                &product.id.to_string(),
                ProductUpdate {
                    is_active: Some(false),
                    image: Some("./x.png".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(
            matches!(result, Err(Error::NoOpField { ref field }) if field == "isActive"),
            "expected NoOpField(isActive), got {result:?}"
        );
        assert_eq!(ctx.history_count().await?, 1);
        Ok(())
    }

    fn cdn_uploader() -> MockImageUploader {
        let mut uploader = MockImageUploader::new();
        uploader.expect_upload().returning(|source| {
            Ok(format!(
                "https://cdn.example.com/{}",
                source.trim_start_matches("./")
            ))
        });
        uploader
    }

    #[tokio::test]
    async fn test_update_image_records_url_change() -> Result<()> {
        let ctx = TestServices::with_uploader(cdn_uploader()).await?;
        let product = ctx
            .mutations
            .add_product(NewProduct {
                image: Some("./lamp.png".to_string()),
                ..lamp()
            })
            .await?;

        let updated = ctx
            .mutations
            .update_product(
                &product.id.to_string(),
                ProductUpdate {
                    image: Some("./lamp-brass.png".to_string()),
                    ..Default::default()
                },
            )
            .await?;

        assert_eq!(updated.image, "https://cdn.example.com/lamp-brass.png");
        let record = ctx.history_record(&updated, 1).await?;
        assert_eq!(record.kind, HistoryKind::EditInfo);
        assert_eq!(
            record.change,
            "Product Lamp: changed 'image' from https://cdn.example.com/lamp.png \
             to https://cdn.example.com/lamp-brass.png"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_update_image_to_same_url_is_no_op() -> Result<()> {
        let ctx = TestServices::with_uploader(cdn_uploader()).await?;
        let product = ctx
            .mutations
            .add_product(NewProduct {
                image: Some("./lamp.png".to_string()),
                ..lamp()
            })
            .await?;

        let result = ctx
            .mutations
            .update_product(
                &product.id.to_string(),
                ProductUpdate {
                    image: Some("./lamp.png".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(
            matches!(result, Err(Error::NoOpField { ref field }) if field == "image"),
            "expected NoOpField(image), got {result:?}"
        );
        assert_eq!(ctx.history_count().await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_rename_to_taken_name() -> Result<()> {
        let ctx = TestServices::new().await?;
        ctx.mutations.add_product(lamp()).await?;
        let chair = ctx
            .mutations
            .add_product(NewProduct {
                name: "chair".to_string(),
                ..lamp()
            })
            .await?;

        let result = ctx
            .mutations
            .update_product(
                &chair.id.to_string(),
                ProductUpdate {
                    name: Some("lamp".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(Error::DuplicateName { ref name }) if name == "Lamp"));
        assert_eq!(ctx.history_count().await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_invalid_and_missing_ids() -> Result<()> {
        let ctx = TestServices::new().await?;

        let invalid = ctx
            .mutations
            .update_product("63d7c48ce8e1b86755cd2bdf", ProductUpdate::default())
            .await;
        assert!(matches!(invalid, Err(Error::InvalidId { .. })));

        let missing = ctx
            .mutations
            .update_product(&Uuid::new_v4().to_string(), ProductUpdate::default())
            .await;
        assert!(matches!(missing, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_cascades_history_and_records_delete() -> Result<()> {
        let ctx = TestServices::new().await?;
        let product = ctx.mutations.add_product(lamp()).await?;
        let id = product.id.to_string();
        let product = ctx
            .mutations
            .update_product(
                &id,
                ProductUpdate {
                    count: Some(3),
                    ..Default::default()
                },
            )
            .await?;
        let linked = product.history.record_ids();

        let deleted = ctx.mutations.delete_product(&id).await?;
        assert_eq!(deleted, product);

        for record_id in linked {
            assert!(ctx.history.find_by_id(record_id).await?.is_none());
        }

        let remaining: Vec<ProductHistoryModel> = ctx.history.find(10, 0).await?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].kind, HistoryKind::Delete);
        assert_eq!(remaining[0].change, "Product Lamp.");

        let again = ctx.mutations.delete_product(&id).await;
        assert!(matches!(again, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_leaves_other_products_history() -> Result<()> {
        let ctx = TestServices::new().await?;
        let first = ctx.mutations.add_product(lamp()).await?;
        let chair = ctx
            .mutations
            .add_product(NewProduct {
                name: "chair".to_string(),
                ..lamp()
            })
            .await?;

        ctx.mutations.delete_product(&first.id.to_string()).await?;

        let chair_record = ctx.history_record(&chair, 0).await?;
        assert_eq!(chair_record.change, "Product Chair");
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_product_write_leaves_orphan_history() {
        let mut products = MockProductRepository::new();
        let prior = sample_product("Lamp");
        let id = prior.id;
        products
            .expect_find_by_id()
            .returning(move |_| Ok(Some(prior.clone())));
        products
            .expect_update_by_id()
            .returning(|_, _| Err(Error::Storage(DbErr::Custom("write failed".to_string()))));
        let mut history = MockHistoryRepository::new();
        history.expect_create().times(1).returning(Ok);

        let services = mocked_services(products, history, MockImageUploader::new());
        let result = services
            .update_product(
                &id.to_string(),
                ProductUpdate {
                    count: Some(9),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(Error::Storage(_))));
    }
}
