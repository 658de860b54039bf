//! Product entity - Represents a tracked inventory item.
//!
//! Each product carries its business fields plus an embedded, append-only list of
//! links into the `product_history` table. The list is stored as a JSON column so
//! the product row stays a self-contained document.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Generated identifier, immutable after creation
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Unique, capitalized product name (e.g., "Lamp")
    #[sea_orm(unique)]
    pub name: String,
    /// Whether the product is switched on in the catalogue
    pub is_active: bool,
    /// Hosted image URL, empty when no image was uploaded
    pub image: String,
    /// Units in stock
    pub count: i64,
    /// Weight of a single unit, up to 3 fractional digits
    pub weight_per_item: f64,
    /// Price of a single unit, up to 2 fractional digits
    pub price_per_item: f64,
    /// Free-form description
    pub description: String,
    /// Chronological links to this product's history records
    #[sea_orm(column_type = "Json")]
    pub history: HistoryLinks,
}

/// Ordered list of history links embedded in a product row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct HistoryLinks(pub Vec<HistoryLink>);

impl HistoryLinks {
    /// Ids of every referenced history record, in insertion order.
    pub fn record_ids(&self) -> Vec<Uuid> {
        self.0.iter().map(|link| link.product_history).collect()
    }

    /// Returns a copy of the list with `link` appended.
    #[must_use]
    pub fn appended(&self, link: HistoryLink) -> Self {
        let mut links = self.0.clone();
        links.push(link);
        Self(links)
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One entry of a product's history list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryLink {
    /// Creation timestamp of the referenced record
    pub date: DateTimeUtc,
    /// Id of the referenced `product_history` row
    pub product_history: Uuid,
}

/// Products own no foreign keys; history links are weak references.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
