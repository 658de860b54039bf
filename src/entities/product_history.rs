//! Product history entity - Immutable narrative of one change event.
//!
//! Rows are inserted once and never updated. They are removed only when the
//! product that links to them is deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product history database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_history")]
pub struct Model {
    /// Unique identifier for the record
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// When the change happened
    pub date: DateTimeUtc,
    /// Kind of change
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    /// Human-readable change narrative
    pub change: String,
}

/// Fixed set of history record types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum HistoryKind {
    /// Product was created
    #[sea_orm(string_value = "Add product")]
    #[serde(rename = "Add product")]
    AddProduct,
    /// Stock count changed
    #[sea_orm(string_value = "Edit count")]
    #[serde(rename = "Edit count")]
    EditCount,
    /// Any other field changed
    #[sea_orm(string_value = "Edit info")]
    #[serde(rename = "Edit info")]
    EditInfo,
    /// Product was removed
    #[sea_orm(string_value = "Delete")]
    Delete,
}

/// History records have no outgoing relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
