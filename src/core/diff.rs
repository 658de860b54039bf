//! Product diffing - decides what an update changes and narrates it.
//!
//! A supplied `count` always wins: the update becomes a count change and the other
//! supplied fields are neither diffed nor checked. Without `count`, each supplied
//! field is compared against the stored product in a fixed order and turned into a
//! `{field, old, new}` change; the narrative is joined from those changes at the end.
//! A supplied value equal to the stored one aborts the whole diff.

use crate::{
    core::input::ProductUpdate,
    entities::{HistoryKind, ProductModel},
    errors::{Error, Result},
};
use std::fmt::Display;

/// One changed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// Client-facing field name, e.g. `pricePerItem`
    pub field: &'static str,
    pub old: String,
    pub new: String,
}

impl FieldChange {
    fn clause(&self) -> String {
        format!("changed '{}' from {} to {}", self.field, self.old, self.new)
    }
}

/// Outcome of diffing an update against the stored product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductDiff {
    /// `count` was supplied.
    CountChange {
        product: String,
        old: i64,
        new: i64,
    },
    /// One or more non-count fields changed.
    InfoChange {
        product: String,
        changes: Vec<FieldChange>,
    },
    /// Nothing was supplied.
    NoChange,
}

impl ProductDiff {
    /// History type to record, or `None` when there is nothing to record.
    pub const fn history_kind(&self) -> Option<HistoryKind> {
        match self {
            Self::CountChange { .. } => Some(HistoryKind::EditCount),
            Self::InfoChange { .. } => Some(HistoryKind::EditInfo),
            Self::NoChange => None,
        }
    }

    /// Human-readable narrative, or `None` for [`ProductDiff::NoChange`].
    pub fn narrative(&self) -> Option<String> {
        match self {
            Self::CountChange { product, old, new } => Some(format!(
                "Product {product} changed count from {old} to {new}."
            )),
            Self::InfoChange { product, changes } => {
                let clauses: Vec<String> = changes.iter().map(FieldChange::clause).collect();
                Some(format!("Product {product}: {}", clauses.join(", ")))
            }
            Self::NoChange => None,
        }
    }
}

/// Diffs `update` against `prior`.
///
/// # Errors
/// Returns `Error::NoOpField` naming the first supplied field (in the order
/// isActive, image, name, weightPerItem, pricePerItem, description) whose value
/// equals the stored one. Never fails when `count` is supplied.
pub fn diff_product(prior: &ProductModel, update: &ProductUpdate) -> Result<ProductDiff> {
    if let Some(new) = update.count {
        return Ok(ProductDiff::CountChange {
            product: prior.name.clone(),
            old: prior.count,
            new,
        });
    }

    let rules = [
        compare("isActive", &prior.is_active, update.is_active.as_ref()),
        compare("image", &prior.image, update.image.as_ref()),
        compare("name", &prior.name, update.name.as_ref()),
        compare(
            "weightPerItem",
            &prior.weight_per_item,
            update.weight_per_item.as_ref(),
        ),
        compare(
            "pricePerItem",
            &prior.price_per_item,
            update.price_per_item.as_ref(),
        ),
        compare("description", &prior.description, update.description.as_ref()),
    ];

    let changes = rules.into_iter().flatten().collect::<Result<Vec<_>>>()?;
    if changes.is_empty() {
        return Ok(ProductDiff::NoChange);
    }

    Ok(ProductDiff::InfoChange {
        product: prior.name.clone(),
        changes,
    })
}

/// Runs the no-op rules ordered ahead of `image`, so a rejected update never
/// reaches the uploader.
///
/// # Errors
/// Returns `Error::NoOpField` for an unchanged `isActive`. Never fails when
/// `count` is supplied.
pub fn check_before_image(prior: &ProductModel, update: &ProductUpdate) -> Result<()> {
    if update.count.is_some() {
        return Ok(());
    }
    compare("isActive", &prior.is_active, update.is_active.as_ref())
        .transpose()
        .map(drop)
}

fn compare<T>(field: &'static str, old: &T, new: Option<&T>) -> Option<Result<FieldChange>>
where
    T: PartialEq + Display,
{
    let new = new?;
    if new == old {
        return Some(Err(Error::NoOpField {
            field: field.to_string(),
        }));
    }
    Some(Ok(FieldChange {
        field,
        old: old.to_string(),
        new: new.to_string(),
    }))
}
