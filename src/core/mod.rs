//! Core business logic - framework-agnostic product operations.
//!
//! Validation, diffing and history recording are plain functions and small
//! types; [`ProductMutationService`] and [`ProductQueryService`] tie them to the
//! store and the image uploader.

pub mod diff;
pub mod history;
pub mod input;
pub mod mutation;
pub mod query;
pub mod validation;

pub use diff::{FieldChange, ProductDiff, diff_product};
pub use history::HistoryRecorder;
pub use input::{NewProduct, ProductUpdate};
pub use mutation::ProductMutationService;
pub use query::ProductQueryService;
