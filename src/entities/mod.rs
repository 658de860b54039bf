//! Entity module - `SeaORM` definitions for the `products` and `product_history` tables.
//! A product links to its history rows through an embedded JSON list, not a foreign key.

pub mod product;
pub mod product_history;

// Aliased so both Models can be imported side by side
pub use product::{Entity as Product, HistoryLink, HistoryLinks, Model as ProductModel};
pub use product_history::{Entity as ProductHistory, HistoryKind, Model as ProductHistoryModel};
