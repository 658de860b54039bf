//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! which also creates the unique index on `products.name` that guards concurrent creates.

use crate::entities::{Product, ProductHistory};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info};

/// Default database location used when neither the environment nor `config.toml` set one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/product_base.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable,
/// then from `configured`, and finally falls back to [`DEFAULT_DATABASE_URL`].
pub fn get_database_url(configured: Option<&str>) -> String {
    std::env::var("DATABASE_URL")
        .ok()
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates the `products` and `product_history` tables if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut product_table = schema.create_table_from_entity(Product);
    let mut history_table = schema.create_table_from_entity(ProductHistory);

    product_table.if_not_exists();
    history_table.if_not_exists();

    db.execute(builder.build(&product_table)).await?;
    db.execute(builder.build(&history_table)).await?;

    info!("Database tables ensured.");
    Ok(())
}
