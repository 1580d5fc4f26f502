//! Database configuration module for the HQ backend.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary
//! tables based on the entity definitions. The module uses `SeaORM`'s
//! `Schema::create_table_from_entity` method to automatically generate SQL statements
//! from the entity models, so the schema always matches the Rust struct definitions
//! without manual SQL.

use crate::entities::{
    Activation, Client, Invoice, License, Release, Sale, Scan, Wallet, WalletTransaction,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns the default `SQLite` path.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/station_hq.sqlite".to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL`
/// environment variable, falling back to a default local file if unset.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation
/// from the entity definitions.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let client_table = schema.create_table_from_entity(Client);
    let license_table = schema.create_table_from_entity(License);
    let activation_table = schema.create_table_from_entity(Activation);
    let sale_table = schema.create_table_from_entity(Sale);
    let scan_table = schema.create_table_from_entity(Scan);
    let invoice_table = schema.create_table_from_entity(Invoice);
    let wallet_table = schema.create_table_from_entity(Wallet);
    let wallet_transaction_table = schema.create_table_from_entity(WalletTransaction);
    let release_table = schema.create_table_from_entity(Release);

    db.execute(builder.build(&client_table)).await?;
    db.execute(builder.build(&license_table)).await?;
    db.execute(builder.build(&activation_table)).await?;
    db.execute(builder.build(&sale_table)).await?;
    db.execute(builder.build(&scan_table)).await?;
    db.execute(builder.build(&invoice_table)).await?;
    db.execute(builder.build(&wallet_table)).await?;
    db.execute(builder.build(&wallet_transaction_table)).await?;
    db.execute(builder.build(&release_table)).await?;

    Ok(())
}
