//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod activation;
pub mod client;
pub mod invoice;
pub mod license;
pub mod release;
pub mod sale;
pub mod scan;
pub mod wallet;
pub mod wallet_transaction;

// Re-export specific types to avoid conflicts
pub use activation::{Column as ActivationColumn, Entity as Activation, Model as ActivationModel};
pub use client::{Column as ClientColumn, Entity as Client, Model as ClientModel};
pub use invoice::{Column as InvoiceColumn, Entity as Invoice, Model as InvoiceModel};
pub use license::{Column as LicenseColumn, Entity as License, Model as LicenseModel};
pub use release::{Column as ReleaseColumn, Entity as Release, Model as ReleaseModel};
pub use sale::{Column as SaleColumn, Entity as Sale, Model as SaleModel};
pub use scan::{Column as ScanColumn, Entity as Scan, Model as ScanModel};
pub use wallet::{Column as WalletColumn, Entity as Wallet, Model as WalletModel};
pub use wallet_transaction::{
    Column as WalletTransactionColumn, Entity as WalletTransaction,
    Model as WalletTransactionModel,
};
