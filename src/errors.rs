//! Unified error types for the HQ core.
//!
//! Every core operation returns [`Result`]. The surrounding request layer is
//! expected to map these variants onto status codes (not-found into 404,
//! validation failures into 400/401/403), so the variants carry enough
//! structure to make that mapping mechanical.

use thiserror::Error;

/// All error conditions the core can surface.
#[derive(Debug, Error)]
pub enum Error {
    /// No client exists with the given id.
    #[error("Client not found: {id}")]
    ClientNotFound {
        /// The client id that failed to resolve
        id: String,
    },

    /// No seller matches the given station API key.
    #[error("Seller not found")]
    SellerNotFound,

    /// A wallet row is missing for a client that should have one.
    #[error("Wallet not found for client {client_id}")]
    WalletNotFound {
        /// Owning client id
        client_id: String,
    },

    /// Credential lookup failed: bad API key, or the client is inactive.
    #[error("Unauthorized")]
    Unauthorized,

    /// License key is unknown or the license has been deactivated.
    #[error("Invalid license")]
    LicenseInvalid,

    /// License exists but its expiry date is in the past.
    #[error("License expired")]
    LicenseExpired,

    /// A new machine would exceed the license's activation cap.
    #[error("Maximum activations ({max}) reached")]
    ActivationLimitReached {
        /// The license's activation cap
        max: i32,
    },

    /// A client with this contact email already exists.
    #[error("Email already registered: {email}")]
    DuplicateEmail {
        /// The colliding email address
        email: String,
    },

    /// Generated API key collided with an existing one.
    #[error("API key collision")]
    DuplicateApiKey,

    /// A release with this version string already exists.
    #[error("Version already published: {version}")]
    DuplicateVersion {
        /// The colliding version string
        version: String,
    },

    /// Tier name is not in the tier table.
    #[error("Invalid tier: {tier}")]
    InvalidTier {
        /// The unrecognized tier name
        tier: String,
    },

    /// Monetary amount is non-positive, negative, or not finite.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Withdrawal request exceeds the available balance.
    #[error("Insufficient balance: requested {requested:.2}, available {available:.2}")]
    InsufficientBalance {
        /// Balance available for withdrawal
        available: f64,
        /// Amount that was requested
        requested: f64,
    },

    /// A required field is missing or malformed.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// What was wrong with the input
        message: String,
    },

    /// Failed to load or parse configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong while loading configuration
        message: String,
    },

    /// Underlying store error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Convenience `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
