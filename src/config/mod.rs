/// Database configuration and connection management
pub mod database;

/// Subscription tier table: monthly fees and commission rates
pub mod tiers;
