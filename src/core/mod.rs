//! Core business logic for the HQ backend.
//!
//! Every module here is framework-agnostic: functions take a
//! `&DatabaseConnection` plus plain arguments and return typed results, so
//! any request layer can sit on top without the logic knowing about it.

/// Dashboard roll-ups and the client leaderboard
pub mod analytics;
/// Subscription invoicing and revenue summaries
pub mod billing;
/// Sale fee splits and scan telemetry
pub mod commission;
/// License issuance and machine activation
pub mod licensing;
/// Client registration, authentication, and tier management
pub mod registry;
/// Release publication and station update checks
pub mod updates;
/// Marketplace wallet balances and payout requests
pub mod wallet;
