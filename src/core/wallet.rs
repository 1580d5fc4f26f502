//! Marketplace wallet ledger.
//!
//! Every balance change appends a wallet transaction row, so the balance is
//! always reconstructible from the ledger. Withdrawals check and deduct in
//! one transaction; the balance can never go negative.

use crate::{
    entities::{
        Client, Wallet, WalletTransaction, client, wallet, wallet_transaction,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{ConnectionTrait, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait, prelude::*};
use tracing::{info, warn};

use super::commission::round_cents;

/// A wallet plus its recent ledger entries.
#[derive(Debug, Clone)]
pub struct WalletStatement {
    /// The wallet row
    pub wallet: wallet::Model,
    /// Most recent transactions, newest first
    pub recent_transactions: Vec<wallet_transaction::Model>,
}

async fn ensure_wallet_in<C: ConnectionTrait>(db: &C, client_id: &str) -> Result<wallet::Model> {
    if let Some(existing) = Wallet::find()
        .filter(wallet::Column::ClientId.eq(client_id))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    Client::find_by_id(client_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::ClientNotFound {
            id: client_id.to_string(),
        })?;

    let now = Utc::now();
    let model = wallet::ActiveModel {
        client_id: Set(client_id.to_string()),
        balance: Set(0.0),
        pending_balance: Set(0.0),
        total_earned: Set(0.0),
        total_withdrawn: Set(0.0),
        payout_email: Set(None),
        payout_method: Set("paypal".to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match model.insert(db).await {
        Ok(created) => {
            info!(client_id, wallet_id = created.id, "Created wallet");
            Ok(created)
        }
        // Lost a creation race: the other writer's row is the wallet
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Wallet::find()
            .filter(wallet::Column::ClientId.eq(client_id))
            .one(db)
            .await?
            .ok_or_else(|| Error::WalletNotFound {
                client_id: client_id.to_string(),
            }),
        Err(e) => Err(e.into()),
    }
}

/// Returns the client's wallet, creating an empty one on first touch.
///
/// # Errors
/// Returns `ClientNotFound` for an unknown client.
pub async fn ensure_wallet(db: &DatabaseConnection, client_id: &str) -> Result<wallet::Model> {
    ensure_wallet_in(db, client_id).await
}

/// Credits marketplace earnings to the seller identified by its API key.
///
/// The credit and its ledger entry commit together. Returns the new
/// balance.
///
/// # Errors
/// Returns `SellerNotFound` when the key matches no active client, or
/// `InvalidAmount` for a non-positive or non-finite amount.
pub async fn credit(
    db: &DatabaseConnection,
    api_key: &str,
    amount: f64,
    order_id: Option<&str>,
    description: Option<&str>,
) -> Result<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    let amount = round_cents(amount);

    let txn = db.begin().await?;

    let seller = Client::find()
        .filter(client::Column::ApiKey.eq(api_key))
        .filter(client::Column::Status.eq("active"))
        .one(&txn)
        .await?
        .ok_or(Error::SellerNotFound)?;

    let wallet = ensure_wallet_in(&txn, &seller.id).await?;
    let new_balance = round_cents(wallet.balance + amount);
    let new_earned = round_cents(wallet.total_earned + amount);
    let wallet_id = wallet.id;

    let mut active: wallet::ActiveModel = wallet.into();
    active.balance = Set(new_balance);
    active.total_earned = Set(new_earned);
    active.updated_at = Set(Utc::now());
    active.update(&txn).await?;

    let entry = wallet_transaction::ActiveModel {
        wallet_id: Set(wallet_id),
        kind: Set("credit".to_string()),
        amount: Set(amount),
        description: Set(description.map(ToString::to_string)),
        order_id: Set(order_id.map(ToString::to_string)),
        status: Set("completed".to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    entry.insert(&txn).await?;

    txn.commit().await?;

    info!(
        client_id = %seller.id,
        amount, new_balance, "Credited wallet"
    );
    Ok(new_balance)
}

/// Requests a payout. The available-balance check and the deduction share a
/// transaction, so two concurrent withdrawals cannot both drain the same
/// funds. The ledger entry is written as a negative amount with pending
/// status. Returns the remaining balance.
///
/// # Errors
/// Returns `InvalidAmount` for a non-positive or non-finite amount,
/// `WalletNotFound` when the client never earned anything, or
/// `InsufficientBalance` when the request exceeds the available funds.
pub async fn request_withdrawal(
    db: &DatabaseConnection,
    client_id: &str,
    amount: f64,
) -> Result<f64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    let amount = round_cents(amount);

    let txn = db.begin().await?;

    let wallet = Wallet::find()
        .filter(wallet::Column::ClientId.eq(client_id))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::WalletNotFound {
            client_id: client_id.to_string(),
        })?;

    if wallet.balance < amount {
        warn!(
            client_id,
            available = wallet.balance,
            requested = amount,
            "Rejected withdrawal"
        );
        return Err(Error::InsufficientBalance {
            available: wallet.balance,
            requested: amount,
        });
    }

    let new_balance = round_cents(wallet.balance - amount);
    let new_withdrawn = round_cents(wallet.total_withdrawn + amount);
    let wallet_id = wallet.id;

    let mut active: wallet::ActiveModel = wallet.into();
    active.balance = Set(new_balance);
    active.total_withdrawn = Set(new_withdrawn);
    active.updated_at = Set(Utc::now());
    active.update(&txn).await?;

    let entry = wallet_transaction::ActiveModel {
        wallet_id: Set(wallet_id),
        kind: Set("withdrawal".to_string()),
        amount: Set(-amount),
        description: Set(Some("Payout request".to_string())),
        order_id: Set(None),
        status: Set("pending".to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    entry.insert(&txn).await?;

    txn.commit().await?;

    info!(client_id, amount, new_balance, "Withdrawal requested");
    Ok(new_balance)
}

/// Updates where and how the client gets paid out.
///
/// # Errors
/// Returns `ClientNotFound` for an unknown client.
pub async fn update_payout_settings(
    db: &DatabaseConnection,
    client_id: &str,
    payout_email: Option<&str>,
    payout_method: &str,
) -> Result<wallet::Model> {
    let wallet = ensure_wallet(db, client_id).await?;

    let mut active: wallet::ActiveModel = wallet.into();
    active.payout_email = Set(payout_email.map(ToString::to_string));
    active.payout_method = Set(payout_method.to_string());
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Returns the wallet with its 20 most recent ledger entries.
///
/// # Errors
/// Returns `ClientNotFound` for an unknown client.
pub async fn wallet_statement(db: &DatabaseConnection, client_id: &str) -> Result<WalletStatement> {
    let wallet = ensure_wallet(db, client_id).await?;

    let recent_transactions = WalletTransaction::find()
        .filter(wallet_transaction::Column::WalletId.eq(wallet.id))
        .order_by_desc(wallet_transaction::Column::CreatedAt)
        .order_by_desc(wallet_transaction::Column::Id)
        .limit(20)
        .all(db)
        .await?;

    Ok(WalletStatement {
        wallet,
        recent_transactions,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::registry;
    use crate::test_utils::{registered_client, setup_test_db};

    #[tokio::test]
    async fn test_ensure_wallet_starts_empty() -> Result<()> {
        let db = setup_test_db().await?;
        let client = registered_client(&db, "Seller", "w@example.test").await?;

        let wallet = ensure_wallet(&db, &client.id).await?;
        assert_eq!(wallet.balance, 0.0);
        assert_eq!(wallet.total_earned, 0.0);
        assert_eq!(wallet.payout_method, "paypal");

        // Second touch returns the same wallet
        let again = ensure_wallet(&db, &client.id).await?;
        assert_eq!(again.id, wallet.id);

        let err = ensure_wallet(&db, "MISSING1").await.unwrap_err();
        assert!(matches!(err, Error::ClientNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_credit_then_withdraw() -> Result<()> {
        let db = setup_test_db().await?;
        let client = registered_client(&db, "Seller", "cw@example.test").await?;

        let balance = credit(&db, &client.api_key, 50.0, Some("ORD-1"), Some("Deck sale")).await?;
        assert_eq!(balance, 50.0);

        let balance = request_withdrawal(&db, &client.id, 30.0).await?;
        assert_eq!(balance, 20.0);

        let statement = wallet_statement(&db, &client.id).await?;
        assert_eq!(statement.wallet.balance, 20.0);
        assert_eq!(statement.wallet.total_earned, 50.0);
        assert_eq!(statement.wallet.total_withdrawn, 30.0);

        // Both movements logged, withdrawal as a negative pending entry
        assert_eq!(statement.recent_transactions.len(), 2);
        let withdrawal = &statement.recent_transactions[0];
        assert_eq!(withdrawal.kind, "withdrawal");
        assert_eq!(withdrawal.amount, -30.0);
        assert_eq!(withdrawal.status, "pending");
        let earning = &statement.recent_transactions[1];
        assert_eq!(earning.kind, "credit");
        assert_eq!(earning.amount, 50.0);
        assert_eq!(earning.status, "completed");
        assert_eq!(earning.order_id.as_deref(), Some("ORD-1"));
        Ok(())
    }

    #[tokio::test]
    async fn test_overdraw_rejected_and_balance_untouched() -> Result<()> {
        let db = setup_test_db().await?;
        let client = registered_client(&db, "Seller", "over@example.test").await?;
        credit(&db, &client.api_key, 20.0, None, None).await?;

        let err = request_withdrawal(&db, &client.id, 20.01).await.unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientBalance {
                available,
                requested,
            } if available == 20.0 && requested == 20.01
        ));

        let statement = wallet_statement(&db, &client.id).await?;
        assert_eq!(statement.wallet.balance, 20.0);
        assert_eq!(statement.recent_transactions.len(), 1);

        // Exact balance is withdrawable
        let balance = request_withdrawal(&db, &client.id, 20.0).await?;
        assert_eq!(balance, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_amounts_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let client = registered_client(&db, "Seller", "inv@example.test").await?;

        for bad in [0.0, -5.0, f64::NAN] {
            let err = credit(&db, &client.api_key, bad, None, None).await.unwrap_err();
            assert!(matches!(err, Error::InvalidAmount { .. }));
        }
        let err = request_withdrawal(&db, &client.id, 0.0).await.unwrap_err();
        assert!(matches!(err, Error::InvalidAmount { .. }));

        // Withdrawing from a never-credited client has no wallet to draw on
        let err = request_withdrawal(&db, &client.id, 5.0).await.unwrap_err();
        assert!(matches!(err, Error::WalletNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_credit_requires_known_active_seller() -> Result<()> {
        let db = setup_test_db().await?;
        let client = registered_client(&db, "Seller", "auth@example.test").await?;

        let err = credit(&db, "stn_bogus", 10.0, None, None).await.unwrap_err();
        assert!(matches!(err, Error::SellerNotFound));

        registry::deactivate(&db, &client.id).await?;
        let err = credit(&db, &client.api_key, 10.0, None, None).await.unwrap_err();
        assert!(matches!(err, Error::SellerNotFound));
        Ok(())
    }

    #[tokio::test]
    async fn test_payout_settings() -> Result<()> {
        let db = setup_test_db().await?;
        let client = registered_client(&db, "Seller", "payout@example.test").await?;

        let wallet =
            update_payout_settings(&db, &client.id, Some("pay@example.test"), "bank").await?;
        assert_eq!(wallet.payout_email.as_deref(), Some("pay@example.test"));
        assert_eq!(wallet.payout_method, "bank");
        Ok(())
    }

    #[tokio::test]
    async fn test_statement_caps_at_twenty_entries() -> Result<()> {
        let db = setup_test_db().await?;
        let client = registered_client(&db, "Seller", "cap20@example.test").await?;

        for i in 0..25 {
            credit(&db, &client.api_key, 1.0 + f64::from(i), None, None).await?;
        }

        let statement = wallet_statement(&db, &client.id).await?;
        assert_eq!(statement.recent_transactions.len(), 20);
        // Newest first
        assert_eq!(statement.recent_transactions[0].amount, 25.0);
        Ok(())
    }
}
