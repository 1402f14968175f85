use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use diesel::Connection;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::transactions_model::*;
use super::transactions_repository::TransactionRepository;
use crate::constants::{
    MAX_SINGLE_DEPOSIT, TRANSACTION_TYPE_DEPOSIT, TRANSACTION_TYPE_WITHDRAWAL,
};
use crate::transactions::{Result, TransactionError};
use crate::users::{UserError, UserRepository};

fn map_user_err(e: UserError) -> TransactionError {
    match e {
        UserError::NotFound(msg) => TransactionError::NotFound(msg),
        other => TransactionError::DatabaseError(other.to_string()),
    }
}

/// Service for the ledger and the wallet deposit/withdraw operations.
///
/// Wallet mutations run inside an immediate transaction so the balance write
/// and the ledger append commit or roll back as one unit.
pub struct TransactionService {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl TransactionService {
    /// Creates a new TransactionService instance
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Credits the wallet, with a fixed per-deposit ceiling
    pub async fn deposit(&self, user_id: &str, amount: Decimal) -> Result<WalletReceipt> {
        if amount <= Decimal::ZERO {
            return Err(TransactionError::InvalidData(
                "Amount must be a positive number".to_string(),
            ));
        }
        if amount > MAX_SINGLE_DEPOSIT {
            return Err(TransactionError::AmountTooLarge(MAX_SINGLE_DEPOSIT));
        }

        debug!("Depositing {} for user {}", amount, user_id);

        let mut conn = self
            .pool
            .get()
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        conn.immediate_transaction(|conn| {
            let balance =
                UserRepository::wallet_balance_in_tx(conn, user_id).map_err(map_user_err)?;
            let new_balance = balance + amount;
            UserRepository::set_wallet_balance_in_tx(conn, user_id, new_balance)
                .map_err(map_user_err)?;

            let transaction = TransactionRepository::insert_in_tx(
                conn,
                NewTransaction {
                    user_id: user_id.to_string(),
                    property_id: None,
                    transaction_type: TRANSACTION_TYPE_DEPOSIT.to_string(),
                    amount,
                    shares: None,
                    description: Some("Wallet top-up".to_string()),
                },
            )?;

            Ok(WalletReceipt {
                new_balance,
                transaction,
            })
        })
    }

    /// Debits the wallet, failing when the balance floor would be crossed
    pub async fn withdraw(&self, user_id: &str, amount: Decimal) -> Result<WalletReceipt> {
        if amount <= Decimal::ZERO {
            return Err(TransactionError::InvalidData(
                "Amount must be a positive number".to_string(),
            ));
        }

        debug!("Withdrawing {} for user {}", amount, user_id);

        let mut conn = self
            .pool
            .get()
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        conn.immediate_transaction(|conn| {
            let balance =
                UserRepository::wallet_balance_in_tx(conn, user_id).map_err(map_user_err)?;

            if amount > balance {
                return Err(TransactionError::InsufficientFunds { available: balance });
            }

            let new_balance = balance - amount;
            UserRepository::set_wallet_balance_in_tx(conn, user_id, new_balance)
                .map_err(map_user_err)?;

            let transaction = TransactionRepository::insert_in_tx(
                conn,
                NewTransaction {
                    user_id: user_id.to_string(),
                    property_id: None,
                    transaction_type: TRANSACTION_TYPE_WITHDRAWAL.to_string(),
                    amount,
                    shares: None,
                    description: Some("Wallet withdrawal".to_string()),
                },
            )?;

            Ok(WalletReceipt {
                new_balance,
                transaction,
            })
        })
    }

    /// Searches the user's ledger with filters, pagination and lifetime totals
    pub fn search_transactions(
        &self,
        user_id: &str,
        filters: &TransactionFilters,
        page: i64,
        page_size: i64,
    ) -> Result<TransactionSearchResponse> {
        let repo = TransactionRepository::new(self.pool.clone());
        let (transactions, total) = repo.search(user_id, page, page_size, filters)?;
        let summary = repo.summary(user_id)?;

        Ok(TransactionSearchResponse {
            total,
            page,
            page_size,
            summary,
            transactions,
        })
    }

    /// Retrieves one ledger entry scoped to its owner
    pub fn get_transaction(&self, user_id: &str, transaction_id: &str) -> Result<TransactionDetails> {
        let repo = TransactionRepository::new(self.pool.clone());
        repo.get_for_user(transaction_id, user_id)
    }
}
