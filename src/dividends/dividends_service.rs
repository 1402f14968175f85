use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use diesel::Connection;
use log::debug;
use std::sync::Arc;

use super::dividends_model::*;
use super::dividends_repository::DividendRepository;
use crate::constants::TRANSACTION_TYPE_DIVIDEND;
use crate::dividends::{DividendError, Result};
use crate::transactions::{NewTransaction, TransactionRepository};
use crate::users::{UserError, UserRepository};

/// Service for dividend history and payout settlement
pub struct DividendService {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl DividendService {
    /// Creates a new DividendService instance
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Records a payout: wallet credit, dividend row and the reconciling
    /// `dividend`-type ledger entry commit as one transaction.
    pub async fn record_payout(&self, new_dividend: NewDividend) -> Result<Dividend> {
        new_dividend.validate()?;

        debug!(
            "Recording dividend payout..., user: {}, property: {}, amount: {}",
            new_dividend.user_id, new_dividend.property_id, new_dividend.amount
        );

        let mut conn = self
            .pool
            .get()
            .map_err(|e| DividendError::DatabaseError(e.to_string()))?;

        conn.immediate_transaction(|conn| {
            let balance = UserRepository::wallet_balance_in_tx(conn, &new_dividend.user_id)
                .map_err(|e| match e {
                    UserError::NotFound(msg) => DividendError::NotFound(msg),
                    other => DividendError::DatabaseError(other.to_string()),
                })?;
            UserRepository::set_wallet_balance_in_tx(
                conn,
                &new_dividend.user_id,
                balance + new_dividend.amount,
            )
            .map_err(|e| DividendError::DatabaseError(e.to_string()))?;

            let period = new_dividend.period_label.clone();
            let dividend = DividendRepository::insert_in_tx(conn, new_dividend)?;

            TransactionRepository::insert_in_tx(
                conn,
                NewTransaction {
                    user_id: dividend.user_id.clone(),
                    property_id: Some(dividend.property_id.clone()),
                    transaction_type: TRANSACTION_TYPE_DIVIDEND.to_string(),
                    amount: dividend.amount,
                    shares: None,
                    description: period.map(|p| format!("Dividend payout for {}", p)),
                },
            )
            .map_err(|e| DividendError::DatabaseError(e.to_string()))?;

            Ok(dividend)
        })
    }

    /// Lists a user's dividend history with the lifetime total
    pub fn get_my_dividends(
        &self,
        user_id: &str,
        page: i64,
        page_size: i64,
    ) -> Result<DividendsPage> {
        let repo = DividendRepository::new(self.pool.clone());
        let dividends = repo.list_for_user(user_id, page, page_size)?;
        let total_earned = repo.total_earned(user_id)?;

        Ok(DividendsPage {
            total_earned,
            dividends,
        })
    }
}
