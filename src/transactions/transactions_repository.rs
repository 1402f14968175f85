use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::constants::{
    TRANSACTION_STATUS_COMPLETED, TRANSACTION_TYPE_DEPOSIT, TRANSACTION_TYPE_DIVIDEND,
    TRANSACTION_TYPE_INVESTMENT, TRANSACTION_TYPE_WITHDRAWAL,
};
use crate::db::get_connection;
use crate::schema::{properties, transactions};
use crate::transactions::transactions_errors::{Result, TransactionError};
use crate::transactions::transactions_model::*;
use crate::utils::{new_reference_id, parse_decimal_tolerant};

/// Repository for the append-only transaction ledger
pub struct TransactionRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository instance
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Appends a ledger entry inside an open transaction. Every
    /// ledger-affecting path (buy, sell, deposit, withdraw, dividend payout)
    /// funnels through here.
    pub fn insert_in_tx(
        conn: &mut SqliteConnection,
        new_transaction: NewTransaction,
    ) -> Result<Transaction> {
        let row = TransactionDB {
            id: Uuid::new_v4().to_string(),
            user_id: new_transaction.user_id,
            property_id: new_transaction.property_id,
            transaction_type: new_transaction.transaction_type,
            amount: new_transaction.amount.to_string(),
            shares: new_transaction.shares,
            description: new_transaction.description,
            status: TRANSACTION_STATUS_COMPLETED.to_string(),
            reference_id: new_reference_id(),
            created_at: chrono::Utc::now().naive_utc(),
        };

        diesel::insert_into(transactions::table)
            .values(&row)
            .execute(conn)
            .map_err(TransactionError::from)?;

        Ok(row.into())
    }

    pub fn search(
        &self,
        user_id: &str,
        page: i64,      // Page number, 1-based
        page_size: i64, // Number of items per page
        filters: &TransactionFilters,
    ) -> Result<(Vec<TransactionDetails>, i64)> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        let offset = (page.max(1) - 1) * page_size;

        let create_base_query = || {
            let mut query = transactions::table
                .left_join(properties::table)
                .filter(transactions::user_id.eq(user_id))
                .into_boxed();

            if let Some(ref tx_type) = filters.transaction_type {
                query = query.filter(transactions::transaction_type.eq(tx_type));
            }
            if let Some(ref status) = filters.status {
                query = query.filter(transactions::status.eq(status));
            }
            if let Some(from) = filters.from {
                query = query.filter(transactions::created_at.ge(from));
            }
            if let Some(to) = filters.to {
                query = query.filter(transactions::created_at.le(to));
            }

            query.order(transactions::created_at.desc())
        };

        let total = create_base_query().count().get_result::<i64>(&mut conn)?;

        let rows = create_base_query()
            .select((
                TransactionDB::as_select(),
                properties::name.nullable(),
                properties::category.nullable(),
                properties::image_url.nullable(),
            ))
            .limit(page_size)
            .offset(offset)
            .load::<(TransactionDB, Option<String>, Option<String>, Option<String>)>(&mut conn)?;

        let details = rows
            .into_iter()
            .map(|(tx, property_name, category, image_url)| TransactionDetails {
                transaction: tx.into(),
                property_name,
                category,
                image_url,
            })
            .collect();

        Ok((details, total))
    }

    /// Folds lifetime totals over the user's completed ledger entries
    pub fn summary(&self, user_id: &str) -> Result<TransactionSummary> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        let rows = transactions::table
            .filter(transactions::user_id.eq(user_id))
            .filter(transactions::status.eq(TRANSACTION_STATUS_COMPLETED))
            .select((transactions::transaction_type, transactions::amount))
            .load::<(String, String)>(&mut conn)
            .map_err(TransactionError::from)?;

        let mut summary = TransactionSummary::default();
        for (tx_type, amount_str) in rows {
            let amount = parse_decimal_tolerant(&amount_str, "amount");
            match tx_type.as_str() {
                TRANSACTION_TYPE_DIVIDEND => summary.total_dividends += amount,
                TRANSACTION_TYPE_INVESTMENT => summary.total_invested += amount,
                TRANSACTION_TYPE_WITHDRAWAL => summary.total_withdrawn += amount,
                TRANSACTION_TYPE_DEPOSIT => summary.total_deposited += amount,
                _ => {}
            }
            summary.transaction_count += 1;
        }

        Ok(summary)
    }

    /// Retrieves a ledger entry scoped to its owner
    pub fn get_for_user(&self, transaction_id: &str, user_id: &str) -> Result<TransactionDetails> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| TransactionError::DatabaseError(e.to_string()))?;

        let (tx, property_name, category, image_url) = transactions::table
            .left_join(properties::table)
            .filter(transactions::id.eq(transaction_id))
            .filter(transactions::user_id.eq(user_id))
            .select((
                TransactionDB::as_select(),
                properties::name.nullable(),
                properties::category.nullable(),
                properties::image_url.nullable(),
            ))
            .first::<(TransactionDB, Option<String>, Option<String>, Option<String>)>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => TransactionError::NotFound(format!(
                    "Transaction with id {} not found",
                    transaction_id
                )),
                _ => TransactionError::DatabaseError(e.to_string()),
            })?;

        Ok(TransactionDetails {
            transaction: tx.into(),
            property_name,
            category,
            image_url,
        })
    }

    /// Most recent ledger entries for a user, for the portfolio dashboard
    pub fn recent_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<TransactionDetails>> {
        let (details, _) = self.search(
            user_id,
            1,
            limit,
            &TransactionFilters::default(),
        )?;
        Ok(details)
    }
}
