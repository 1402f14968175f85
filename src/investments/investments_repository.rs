use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::constants::{INVESTMENT_STATUS_ACTIVE, INVESTMENT_STATUS_EXITED};
use crate::db::get_connection;
use crate::investments::investments_errors::{InvestmentError, Result};
use crate::investments::investments_model::{Investment, InvestmentDB};
use crate::schema::investments;

/// Repository for managing investment positions.
///
/// The `_in_tx` functions take an open connection and are only meant to be
/// called from inside a settlement transaction.
pub struct InvestmentRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl InvestmentRepository {
    /// Creates a new InvestmentRepository instance
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Lists all positions held by a user, newest first
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<Investment>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| InvestmentError::DatabaseError(e.to_string()))?;

        investments::table
            .filter(investments::user_id.eq(user_id))
            .order(investments::invested_at.desc())
            .load::<InvestmentDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Investment::from).collect())
            .map_err(InvestmentError::from)
    }

    /// Retrieves an investment scoped to its owner
    pub fn get_for_user(&self, investment_id: &str, user_id: &str) -> Result<Investment> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| InvestmentError::DatabaseError(e.to_string()))?;

        investments::table
            .find(investment_id)
            .filter(investments::user_id.eq(user_id))
            .first::<InvestmentDB>(&mut conn)
            .map(Investment::from)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => InvestmentError::NotFound(format!(
                    "Investment with id {} not found",
                    investment_id
                )),
                _ => InvestmentError::DatabaseError(e.to_string()),
            })
    }

    /// Finds the (user, property) position inside an open transaction
    pub fn find_position_in_tx(
        conn: &mut SqliteConnection,
        user_id: &str,
        property_id: &str,
    ) -> Result<Option<Investment>> {
        investments::table
            .filter(investments::user_id.eq(user_id))
            .filter(investments::property_id.eq(property_id))
            .first::<InvestmentDB>(conn)
            .optional()
            .map(|row| row.map(Investment::from))
            .map_err(InvestmentError::from)
    }

    /// Retrieves an owner-scoped investment inside an open transaction
    pub fn get_for_user_in_tx(
        conn: &mut SqliteConnection,
        investment_id: &str,
        user_id: &str,
    ) -> Result<Investment> {
        investments::table
            .find(investment_id)
            .filter(investments::user_id.eq(user_id))
            .first::<InvestmentDB>(conn)
            .map(Investment::from)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => InvestmentError::NotFound(format!(
                    "Investment with id {} not found",
                    investment_id
                )),
                _ => InvestmentError::DatabaseError(e.to_string()),
            })
    }

    /// Creates a fresh position on first buy
    pub fn create_position_in_tx(
        conn: &mut SqliteConnection,
        user_id: &str,
        property_id: &str,
        shares: i32,
        amount: Decimal,
    ) -> Result<Investment> {
        let row = InvestmentDB {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            property_id: property_id.to_string(),
            shares,
            amount: amount.to_string(),
            status: INVESTMENT_STATUS_ACTIVE.to_string(),
            invested_at: chrono::Utc::now().naive_utc(),
        };

        diesel::insert_into(investments::table)
            .values(&row)
            .execute(conn)
            .map_err(InvestmentError::from)?;

        Ok(row.into())
    }

    /// Accumulates shares and cost basis onto an existing position.
    /// Re-buying an exited position brings it back to active.
    pub fn accumulate_position_in_tx(
        conn: &mut SqliteConnection,
        position: &Investment,
        shares_added: i32,
        amount_added: Decimal,
    ) -> Result<()> {
        diesel::update(investments::table.find(&position.id))
            .set((
                investments::shares.eq(position.shares + shares_added),
                investments::amount.eq((position.amount + amount_added).to_string()),
                investments::status.eq(INVESTMENT_STATUS_ACTIVE),
            ))
            .execute(conn)
            .map_err(InvestmentError::from)?;
        Ok(())
    }

    /// Reduces a position after a partial sale, shrinking the cost basis
    /// proportionally so it reflects only the unsold shares.
    pub fn reduce_position_in_tx(
        conn: &mut SqliteConnection,
        position: &Investment,
        shares_sold: i32,
        cost_basis_removed: Decimal,
    ) -> Result<()> {
        diesel::update(investments::table.find(&position.id))
            .set((
                investments::shares.eq(position.shares - shares_sold),
                investments::amount.eq((position.amount - cost_basis_removed).to_string()),
            ))
            .execute(conn)
            .map_err(InvestmentError::from)?;
        Ok(())
    }

    /// Zeroes a position after a full exit
    pub fn exit_position_in_tx(conn: &mut SqliteConnection, investment_id: &str) -> Result<()> {
        diesel::update(investments::table.find(investment_id))
            .set((
                investments::shares.eq(0),
                investments::amount.eq(Decimal::ZERO.to_string()),
                investments::status.eq(INVESTMENT_STATUS_EXITED),
            ))
            .execute(conn)
            .map_err(InvestmentError::from)?;
        Ok(())
    }
}
