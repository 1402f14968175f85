use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::investments_model::{Investment, InvestmentReceipt, SaleReceipt};
use super::investments_repository::InvestmentRepository;
use super::investments_traits::SettlementEngine;
use crate::constants::{
    PROPERTY_STATUS_FUNDED, TRANSACTION_TYPE_INVESTMENT, TRANSACTION_TYPE_SALE,
};
use crate::investments::{InvestmentError, Result};
use crate::properties::{Property, PropertyDB};
use crate::schema::properties;
use crate::transactions::{NewTransaction, TransactionRepository};
use crate::users::{UserError, UserRepository};

/// The share-settlement engine.
///
/// Buy and sell each run inside one `immediate_transaction`: SQLite takes the
/// write lock at BEGIN, so the property and user rows cannot change under us
/// and every mutation commits or rolls back together. Within the transaction
/// the property row is always read and validated before the user row; sell
/// follows the same order as buy.
pub struct InvestmentService {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl InvestmentService {
    /// Creates a new InvestmentService instance
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    fn load_property_in_tx(conn: &mut SqliteConnection, property_id: &str) -> Result<Property> {
        properties::table
            .find(property_id)
            .first::<PropertyDB>(conn)
            .map(Property::from)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    InvestmentError::NotFound(format!("Property with id {} not found", property_id))
                }
                _ => InvestmentError::DatabaseError(e.to_string()),
            })
    }

    fn map_user_err(e: UserError) -> InvestmentError {
        match e {
            UserError::NotFound(msg) => InvestmentError::NotFound(msg),
            other => InvestmentError::DatabaseError(other.to_string()),
        }
    }
}

#[async_trait]
impl SettlementEngine for InvestmentService {
    async fn invest(
        &self,
        user_id: &str,
        property_id: &str,
        amount: Decimal,
    ) -> Result<InvestmentReceipt> {
        if amount <= Decimal::ZERO {
            return Err(InvestmentError::InvalidData(
                "A positive investment amount is required".to_string(),
            ));
        }

        debug!(
            "Settling buy..., user: {}, property: {}, amount: {}",
            user_id, property_id, amount
        );

        let mut conn = self
            .pool
            .get()
            .map_err(|e| InvestmentError::DatabaseError(e.to_string()))?;

        conn.immediate_transaction(|conn| {
            // Property row first, user row second. Sell uses the same order.
            let property = Self::load_property_in_tx(conn, property_id)?;

            if !property.is_active() {
                return Err(InvestmentError::PropertyNotActive(property.status));
            }
            if amount < property.min_investment {
                return Err(InvestmentError::BelowMinimumInvestment(
                    property.min_investment,
                ));
            }

            let share_price = property.share_price();
            let shares_to_buy = (amount / share_price)
                .floor()
                .to_i32()
                .ok_or(InvestmentError::InsufficientAmount)?;
            if shares_to_buy < 1 {
                return Err(InvestmentError::InsufficientAmount);
            }

            let remaining = property.shares_remaining();
            if shares_to_buy > remaining {
                return Err(InvestmentError::Oversubscribed { remaining });
            }

            // Whole shares only. The remainder of the requested amount below
            // one share's price is not charged.
            let actual_cost = Decimal::from(shares_to_buy) * share_price;

            let balance = UserRepository::wallet_balance_in_tx(conn, user_id)
                .map_err(Self::map_user_err)?;
            if balance < actual_cost {
                return Err(InvestmentError::InsufficientFunds {
                    available: balance,
                    required: actual_cost,
                });
            }

            // All preconditions hold; every write below commits atomically.
            UserRepository::set_wallet_balance_in_tx(conn, user_id, balance - actual_cost)
                .map_err(Self::map_user_err)?;

            let new_shares_sold = property.shares_sold + shares_to_buy;
            diesel::update(properties::table.find(&property.id))
                .set((
                    properties::shares_sold.eq(new_shares_sold),
                    properties::updated_at.eq(chrono::Utc::now().naive_utc()),
                ))
                .execute(conn)
                .map_err(InvestmentError::from)?;

            if new_shares_sold == property.total_shares {
                diesel::update(properties::table.find(&property.id))
                    .set(properties::status.eq(PROPERTY_STATUS_FUNDED))
                    .execute(conn)
                    .map_err(InvestmentError::from)?;
            }

            match InvestmentRepository::find_position_in_tx(conn, user_id, property_id)? {
                Some(position) => InvestmentRepository::accumulate_position_in_tx(
                    conn,
                    &position,
                    shares_to_buy,
                    actual_cost,
                )?,
                None => {
                    InvestmentRepository::create_position_in_tx(
                        conn,
                        user_id,
                        property_id,
                        shares_to_buy,
                        actual_cost,
                    )?;
                }
            }

            let transaction = TransactionRepository::insert_in_tx(
                conn,
                NewTransaction {
                    user_id: user_id.to_string(),
                    property_id: Some(property.id.clone()),
                    transaction_type: TRANSACTION_TYPE_INVESTMENT.to_string(),
                    amount: actual_cost,
                    shares: Some(shares_to_buy),
                    description: Some(format!("Investment in {}", property.name)),
                },
            )
            .map_err(|e| InvestmentError::DatabaseError(e.to_string()))?;

            Ok(InvestmentReceipt {
                shares_bought: shares_to_buy,
                amount_invested: actual_cost,
                share_price,
                transaction,
            })
        })
    }

    async fn sell(
        &self,
        user_id: &str,
        investment_id: &str,
        shares_to_sell: i32,
    ) -> Result<SaleReceipt> {
        if shares_to_sell < 1 {
            return Err(InvestmentError::InvalidData(
                "sharesToSell must be at least 1".to_string(),
            ));
        }

        debug!(
            "Settling sale..., user: {}, investment: {}, shares: {}",
            user_id, investment_id, shares_to_sell
        );

        let mut conn = self
            .pool
            .get()
            .map_err(|e| InvestmentError::DatabaseError(e.to_string()))?;

        conn.immediate_transaction(|conn| {
            let investment =
                InvestmentRepository::get_for_user_in_tx(conn, investment_id, user_id)?;

            if shares_to_sell > investment.shares {
                return Err(InvestmentError::InvalidData(format!(
                    "You only have {} shares",
                    investment.shares
                )));
            }

            // Same order as invest: property row before the user row.
            let property = Self::load_property_in_tx(conn, &investment.property_id)?;

            // Sale proceeds track the current valuation, not the purchase
            // price; there is no separate market-price feed.
            let share_price = property.share_price();
            let sale_value = Decimal::from(shares_to_sell) * share_price;

            let balance = UserRepository::wallet_balance_in_tx(conn, user_id)
                .map_err(Self::map_user_err)?;
            UserRepository::set_wallet_balance_in_tx(conn, user_id, balance + sale_value)
                .map_err(Self::map_user_err)?;

            if shares_to_sell == investment.shares {
                InvestmentRepository::exit_position_in_tx(conn, &investment.id)?;
            } else {
                let cost_basis_removed = investment.amount * Decimal::from(shares_to_sell)
                    / Decimal::from(investment.shares);
                InvestmentRepository::reduce_position_in_tx(
                    conn,
                    &investment,
                    shares_to_sell,
                    cost_basis_removed,
                )?;
            }

            diesel::update(properties::table.find(&property.id))
                .set((
                    properties::shares_sold.eq(property.shares_sold - shares_to_sell),
                    properties::updated_at.eq(chrono::Utc::now().naive_utc()),
                ))
                .execute(conn)
                .map_err(InvestmentError::from)?;

            let transaction = TransactionRepository::insert_in_tx(
                conn,
                NewTransaction {
                    user_id: user_id.to_string(),
                    property_id: Some(property.id.clone()),
                    transaction_type: TRANSACTION_TYPE_SALE.to_string(),
                    amount: sale_value,
                    shares: Some(shares_to_sell),
                    description: Some(format!(
                        "Sold {} shares of {}",
                        shares_to_sell, property.name
                    )),
                },
            )
            .map_err(|e| InvestmentError::DatabaseError(e.to_string()))?;

            Ok(SaleReceipt {
                sale_value,
                shares_sold: shares_to_sell,
                transaction,
            })
        })
    }

    fn get_my_investments(&self, user_id: &str) -> Result<Vec<Investment>> {
        let repo = InvestmentRepository::new(self.pool.clone());
        repo.list_for_user(user_id)
    }
}
