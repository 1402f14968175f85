use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transactions::Transaction;
use crate::utils::parse_decimal_tolerant;

/// Domain model representing a user's position in one property.
///
/// Jointly derived from the user wallet and the property inventory: this row
/// is only ever written inside a settlement transaction that also updates its
/// counterpart user and property rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: String,
    pub user_id: String,
    pub property_id: String,
    pub shares: i32,
    pub amount: Decimal,
    pub status: String,
    pub invested_at: NaiveDateTime,
}

/// Result of a successful buy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentReceipt {
    pub shares_bought: i32,
    pub amount_invested: Decimal,
    pub share_price: Decimal,
    pub transaction: Transaction,
}

/// Result of a successful sale
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleReceipt {
    pub sale_value: Decimal,
    pub shares_sold: i32,
    pub transaction: Transaction,
}

/// Database model for investments
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::investments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InvestmentDB {
    pub id: String,
    pub user_id: String,
    pub property_id: String,
    pub shares: i32,
    pub amount: String,
    pub status: String,
    pub invested_at: NaiveDateTime,
}

impl From<InvestmentDB> for Investment {
    fn from(db: InvestmentDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            property_id: db.property_id,
            shares: db.shares,
            amount: parse_decimal_tolerant(&db.amount, "amount"),
            status: db.status,
            invested_at: db.invested_at,
        }
    }
}
