use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::parse_decimal_tolerant;

/// Domain model representing one immutable ledger entry.
///
/// Rows are append-only: nothing in this crate updates or deletes a
/// transaction after insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub property_id: Option<String>,
    pub transaction_type: String,
    pub amount: Decimal,
    pub shares: Option<i32>,
    pub description: Option<String>,
    pub status: String,
    pub reference_id: String,
    pub created_at: NaiveDateTime,
}

/// A ledger entry enriched with property context for display
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub property_name: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// Input model for appending a ledger entry. Only settlement, wallet and
/// dividend paths construct these; the id and reference id are generated at
/// insert time.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: String,
    pub property_id: Option<String>,
    pub transaction_type: String,
    pub amount: Decimal,
    pub shares: Option<i32>,
    pub description: Option<String>,
}

/// Filters accepted by the ledger search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    pub transaction_type: Option<String>,
    pub status: Option<String>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

/// Lifetime totals over completed ledger entries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub total_dividends: Decimal,
    pub total_invested: Decimal,
    pub total_withdrawn: Decimal,
    pub total_deposited: Decimal,
    pub transaction_count: i64,
}

/// Paged response for the ledger search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSearchResponse {
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub summary: TransactionSummary,
    pub transactions: Vec<TransactionDetails>,
}

/// Result of a wallet deposit or withdrawal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletReceipt {
    pub new_balance: Decimal,
    pub transaction: Transaction,
}

/// Database model for transactions
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub user_id: String,
    pub property_id: Option<String>,
    pub transaction_type: String,
    pub amount: String,
    pub shares: Option<i32>,
    pub description: Option<String>,
    pub status: String,
    pub reference_id: String,
    pub created_at: NaiveDateTime,
}

impl From<TransactionDB> for Transaction {
    fn from(db: TransactionDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            property_id: db.property_id,
            transaction_type: db.transaction_type,
            amount: parse_decimal_tolerant(&db.amount, "amount"),
            shares: db.shares,
            description: db.description,
            status: db.status,
            reference_id: db.reference_id,
            created_at: db.created_at,
        }
    }
}
