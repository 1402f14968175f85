use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::dividends_errors::{DividendError, Result};
use crate::utils::parse_decimal_tolerant;

/// Domain model representing one dividend payout to one user.
///
/// Reporting record only; the wallet credit itself reconciles with a
/// `dividend`-type ledger entry written in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dividend {
    pub id: String,
    pub property_id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub period_label: Option<String>,
    pub status: String,
    pub paid_at: NaiveDateTime,
}

/// A dividend enriched with property context for display
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendDetails {
    #[serde(flatten)]
    pub dividend: Dividend,
    pub property_name: String,
    pub image_url: Option<String>,
}

/// Input model for recording a payout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDividend {
    pub property_id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub period_label: Option<String>,
}

impl NewDividend {
    /// Validates the payout data
    pub fn validate(&self) -> Result<()> {
        if self.property_id.trim().is_empty() {
            return Err(DividendError::InvalidData(
                "Property ID cannot be empty".to_string(),
            ));
        }
        if self.user_id.trim().is_empty() {
            return Err(DividendError::InvalidData(
                "User ID cannot be empty".to_string(),
            ));
        }
        if self.amount <= Decimal::ZERO {
            return Err(DividendError::InvalidData(
                "Dividend amount must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Paged response for a user's dividend history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DividendsPage {
    pub total_earned: Decimal,
    pub dividends: Vec<DividendDetails>,
}

/// Database model for dividends
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
#[diesel(table_name = crate::schema::dividends)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DividendDB {
    pub id: String,
    pub property_id: String,
    pub user_id: String,
    pub amount: String,
    pub period_label: Option<String>,
    pub status: String,
    pub paid_at: NaiveDateTime,
}

impl From<DividendDB> for Dividend {
    fn from(db: DividendDB) -> Self {
        Self {
            id: db.id,
            property_id: db.property_id,
            user_id: db.user_id,
            amount: parse_decimal_tolerant(&db.amount, "amount"),
            period_label: db.period_label,
            status: db.status,
            paid_at: db.paid_at,
        }
    }
}
