use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dividends::DividendDetails;
use crate::properties::Property;
use crate::transactions::TransactionDetails;

/// One active position joined with its property context.
///
/// Every monetary figure here is recomputed from the current property
/// valuation at read time; nothing in this struct is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub investment_id: String,
    pub property_id: String,
    pub name: String,
    pub location: String,
    pub category: String,
    pub image_url: Option<String>,
    pub property_status: String,
    pub target_roi: Option<Decimal>,
    pub annual_yield: Option<Decimal>,
    pub dividend_freq: String,
    pub term_years: Option<i32>,
    pub shares: i32,
    pub amount_invested: Decimal,
    pub current_value: Decimal,
    pub gain_pct: Decimal,
    pub dividends_earned: Decimal,
    pub invested_at: NaiveDateTime,
}

/// Top-line KPI figures for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_invested: Decimal,
    pub current_value: Decimal,
    pub total_gain: Decimal,
    pub gain_pct: Decimal,
    pub total_dividends: Decimal,
    pub monthly_income: Decimal,
    pub avg_roi: Decimal,
    pub properties_owned: usize,
    pub wallet_balance: Decimal,
}

/// Current value held in one property category, as a share of the whole
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSlice {
    pub category: String,
    pub value: Decimal,
    pub pct: Decimal,
}

/// Full dashboard payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub summary: PortfolioSummary,
    pub allocation: Vec<AllocationSlice>,
    pub holdings: Vec<Holding>,
    pub recent_dividends: Vec<DividendDetails>,
    pub recent_transactions: Vec<TransactionDetails>,
}

/// One row of the per-property performance ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceEntry {
    pub property_id: String,
    pub name: String,
    pub location: String,
    pub category: String,
    pub target_roi: Option<Decimal>,
    pub annual_yield: Option<Decimal>,
    pub amount_invested: Decimal,
    pub current_value: Decimal,
    pub gain_pct: Decimal,
}

/// A saved property together with when it was saved
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    #[serde(flatten)]
    pub property: Property,
    pub funded_pct: Decimal,
    pub added_at: NaiveDateTime,
}
