use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::properties_errors::{PropertyError, Result};
use crate::constants::{
    DIVIDEND_FREQUENCIES, DISPLAY_DECIMAL_PRECISION, PROPERTY_CATEGORIES, PROPERTY_STATUS_ACTIVE,
    PROPERTY_STATUS_CLOSED, PROPERTY_STATUS_COMING_SOON, PROPERTY_STATUS_FUNDED,
};
use crate::utils::parse_decimal_tolerant;

/// Domain model representing a listed property.
///
/// The share inventory counters (total_shares / shares_sold) are owned
/// exclusively by this row; they only move through the settlement engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub name: String,
    pub location: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub category: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub total_value: Decimal,
    pub total_shares: i32,
    pub shares_sold: i32,
    pub min_investment: Decimal,
    pub target_roi: Option<Decimal>,
    pub annual_yield: Option<Decimal>,
    pub appreciation: Option<Decimal>,
    pub dividend_freq: String,
    pub term_years: Option<i32>,
    pub status: String,
    pub listed_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Property {
    /// Current per-share price, always recomputed from the two operands.
    pub fn share_price(&self) -> Decimal {
        self.total_value / Decimal::from(self.total_shares)
    }

    pub fn shares_remaining(&self) -> i32 {
        self.total_shares - self.shares_sold
    }

    /// Percentage of the inventory already sold, rounded for display.
    pub fn funded_pct(&self) -> Decimal {
        if self.total_shares == 0 {
            return Decimal::ZERO;
        }
        (Decimal::from(self.shares_sold) / Decimal::from(self.total_shares)
            * Decimal::ONE_HUNDRED)
            .round_dp(1)
    }

    pub fn is_active(&self) -> bool {
        self.status == PROPERTY_STATUS_ACTIVE
    }
}

/// A property together with marketplace statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyWithStats {
    #[serde(flatten)]
    pub property: Property,
    pub share_price: Decimal,
    pub funded_pct: Decimal,
    pub investor_count: i64,
    pub listed_by_name: Option<String>,
}

impl PropertyWithStats {
    pub fn new(property: Property, investor_count: i64, listed_by_name: Option<String>) -> Self {
        let share_price = property
            .share_price()
            .round_dp(DISPLAY_DECIMAL_PRECISION);
        let funded_pct = property.funded_pct();
        Self {
            property,
            share_price,
            funded_pct,
            investor_count,
            listed_by_name,
        }
    }
}

/// Input model for creating a new property listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub location: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub category: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub total_value: Decimal,
    pub total_shares: Option<i32>,
    pub min_investment: Decimal,
    pub target_roi: Option<Decimal>,
    pub annual_yield: Option<Decimal>,
    pub appreciation: Option<Decimal>,
    pub dividend_freq: Option<String>,
    pub term_years: Option<i32>,
    pub listed_by: Option<String>,
}

impl NewProperty {
    /// Validates the new property data
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PropertyError::InvalidData(
                "Property name cannot be empty".to_string(),
            ));
        }
        if self.location.trim().is_empty() {
            return Err(PropertyError::InvalidData(
                "Location cannot be empty".to_string(),
            ));
        }
        if !PROPERTY_CATEGORIES.contains(&self.category.as_str()) {
            return Err(PropertyError::InvalidData(format!(
                "Unknown category '{}'",
                self.category
            )));
        }
        if self.total_value <= Decimal::ZERO {
            return Err(PropertyError::InvalidData(
                "Total value must be positive".to_string(),
            ));
        }
        if let Some(shares) = self.total_shares {
            if shares < 1 {
                return Err(PropertyError::InvalidData(
                    "Total shares must be at least 1".to_string(),
                ));
            }
        }
        if self.min_investment < Decimal::ZERO {
            return Err(PropertyError::InvalidData(
                "Minimum investment cannot be negative".to_string(),
            ));
        }
        if let Some(freq) = &self.dividend_freq {
            if !DIVIDEND_FREQUENCIES.contains(&freq.as_str()) {
                return Err(PropertyError::InvalidData(format!(
                    "Unknown dividend frequency '{}'",
                    freq
                )));
            }
        }
        Ok(())
    }
}

/// Typed allow-list for property updates. The share inventory
/// (total_value / total_shares / shares_sold) is deliberately absent: it only
/// moves through the settlement engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<String>,
    pub target_roi: Option<Decimal>,
    pub annual_yield: Option<Decimal>,
    pub appreciation: Option<Decimal>,
    pub dividend_freq: Option<String>,
    pub term_years: Option<i32>,
    pub min_investment: Option<Decimal>,
}

impl PropertyUpdate {
    pub fn validate(&self) -> Result<()> {
        if self == &PropertyUpdate::default() {
            return Err(PropertyError::InvalidData(
                "No valid fields to update".to_string(),
            ));
        }
        if let Some(freq) = &self.dividend_freq {
            if !DIVIDEND_FREQUENCIES.contains(&freq.as_str()) {
                return Err(PropertyError::InvalidData(format!(
                    "Unknown dividend frequency '{}'",
                    freq
                )));
            }
        }
        if let Some(status) = &self.status {
            if ![
                PROPERTY_STATUS_ACTIVE,
                PROPERTY_STATUS_FUNDED,
                PROPERTY_STATUS_CLOSED,
                PROPERTY_STATUS_COMING_SOON,
            ]
            .contains(&status.as_str())
            {
                return Err(PropertyError::InvalidData(format!(
                    "Unknown status '{}'",
                    status
                )));
            }
        }
        Ok(())
    }
}

/// Changeset mirror of PropertyUpdate with decimals rendered for storage
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::properties)]
pub struct PropertyUpdateDB {
    pub name: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<String>,
    pub target_roi: Option<String>,
    pub annual_yield: Option<String>,
    pub appreciation: Option<String>,
    pub dividend_freq: Option<String>,
    pub term_years: Option<i32>,
    pub min_investment: Option<String>,
}

impl From<PropertyUpdate> for PropertyUpdateDB {
    fn from(domain: PropertyUpdate) -> Self {
        Self {
            name: domain.name,
            location: domain.location,
            city: domain.city,
            country: domain.country,
            description: domain.description,
            image_url: domain.image_url,
            status: domain.status,
            target_roi: domain.target_roi.map(|d| d.to_string()),
            annual_yield: domain.annual_yield.map(|d| d.to_string()),
            appreciation: domain.appreciation.map(|d| d.to_string()),
            dividend_freq: domain.dividend_freq,
            term_years: domain.term_years,
            min_investment: domain.min_investment.map(|d| d.to_string()),
        }
    }
}

/// Filters accepted by the marketplace search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilters {
    pub category: Option<String>,
    pub status: Option<String>,
    pub min_roi: Option<f64>,
    pub max_min_investment: Option<f64>,
    pub search: Option<String>,
}

/// Sort orders for the marketplace search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertySort {
    Newest,
    RoiDesc,
    RoiAsc,
    ValueDesc,
    ValueAsc,
    FundedDesc,
}

impl Default for PropertySort {
    fn default() -> Self {
        PropertySort::Newest
    }
}

/// Paged response for the marketplace search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySearchResponse {
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub properties: Vec<PropertyWithStats>,
}

/// Database model for properties
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
#[diesel(table_name = crate::schema::properties)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PropertyDB {
    pub id: String,
    pub name: String,
    pub location: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub category: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub total_value: String,
    pub total_shares: i32,
    pub shares_sold: i32,
    pub min_investment: String,
    pub target_roi: Option<String>,
    pub annual_yield: Option<String>,
    pub appreciation: Option<String>,
    pub dividend_freq: String,
    pub term_years: Option<i32>,
    pub status: String,
    pub listed_by: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<PropertyDB> for Property {
    fn from(db: PropertyDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            location: db.location,
            city: db.city,
            country: db.country,
            category: db.category,
            description: db.description,
            image_url: db.image_url,
            total_value: parse_decimal_tolerant(&db.total_value, "total_value"),
            total_shares: db.total_shares,
            shares_sold: db.shares_sold,
            min_investment: parse_decimal_tolerant(&db.min_investment, "min_investment"),
            target_roi: db.target_roi.map(|v| parse_decimal_tolerant(&v, "target_roi")),
            annual_yield: db
                .annual_yield
                .map(|v| parse_decimal_tolerant(&v, "annual_yield")),
            appreciation: db
                .appreciation
                .map(|v| parse_decimal_tolerant(&v, "appreciation")),
            dividend_freq: db.dividend_freq,
            term_years: db.term_years,
            status: db.status,
            listed_by: db.listed_by,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewProperty> for PropertyDB {
    fn from(domain: NewProperty) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            name: domain.name,
            location: domain.location,
            city: domain.city,
            country: domain.country,
            category: domain.category,
            description: domain.description,
            image_url: domain.image_url,
            total_value: domain.total_value.to_string(),
            total_shares: domain.total_shares.unwrap_or(1000),
            shares_sold: 0,
            min_investment: domain.min_investment.to_string(),
            target_roi: domain.target_roi.map(|d| d.to_string()),
            annual_yield: domain.annual_yield.map(|d| d.to_string()),
            appreciation: domain.appreciation.map(|d| d.to_string()),
            dividend_freq: domain
                .dividend_freq
                .unwrap_or_else(|| "Monthly".to_string()),
            term_years: domain.term_years,
            status: PROPERTY_STATUS_ACTIVE.to_string(),
            listed_by: domain.listed_by,
            created_at: now,
            updated_at: now,
        }
    }
}
