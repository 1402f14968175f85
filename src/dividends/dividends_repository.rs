use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::constants::DIVIDEND_STATUS_PAID;
use crate::db::get_connection;
use crate::dividends::dividends_errors::{DividendError, Result};
use crate::dividends::dividends_model::*;
use crate::schema::{dividends, properties};
use crate::utils::parse_decimal_tolerant;

/// Repository for dividend payout records
pub struct DividendRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl DividendRepository {
    /// Creates a new DividendRepository instance
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Inserts a payout record inside an open transaction
    pub fn insert_in_tx(conn: &mut SqliteConnection, new_dividend: NewDividend) -> Result<Dividend> {
        new_dividend.validate()?;

        let row = DividendDB {
            id: Uuid::new_v4().to_string(),
            property_id: new_dividend.property_id,
            user_id: new_dividend.user_id,
            amount: new_dividend.amount.to_string(),
            period_label: new_dividend.period_label,
            status: DIVIDEND_STATUS_PAID.to_string(),
            paid_at: chrono::Utc::now().naive_utc(),
        };

        diesel::insert_into(dividends::table)
            .values(&row)
            .execute(conn)
            .map_err(DividendError::from)?;

        Ok(row.into())
    }

    /// Lists a user's dividends, newest first, with property context
    pub fn list_for_user(
        &self,
        user_id: &str,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<DividendDetails>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| DividendError::DatabaseError(e.to_string()))?;

        let offset = (page.max(1) - 1) * page_size;

        let rows = dividends::table
            .inner_join(properties::table)
            .filter(dividends::user_id.eq(user_id))
            .order(dividends::paid_at.desc())
            .select((
                DividendDB::as_select(),
                properties::name,
                properties::image_url,
            ))
            .limit(page_size)
            .offset(offset)
            .load::<(DividendDB, String, Option<String>)>(&mut conn)
            .map_err(DividendError::from)?;

        Ok(rows
            .into_iter()
            .map(|(dividend, property_name, image_url)| DividendDetails {
                dividend: dividend.into(),
                property_name,
                image_url,
            })
            .collect())
    }

    /// Sums all paid dividends for a user
    pub fn total_earned(&self, user_id: &str) -> Result<Decimal> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| DividendError::DatabaseError(e.to_string()))?;

        let amounts = dividends::table
            .filter(dividends::user_id.eq(user_id))
            .filter(dividends::status.eq(DIVIDEND_STATUS_PAID))
            .select(dividends::amount)
            .load::<String>(&mut conn)
            .map_err(DividendError::from)?;

        Ok(amounts
            .iter()
            .map(|a| parse_decimal_tolerant(a, "amount"))
            .sum())
    }

    /// Sums paid dividends per property for one user, for the holdings view
    pub fn earned_by_property(&self, user_id: &str) -> Result<Vec<(String, Decimal)>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| DividendError::DatabaseError(e.to_string()))?;

        let rows = dividends::table
            .filter(dividends::user_id.eq(user_id))
            .filter(dividends::status.eq(DIVIDEND_STATUS_PAID))
            .select((dividends::property_id, dividends::amount))
            .load::<(String, String)>(&mut conn)
            .map_err(DividendError::from)?;

        let mut totals: Vec<(String, Decimal)> = Vec::new();
        for (property_id, amount) in rows {
            let amount = parse_decimal_tolerant(&amount, "amount");
            match totals.iter_mut().find(|(id, _)| *id == property_id) {
                Some((_, total)) => *total += amount,
                None => totals.push((property_id, amount)),
            }
        }
        Ok(totals)
    }

    /// Most recent dividends for a user, for the portfolio dashboard
    pub fn recent_for_user(&self, user_id: &str, limit: i64) -> Result<Vec<DividendDetails>> {
        self.list_for_user(user_id, 1, limit)
    }
}
