use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::Double;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use super::portfolio_model::WishlistEntry;
use crate::db::get_connection;
use crate::investments::{Investment, InvestmentDB};
use crate::portfolio::portfolio_errors::{PortfolioError, Result};
use crate::properties::{Property, PropertyDB};
use crate::schema::{investments, properties, wishlist};

/// Read-side queries backing the portfolio aggregator
pub struct PortfolioRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl PortfolioRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Loads every open position for the user together with its property,
    /// largest position first. Exited rows (shares == 0) are skipped.
    pub fn open_positions(&self, user_id: &str) -> Result<Vec<(Investment, Property)>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PortfolioError::DatabaseError(e.to_string()))?;

        let rows = investments::table
            .inner_join(properties::table)
            .filter(investments::user_id.eq(user_id))
            .filter(investments::shares.gt(0))
            .order(sql::<Double>("CAST(investments.amount AS REAL)").desc())
            .select((InvestmentDB::as_select(), PropertyDB::as_select()))
            .load::<(InvestmentDB, PropertyDB)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(i, p)| (Investment::from(i), Property::from(p)))
            .collect())
    }

    /// Open positions ordered by the property's target ROI, best first
    pub fn positions_by_target_roi(&self, user_id: &str) -> Result<Vec<(Investment, Property)>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PortfolioError::DatabaseError(e.to_string()))?;

        let rows = investments::table
            .inner_join(properties::table)
            .filter(investments::user_id.eq(user_id))
            .filter(investments::shares.gt(0))
            .order(sql::<Double>("CAST(properties.target_roi AS REAL)").desc())
            .select((InvestmentDB::as_select(), PropertyDB::as_select()))
            .load::<(InvestmentDB, PropertyDB)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(i, p)| (Investment::from(i), Property::from(p)))
            .collect())
    }

    /// Saves a property to the user's wishlist. Saving twice is a no-op.
    pub fn add_to_wishlist(&self, user_id: &str, property_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PortfolioError::DatabaseError(e.to_string()))?;

        diesel::insert_into(wishlist::table)
            .values((
                wishlist::user_id.eq(user_id),
                wishlist::property_id.eq(property_id),
            ))
            .on_conflict_do_nothing()
            .execute(&mut conn)?;

        Ok(())
    }

    pub fn remove_from_wishlist(&self, user_id: &str, property_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PortfolioError::DatabaseError(e.to_string()))?;

        diesel::delete(
            wishlist::table
                .filter(wishlist::user_id.eq(user_id))
                .filter(wishlist::property_id.eq(property_id)),
        )
        .execute(&mut conn)?;

        Ok(())
    }

    /// Lists the user's saved properties, most recently saved first
    pub fn get_wishlist(&self, user_id: &str) -> Result<Vec<WishlistEntry>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PortfolioError::DatabaseError(e.to_string()))?;

        let rows = wishlist::table
            .inner_join(properties::table)
            .filter(wishlist::user_id.eq(user_id))
            .order(wishlist::added_at.desc())
            .select((PropertyDB::as_select(), wishlist::added_at))
            .load::<(PropertyDB, chrono::NaiveDateTime)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(|(p, added_at)| {
                let property = Property::from(p);
                let funded_pct = property.funded_pct();
                WishlistEntry {
                    property,
                    funded_pct,
                    added_at,
                }
            })
            .collect())
    }
}
