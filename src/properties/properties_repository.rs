use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::{Bool, Double};
use diesel::sqlite::SqliteConnection;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::get_connection;
use crate::properties::properties_errors::{PropertyError, Result};
use crate::properties::properties_model::*;
use crate::schema::{investments, properties, users};

/// Repository for managing property data in the database
pub struct PropertyRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl PropertyRepository {
    /// Creates a new PropertyRepository instance
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    pub fn search(
        &self,
        page: i64,      // Page number, 1-based
        page_size: i64, // Number of items per page
        filters: &PropertyFilters,
        sort: PropertySort,
    ) -> Result<(Vec<Property>, i64)> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PropertyError::DatabaseError(e.to_string()))?;

        let offset = (page.max(1) - 1) * page_size;

        // Monetary columns are stored as TEXT, so numeric filters and sorts
        // go through CAST expressions rather than plain column comparisons.
        let create_base_query = || {
            let mut query = properties::table.into_boxed();

            if let Some(ref category) = filters.category {
                if category != "all" {
                    query = query.filter(properties::category.eq(category));
                }
            }
            if let Some(ref status) = filters.status {
                query = query.filter(properties::status.eq(status));
            }
            if let Some(min_roi) = filters.min_roi {
                query = query.filter(
                    sql::<Bool>("CAST(target_roi AS REAL) >= ").bind::<Double, _>(min_roi),
                );
            }
            if let Some(max_min) = filters.max_min_investment {
                query = query.filter(
                    sql::<Bool>("CAST(min_investment AS REAL) <= ").bind::<Double, _>(max_min),
                );
            }
            if let Some(ref keyword) = filters.search {
                let pattern = format!("%{}%", keyword);
                query = query.filter(
                    properties::name
                        .like(pattern.clone())
                        .or(properties::location.like(pattern.clone()))
                        .or(properties::description.like(pattern).assume_not_null()),
                );
            }

            match sort {
                PropertySort::Newest => query = query.order(properties::created_at.desc()),
                PropertySort::RoiDesc => {
                    query = query.order(sql::<Double>("CAST(target_roi AS REAL)").desc())
                }
                PropertySort::RoiAsc => {
                    query = query.order(sql::<Double>("CAST(target_roi AS REAL)").asc())
                }
                PropertySort::ValueDesc => {
                    query = query.order(sql::<Double>("CAST(total_value AS REAL)").desc())
                }
                PropertySort::ValueAsc => {
                    query = query.order(sql::<Double>("CAST(total_value AS REAL)").asc())
                }
                PropertySort::FundedDesc => {
                    query = query.order(
                        sql::<Double>("CAST(shares_sold AS REAL) / total_shares").desc(),
                    )
                }
            }

            query
        };

        let total = create_base_query().count().get_result::<i64>(&mut conn)?;

        let results = create_base_query()
            .select(PropertyDB::as_select())
            .limit(page_size)
            .offset(offset)
            .load::<PropertyDB>(&mut conn)?;

        Ok((results.into_iter().map(Property::from).collect(), total))
    }

    /// Retrieves a property by its ID
    pub fn get_by_id(&self, property_id: &str) -> Result<Property> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PropertyError::DatabaseError(e.to_string()))?;

        let property = properties::table
            .find(property_id)
            .first::<PropertyDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    PropertyError::NotFound(format!("Property with id {} not found", property_id))
                }
                _ => PropertyError::DatabaseError(e.to_string()),
            })?;

        Ok(property.into())
    }

    /// Resolves the display name of the lister, if any
    pub fn get_lister_name(&self, property: &Property) -> Result<Option<String>> {
        let lister_id = match &property.listed_by {
            Some(id) => id.clone(),
            None => return Ok(None),
        };

        let mut conn = get_connection(&self.pool)
            .map_err(|e| PropertyError::DatabaseError(e.to_string()))?;

        users::table
            .find(lister_id)
            .select(users::full_name)
            .first::<String>(&mut conn)
            .optional()
            .map_err(PropertyError::from)
    }

    /// Counts distinct investment rows per property
    pub fn investor_counts(&self, property_ids: &[String]) -> Result<HashMap<String, i64>> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PropertyError::DatabaseError(e.to_string()))?;

        let rows = investments::table
            .filter(investments::property_id.eq_any(property_ids))
            .group_by(investments::property_id)
            .select((investments::property_id, diesel::dsl::count_star()))
            .load::<(String, i64)>(&mut conn)
            .map_err(PropertyError::from)?;

        Ok(rows.into_iter().collect())
    }

    /// Creates a new property
    pub fn create(&self, new_property: NewProperty) -> Result<Property> {
        new_property.validate()?;

        let mut property_db: PropertyDB = new_property.into();
        if property_db.id.is_empty() {
            property_db.id = Uuid::new_v4().to_string();
        }

        let mut conn = get_connection(&self.pool)
            .map_err(|e| PropertyError::DatabaseError(e.to_string()))?;

        diesel::insert_into(properties::table)
            .values(&property_db)
            .execute(&mut conn)
            .map_err(|e| PropertyError::DatabaseError(e.to_string()))?;

        Ok(property_db.into())
    }

    /// Applies a typed update and returns the fresh row
    pub fn update(&self, property_id: &str, update: PropertyUpdate) -> Result<Property> {
        update.validate()?;

        let mut conn = get_connection(&self.pool)
            .map_err(|e| PropertyError::DatabaseError(e.to_string()))?;

        let changeset: PropertyUpdateDB = update.into();
        let affected = diesel::update(properties::table.find(property_id))
            .set((
                &changeset,
                properties::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(&mut conn)
            .map_err(|e| PropertyError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(PropertyError::NotFound(format!(
                "Property with id {} not found",
                property_id
            )));
        }

        self.get_by_id(property_id)
    }

    /// Deletes a property by its ID
    pub fn delete(&self, property_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)
            .map_err(|e| PropertyError::DatabaseError(e.to_string()))?;

        let affected = diesel::delete(properties::table.find(property_id))
            .execute(&mut conn)
            .map_err(|e| PropertyError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(PropertyError::NotFound(format!(
                "Property with id {} not found",
                property_id
            )));
        }

        Ok(affected)
    }
}
