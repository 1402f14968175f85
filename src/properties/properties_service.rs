use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::properties_model::*;
use super::properties_repository::PropertyRepository;
use crate::properties::Result;

/// Service for the property marketplace
pub struct PropertyService {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl PropertyService {
    /// Creates a new PropertyService instance
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    /// Searches the marketplace with filters, sorting and pagination
    pub fn search_properties(
        &self,
        filters: &PropertyFilters,
        sort: PropertySort,
        page: i64,
        page_size: i64,
    ) -> Result<PropertySearchResponse> {
        let repo = PropertyRepository::new(self.pool.clone());
        let (properties, total) = repo.search(page, page_size, filters, sort)?;

        let ids: Vec<String> = properties.iter().map(|p| p.id.clone()).collect();
        let counts = repo.investor_counts(&ids)?;

        let properties = properties
            .into_iter()
            .map(|p| {
                let count = counts.get(&p.id).copied().unwrap_or(0);
                PropertyWithStats::new(p, count, None)
            })
            .collect();

        Ok(PropertySearchResponse {
            total,
            page,
            page_size,
            properties,
        })
    }

    /// Retrieves one property with its marketplace statistics
    pub fn get_property(&self, property_id: &str) -> Result<PropertyWithStats> {
        let repo = PropertyRepository::new(self.pool.clone());
        let property = repo.get_by_id(property_id)?;
        let lister_name = repo.get_lister_name(&property)?;
        let counts = repo.investor_counts(std::slice::from_ref(&property.id))?;
        let count = counts.get(&property.id).copied().unwrap_or(0);
        Ok(PropertyWithStats::new(property, count, lister_name))
    }

    /// Lists a new property on the marketplace
    pub async fn create_property(&self, new_property: NewProperty) -> Result<Property> {
        debug!("Creating property..., name: {}", new_property.name);
        let repo = PropertyRepository::new(self.pool.clone());
        repo.create(new_property)
    }

    /// Applies an allow-listed update to a property
    pub async fn update_property(
        &self,
        property_id: &str,
        update: PropertyUpdate,
    ) -> Result<Property> {
        let repo = PropertyRepository::new(self.pool.clone());
        repo.update(property_id, update)
    }

    /// Removes a property from the marketplace
    pub async fn delete_property(&self, property_id: &str) -> Result<()> {
        let repo = PropertyRepository::new(self.pool.clone());
        repo.delete(property_id)?;
        Ok(())
    }
}
