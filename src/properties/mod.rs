// Module declarations
pub(crate) mod properties_errors;
pub(crate) mod properties_model;
pub(crate) mod properties_repository;
pub(crate) mod properties_service;

// Re-export the public interface
pub use properties_model::{
    NewProperty, Property, PropertyDB, PropertyFilters, PropertySearchResponse, PropertySort,
    PropertyUpdate, PropertyWithStats,
};
pub use properties_repository::PropertyRepository;
pub use properties_service::PropertyService;

// Re-export error types for convenience
pub use properties_errors::{PropertyError, Result};
