pub mod catalog_service;
pub mod error;

pub use catalog_service::{CatalogService, ServicePolicy};
pub use error::{CatalogError, CatalogResult, Entity};
