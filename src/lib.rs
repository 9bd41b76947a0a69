pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{CatalogError, CatalogService, ServicePolicy};
pub use domain::validation::{FieldRuleSet, Rule, ValidationErrors, Validator};
pub use infra::config::Settings;
pub use storage::{CatalogStore, MemoryCatalogStore, PostgresCatalogStore};
