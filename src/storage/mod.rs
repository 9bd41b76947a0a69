pub mod catalog;

pub use catalog::{CatalogStore, MemoryCatalogStore, PostgresCatalogStore};
