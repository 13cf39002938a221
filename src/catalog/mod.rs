pub mod filter;
pub mod repository;
pub mod seed;

pub use filter::{filter_services, CatalogFilter, ALL_CATEGORIES};
pub use repository::{CatalogRepository, InMemoryCatalog};
