//! Storefront client core: catalog queries and view routing against the
//! storefront REST API.

pub mod catalog;
pub mod endpoints;
pub mod error;
pub mod loaders;
pub mod query;
pub mod router;
pub mod session;
pub mod state;

pub use catalog::{CatalogEngine, CatalogOptions, CatalogResponse};
pub use endpoints::ApiEndpoints;
pub use error::CatalogError;
pub use loaders::{register_catalog_loaders, ViewUpdate};
pub use router::{History, MemoryHistory, RouteMatch, Router, RouterEvent, View, ViewLoader};
pub use session::{CredentialStore, MemoryCredentials};
pub use state::{FilterState, PageLink, PaginationState};

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod query_tests;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
