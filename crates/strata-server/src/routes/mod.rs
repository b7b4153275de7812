//! Application routes.

pub mod info;
pub mod items;

use crate::router::RouteTable;
use http::Method;
use std::sync::Arc;
use strata_core::Resource;
use strata_middleware::SchemaRegistry;
use strata_store::{Item, ItemStore};

/// Builds the full route table.
///
/// The index route gets global pre-processing only. Item routes carry
/// [`items::ITEM_STAGES`].
#[must_use]
pub fn table(store: &Arc<ItemStore>) -> RouteTable {
    RouteTable::new()
        .route(Method::GET, "/", "index", info::index)
        .group(items::routes(store))
}

/// Visibility schemas for every resource the routes return.
#[must_use]
pub fn schemas() -> SchemaRegistry {
    SchemaRegistry::new().register(Item::KIND, items::item_schema())
}
