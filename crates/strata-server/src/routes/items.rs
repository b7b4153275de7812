//! The item CRUD routes.
//!
//! Handlers take their path id and body as coerced arguments, so a
//! malformed request is rejected before the handler runs and never
//! partially applies. Missing records
//! are reported with [`Reply::absent`], which the pipeline treats as a
//! successful outcome.

use crate::router::RouteGroup;
use http::{Method, StatusCode};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use strata_core::{coerce, FromInput, Handler, HandlerInput, Json, Outcome, Reply, StrataResult};
use strata_middleware::VisibilitySchema;
use strata_store::{ItemId, ItemStore};

/// The stages applied to every item route, in order.
pub const ITEM_STAGES: &[&str] = &["request_logger", "logging"];

/// Request body accepted by create and update.
#[derive(Debug, Deserialize)]
struct ItemBody {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

/// The `:id` path parameter as an item id.
struct ItemPath(ItemId);

impl FromInput for ItemPath {
    fn from_input(input: &HandlerInput) -> StrataResult<Self> {
        input.param("id").map(ItemPath)
    }
}

/// The external form of an item.
#[must_use]
pub fn item_schema() -> VisibilitySchema {
    VisibilitySchema::new()
        .visible("id")
        .visible("name")
        .visible("description")
        .hidden("internalSecret")
}

/// Declares the item routes over a shared store.
#[must_use]
pub fn routes(store: &Arc<ItemStore>) -> RouteGroup {
    RouteGroup::new("/items")
        .stages(ITEM_STAGES)
        .route(Method::GET, "/", "listItems", bind(store, list_items))
        .route(Method::GET, "/:id", "getItem", bind(store, get_item))
        .route(Method::POST, "/", "createItem", bind(store, create_item))
        .route(Method::PUT, "/:id", "updateItem", bind(store, update_item))
        .route(Method::DELETE, "/:id", "deleteItem", bind(store, delete_item))
}

fn bind<T, F, Fut>(store: &Arc<ItemStore>, handler: F) -> impl Handler
where
    T: FromInput + Send + 'static,
    F: Fn(Arc<ItemStore>, T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    let store = Arc::clone(store);
    coerce(move |args: T| handler(Arc::clone(&store), args))
}

fn not_found(id: ItemId) -> Reply {
    Reply::absent(format!("item {id} not found"))
}

async fn list_items(store: Arc<ItemStore>, (): ()) -> Outcome {
    let items = store.list();
    Reply::resources(items.as_slice())
}

async fn get_item(store: Arc<ItemStore>, ItemPath(id): ItemPath) -> Outcome {
    match store.get(id) {
        Some(item) => Reply::resource(&item),
        None => Ok(not_found(id)),
    }
}

async fn create_item(store: Arc<ItemStore>, Json(body): Json<ItemBody>) -> Outcome {
    let item = store.create(body.name, body.description);
    Ok(Reply::resource(&item)?.with_status(StatusCode::CREATED))
}

async fn update_item(
    store: Arc<ItemStore>,
    (ItemPath(id), Json(body)): (ItemPath, Json<ItemBody>),
) -> Outcome {
    match store.update(id, body.name, body.description) {
        Some(item) => Reply::resource(&item),
        None => Ok(not_found(id)),
    }
}

async fn delete_item(store: Arc<ItemStore>, ItemPath(id): ItemPath) -> Outcome {
    let deleted = store.remove(id);
    Ok(Reply::json(serde_json::json!({ "deleted": deleted })))
}
