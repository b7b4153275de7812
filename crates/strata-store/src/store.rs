//! The item store.

use crate::item::{Item, ItemId};
use indexmap::IndexMap;
use parking_lot::Mutex;

/// Mutable state guarded by the store lock.
#[derive(Debug)]
struct State {
    /// Records in insertion order.
    items: IndexMap<ItemId, Item>,
    /// Next id to assign. Only ever grows.
    next_id: ItemId,
}

/// In-memory CRUD store for items.
///
/// Every operation takes the lock once, so readers never see a record that
/// is half-created or half-updated and the id counter cannot hand the same
/// id to two concurrent creates. Share it between request tasks with an
/// `Arc<ItemStore>`.
#[derive(Debug)]
pub struct ItemStore {
    state: Mutex<State>,
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore {
    /// Creates an empty store. The first id assigned is `1`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                items: IndexMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Returns all items in insertion order.
    pub fn list(&self) -> Vec<Item> {
        self.state.lock().items.values().cloned().collect()
    }

    /// Returns the item with the given id, if present.
    pub fn get(&self, id: ItemId) -> Option<Item> {
        self.state.lock().items.get(&id).cloned()
    }

    /// Creates an item, assigning the next id and generating its secret.
    pub fn create(&self, name: impl Into<String>, description: Option<String>) -> Item {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;

        let item = Item::new(id, name.into(), description, Item::secret_for(id));
        state.items.insert(id, item.clone());
        tracing::debug!(item_id = id, "item created");
        item
    }

    /// Replaces the name and description of an existing item.
    ///
    /// The id and the internal secret are carried forward unchanged.
    /// Returns `None` and changes nothing when the id is unknown.
    pub fn update(
        &self,
        id: ItemId,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Option<Item> {
        let mut state = self.state.lock();
        let slot = state.items.get_mut(&id)?;
        *slot = slot.replaced(name.into(), description);
        tracing::debug!(item_id = id, "item updated");
        Some(slot.clone())
    }

    /// Removes an item. Returns `false` if it was not present.
    pub fn remove(&self, id: ItemId) -> bool {
        // shift_remove keeps the remaining items in insertion order.
        let removed = self.state.lock().items.shift_remove(&id).is_some();
        if removed {
            tracing::debug!(item_id = id, "item removed");
        }
        removed
    }

    /// Returns the number of stored items.
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Returns `true` if the store holds no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
