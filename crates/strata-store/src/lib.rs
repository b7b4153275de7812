//! # Strata Store
//!
//! Authoritative in-memory state for the `item` resource.
//!
//! The store owns the records and the id counter behind one lock, so each
//! of its operations is atomic with respect to concurrent requests. Ids are
//! assigned from a monotonically increasing counter and never reused, even
//! after the record holding them is removed.
//!
//! ```
//! use strata_store::ItemStore;
//!
//! let store = ItemStore::new();
//! let widget = store.create("Widget", None);
//! assert_eq!(widget.id(), 1);
//! assert!(store.remove(widget.id()));
//! assert!(!store.remove(widget.id()));
//! ```

#![doc(html_root_url = "https://docs.rs/strata-store/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod item;
mod store;

pub use item::{Item, ItemId};
pub use store::ItemStore;
