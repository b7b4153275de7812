//! The item record.

use serde::Serialize;
use strata_core::Resource;

/// Item identifier. Always positive.
pub type ItemId = u64;

/// An item as held by the store.
///
/// Fields are private: ids and secrets are assigned by the
/// [`ItemStore`](crate::ItemStore) and cannot be supplied by callers.
/// The serialized form is the *internal* view and includes
/// `internalSecret`; responses are projected before they leave the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    id: ItemId,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    internal_secret: String,
}

impl Item {
    pub(crate) fn new(
        id: ItemId,
        name: String,
        description: Option<String>,
        internal_secret: String,
    ) -> Self {
        Self {
            id,
            name,
            description,
            internal_secret,
        }
    }

    /// Derives the secret for a freshly assigned id.
    pub(crate) fn secret_for(id: ItemId) -> String {
        format!("secret-{id}")
    }

    /// Builds the replacement record for an update, carrying the secret forward.
    pub(crate) fn replaced(&self, name: String, description: Option<String>) -> Self {
        Self::new(self.id, name, description, self.internal_secret.clone())
    }

    /// Returns the id.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Returns the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the internal secret.
    pub fn internal_secret(&self) -> &str {
        &self.internal_secret
    }
}

impl Resource for Item {
    const KIND: &'static str = "item";
}
