//! Response projection.
//!
//! A [`VisibilitySchema`] marks each field of a record as visible or
//! hidden. Projection keeps the visible fields and drops everything else,
//! including fields the schema does not mention. Sequences are projected
//! element by element.
//!
//! The [`SchemaRegistry`] maps resource kinds to schemas. The pipeline
//! applies it to every reply that carries a record of a registered kind.

use serde_json::{Map, Value};
use std::collections::HashMap;
use strata_core::{Reply, ReplyKind};

/// Whether a field appears in the external form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Copied to the output.
    Visible,
    /// Omitted from the output.
    Hidden,
}

/// Field visibility for one resource kind.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use strata_middleware::VisibilitySchema;
///
/// let schema = VisibilitySchema::new().visible("id").hidden("token");
/// let projected = schema.project(&json!({"id": 1, "token": "t", "extra": true}));
///
/// assert_eq!(projected, json!({"id": 1}));
/// ```
#[derive(Debug, Clone, Default)]
pub struct VisibilitySchema {
    fields: HashMap<String, Visibility>,
}

impl VisibilitySchema {
    /// Creates an empty schema. An empty schema hides every field.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a field visible.
    #[must_use]
    pub fn visible(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into(), Visibility::Visible);
        self
    }

    /// Marks a field hidden.
    #[must_use]
    pub fn hidden(mut self, field: impl Into<String>) -> Self {
        self.fields.insert(field.into(), Visibility::Hidden);
        self
    }

    /// Returns the declared visibility of a field.
    #[must_use]
    pub fn visibility(&self, field: &str) -> Option<Visibility> {
        self.fields.get(field).copied()
    }

    fn is_visible(&self, field: &str) -> bool {
        self.visibility(field) == Some(Visibility::Visible)
    }

    /// Projects a record, or a sequence of records.
    ///
    /// Values of visible fields are copied unchanged. Scalars pass
    /// through as they are.
    #[must_use]
    pub fn project(&self, value: &Value) -> Value {
        match value {
            Value::Object(fields) => Value::Object(
                fields
                    .iter()
                    .filter(|(name, _)| self.is_visible(name))
                    .map(|(name, v)| (name.clone(), v.clone()))
                    .collect::<Map<_, _>>(),
            ),
            Value::Array(records) => {
                Value::Array(records.iter().map(|record| self.project(record)).collect())
            }
            other => other.clone(),
        }
    }
}

/// Visibility schemas keyed by resource kind.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, VisibilitySchema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the schema for a resource kind, replacing any previous one.
    #[must_use]
    pub fn register(mut self, kind: &'static str, schema: VisibilitySchema) -> Self {
        self.schemas.insert(kind, schema);
        self
    }

    /// Returns the schema for a resource kind.
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&VisibilitySchema> {
        self.schemas.get(kind)
    }

    /// Projects a reply if it carries a resource of a registered kind.
    ///
    /// Plain and absent replies, and resources without a schema, pass
    /// through unchanged.
    #[must_use]
    pub fn project_reply(&self, reply: Reply) -> Reply {
        let ReplyKind::Resource(kind) = reply.kind() else {
            return reply;
        };

        match self.get(kind) {
            Some(schema) => {
                let projected = schema.project(reply.body());
                reply.with_body(projected)
            }
            None => {
                tracing::debug!(kind, "no visibility schema registered");
                reply
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Serialize;
    use serde_json::json;
    use strata_core::Resource;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Record {
        id: u64,
        name: String,
        internal_secret: String,
    }

    impl Resource for Record {
        const KIND: &'static str = "record";
    }

    fn schema() -> VisibilitySchema {
        VisibilitySchema::new()
            .visible("id")
            .visible("name")
            .hidden("internalSecret")
    }

    fn record(id: u64) -> Record {
        Record {
            id,
            name: format!("r{id}"),
            internal_secret: format!("secret-{id}"),
        }
    }

    #[test]
    fn test_hidden_field_is_removed() {
        let projected = schema().project(&json!({"id": 1, "name": "a", "internalSecret": "s"}));
        assert_eq!(projected, json!({"id": 1, "name": "a"}));
    }

    #[test]
    fn test_unlisted_field_is_removed() {
        let projected = schema().project(&json!({"id": 1, "debug": "x"}));
        assert_eq!(projected, json!({"id": 1}));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let input = json!({"id": 1, "internalSecret": "s"});
        let _ = schema().project(&input);
        assert_eq!(input["internalSecret"], "s");
    }

    #[test]
    fn test_sequence_projected_element_wise() {
        let projected = schema().project(&json!([
            {"id": 1, "internalSecret": "a"},
            {"id": 2, "internalSecret": "b"},
        ]));
        assert_eq!(projected, json!([{"id": 1}, {"id": 2}]));
    }

    #[test]
    fn test_registry_projects_resource_replies() {
        let registry = SchemaRegistry::new().register(Record::KIND, schema());
        let reply = Reply::resource(&record(1)).unwrap();

        let projected = registry.project_reply(reply);
        assert_eq!(projected.body(), &json!({"id": 1, "name": "r1"}));
    }

    #[test]
    fn test_registry_projects_resource_lists() {
        let registry = SchemaRegistry::new().register(Record::KIND, schema());
        let reply = Reply::resources(&[record(1), record(2)]).unwrap();

        let projected = registry.project_reply(reply);
        assert_eq!(projected.body(), &json!([{"id": 1, "name": "r1"}, {"id": 2, "name": "r2"}]));
    }

    #[test]
    fn test_plain_and_absent_replies_pass_through() {
        let registry = SchemaRegistry::new().register(Record::KIND, schema());

        let plain = Reply::json(json!({"internalSecret": "visible in plain replies"}));
        assert_eq!(registry.project_reply(plain.clone()), plain);

        let absent = Reply::absent("missing");
        assert_eq!(registry.project_reply(absent.clone()), absent);
    }

    #[test]
    fn test_unregistered_kind_passes_through() {
        let reply = Reply::resource(&record(3)).unwrap();
        let out = SchemaRegistry::new().project_reply(reply.clone());
        assert_eq!(out, reply);
    }

    proptest! {
        #[test]
        fn prop_projection_never_leaks_hidden_fields(
            id in any::<u64>(),
            name in ".*",
            secret in ".*",
            extra in prop::collection::hash_map("[a-z]{1,6}", any::<i64>(), 0..4),
        ) {
            let mut value = json!({"id": id, "name": name, "internalSecret": secret});
            if let Value::Object(fields) = &mut value {
                for (k, v) in extra {
                    fields.entry(k).or_insert(json!(v));
                }
            }

            let projected = schema().project(&value);
            let fields = projected.as_object().unwrap();
            prop_assert!(!fields.contains_key("internalSecret"));
            prop_assert!(fields.keys().all(|k| k == "id" || k == "name"));
            prop_assert_eq!(&fields["id"], &value["id"]);
        }
    }
}
