//! Handler input with primitive coercion.
//!
//! [`HandlerInput`] owns what the router extracted from the request: the
//! path parameters and the collected body. Coercion failures are reported
//! as [`StrataError::Validation`] so they are rejected before any business
//! logic runs.

use crate::{StrataError, StrataResult};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::str::FromStr;

/// Path parameters and body handed to a [`Handler`](crate::Handler).
#[derive(Debug, Clone, Default)]
pub struct HandlerInput {
    params: HashMap<String, String>,
    body: Bytes,
}

impl HandlerInput {
    /// Creates a new input from extracted path parameters and a body.
    #[must_use]
    pub fn new(params: HashMap<String, String>, body: Bytes) -> Self {
        Self { params, body }
    }

    /// Creates an input with no parameters and an empty body.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the raw value of a path parameter.
    #[must_use]
    pub fn raw_param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Parses a path parameter.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the parameter is missing or does not
    /// parse as `T`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use strata_core::HandlerInput;
    ///
    /// let mut params = HashMap::new();
    /// params.insert("id".to_string(), "abc".to_string());
    /// let input = HandlerInput::new(params, Default::default());
    ///
    /// assert!(input.param::<u64>("id").is_err());
    /// ```
    pub fn param<T: FromStr>(&self, name: &str) -> StrataResult<T> {
        let raw = self.raw_param(name).ok_or_else(|| {
            StrataError::validation_field(name, format!("missing path parameter '{name}'"))
        })?;

        raw.parse().map_err(|_| {
            StrataError::validation_field(
                name,
                format!("invalid path parameter '{name}': {raw:?} is not a valid {}", short_type_name::<T>()),
            )
        })
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty body, malformed JSON, a
    /// missing required field or a field of the wrong type.
    pub fn json<T: DeserializeOwned>(&self) -> StrataResult<T> {
        if self.body.is_empty() {
            return Err(StrataError::validation("request body is required"));
        }

        serde_json::from_slice(&self.body)
            .map_err(|e| StrataError::validation(format!("invalid request body: {e}")))
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
