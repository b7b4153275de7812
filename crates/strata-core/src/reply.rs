//! Handler replies.
//!
//! A [`Reply`] is the successful half of an [`Outcome`](crate::Outcome).
//! Replies that carry records remember the record's resource kind so the
//! pipeline can project them through the matching visibility schema
//! without the handler being involved.

use crate::StrataResult;
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// A record type exposed through the pipeline.
///
/// The kind names the visibility schema registered for the record.
pub trait Resource: Serialize {
    /// Resource kind, e.g. `"item"`.
    const KIND: &'static str;
}

/// What a reply body contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Arbitrary JSON without a visibility schema.
    Plain,
    /// One record, or a sequence of records, of the named kind.
    Resource(&'static str),
    /// The targeted record does not exist.
    Absent,
}

/// A successful handler result.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    status: StatusCode,
    kind: ReplyKind,
    body: Value,
}

impl Reply {
    /// Creates a plain JSON reply with `200 OK`.
    #[must_use]
    pub fn json(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            kind: ReplyKind::Plain,
            body,
        }
    }

    /// Creates a reply carrying a single record.
    pub fn resource<R: Resource>(record: &R) -> StrataResult<Self> {
        Ok(Self {
            status: StatusCode::OK,
            kind: ReplyKind::Resource(R::KIND),
            body: serde_json::to_value(record)?,
        })
    }

    /// Creates a reply carrying a sequence of records.
    pub fn resources<R: Resource>(records: &[R]) -> StrataResult<Self> {
        Ok(Self {
            status: StatusCode::OK,
            kind: ReplyKind::Resource(R::KIND),
            body: serde_json::to_value(records)?,
        })
    }

    /// Creates the absent-signal: the target of the request does not exist.
    ///
    /// This is a successful outcome. Interceptors observe it as success and
    /// the transport renders it as `404 Not Found`.
    #[must_use]
    pub fn absent(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            kind: ReplyKind::Absent,
            body: serde_json::json!({
                "error": {
                    "code": "NOT_FOUND",
                    "message": message.into(),
                }
            }),
        }
    }

    /// Overrides the status code.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the reply kind.
    #[must_use]
    pub fn kind(&self) -> ReplyKind {
        self.kind
    }

    /// Returns `true` for the absent-signal.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        self.kind == ReplyKind::Absent
    }

    /// Returns the body.
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Consumes the reply, returning the body.
    #[must_use]
    pub fn into_body(self) -> Value {
        self.body
    }

    /// Replaces the body, keeping status and kind.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }
}
