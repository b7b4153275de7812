//! Service index.

use strata_core::{HandlerInput, Outcome, Reply};

/// Endpoints listed by the index, in declaration order.
pub const ENDPOINTS: &[&str] = &[
    "GET /",
    "GET /items",
    "GET /items/:id",
    "POST /items",
    "PUT /items/:id",
    "DELETE /items/:id",
];

/// `GET /`: names the service and lists its endpoints.
pub async fn index(_input: HandlerInput) -> Outcome {
    Ok(Reply::json(serde_json::json!({
        "message": "Strata item service",
        "endpoints": ENDPOINTS,
    })))
}
