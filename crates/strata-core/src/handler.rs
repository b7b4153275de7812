//! Handler trait for route business logic.
//!
//! A [`Handler`] is the innermost step of the pipeline. It receives the
//! route's path parameters and body as a [`HandlerInput`] and knows nothing
//! about the stages wrapped around it.

use crate::{HandlerInput, Reply, StrataError};
use std::future::Future;
use std::pin::Pin;

/// A boxed future, `Send` so it can cross tokio tasks.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The settled result of a handler or of any stage wrapping it.
pub type Outcome = Result<Reply, StrataError>;

/// Type-erased route handler.
///
/// Any `Fn(HandlerInput) -> impl Future<Output = Outcome>` closure is a
/// handler, so routes are usually declared with closures capturing their
/// shared state by `Arc`.
///
/// # Example
///
/// ```
/// use strata_core::{Handler, HandlerInput, Reply};
///
/// let hello = |_input: HandlerInput| async { Ok(Reply::json(serde_json::json!("hi"))) };
/// let _handler: &dyn Handler = &hello;
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Invokes the handler.
    fn call(&self, input: HandlerInput) -> BoxFuture<'static, Outcome>;
}

impl<F, Fut> Handler for F
where
    F: Fn(HandlerInput) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    fn call(&self, input: HandlerInput) -> BoxFuture<'static, Outcome> {
        Box::pin(self(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_closure_is_handler() {
        let handler: Arc<dyn Handler> = Arc::new(|input: HandlerInput| async move {
            let id: u64 = input.param("id")?;
            Ok(Reply::json(serde_json::json!({ "id": id })))
        });

        let mut params = HashMap::new();
        params.insert("id".to_string(), "7".to_string());
        let reply = handler
            .call(HandlerInput::new(params, bytes::Bytes::new()))
            .await
            .unwrap();
        assert_eq!(reply.body()["id"], 7);
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let handler = |_input: HandlerInput| async { Err(StrataError::internal("boom")) };
        let outcome = handler.call(HandlerInput::empty()).await;
        assert!(matches!(outcome, Err(StrataError::Internal { .. })));
    }
}
