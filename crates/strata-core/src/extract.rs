//! Coerced handler arguments.
//!
//! A [`FromInput`] type is built from a [`HandlerInput`] before the handler
//! function is called. Wrapping a function with [`coerce`] turns it into a
//! [`Handler`] whose body only ever sees valid arguments: if coercion
//! fails, the error is the outcome and the function does not run.

use crate::{Handler, HandlerInput, Outcome, StrataResult};
use serde::de::DeserializeOwned;
use std::future::Future;

/// Trait for argument types coerced from a [`HandlerInput`].
///
/// # Example
///
/// ```
/// use strata_core::{FromInput, HandlerInput, StrataResult};
///
/// struct RecordId(u64);
///
/// impl FromInput for RecordId {
///     fn from_input(input: &HandlerInput) -> StrataResult<Self> {
///         input.param("id").map(RecordId)
///     }
/// }
///
/// assert!(RecordId::from_input(&HandlerInput::empty()).is_err());
/// ```
pub trait FromInput: Sized {
    /// Coerces this type from the input.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the input does not hold a valid
    /// value.
    fn from_input(input: &HandlerInput) -> StrataResult<Self>;
}

impl FromInput for () {
    fn from_input(_input: &HandlerInput) -> StrataResult<Self> {
        Ok(())
    }
}

// Left to right, so the first failing argument is the one reported.
macro_rules! impl_from_input_for_tuple {
    ($($T:ident),*) => {
        impl<$($T: FromInput),*> FromInput for ($($T,)*) {
            fn from_input(input: &HandlerInput) -> StrataResult<Self> {
                Ok(($($T::from_input(input)?,)*))
            }
        }
    };
}

impl_from_input_for_tuple!(T1);
impl_from_input_for_tuple!(T1, T2);
impl_from_input_for_tuple!(T1, T2, T3);

/// A JSON request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T: DeserializeOwned> FromInput for Json<T> {
    fn from_input(input: &HandlerInput) -> StrataResult<Self> {
        input.json().map(Json)
    }
}

/// Turns a function of coerced arguments into a [`Handler`].
///
/// # Example
///
/// ```
/// use strata_core::{coerce, Handler, Json, Reply};
///
/// #[derive(serde::Deserialize)]
/// struct Greeting {
///     name: String,
/// }
///
/// let greet = coerce(|Json(greeting): Json<Greeting>| async move {
///     Ok(Reply::json(serde_json::json!({ "hello": greeting.name })))
/// });
/// let _handler: &dyn Handler = &greet;
/// ```
pub fn coerce<T, F, Fut>(function: F) -> impl Handler
where
    T: FromInput + Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    move |input: HandlerInput| {
        let call = T::from_input(&input).map(&function);
        async move { call?.await }
    }
}
