//! JSON body extractor that never rejects

use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use tracing::debug;

/// JSON body extractor falling back to `T::default()`.
///
/// A missing, empty or malformed body, or one sent without a JSON content
/// type, yields the default value instead of a rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientJson<T>(pub T);

impl<T> LenientJson<T> {
    /// Consume the extractor and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for LenientJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = match Bytes::from_request(req, state).await {
            Ok(bytes) => bytes,
            Err(rejection) => {
                debug!(error = %rejection, "Unreadable request body, using defaults");
                return Ok(Self(T::default()));
            }
        };

        Ok(Self(parse_or_default(&bytes)))
    }
}

fn parse_or_default<T: DeserializeOwned + Default>(bytes: &[u8]) -> T {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return T::default();
    }

    serde_json::from_slice(bytes).unwrap_or_else(|e| {
        debug!(error = %e, "Malformed JSON body, using defaults");
        T::default()
    })
}
