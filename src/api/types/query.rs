//! Query string extractor that never rejects

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query},
    http::{Uri, request::Parts},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

/// Query string extractor falling back to `T::default()`.
///
/// Every parameter is read as a string. A key repeated in the query string
/// keeps its first value, and a query that cannot be decoded into `T`
/// yields the default value.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for LenientQuery<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parse_or_default(&parts.uri)))
    }
}

fn parse_or_default<T: DeserializeOwned + Default>(uri: &Uri) -> T {
    let pairs = match Query::<Vec<(String, String)>>::try_from_uri(uri) {
        Ok(Query(pairs)) => pairs,
        Err(rejection) => {
            debug!(error = %rejection, "Undecodable query string, using defaults");
            return T::default();
        }
    };

    let mut fields = Map::new();
    for (key, value) in pairs {
        fields.entry(key).or_insert(Value::String(value));
    }

    serde_json::from_value(Value::Object(fields)).unwrap_or_else(|e| {
        debug!(error = %e, "Unexpected query parameters, using defaults");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use super::*;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Params {
        page: Option<String>,
        q: Option<String>,
    }

    fn parse(uri: &'static str) -> Params {
        parse_or_default(&Uri::from_static(uri))
    }

    #[test]
    fn test_first_value_wins() {
        assert_eq!(parse("/?page=1&page=2").page.as_deref(), Some("1"));
        assert_eq!(parse("/?q=a&page=7&q=b").q.as_deref(), Some("a"));
    }

    #[test]
    fn test_missing_and_unknown_keys() {
        assert_eq!(parse("/"), Params::default());
        assert_eq!(parse("/?other=1").page, None);
        assert_eq!(parse("/?page=").page.as_deref(), Some(""));
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(parse("/?q=google%20sheets").q.as_deref(), Some("google sheets"));
        assert_eq!(parse("/?q=a+b").q.as_deref(), Some("a b"));
    }

    #[tokio::test]
    async fn test_extractor_never_rejects() {
        let request = axum::http::Request::builder()
            .uri("/search?page=3&page=4&page")
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let LenientQuery(params) = LenientQuery::<Params>::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(params.page.as_deref(), Some("3"));
    }
}
