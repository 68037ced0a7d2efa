//! HTTP request and response types

pub mod error;
pub mod json;
pub mod query;

pub use error::{ApiError, ApiErrorResponse};
pub use json::LenientJson;
pub use query::LenientQuery;
