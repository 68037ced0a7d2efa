//! Infrastructure layer - Storage, services and observability

pub mod logging;
pub mod observability;
pub mod rate_limiter;
pub mod services;
pub mod workflow;
