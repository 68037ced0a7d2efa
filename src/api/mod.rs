//! API layer - HTTP endpoints and middleware

pub mod catalog;
pub mod health;
pub mod middleware;
pub mod router;
pub mod state;
pub mod types;
pub mod ui;

pub use router::{RouterOptions, create_router, create_router_with_state};
pub use state::AppState;
