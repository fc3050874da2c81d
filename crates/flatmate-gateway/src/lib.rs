//! Gateway internals, exposed as a library so the integration tests can
//! assemble the router against an in-memory database.

pub mod app;
pub mod auth;
pub mod http;
pub mod reject;

pub use app::{build_router, AppState};
