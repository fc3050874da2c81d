//! Wire contract of the bot API: request/response payloads, the coded error
//! shape, and route path constants. Bot clients depend on these staying
//! byte-compatible; `tests/wire_compat.rs` pins the exact JSON.

pub mod error;
pub mod input;
pub mod methods;
pub mod output;

pub use error::{ApiError, ErrorBody};
pub use output::UserInfo;
