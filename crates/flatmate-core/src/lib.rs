//! Shared foundation for the Flatmate workspace: configuration loading,
//! id aliases, and the core error type.

pub mod config;
pub mod error;
pub mod types;

pub use config::FlatmateConfig;
pub use error::CoreError;
