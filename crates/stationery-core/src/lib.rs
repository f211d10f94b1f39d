//! StationeryConnect Core — shared errors and traits.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`state`]: Shared application state
//! - [`traits`]: Configuration abstraction

#![doc = include_str!("../README.md")]

pub mod error;
pub mod state;
pub mod traits;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use state::AppState;
pub use traits::ConfigProvider;
