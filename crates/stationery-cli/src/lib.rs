//! Command-line front end for StationeryConnect.
//!
//! # Key Abstractions
//!
//! - [`StationeryCli`]: loads configuration, logs in and dispatches commands
//! - [`CliArgs`]: clap argument tree
//! - [`StationeryConfig`]: file/env configuration via `confyg`

#![doc = include_str!("../README.md")]

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;
pub mod crm_handlers;

pub use app::StationeryCli;
pub use cli::{CliArgs, Command};
pub use config::StationeryConfig;
