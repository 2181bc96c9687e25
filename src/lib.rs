//! Command line client for PocketBase servers.
//!
//! # Modules
//!
//! - `registry`: named contexts and the active-context pointer
//! - `resolver`: Cisco-style command abbreviation
//! - `session`: validity of cached authentication
//! - `storage`: YAML persistence under the configuration directory
//! - `client`: PocketBase REST API client
//! - `commands` / `actions`: CLI definitions and their implementations

pub mod actions;
pub mod cli;
pub mod client;
pub mod commands;
pub mod configuration;
pub mod context;
pub mod error;
pub mod exit_codes;
pub mod format;
pub mod model;
pub mod record;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod storage;
