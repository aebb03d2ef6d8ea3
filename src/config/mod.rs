//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (batch size, retry parameters, etc.)
//! - The library `Config` and the read-only supply `Policy`
//! - CLI option types and parsing

mod cli;
mod constants;
mod policy;
mod types;

// Re-export all constants
pub use cli::{Command, Opt};
pub use constants::*;
pub use policy::{EntityToggles, LocalePolicy, Policy};
pub use types::{Config, LogFormat, LogLevel};
