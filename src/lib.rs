//! geonames_sync library: GeoNames supply and update
//!
//! This library loads the GeoNames gazetteer (continents, countries,
//! first-level administrative divisions and cities) into a SQLite database
//! and keeps it current by applying the daily modifications and deletes
//! feeds.
//!
//! # Example
//!
//! ```no_run
//! use geonames_sync::{run_supply, Config, LoggingTranslations, SupplyOptions};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     db_path: std::path::PathBuf::from("world.db"),
//!     ..Default::default()
//! };
//!
//! let report = run_supply(
//!     config,
//!     SupplyOptions::default(),
//!     CancellationToken::new(),
//!     &LoggingTranslations,
//! )
//! .await?;
//! println!("{}", report.report);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod config;
pub mod download;
pub mod error_handling;
pub mod initialization;
pub mod models;
pub mod reader;
pub mod run;
pub mod storage;
pub mod supply;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, Policy};
pub use error_handling::SupplyError;
pub use models::EntityKind;
pub use run::{
    run_supply, run_update, LoggingTranslations, RunReport, Stage, StageError, SupplyOptions,
    TranslationSync, UpdateOptions,
};
pub use supply::{KindReport, SupplyFiles, SupplyReport, SupplyService};
