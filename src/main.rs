//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `geonames_sync` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Ctrl-C handling
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use std::process;
use tokio_util::sync::CancellationToken;

use geonames_sync::config::{Command, Opt};
use geonames_sync::initialization::init_logger_with;
use geonames_sync::{
    run_supply, run_update, LoggingTranslations, RunReport, SupplyOptions, UpdateOptions,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // Try loading from current directory first, then from the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    let config = match opt.to_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("geonames_sync error: {:#}", e);
            process::exit(1);
        }
    };

    // First Ctrl-C aborts in-flight downloads; the current stage then fails
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            signal_token.cancel();
        }
    });

    let translations = LoggingTranslations;
    let result = match opt.command {
        Command::Supply {
            force,
            keep_files,
            without_translations,
        } => {
            let options = SupplyOptions {
                force,
                keep_files,
                with_translations: !without_translations,
            };
            run_supply(config, options, cancel, &translations).await
        }
        Command::Update {
            keep_files,
            without_translations,
            date,
        } => {
            let options = UpdateOptions::new(keep_files, !without_translations, date);
            run_update(config, options, cancel, &translations).await
        }
    };

    match result {
        Ok(report) => {
            print_summary(&report);
            Ok(())
        }
        Err(e) => {
            eprintln!("geonames_sync error: {:#}", e);
            process::exit(1);
        }
    }
}

fn print_summary(report: &RunReport) {
    println!(
        "✅ Finished in {:.1}s: {}",
        report.elapsed_seconds, report.report
    );
    println!("Results saved in {}", report.db_path.display());
}
