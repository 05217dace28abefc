//! piiscan command-line shell
//!
//! Loads configuration, sets up logging and runs one batch over the
//! filesystem object store. Scanning logic lives in the `crates/` directory.

use anyhow::Context;
use piiscan_core::AppConfig;
use piiscan_scanner::{BatchConfig, BatchDriver, BatchSummary};
use piiscan_store::FsObjectStore;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor the configured filter parses
const FALLBACK_FILTER: &str = "info,piiscan=debug";

/// Pick the log filter: `RUST_LOG` wins over the configured directive.
fn log_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

/// Initialize tracing subscriber for logging
fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::{fmt, prelude::*};

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(log_filter(&config.logging.filter))
        .init();
}

/// Run one batch with an already loaded configuration.
///
/// The destination collection is created if missing; a missing source
/// collection aborts the batch.
pub async fn run_with_config(config: &AppConfig) -> anyhow::Result<BatchSummary> {
    let batch = BatchConfig::from_app_config(config).context("invalid configuration")?;

    let store = FsObjectStore::new(&config.store.root).with_page_size(config.store.page_size);
    store
        .create_collection(&batch.destination)
        .await
        .with_context(|| format!("failed to create destination {}", batch.destination))?;

    let driver = BatchDriver::new(Arc::new(store), batch);
    let summary = driver.run().await.context("batch aborted")?;
    Ok(summary)
}

/// Entry point for the `piiscan` binary.
///
/// Exits non-zero when the batch aborts or any object fails.
pub async fn run() -> anyhow::Result<ExitCode> {
    let config = AppConfig::load_with_env().context("failed to load configuration")?;
    init_tracing(&config);

    info!("Starting piiscan v{}", env!("CARGO_PKG_VERSION"));

    let summary = run_with_config(&config).await?;
    println!("{summary}");

    Ok(if summary.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configured_filter_falls_back() {
        // Only meaningful when RUST_LOG is unset in the test environment
        if std::env::var_os("RUST_LOG").is_none() {
            let filter = log_filter("piiscan=notalevel");
            assert_eq!(filter.to_string(), EnvFilter::new(FALLBACK_FILTER).to_string());
        }
    }

    #[test]
    fn test_configured_filter_used() {
        if std::env::var_os("RUST_LOG").is_none() {
            let filter = log_filter("warn");
            assert_eq!(filter.to_string(), "warn");
        }
    }
}
