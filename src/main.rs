//! Feed → CSV exporter — Binary Entrypoint
//! Loads configuration, fetches the feed once and writes the CSV table.

use anyhow::Context;
use feed_table_export::{export, success_message, ExportConfig, HttpFeedSource};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact human-readable logs by default; JSON lines when FEED_EXPORT_LOG_JSON=1.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("feed_table_export=info,warn"));

    let json = std::env::var("FEED_EXPORT_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = ExportConfig::load_default().context("loading export config")?;
    let source = HttpFeedSource::new(cfg.feed_url.clone(), cfg.timeout())
        .context("building HTTP client")?;

    let report = export(&source, &cfg)
        .await
        .with_context(|| format!("exporting {} to {}", cfg.feed_url, cfg.output_path.display()))?;

    println!("{}", success_message(&cfg, &report));
    Ok(())
}
