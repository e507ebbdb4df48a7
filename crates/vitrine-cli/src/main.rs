mod rows;
mod runner;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vitrine_core::AppConfig;
use vitrine_scraper::{
    CollectContext, CollectorSettings, DiagnosticsSink, FsDiagnostics, HttpPage, NoDiagnostics,
};

use crate::runner::RunFilter;

#[derive(Debug, Parser)]
#[command(name = "vitrine")]
#[command(about = "Collect cash, Pix and installment prices for a sheet of product links")]
struct Cli {
    /// Input CSV with id, title and link columns.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Results CSV to write.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Process at most this many rows.
    #[arg(short, long)]
    limit: Option<usize>,

    /// Comma-separated product ids to process.
    #[arg(long)]
    ids: Option<String>,

    /// Directory for debug snapshots of pages where nothing was found.
    #[arg(long)]
    debug_dir: Option<PathBuf>,
}

impl Cli {
    /// Command-line values take precedence over the environment.
    fn apply(self, config: &mut AppConfig) {
        if let Some(input) = self.input {
            config.input_path = input;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(limit) = self.limit {
            config.limit_rows = Some(limit);
        }
        if let Some(ids) = self.ids.as_deref().and_then(vitrine_core::config::parse_id_list) {
            config.only_ids = Some(ids);
        }
        if let Some(dir) = self.debug_dir {
            config.debug_dir = Some(dir);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config =
        vitrine_core::load_app_config_from_env().context("failed to load configuration")?;
    Cli::parse().apply(&mut config);

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(config.log_level.as_deref())?)
        .init();

    run(&config).await
}

/// `VITRINE_LOG_LEVEL` when set, else `RUST_LOG`, else `info`.
fn log_filter(log_level: Option<&str>) -> anyhow::Result<EnvFilter> {
    let filter = match log_level {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid VITRINE_LOG_LEVEL {level:?}"))?,
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?,
    };
    Ok(filter)
}

async fn run(config: &AppConfig) -> anyhow::Result<()> {
    tracing::debug!(?config, "starting run");

    let input_rows = rows::read_rows(&config.input_path)?;
    let filter = RunFilter {
        limit: config.limit_rows,
        only_ids: config.only_ids.clone(),
    };

    let settings = CollectorSettings::from(config);
    let diagnostics: Box<dyn DiagnosticsSink> = match &config.debug_dir {
        Some(dir) => {
            let sink = FsDiagnostics::new(dir.clone());
            tracing::info!(dir = %sink.root().display(), "debug snapshots enabled");
            Box::new(sink)
        }
        None => Box::new(NoDiagnostics),
    };
    let ctx = CollectContext {
        settings: &settings,
        diagnostics: diagnostics.as_ref(),
    };

    let mut page = HttpPage::new(
        &config.user_agent,
        Duration::from_secs(config.http_connect_timeout_secs),
    )
    .context("failed to build page session")?;

    let report = runner::run_rows(&mut page, &input_rows, &filter, &ctx).await;
    rows::write_output(&config.output_path, &report.rows)?;

    tracing::info!(
        processed = report.rows.len(),
        total = input_rows.len(),
        succeeded = report.succeeded,
        filtered = filter.is_active(),
        output = %config.output_path.display(),
        "run complete"
    );
    println!(
        "OK - {} products processed{}. Output written to {}",
        report.rows.len(),
        if filter.is_active() { " (filter applied)" } else { "" },
        config.output_path.display()
    );

    Ok(())
}
