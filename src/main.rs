use anyhow::Result;
use clap::{Parser, ValueEnum};
use recipebook_harness::auth::Session;
use recipebook_harness::client::ApiClient;
use recipebook_harness::config::{FileConfig, HarnessConfig};
use recipebook_harness::fixtures::RunFixture;
use recipebook_harness::sequence::{
    category_lifecycle, recipe_lifecycle, run_sequence, SequenceReport, Step,
};
use std::path::PathBuf;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Sequences {
    All,
    Recipes,
    Categories,
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Base URL of the RecipeBook server under test.
    #[clap(long)]
    base_url: Option<String>,

    /// Email of the pre-provisioned test account.
    #[clap(long)]
    email: Option<String>,

    /// Password of the pre-provisioned test account.
    #[clap(long)]
    password: Option<String>,

    /// Path to an optional TOML config file.
    #[clap(long)]
    config: Option<PathBuf>,

    /// Which lifecycle sequences to run.
    #[clap(long, value_enum, default_value_t = Sequences::All)]
    sequences: Sequences,

    /// Timeout in seconds for individual HTTP requests.
    #[clap(long)]
    request_timeout_sec: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let config = HarnessConfig::resolve(
        cli_args.base_url,
        cli_args.email,
        cli_args.password,
        cli_args.request_timeout_sec,
        file_config,
    );

    info!("Targeting RecipeBook server at {}", config.base_url);

    let mut reports: Vec<SequenceReport> = Vec::new();
    if matches!(cli_args.sequences, Sequences::All | Sequences::Recipes) {
        reports.push(run_lifecycle(&config, "recipe lifecycle", recipe_lifecycle()).await?);
    }
    if matches!(cli_args.sequences, Sequences::All | Sequences::Categories) {
        reports.push(run_lifecycle(&config, "category lifecycle", category_lifecycle()).await?);
    }

    let mut failures = 0;
    for report in &reports {
        if let Some((step, err)) = report.failure() {
            failures += 1;
            error!("{}: failed at step `{}`: {}", report.name, step, err);
        } else {
            info!("{}: all {} steps passed", report.name, report.steps.len());
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} sequences failed", failures, reports.len());
    }
    Ok(())
}

/// Authenticates a fresh session and drives one sequence.
///
/// An authentication failure propagates and aborts the whole run; assertion
/// failures stay inside the returned report so independent sequences still
/// run.
async fn run_lifecycle(
    config: &HarnessConfig,
    name: &'static str,
    steps: &[Step],
) -> Result<SequenceReport> {
    let api = ApiClient::new(config.base_url.clone(), config.request_timeout);
    let session = Session::establish(api, &config.credentials()).await?;
    let fixture = RunFixture::generate();
    info!(sequence = name, suffix = fixture.suffix(), "run fixture generated");
    Ok(run_sequence(name, &session, &fixture, steps).await)
}
