use std::path::PathBuf;

use anyhow::{Context, Result};
use badge_wall::{
    aggregate::{BadgeAggregator, DEFAULT_CONCURRENCY},
    client::{RemoteWorkflowClient, RetrievalPolicy},
    config::{ConfigStore, DEFAULT_CONFIG_PATH},
    render::{self, DEFAULT_OUTPUT_PATH, DEFAULT_TITLE, WallRenderer},
    workflow::github::{GITHUB_API_URL, GitHubProvider},
};
use chrono::Local;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "badge-wall")]
#[command(version, about = "Render a static wall of GitHub Actions workflow badges")]
struct Cli {
    /// Path to the repository configuration
    #[arg(long, short, env = "WALL_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Where to write the generated page
    #[arg(long, short, env = "WALL_OUTPUT", default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// How workflows are retrieved for each repository
    #[arg(long, value_enum, default_value = "enumerate")]
    policy: Policy,

    /// How many repositories are fetched at once
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "GITHUB_API_URL", default_value = GITHUB_API_URL)]
    api_url: String,

    /// Page title and heading
    #[arg(long, default_value = DEFAULT_TITLE)]
    title: String,

    /// Log debug output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Policy {
    /// List every workflow of the repository
    Enumerate,
    /// Look up ci.yml, build.yml and test.yml only
    Probe,
}

impl From<Policy> for RetrievalPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Enumerate => Self::EnumerateAll,
            Policy::Probe => Self::probe_default(),
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "badge_wall=debug,info"
        } else {
            "info"
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = ConfigStore::new(&cli.config);
    let config = store.load().context("failed to load configuration")?;
    let token = store
        .get_credential()
        .context("failed to resolve the GitHub token")?;
    info!(
        "loaded configuration for organization {} ({} repositories)",
        config.organization,
        config.repository_count()
    );

    let provider = GitHubProvider::with_api_url(token, &cli.api_url)?;
    let client = RemoteWorkflowClient::new(provider).with_policy(cli.policy.into());

    info!("starting badge generation…");
    let wall = BadgeAggregator::new(client)
        .with_concurrency(cli.concurrency)
        .build(&config)
        .await;

    let html = WallRenderer::new()
        .with_title(cli.title)
        .render(&wall, Local::now().naive_local());
    render::write(&html, &cli.output)
        .await
        .context("failed to write the badge wall")?;

    info!("badge generation completed");
    Ok(())
}
