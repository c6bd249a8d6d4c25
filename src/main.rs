use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use gitwrap::server::{self, AppState};
use gitwrap::svg::{self, Theme};
use gitwrap::{GithubApi, GithubArgs, GithubClient, Settings, StatsAggregator, StatsSummary};
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

/// GitWrap - your year on GitHub, as a card
#[derive(Parser, Debug)]
#[command(name = "gitwrap")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the stats API and card endpoint
    Serve {
        /// Address to listen on
        #[arg(long, env = "GITWRAP_BIND", default_value = "127.0.0.1:8000")]
        bind: SocketAddr,

        #[command(flatten)]
        github: GithubArgs,
    },

    /// Print a user's summary as JSON
    Stats {
        /// GitHub username
        username: String,

        #[command(flatten)]
        github: GithubArgs,
    },

    /// Write a user's card as SVG
    Card {
        /// GitHub username
        username: String,

        /// Card theme (dark or light)
        #[arg(long, default_value = "dark")]
        theme: Theme,

        /// Output path (defaults to gitwrap-<login>-<year>.svg)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        github: GithubArgs,
    },
}

fn build_aggregator(settings: &Settings) -> Result<StatsAggregator> {
    let client = GithubClient::new(&settings.api_base, settings.call_timeout)
        .context("Failed to create GitHub client")?;
    Ok(StatsAggregator::new(Arc::new(client) as Arc<dyn GithubApi>)
        .with_deadline(settings.request_deadline))
}

async fn fetch_summary(username: &str, github: GithubArgs) -> Result<StatsSummary> {
    let settings = Settings::from(github);
    let aggregator = build_aggregator(&settings)?;
    let summary = aggregator
        .aggregate(username, settings.default_year, settings.token.as_ref())
        .await
        .with_context(|| format!("Failed to aggregate GitHub data for {username}"))?;
    Ok(summary)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Serve { bind, github } => {
            let settings = Settings::from(github);
            if settings.token.is_none() {
                log::warn!("No GitHub token configured; every request will fail until one is set");
            }
            let aggregator = build_aggregator(&settings)?;
            let state = AppState::new(aggregator, settings.token, settings.default_year);

            let listener = TcpListener::bind(bind)
                .await
                .with_context(|| format!("Failed to bind {bind}"))?;
            server::serve(listener, state).await.context("Server failed")?;
        }
        Commands::Stats { username, github } => {
            let summary = fetch_summary(&username, github).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Card {
            username,
            theme,
            output,
            github,
        } => {
            let summary = fetch_summary(&username, github).await?;
            let path = output.unwrap_or_else(|| {
                PathBuf::from(format!("gitwrap-{}-{}.svg", summary.user.login, summary.year))
            });
            fs::write(&path, svg::generate_svg(&summary, theme))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Generated {} successfully.", path.display());
        }
    }

    Ok(())
}
