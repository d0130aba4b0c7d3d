use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use wordpress_version_checker::config::{self, CheckerConfig};
use wordpress_version_checker::github::GitHubClient;
use wordpress_version_checker::logging::init_logging;
use wordpress_version_checker::parser::ReadmeParser;
use wordpress_version_checker::scheduler::{Scheduler, shutdown_on};
use wordpress_version_checker::sweep::Sweeper;
use wordpress_version_checker::version::{LatestVersionSource, WordPressVersionSource};

#[derive(Parser)]
#[command(name = "wordpress-version-checker")]
#[command(
    version,
    about = "Files an issue when a plugin's \"Tested up to\" version lags the latest WordPress"
)]
struct Cli {
    /// Path to the JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Also write logs to the data directory log file
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Sweep on the configured interval until interrupted (default)
    Run,
    /// Run a single sweep and exit
    Once,
    /// Print the latest WordPress version
    Latest,
    /// Print the "Tested up to" version of a local readme
    Parse {
        /// Readme file to parse
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_path = cli.log_file.then(config::log_path);
    let _guard = init_logging(cli.log_json, log_path.as_deref())?;

    let config_path = cli.config.unwrap_or_else(config::config_path);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Parse { file } => parse_readme(&file),
        Command::Latest => runtime.block_on(print_latest(&config_path)),
        Command::Once => runtime.block_on(run_once(&config_path)),
        Command::Run => runtime.block_on(run_scheduler(&config_path)),
    }
}

fn load_config(config_path: &Path) -> anyhow::Result<CheckerConfig> {
    let config = CheckerConfig::load(config_path)?;
    info!(
        "Loaded {} repositories from {}",
        config.repositories.len(),
        config_path.display()
    );
    Ok(config)
}

async fn print_latest(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let source = WordPressVersionSource::new(&config.wordpress.api_url, config.fetch_timeout())?;

    println!("{}", source.fetch_latest().await?);
    Ok(())
}

async fn run_once(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let report = build_sweeper(&config)?.run().await?;

    if report.failed_count() > 0 {
        info!(
            "{} repositories failed, they will be retried on the next sweep",
            report.failed_count()
        );
    }
    Ok(())
}

async fn run_scheduler(config_path: &Path) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let scheduler = Scheduler::new(
        Arc::new(build_sweeper(&config)?),
        config.sweep_interval(),
        config.schedule.run_on_start,
    );

    scheduler
        .run_until(shutdown_on(tokio::signal::ctrl_c()))
        .await;
    Ok(())
}

fn parse_readme(file: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let version = ReadmeParser::new()
        .parse(&content)
        .with_context(|| format!("Invalid readme {}", file.display()))?;
    println!("{}", version);
    Ok(())
}

fn build_sweeper(config: &CheckerConfig) -> anyhow::Result<Sweeper> {
    let source = WordPressVersionSource::new(&config.wordpress.api_url, config.fetch_timeout())?;
    let tracker = GitHubClient::new(
        &config.github.api_url,
        config.github.token.clone(),
        config.fetch_timeout(),
    )?;

    Ok(
        Sweeper::new(Arc::new(source), Arc::new(tracker), config.repositories.clone())
            .with_bot_login(&config.github.bot_login)
            .with_fetch_timeout(config.fetch_timeout()),
    )
}
