use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use arti_query::config::{Settings, SettingsOverrides};
use arti_query::filter::FilterOptions;
use arti_query::orchestrator::{BatchPolicy, Destination, GetOptions, QueryOrchestrator};
use arti_query::repository::nexus::NexusRepository;

/// Search and download artifacts from a Nexus repository
#[derive(Parser)]
#[command(name = "arti-query")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to settings.toml if that exists)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Repository URL
    #[arg(long, global = true)]
    host: Option<String>,

    /// Username
    #[arg(long, global = true)]
    user: Option<String>,

    /// Password
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search the repository: <keyword>, g:a:v, g:a:e:v or g:a:e:c:v, optionally followed by @<repository>
    Search {
        #[arg(default_value = "")]
        query: String,

        #[command(flatten)]
        filter: FilterOptions,
    },
    /// Download artifact(s): g:a:v, g:a:e:v or g:a:e:c:v, optionally followed by @<repository>
    Get {
        gav: String,

        #[command(flatten)]
        filter: FilterOptions,

        /// Output file, requires exactly one matching artifact
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Root directory for <groupId>/<artifactId>/<version>/<file> when not using --out
        #[arg(long, default_value = ".")]
        dir: PathBuf,

        /// Keep downloading after a failed artifact and report all failures at the end
        #[arg(long)]
        keep_going: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let settings = Settings::load(cli.config.as_deref())?
        .with_overrides(SettingsOverrides {
            host: cli.host,
            username: cli.user,
            password: cli.password,
        });

    let repository = NexusRepository::new(
        settings.host()?.to_string(),
        settings.credentials(),
        settings.default_repository.clone(),
    )?;
    let orchestrator = QueryOrchestrator::new(repository);

    match cli.command {
        Command::Search { query, filter } => {
            let outcome = orchestrator.search(&query, &filter).await;
            for artifact in &outcome.artifacts {
                println!("{}", artifact);
            }
            if outcome.error.is_none() && outcome.artifacts.is_empty() {
                info!("no matching artifact for {}", outcome.criteria);
            }
            // a failed search has already been logged and is not fatal
            Ok(ExitCode::SUCCESS)
        }
        Command::Get { gav, filter, out, dir, keep_going } => {
            let options = GetOptions {
                filter,
                destination: match out {
                    Some(path) => Destination::File(path),
                    None => Destination::Layout(dir),
                },
                batch_policy: if keep_going { BatchPolicy::Continue } else { settings.batch_policy },
            };

            let report = orchestrator.get(&gav, &options).await?;
            for downloaded in &report.downloaded {
                info!("{} -> {} ({} bytes)", downloaded.artifact, downloaded.path.display(), downloaded.bytes);
            }
            for (artifact, e) in &report.failed {
                error!("{}: {:#}", artifact, e);
            }

            if report.is_complete() {
                Ok(ExitCode::SUCCESS)
            }
            else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
